//! Crate `error` collects the abnormal outcomes that are surfaced as data
//! rather than as a normal `Ok` value.
//!
//! Only three of the five kinds described in the design notes become a
//! Rust `Error`: an unsatisfiable solve and a solver abort are *not*
//! errors here, they are ordinary values (`SolveOutcome`, `DetCond`,
//! `FaultStatus`) — promoting them to `Err` would make the common case of
//! "this fault is untestable" look like a failure of the tool itself.

use thiserror::Error;

/// Errors a caller can get back from a single public call.
///
/// `InvalidArgument` and `LogicNotApplicable` are caller-contract
/// violations: safe to abort the current work unit (a single fault, a
/// single FFR), never the process. `ImpossibleState` marks an internal
/// invariant break; callers should treat it like a panic that was caught
/// at a thread boundary — the work unit that raised it is abandoned, but
/// sibling workers keep going.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DtpgError {
    /// Two `Assign`s on the same `(node, frame)` disagree.
    #[error("conflicting assignment on node {node:?} at frame {frame}: {existing} vs {new}")]
    ConflictingAssignment {
        node: crate::network::NodeId,
        frame: u8,
        existing: bool,
        new: bool,
    },

    /// A `NodeId`/`FfrId`/`MffcId`/`FaultId` was out of range for the
    /// `Network` it was used against.
    #[error("index {index} out of range (bound {bound}) for {what}")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },

    /// A `Config` option carried the wrong JSON shape (e.g. `method` was
    /// not one of the known strings, or `thread_num` was negative).
    #[error("option {key:?} has invalid value: {detail}")]
    InvalidOption { key: &'static str, detail: String },

    /// An operation was asked to act on a structurally impossible
    /// argument — e.g. lowering a `DetCond` whose `cover` is empty but
    /// whose `kind` is `Detected`, or estimating the CNF size of a
    /// constant-0 `Expr`.
    #[error("impossible state: {0}")]
    ImpossibleState(String),
}

pub type Result<T> = std::result::Result<T, DtpgError>;
