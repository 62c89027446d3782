//! Crate `network` owns the in-memory circuit: nodes, FFRs, MFFCs and the
//! fault table. File parsing (blif/iscas89) is out of scope; `Network` is
//! built programmatically, either by hand or by an external front end
//! that calls [`NetworkBuilder`].

mod builder;
mod fault;
mod ffr;
mod node;

pub use builder::NetworkBuilder;
pub use fault::{Fault, FaultId, FaultModel, FaultVariant};
pub use ffr::{Ffr, FfrId, Mffc, MffcId};
pub use node::{Node, NodeId, NodeKind, Primitive};

use crate::error::{self, DtpgError};

/// The circuit DAG plus its derived structure (FFRs, MFFCs, fault table).
///
/// `Network` has process-lifetime ownership of every `Node`/`Ffr`/`Mffc`/
/// `Fault`; every other component in this crate borrows it read-only.
/// Fanin lists, once built, never change — indices into `nodes` are
/// stable for the life of the `Network`.
#[derive(Debug, Default)]
pub struct Network {
    nodes: Vec<Node>,
    ffrs: Vec<Ffr>,
    mffcs: Vec<Mffc>,
    faults: Vec<Fault>,
    has_prev_state: bool,
}

impl Network {
    /// Returns the node with the given id.
    ///
    /// # Panics
    /// Panics if `id` is out of range; `NodeId`s handed out by this
    /// `Network` are always in range, so this only fires on a caller bug
    /// (an id borrowed from a different `Network`).
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_num(&self) -> usize {
        self.nodes.len()
    }

    pub fn ffr(&self, id: FfrId) -> &Ffr {
        &self.ffrs[id.0]
    }

    pub fn ffr_num(&self) -> usize {
        self.ffrs.len()
    }

    pub fn ffr_ids(&self) -> impl Iterator<Item = FfrId> + '_ {
        (0..self.ffrs.len()).map(FfrId)
    }

    pub fn mffc(&self, id: MffcId) -> &Mffc {
        &self.mffcs[id.0]
    }

    pub fn mffc_num(&self) -> usize {
        self.mffcs.len()
    }

    /// `true` if the network contains at least one flip-flop, i.e. a
    /// transition-delay (two-frame) fault model is meaningful for it.
    pub fn has_prev_state(&self) -> bool {
        self.has_prev_state
    }

    pub fn fault(&self, id: FaultId) -> &Fault {
        &self.faults[id.0]
    }

    pub fn fault_num(&self) -> usize {
        self.faults.len()
    }

    /// Representative faults only: every `Fault` whose `rep_of` is its
    /// own fixed point.
    pub fn rep_fault_list(&self) -> impl Iterator<Item = &Fault> {
        self.faults
            .iter()
            .enumerate()
            .filter(|(i, f)| f.rep_of().0 == *i)
            .map(|(_, f)| f)
    }

    pub(crate) fn checked_node(&self, id: NodeId) -> error::Result<&Node> {
        self.nodes
            .get(id.0)
            .ok_or(DtpgError::IndexOutOfRange {
                what: "NodeId",
                index: id.0,
                bound: self.nodes.len(),
            })
    }
}
