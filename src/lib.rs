/*!
# A SAT-encoded structural ATPG reasoning core

`dtpg-core` is the reasoning layer of an Automatic Test Pattern
Generator for gate-level digital circuits: given a [`network::Network`]
(the circuit DAG plus its derived fanout-free regions, maximum fanout-free
cones and fault table) it builds incremental structural CNF, encodes the
Boolean difference between a faulty and a fault-free copy of the circuit,
and drives a SAT solver to either produce a detecting test vector for a
fault or establish that none exists.

Three entry points sit on top of the shared encoding pipeline
([`struct_engine`], [`bool_diff`], [`extract`], [`justify`]):

- [`dtpg::Dtpg`] generates a single test vector for one fault.
- [`condgen::CondGenMgr`] enumerates, per fanout-free region, a covering
  set of sufficient propagation conditions in parallel across a thread
  pool.
- [`lowering`] turns one such condition's cover into a single SAT
  literal a caller can assume, by any of several CNF-lowering
  strategies, or estimates the relative cost of each without
  materializing clauses.

Everything above is generic over [`sat::SatSolver`]: production callers
link the `rustsat`-backed [`sat::RustSatSolver`] (the `rustsat-backend`
feature, on by default), while this crate's own tests and any caller
without a system SAT solver available can use the dependency-free
[`sat::naive::BruteForceSolver`].
*/

/// Crate `network` owns the in-memory circuit: nodes, FFRs, MFFCs and
/// the fault table.
pub mod network;
/// Crate `sat` is the abstract boundary to the third-party SAT solver.
pub mod sat;
/// Crate `types` provides the shared value types every encoder and
/// driver passes around.
pub mod types;
/// Crate `varmap` is the bijection between (node, time-frame) pairs and
/// SAT literals.
pub mod varmap;
/// Crate `struct_engine` builds incremental structural CNF over a
/// time-indexed assignment space.
pub mod struct_engine;
/// Crate `bool_diff` encodes the Boolean-difference cone attached to a
/// `StructEngine` as a sub-encoder.
pub mod bool_diff;
/// Crate `extract` recovers a sufficient condition from a SAT model.
pub mod extract;
/// Crate `justify` back-propagates an internal condition to one
/// expressed purely in terms of primary/pseudo inputs.
pub mod justify;
/// Crate `condgen` enumerates per-FFR sufficient conditions in
/// parallel.
pub mod condgen;
/// Crate `lowering` turns a condition's cover into CNF, by one of
/// several strategies, or estimates the cost of each.
pub mod lowering;
/// Crate `config` holds the option map every driver-level entry point
/// reads from.
pub mod config;
/// Crate `stats` collects the counters the drivers above report.
pub mod stats;
/// Crate `dtpg` is the top-level per-fault test generation driver.
pub mod dtpg;
/// Crate `error` collects the abnormal outcomes surfaced as data rather
/// than as a normal `Ok` value.
pub mod error;

pub use config::Config;
pub use dtpg::Dtpg;
pub use error::{DtpgError, Result};
pub use network::{Fault, FaultModel, FaultVariant, Network, NetworkBuilder};
pub use stats::{CondGenStats, DtpgStats};
pub use types::{Assign, AssignList, DetCond, DtpgResult, TestVector};

/// This crate's version number.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
