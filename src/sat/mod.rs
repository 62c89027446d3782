//! Crate `sat` is the abstract boundary to the third-party SAT solver.
//! Nothing in this crate names a concrete solver type outside this
//! module: `StructEngine`, `BoolDiffEnc`, `CondGen` and the lowering
//! pipeline all program against [`SatSolver`].

#[cfg(feature = "rustsat-backend")]
mod adapter;
/// A small brute-force backend with no external dependency, used by this
/// crate's own tests and available to callers who want a solver that
/// doesn't need `rustsat-backend`.
pub mod naive;

#[cfg(feature = "rustsat-backend")]
pub use adapter::RustSatSolver;

/// A solver literal: positive for the variable asserted true, negative
/// for asserted false, never zero. Mirrors the `i32` literal convention
/// `splr`'s own `Certificate`/CNF-file I/O uses.
pub type SatLit = i32;

/// Three-valued solver result for a single `(lit)` query against a
/// model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitValue {
    True,
    False,
    X,
}

/// A satisfying assignment, valid only until the next `solve` call on the
/// solver that produced it.
pub trait Model {
    fn value(&self, lit: SatLit) -> LitValue;
}

/// The outcome of one `solve` call.
pub enum SolveOutcome<'a> {
    Sat(&'a dyn Model),
    Unsat,
    /// The solver's conflict/time budget was exhausted before it could
    /// decide. Never an `Err` — callers fold this into `DetCond::Overflow`
    /// or `FaultStatus::Undetected`, per the design notes' instruction
    /// that solver non-answers are ordinary data, not errors.
    Abort,
}

/// Aggregate counters a solver can report; folded into `DtpgStats`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SatCallStats {
    pub restarts: u64,
    pub conflicts: u64,
    pub decisions: u64,
    pub propagations: u64,
}

impl SatCallStats {
    pub fn merge_sum(&mut self, other: &SatCallStats) {
        self.restarts += other.restarts;
        self.conflicts += other.conflicts;
        self.decisions += other.decisions;
        self.propagations += other.propagations;
    }

    pub fn merge_max(&mut self, other: &SatCallStats) {
        self.restarts = self.restarts.max(other.restarts);
        self.conflicts = self.conflicts.max(other.conflicts);
        self.decisions = self.decisions.max(other.decisions);
        self.propagations = self.propagations.max(other.propagations);
    }
}

/// The abstract interface every component in this crate consumes. A
/// concrete solver (behind the `rustsat-backend` feature, or the
/// in-crate brute-force test backend) implements this trait; nothing
/// upstream of this module ever matches on a concrete solver type.
pub trait SatSolver {
    /// Allocates a fresh variable and returns its positive literal.
    /// `decision` hints whether the solver should branch on it (most
    /// callers want `true`; Tseitin auxiliary variables typically pass
    /// `false`).
    fn new_variable(&mut self, decision: bool) -> SatLit;

    /// Adds a clause (disjunction of literals).
    fn add_clause(&mut self, clause: &[SatLit]);

    /// `out <-> AND(inputs)`.
    fn add_andgate(&mut self, out: SatLit, inputs: &[SatLit]) {
        for &i in inputs {
            self.add_clause(&[-out, i]);
        }
        let mut cl: Vec<SatLit> = inputs.iter().map(|&i| -i).collect();
        cl.push(out);
        self.add_clause(&cl);
    }

    /// `out <-> OR(inputs)`.
    fn add_orgate(&mut self, out: SatLit, inputs: &[SatLit]) {
        for &i in inputs {
            self.add_clause(&[out, -i]);
        }
        let mut cl: Vec<SatLit> = inputs.to_vec();
        cl.push(-out);
        self.add_clause(&cl);
    }

    /// `out <-> NOR(inputs)`.
    fn add_norgate(&mut self, out: SatLit, inputs: &[SatLit]) {
        let tmp = self.new_variable(false);
        self.add_orgate(tmp, inputs);
        self.add_clause(&[out, tmp]);
        self.add_clause(&[-out, -tmp]);
    }

    /// `out <-> XOR(a, b)`.
    fn add_xorgate(&mut self, out: SatLit, a: SatLit, b: SatLit) {
        self.add_clause(&[-out, -a, -b]);
        self.add_clause(&[-out, a, b]);
        self.add_clause(&[out, -a, b]);
        self.add_clause(&[out, a, -b]);
    }

    /// Solves under the given unit assumptions. The returned model (if
    /// any) is valid only until the next call to `solve`.
    fn solve(&mut self, assumptions: &[SatLit]) -> SolveOutcome<'_>;

    fn cnf_size(&self) -> (usize, usize);

    fn get_stats(&self) -> SatCallStats;
}
