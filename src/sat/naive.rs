//! A brute-force `SatSolver` used only by this crate's own tests. It
//! enumerates the full truth table over its variables on every `solve`
//! call, which is fine for the small fixtures in `tests/scenarios.rs`
//! but would never scale to a real circuit — that's exactly why the
//! `rustsat-backend` feature exists for non-test builds.

use super::{LitValue, Model, SatCallStats, SatLit, SatSolver, SolveOutcome};

#[derive(Debug, Clone, Default)]
pub struct BruteForceSolver {
    num_vars: usize,
    clauses: Vec<Vec<SatLit>>,
    last_model: Vec<bool>,
    calls: u64,
}

impl BruteForceSolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn holds(assignment: &[bool], lit: SatLit) -> bool {
        let idx = lit.unsigned_abs() as usize - 1;
        let v = assignment[idx];
        if lit < 0 {
            !v
        } else {
            v
        }
    }

    fn satisfies(&self, assignment: &[bool]) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|&lit| Self::holds(assignment, lit)))
    }
}

impl Model for BruteForceSolver {
    fn value(&self, lit: SatLit) -> LitValue {
        if Self::holds(&self.last_model, lit) {
            LitValue::True
        } else {
            LitValue::False
        }
    }
}

impl SatSolver for BruteForceSolver {
    fn new_variable(&mut self, _decision: bool) -> SatLit {
        self.num_vars += 1;
        self.num_vars as SatLit
    }

    fn add_clause(&mut self, clause: &[SatLit]) {
        self.clauses.push(clause.to_vec());
    }

    fn solve(&mut self, assumptions: &[SatLit]) -> SolveOutcome<'_> {
        self.calls += 1;
        let n = self.num_vars;
        for bits in 0..(1u64 << n) {
            let assignment: Vec<bool> = (0..n).map(|i| (bits >> i) & 1 == 1).collect();
            if !self.satisfies(&assignment) {
                continue;
            }
            if assumptions.iter().all(|&lit| Self::holds(&assignment, lit)) {
                self.last_model = assignment;
                return SolveOutcome::Sat(&*self);
            }
        }
        SolveOutcome::Unsat
    }

    fn cnf_size(&self) -> (usize, usize) {
        let lits = self.clauses.iter().map(Vec::len).sum();
        (self.clauses.len(), lits)
    }

    fn get_stats(&self) -> SatCallStats {
        SatCallStats {
            restarts: 0,
            conflicts: 0,
            decisions: 0,
            propagations: self.calls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_trivial_and() {
        let mut s = BruteForceSolver::new();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        let out = s.new_variable(false);
        s.add_andgate(out, &[a, b]);
        match s.solve(&[out]) {
            SolveOutcome::Sat(m) => {
                assert_eq!(m.value(a), LitValue::True);
                assert_eq!(m.value(b), LitValue::True);
            }
            _ => panic!("expected sat"),
        }
        match s.solve(&[out, -a]) {
            SolveOutcome::Unsat => {}
            _ => panic!("expected unsat"),
        }
    }
}
