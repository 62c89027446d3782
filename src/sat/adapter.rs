//! Concrete `SatSolver` backed by `rustsat` + the `kissat` backend,
//! gated behind the `rustsat-backend` feature. This is the only file in
//! the crate that names a third-party solver type.

use rustsat::instances::BasicVarManager;
use rustsat::solvers::{Solve, SolverResult};
use rustsat::types::{Clause, Lit, TernaryVal, Var};
use rustsat_kissat::Kissat;

use super::{LitValue, Model, SatCallStats, SatLit, SatSolver, SolveOutcome};

fn to_rustsat_lit(lit: SatLit) -> Lit {
    let var = Var::new((lit.unsigned_abs() - 1) as u32);
    if lit > 0 {
        var.pos_lit()
    } else {
        var.neg_lit()
    }
}

/// Wraps a `kissat` instance plus the variable manager rustsat wants, and
/// the last model so `Model::value` can be queried after `solve`.
pub struct RustSatSolver {
    solver: Kissat,
    var_mgr: BasicVarManager,
    num_vars: usize,
    last_model: Vec<TernaryVal>,
    calls: u64,
}

impl Default for RustSatSolver {
    fn default() -> Self {
        RustSatSolver {
            solver: Kissat::default(),
            var_mgr: BasicVarManager::default(),
            num_vars: 0,
            last_model: Vec::new(),
            calls: 0,
        }
    }
}

impl RustSatSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Model for RustSatSolver {
    fn value(&self, lit: SatLit) -> LitValue {
        let idx = (lit.unsigned_abs() - 1) as usize;
        let Some(&tv) = self.last_model.get(idx) else {
            return LitValue::X;
        };
        let pos = match tv {
            TernaryVal::True => true,
            TernaryVal::False => false,
            TernaryVal::DontCare => return LitValue::X,
        };
        if (lit > 0) == pos {
            LitValue::True
        } else {
            LitValue::False
        }
    }
}

impl SatSolver for RustSatSolver {
    fn new_variable(&mut self, _decision: bool) -> SatLit {
        self.num_vars += 1;
        let _ = self.var_mgr.new_var();
        self.num_vars as SatLit
    }

    fn add_clause(&mut self, clause: &[SatLit]) {
        let cl: Clause = clause.iter().map(|&l| to_rustsat_lit(l)).collect();
        self.solver
            .add_clause(cl)
            .expect("kissat rejected a clause after solving started under an assumption set it does not support incrementally");
    }

    fn solve(&mut self, assumptions: &[SatLit]) -> SolveOutcome<'_> {
        self.calls += 1;
        let assumps: Vec<Lit> = assumptions.iter().map(|&l| to_rustsat_lit(l)).collect();
        let result = if assumps.is_empty() {
            self.solver.solve()
        } else {
            self.solver.solve_assumps(assumps)
        };
        match result {
            Ok(SolverResult::Sat) => {
                self.last_model = (1..=self.num_vars as u32)
                    .map(|v| {
                        self.solver
                            .lit_val(Var::new(v - 1).pos_lit())
                            .unwrap_or(TernaryVal::DontCare)
                    })
                    .collect();
                SolveOutcome::Sat(&*self)
            }
            Ok(SolverResult::Unsat) => SolveOutcome::Unsat,
            _ => SolveOutcome::Abort,
        }
    }

    fn cnf_size(&self) -> (usize, usize) {
        let stats = self.solver.stats();
        (stats.n_clauses, 0)
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
