//! `dtpg`: the top-level per-fault driver. Ties excitation, Boolean-
//! difference propagation, sufficient-condition extraction and
//! justification together into one `DtpgResult`.

use std::time::Instant;

use crate::bool_diff::BoolDiffEnc;
use crate::config::Config;
use crate::error;
use crate::extract::Extractor;
use crate::justify::Justifier;
use crate::network::{Fault, Network};
use crate::sat::SatSolver;
use crate::stats::DtpgStats;
use crate::struct_engine::{SolveWithResult, StructEngine};
use crate::types::{AssignList, DtpgResult, TestVector};

pub struct Dtpg {
    config: Config,
}

impl Dtpg {
    pub fn new(config: Config) -> Self {
        Dtpg { config }
    }

    /// Generates a test for one fault, or reports it Untestable or
    /// Undetected (the spec's alias for an abort). Propagation is
    /// re-derived directly from the fault's own site via a fresh
    /// `BoolDiffEnc`, rather than splicing in `CondGenMgr`'s cached
    /// per-FFR `DetCond` — doing that would need the fault's excitation
    /// clauses and the FFR's lowered activator to share one
    /// `StructEngine`'s variable space, which the condition-lowering
    /// pipeline here isn't wired for. `CondGenMgr` remains a standalone
    /// per-FFR facility for callers that want the raw sufficient
    /// conditions themselves, independent of single-fault test
    /// generation.
    pub fn generate_test<S: SatSolver + Default>(
        &self,
        network: &Network,
        fault: &Fault,
        stats: &mut DtpgStats,
    ) -> error::Result<DtpgResult> {
        let mut engine = StructEngine::new(network, S::default());
        let mut bd = BoolDiffEnc::new(fault.origin_node());

        let cnf_start = Instant::now();
        engine.encode_subenc(&mut bd);
        stats.record_cnf_gen(cnf_start.elapsed());

        let pvar = bd.prop_var();
        let excitation = fault.excitation_condition();
        let mut assumptions: Vec<_> = excitation.iter().map(|a| engine.conv_to_literal(*a)).collect();
        assumptions.push(pvar);

        let extractor = Extractor::new();
        let justifier = Justifier::new(self.config.just.clone().into());

        let solve_start = Instant::now();
        let outcome = engine.solve_with_var_map(&assumptions, |net, var_map, gvar, model| {
            let sensitized = extractor.extract_sufficient_condition(net, &bd, &gvar, model)?;
            let full_condition = sensitized.union(&excitation)?;
            justifier.justify(net, var_map, model, &full_condition)
        });
        let sat_stats = engine.solver().get_stats();
        stats.record_sat_call(solve_start.elapsed(), &sat_stats);

        match outcome {
            SolveWithResult::Unsat => {
                stats.untestable += 1;
                Ok(DtpgResult::Untestable)
            }
            SolveWithResult::Abort => {
                stats.abort += 1;
                Ok(DtpgResult::Undetected)
            }
            SolveWithResult::Sat(justified) => {
                let justified = justified?;
                stats.detected += 1;
                Ok(DtpgResult::Detected(to_test_vector(&justified)))
            }
        }
    }
}

fn to_test_vector(justified: &AssignList) -> TestVector {
    let mut tv = TestVector::default();
    for a in justified.iter() {
        if a.frame() == 1 {
            tv.frame1.push((a.node(), a.value()));
        } else {
            tv.frame0.push((a.node(), a.value()));
        }
    }
    tv
}
