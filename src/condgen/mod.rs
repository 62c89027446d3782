//! `CondGen`: per-FFR-root sufficient-condition enumeration.

mod manager;

pub use manager::CondGenMgr;

use log::{debug, trace};

use crate::bool_diff::BoolDiffEnc;
use crate::error;
use crate::extract::Extractor;
use crate::network::{Network, NodeId};
use crate::sat::{SatLit, SatSolver, SolveOutcome};
use crate::struct_engine::{SolveWithResult, StructEngine};
use crate::types::{AssignList, DetCond};

/// Drives one FFR root through the enumerate-and-minimize loop from the
/// algorithm notes: extract a cube, shrink it to its mandatory subset,
/// then keep blocking and re-solving up to `limit` times.
pub struct CondGen {
    limit: usize,
}

impl CondGen {
    pub fn new(limit: usize) -> Self {
        CondGen { limit }
    }

    pub fn run<S: SatSolver + Default>(&self, network: &Network, root: NodeId) -> error::Result<DetCond> {
        let mut engine = StructEngine::new(network, S::default());
        let mut bd = BoolDiffEnc::new(root);
        engine.encode_subenc(&mut bd);
        let extractor = Extractor::new();
        let pvar = bd.prop_var();

        let outcome = enumerate_cubes(&mut engine, &bd, pvar, self.limit, &extractor, network)?;
        match outcome {
            EnumOutcome::Undetected => {
                debug!("condgen: root {root:?} undetected, no sensitizing cube found");
                Ok(DetCond::Undetected)
            }
            EnumOutcome::Overflow => {
                debug!("condgen: root {root:?} overflowed before any cube was accepted");
                Ok(DetCond::Overflow {
                    outputs: bd.output_list().to_vec(),
                })
            }
            EnumOutcome::Detected { mandatory, cover } => {
                debug!(
                    "condgen: root {root:?} detected, cover has {} cube(s), {} mandatory literal(s)",
                    cover.len(),
                    mandatory.len()
                );
                Ok(DetCond::Detected { mandatory, cover })
            }
            EnumOutcome::OverflowAfterPartialCover { .. } => {
                debug!("condgen: root {root:?} overflowed mid-enumeration, falling back to per-output recovery");
                self.per_output_recovery::<S>(network, root, &bd)
            }
        }
    }

    fn per_output_recovery<S: SatSolver + Default>(
        &self,
        network: &Network,
        root: NodeId,
        whole_bd: &BoolDiffEnc,
    ) -> error::Result<DetCond> {
        let extractor = Extractor::new();
        let mut cover = Vec::new();
        let mut residual_outputs = Vec::new();
        trace!(
            "condgen: root {root:?} entering per-output recovery over {} output(s)",
            whole_bd.output_list().len()
        );

        for &output in whole_bd.output_list() {
            let mut engine = StructEngine::new(network, S::default());
            let mut bd = BoolDiffEnc::new_single_output(root, output);
            engine.encode_subenc(&mut bd);
            let pvar = bd.prop_var();

            match enumerate_cubes(&mut engine, &bd, pvar, self.limit, &extractor, network)? {
                EnumOutcome::Undetected => {
                    // This output alone never sensitizes; not a failure,
                    // simply contributes nothing to the cover.
                }
                EnumOutcome::Overflow | EnumOutcome::OverflowAfterPartialCover { .. } => {
                    residual_outputs.push(output);
                }
                EnumOutcome::Detected { mandatory, cover: per_output_cover } => {
                    for cube in per_output_cover {
                        cover.push(mandatory.union(&cube)?);
                    }
                }
            }
        }

        if cover.is_empty() {
            return Ok(DetCond::Overflow {
                outputs: if residual_outputs.is_empty() {
                    whole_bd.output_list().to_vec()
                } else {
                    residual_outputs
                },
            });
        }

        Ok(DetCond::PartialDetected {
            mandatory: AssignList::new(),
            cover,
            outputs: residual_outputs,
        })
    }
}

enum EnumOutcome {
    Undetected,
    /// The whole-cone solve, or every attempt to improve on the first
    /// cube, aborted before a complete cover was established.
    Overflow,
    Detected {
        mandatory: AssignList,
        cover: Vec<AssignList>,
    },
    /// Aborted after at least the first cube was already accepted into
    /// the cover; `CondGen::run` treats this the same as a plain abort
    /// for the whole-FFR case (falls through to per-output recovery)
    /// but keeps the partial cover available if a caller wants it.
    OverflowAfterPartialCover {
        #[allow(dead_code)]
        partial_cover: Vec<AssignList>,
    },
}

/// Steps 2-5 of the algorithm, parameterized over whichever
/// `BoolDiffEnc`/`prop_var` the caller is driving (the whole-cone pass,
/// or one output's restricted pass in the per-output recovery loop).
fn enumerate_cubes<S: SatSolver>(
    engine: &mut StructEngine<S>,
    bd: &BoolDiffEnc,
    pvar: SatLit,
    limit: usize,
    extractor: &Extractor,
    network: &Network,
) -> error::Result<EnumOutcome> {
    let s0 = match engine.solve_with(&[pvar], |net, gvar, model| {
        extractor.extract_sufficient_condition(net, bd, &gvar, model)
    }) {
        SolveWithResult::Unsat => return Ok(EnumOutcome::Undetected),
        SolveWithResult::Abort => return Ok(EnumOutcome::Overflow),
        SolveWithResult::Sat(cube) => cube?,
    };

    let mut mandatory = AssignList::new();
    let mut remainder = AssignList::new();
    for a in s0.iter() {
        let lit = engine.conv_to_literal(*a);
        match engine.solve(&[pvar, -lit]) {
            SolveOutcome::Unsat => mandatory.push(*a)?,
            _ => remainder.push(*a)?,
        }
    }

    if remainder.is_empty() {
        return Ok(EnumOutcome::Detected {
            mandatory: mandatory.clone(),
            cover: vec![mandatory],
        });
    }

    let mandatory_lits: Vec<SatLit> = mandatory.iter().map(|a| engine.conv_to_literal(*a)).collect();
    let mut cover = vec![remainder.clone()];
    let mut last_cube = remainder;

    for _ in 0..limit.saturating_sub(1) {
        let block_clause: Vec<SatLit> = last_cube.iter().map(|a| -engine.conv_to_literal(*a)).collect();
        engine.solver_mut().add_clause(&block_clause);

        let mut assumptions = vec![pvar];
        assumptions.extend_from_slice(&mandatory_lits);

        enum Step {
            CoverComplete,
            Aborted,
            CollapsedToMandatory,
            NextCube(AssignList),
        }

        let step = match engine.solve_with(&assumptions, |net, gvar, model| {
            extractor.extract_sufficient_condition(net, bd, &gvar, model)
        }) {
            SolveWithResult::Unsat => Step::CoverComplete,
            SolveWithResult::Abort => Step::Aborted,
            SolveWithResult::Sat(cube) => {
                let mut cube = cube?;
                for a in mandatory.iter() {
                    cube.remove(a.node(), a.frame());
                }
                if cube.is_empty() {
                    Step::CollapsedToMandatory
                } else {
                    Step::NextCube(cube)
                }
            }
        };

        match step {
            Step::CoverComplete => {
                return Ok(EnumOutcome::Detected { mandatory, cover });
            }
            Step::CollapsedToMandatory => {
                return Ok(EnumOutcome::Detected {
                    mandatory: mandatory.clone(),
                    cover: vec![mandatory],
                });
            }
            Step::Aborted => {
                return Ok(EnumOutcome::OverflowAfterPartialCover { partial_cover: cover });
            }
            Step::NextCube(cube) => {
                trace!("condgen: accepted cube #{} into cover ({} literal(s))", cover.len() + 1, cube.len());
                cover.push(cube.clone());
                last_cube = cube;
            }
        }
    }

    // Loop bound exhausted without an explicit Unsat: treated the same
    // as an abort of the improvement search (§4.5 step 4's "Repeat up to
    // K-1 times"), the cover accumulated so far is still usable.
    Ok(EnumOutcome::OverflowAfterPartialCover { partial_cover: cover })
}
