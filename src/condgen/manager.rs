//! `CondGenMgr`: the parallel-for driver over FFR ids.

use rayon::prelude::*;

use super::CondGen;
use crate::error;
use crate::network::Network;
use crate::sat::SatSolver;
use crate::types::DetCond;

/// Runs one independent `CondGen::run` per FFR id. Each call owns its
/// own `StructEngine`/SAT-solver instance; the only state shared across
/// the fan-out is the read-only `Network`, matching the "no shared
/// mutable state besides the work-dispensing iterator" resource policy
/// — here, `rayon`'s work-stealing scheduler is that iterator.
pub struct CondGenMgr {
    cond_gen: CondGen,
    thread_num: usize,
}

impl CondGenMgr {
    pub fn new(loop_limit: usize, thread_num: usize) -> Self {
        CondGenMgr {
            cond_gen: CondGen::new(loop_limit),
            thread_num,
        }
    }

    /// Produces one `DetCond` per FFR, indexed by `FfrId`. Returns the
    /// first error encountered (an `Invalid-argument`/`Impossible-state`
    /// from some worker); a solver abort never reaches here as an `Err`
    /// — it is folded into `DetCond::Overflow` by `CondGen` itself.
    pub fn make_cond<S: SatSolver + Default>(&self, network: &Network) -> error::Result<Vec<DetCond>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.thread_num)
            .build()
            .expect("failed to start the CondGenMgr thread pool");

        let roots: Vec<_> = network.ffr_ids().map(|id| network.ffr(id).root()).collect();

        pool.install(|| {
            roots
                .par_iter()
                .map(|&root| self.cond_gen.run::<S>(network, root))
                .collect()
        })
    }
}
