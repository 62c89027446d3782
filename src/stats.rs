//! Statistics blocks. Every field here is either additive (summed
//! across workers/faults) or max-preserving (the worst single call);
//! `merge` folds one worker's block into another's, the shape
//! `CondGenMgr` needs when collecting per-worker reports, the same
//! additive/max split `splr`'s own restart/conflict counters use.

use std::ops::Add;
use std::time::Duration;

use crate::sat::SatCallStats;

/// Top-level per-run statistics for the `dtpg` driver.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DtpgStats {
    pub detected: u64,
    pub untestable: u64,
    pub abort: u64,

    pub cnf_gen_invocations: u64,
    pub cnf_gen_time: Duration,
    pub sat_solve_time: Duration,
    pub backtrace_time: Duration,

    pub sat_stats_cumulative: SatCallStats,
    pub sat_stats_max: SatCallStats,
}

impl DtpgStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cnf_gen(&mut self, elapsed: Duration) {
        self.cnf_gen_invocations += 1;
        self.cnf_gen_time += elapsed;
    }

    pub fn record_sat_call(&mut self, elapsed: Duration, stats: &SatCallStats) {
        self.sat_solve_time += elapsed;
        self.sat_stats_cumulative.merge_sum(stats);
        self.sat_stats_max.merge_max(stats);
    }

    /// Folds `other` into `self`: additive fields sum, the max-preserving
    /// `sat_stats_max` takes the larger of the two.
    pub fn merge(&mut self, other: &DtpgStats) {
        self.detected += other.detected;
        self.untestable += other.untestable;
        self.abort += other.abort;
        self.cnf_gen_invocations += other.cnf_gen_invocations;
        self.cnf_gen_time += other.cnf_gen_time;
        self.sat_solve_time += other.sat_solve_time;
        self.backtrace_time += other.backtrace_time;
        self.sat_stats_cumulative.merge_sum(&other.sat_stats_cumulative);
        self.sat_stats_max.merge_max(&other.sat_stats_max);
    }
}

impl Add for DtpgStats {
    type Output = DtpgStats;
    fn add(mut self, rhs: DtpgStats) -> DtpgStats {
        self.merge(&rhs);
        self
    }
}

/// Per-FFR CNF size breakdown, §6: how many clauses/literals came from
/// the base good-machine encoding, from the Boolean-difference cone,
/// and from condition lowering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CondGenStats {
    pub base_clauses: usize,
    pub base_literals: usize,
    pub bool_diff_clauses: usize,
    pub bool_diff_literals: usize,
    pub lowering_clauses: usize,
    pub lowering_literals: usize,
}

impl CondGenStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> (usize, usize) {
        (
            self.base_clauses + self.bool_diff_clauses + self.lowering_clauses,
            self.base_literals + self.bool_diff_literals + self.lowering_literals,
        )
    }

    pub fn merge(&mut self, other: &CondGenStats) {
        self.base_clauses += other.base_clauses;
        self.base_literals += other.base_literals;
        self.bool_diff_clauses += other.bool_diff_clauses;
        self.bool_diff_literals += other.bool_diff_literals;
        self.lowering_clauses += other.lowering_clauses;
        self.lowering_literals += other.lowering_literals;
    }
}

impl Add for CondGenStats {
    type Output = CondGenStats;
    fn add(mut self, rhs: CondGenStats) -> CondGenStats {
        self.merge(&rhs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_additive_for_sums_and_max_preserving_for_peaks() {
        let mut a = DtpgStats::new();
        a.detected = 3;
        a.sat_stats_max.conflicts = 10;
        let mut b = DtpgStats::new();
        b.detected = 2;
        b.sat_stats_max.conflicts = 50;

        a.merge(&b);
        assert_eq!(a.detected, 5);
        assert_eq!(a.sat_stats_max.conflicts, 50);
    }

    #[test]
    fn cond_gen_stats_total_sums_all_three_components() {
        let stats = CondGenStats {
            base_clauses: 10,
            base_literals: 20,
            bool_diff_clauses: 3,
            bool_diff_literals: 6,
            lowering_clauses: 1,
            lowering_literals: 3,
        };
        assert_eq!(stats.total(), (14, 29));
    }
}
