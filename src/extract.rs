//! Sufficient-condition extractor: recovers a small `AssignList` from a
//! SAT model without another solver call.

use crate::bool_diff::BoolDiffEnc;
use crate::error;
use crate::network::{Network, NodeId, NodeKind, Primitive};
use crate::sat::{LitValue, Model};
use crate::struct_engine::FrameView;
use crate::types::{Assign, AssignList};

/// Chooses which controlling side-input to record when a masking gate
/// has more than one candidate. The runtime variability here is
/// configurable but the set of strategies is fixed, so this is a small
/// closed trait rather than an open-ended hierarchy.
pub trait ExtractPolicy {
    fn choose_controlling(&self, candidates: &[NodeId]) -> NodeId;
}

/// Default policy: the lexicographically first controlling fanin by
/// `NodeId`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexFirst;

impl ExtractPolicy for LexFirst {
    fn choose_controlling(&self, candidates: &[NodeId]) -> NodeId {
        *candidates
            .iter()
            .min_by_key(|n| n.index())
            .expect("choose_controlling called with no candidates")
    }
}

pub struct Extractor<P: ExtractPolicy = LexFirst> {
    policy: P,
}

impl Default for Extractor<LexFirst> {
    fn default() -> Self {
        Extractor { policy: LexFirst }
    }
}

impl Extractor<LexFirst> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: ExtractPolicy> Extractor<P> {
    pub fn with_policy(policy: P) -> Self {
        Extractor { policy }
    }

    /// All-outputs mode: picks the first currently-sensitized output (in
    /// `enc.output_list()` order) and backtraces from it. A single
    /// sensitized output's cube already implies `prop_var()`, so there
    /// is no need to combine cubes across outputs here.
    pub fn extract_sufficient_condition(
        &self,
        network: &Network,
        enc: &BoolDiffEnc,
        gvar: &FrameView,
        model: &dyn Model,
    ) -> error::Result<AssignList> {
        let output = enc
            .output_list()
            .iter()
            .copied()
            .find(|&o| is_sensitized(o, enc, gvar, model))
            .ok_or_else(|| {
                crate::error::DtpgError::ImpossibleState(
                    "extract_sufficient_condition called but no output is sensitized under the model".into(),
                )
            })?;
        self.extract_for_output(network, enc, gvar, model, output)
    }

    /// Single-output mode: backtraces from exactly `output`, assumed
    /// already sensitized under `model`.
    pub fn extract_for_output(
        &self,
        network: &Network,
        enc: &BoolDiffEnc,
        gvar: &FrameView,
        model: &dyn Model,
        output: NodeId,
    ) -> error::Result<AssignList> {
        let mut out = AssignList::new();
        self.backtrace(network, enc, gvar, model, output, &mut out)?;
        Ok(out)
    }

    fn backtrace(
        &self,
        network: &Network,
        enc: &BoolDiffEnc,
        gvar: &FrameView,
        model: &dyn Model,
        node: NodeId,
        out: &mut AssignList,
    ) -> error::Result<()> {
        if node == enc.root() {
            return Ok(());
        }
        let n = network.node(node);
        match n.kind() {
            NodeKind::Ppo => self.backtrace(network, enc, gvar, model, n.fanin()[0], out),
            NodeKind::Gate(Primitive::Buf) | NodeKind::Gate(Primitive::Not) => {
                self.backtrace(network, enc, gvar, model, n.fanin()[0], out)
            }
            NodeKind::Gate(prim @ (Primitive::Xor | Primitive::Xnor)) => {
                let _ = prim;
                for &fi in n.fanin() {
                    if is_sensitized(fi, enc, gvar, model) {
                        self.backtrace(network, enc, gvar, model, fi, out)?;
                    } else {
                        out.push(Assign::new(fi, 1, gval(fi, gvar, model)))?;
                    }
                }
                Ok(())
            }
            NodeKind::Gate(prim) => {
                let ctrl = prim
                    .controlling_value()
                    .expect("non-controlling-value primitive already handled above");
                let mut masking = Vec::new();
                for &fi in n.fanin() {
                    if is_sensitized(fi, enc, gvar, model) {
                        self.backtrace(network, enc, gvar, model, fi, out)?;
                    } else {
                        let v = gval(fi, gvar, model);
                        if v == ctrl {
                            masking.push(fi);
                        } else {
                            out.push(Assign::new(fi, 1, v))?;
                        }
                    }
                }
                if !masking.is_empty() {
                    let chosen = self.policy.choose_controlling(&masking);
                    out.push(Assign::new(chosen, 1, gval(chosen, gvar, model)))?;
                }
                Ok(())
            }
            NodeKind::Ppi => unreachable!("backtrace reached a PPI; the cone never contains one"),
        }
    }
}

fn gval(node: NodeId, gvar: &FrameView, model: &dyn Model) -> bool {
    let lit = gvar
        .get(node)
        .expect("node queried by the extractor was not materialized in the good-machine frame");
    matches!(model.value(lit), LitValue::True)
}

fn fval(node: NodeId, enc: &BoolDiffEnc, model: &dyn Model) -> bool {
    let lit = enc
        .fvar(node)
        .expect("node queried by the extractor is outside the BoolDiffEnc cone");
    matches!(model.value(lit), LitValue::True)
}

fn is_sensitized(node: NodeId, enc: &BoolDiffEnc, gvar: &FrameView, model: &dyn Model) -> bool {
    enc.contains(node) && gval(node, gvar, model) != fval(node, enc, model)
}
