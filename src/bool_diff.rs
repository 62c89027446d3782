//! `BoolDiffEnc`: the Boolean-difference cone attached to a
//! `StructEngine` as a sub-encoder.

use std::collections::HashMap;

use crate::network::{NodeId, NodeKind};
use crate::sat::SatLit;
use crate::struct_engine::{emit_gate_cnf, EngineCore, SubEncoder};
use crate::types::Assign;

/// Built lazily the first time its owning `StructEngine::make_cnf` runs
/// after it is attached via `add_subenc`. Every accessor below panics
/// if called before that happens, matching `StructEngine`'s own
/// never-handed-out-before-ready discipline — callers always attach,
/// then `make_cnf`, then query.
pub struct BoolDiffEnc {
    root: NodeId,
    /// When `Some(o)`, this encoder only asserts the difference variable
    /// for output `o`; used by `CondGen`'s per-output recovery pass so a
    /// whole-cone abort can be retried output-by-output.
    single_output: Option<NodeId>,
    built: bool,
    fvar: HashMap<NodeId, SatLit>,
    outputs: Vec<NodeId>,
    dvar: HashMap<NodeId, SatLit>,
    pvar: Option<SatLit>,
}

impl BoolDiffEnc {
    pub fn new(root: NodeId) -> Self {
        BoolDiffEnc {
            root,
            single_output: None,
            built: false,
            fvar: HashMap::new(),
            outputs: Vec::new(),
            dvar: HashMap::new(),
            pvar: None,
        }
    }

    /// A cone restricted to a single output, for the per-output recovery
    /// pass in `CondGen` step 6.
    pub fn new_single_output(root: NodeId, output: NodeId) -> Self {
        let mut enc = Self::new(root);
        enc.single_output = Some(output);
        enc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The global propagation literal: true iff *some* reachable output
    /// differs between good and faulty machine.
    pub fn prop_var(&self) -> SatLit {
        self.pvar.expect("BoolDiffEnc::prop_var called before make_cnf")
    }

    /// The propagation literal for one specific output.
    pub fn prop_var_for(&self, output: NodeId) -> SatLit {
        *self
            .dvar
            .get(&output)
            .expect("prop_var_for called with an output outside this encoder's cone")
    }

    pub fn output_list(&self) -> &[NodeId] {
        &self.outputs
    }

    /// The fault-frame literal for `node`, if `node` lies in this
    /// encoder's cone (the root itself always does).
    pub fn fvar(&self, node: NodeId) -> Option<SatLit> {
        self.fvar.get(&node).copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.fvar.contains_key(&node)
    }

    /// The literal to use for `fanin` as an input to a cone node: its
    /// fault-frame literal if `fanin` is itself in the cone, else the
    /// good-machine literal (materializing it if needed).
    fn cone_input_lit(&self, fanin: NodeId, engine: &mut EngineCore) -> SatLit {
        match self.fvar.get(&fanin) {
            Some(&lit) => lit,
            None => engine.conv_to_literal(Assign::new(fanin, 1, true)),
        }
    }

    fn forward_cone(&self, engine: &EngineCore) -> Vec<NodeId> {
        let mut seen = vec![self.root];
        let mut idx = 0;
        while idx < seen.len() {
            let n = seen[idx];
            idx += 1;
            for &fo in engine.network().node(n).fanout() {
                if !seen.contains(&fo) {
                    seen.push(fo);
                }
            }
        }
        // `NodeId` ascending order is a valid topological order (builder
        // guarantees every fanin id precedes its consumer).
        seen.sort_by_key(|n| n.index());
        seen
    }
}

impl SubEncoder for BoolDiffEnc {
    fn on_make_cnf(&mut self, engine: &mut EngineCore) {
        if self.built {
            return;
        }
        let cone = self.forward_cone(engine);

        let root_gvar = engine.conv_to_literal(Assign::new(self.root, 1, true));
        self.fvar.insert(self.root, -root_gvar);

        // A root that is itself a PPO (every fanout-free-region root
        // with no internal branch point is, by construction) is its own
        // observable output: the injected flip is trivially visible
        // there without walking any further cone.
        if matches!(engine.network().node(self.root).kind(), NodeKind::Ppo) {
            self.outputs.push(self.root);
        }

        for &n in cone.iter().filter(|&&n| n != self.root) {
            let kind = engine.network().node(n).kind().clone();
            let fanin_ids: Vec<NodeId> = engine.network().node(n).fanin().to_vec();
            match kind {
                NodeKind::Ppo => {
                    let lit = self.cone_input_lit(fanin_ids[0], engine);
                    self.fvar.insert(n, lit);
                    self.outputs.push(n);
                }
                NodeKind::Gate(prim) => {
                    let mut inputs = Vec::with_capacity(fanin_ids.len());
                    for fi in fanin_ids {
                        inputs.push(self.cone_input_lit(fi, engine));
                    }
                    let out = engine.solver_mut().new_variable(false);
                    emit_gate_cnf(engine.solver_mut(), prim, out, &inputs);
                    self.fvar.insert(n, out);
                }
                NodeKind::Ppi => {
                    unreachable!("a PPI cannot be reached by following fanout edges");
                }
            }
        }

        let wanted_outputs: Vec<NodeId> = match self.single_output {
            Some(o) => vec![o],
            None => self.outputs.clone(),
        };
        for &o in &wanted_outputs {
            let gvar = engine.conv_to_literal(Assign::new(o, 1, true));
            let fvar = *self.fvar.get(&o).expect("output present in cone");
            let d = engine.solver_mut().new_variable(false);
            engine.solver_mut().add_xorgate(d, gvar, fvar);
            self.dvar.insert(o, d);
        }
        self.outputs = wanted_outputs;

        let pvar = engine.solver_mut().new_variable(false);
        let dvars: Vec<SatLit> = self.outputs.iter().map(|o| self.dvar[o]).collect();
        engine.solver_mut().add_orgate(pvar, &dvars);
        self.pvar = Some(pvar);

        self.built = true;
    }
}
