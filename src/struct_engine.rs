//! `StructEngine`: incremental structural CNF over a time-indexed
//! assignment space.

use bitflags::bitflags;
use log::trace;

use crate::error;
use crate::network::{Network, NodeId, NodeKind};
use crate::sat::{Model, SatLit, SatSolver, SolveOutcome};
use crate::types::{Assign, FrameId};
use crate::varmap::VarMap;

bitflags! {
    /// Per-node memoization: which time-frames already have CNF asserted
    /// for this node's good-machine function. Mirrors the per-entity
    /// bitflag idiom used for solver-internal variable/clause flags
    /// elsewhere in this crate's lineage.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CnfStatus: u8 {
        const CURRENT_DONE  = 0b01;
        const PREVIOUS_DONE = 0b10;
    }
}

/// A sub-encoder attached to a `StructEngine`. `BoolDiffEnc` is the only
/// implementor in this crate; the trait exists so `add_subenc` can defer
/// variable allocation until `make_cnf` actually needs it, without
/// `StructEngine` depending on `BoolDiffEnc` directly.
pub trait SubEncoder {
    /// Called once, after the subencoder's own variables may be
    /// allocated, each time `make_cnf` processes a new batch of roots.
    fn on_make_cnf(&mut self, engine: &mut EngineCore);
}

/// The mutable state `StructEngine` exposes to sub-encoders during
/// `make_cnf`, split out so a `SubEncoder::on_make_cnf` can call back
/// into TFI-closure materialization without a borrow cycle through
/// `StructEngine` itself (which would also hold the `Vec<Box<dyn
/// SubEncoder>>` the callback is stored in).
pub struct EngineCore<'a> {
    pub(crate) solver: &'a mut dyn SatSolver,
    pub(crate) var_map: &'a mut VarMap,
    pub(crate) status: &'a mut [CnfStatus],
    pub(crate) network: &'a Network,
}

impl EngineCore<'_> {
    pub fn conv_to_literal(&mut self, a: Assign) -> SatLit {
        let lit = materialize(self.network, self.solver, self.var_map, self.status, a.node(), a.frame());
        if a.value() {
            lit
        } else {
            -lit
        }
    }

    pub fn network(&self) -> &Network {
        self.network
    }

    pub fn solver_mut(&mut self) -> &mut dyn SatSolver {
        self.solver
    }
}

/// The outcome of [`StructEngine::solve_with`].
pub enum SolveWithResult<R> {
    Sat(R),
    Unsat,
    Abort,
}

/// A read-only view of one time-frame's slice of the engine's `VarMap`.
pub struct FrameView<'a> {
    map: &'a VarMap,
    frame: FrameId,
}

impl FrameView<'_> {
    pub fn get(&self, node: NodeId) -> Option<SatLit> {
        self.map.get(node, self.frame)
    }
}

/// Owns one SAT solver instance and the `VarMap` built against it.
/// Generic over the solver implementation so production code links
/// against the `rustsat` backend and tests link against
/// `sat::naive::BruteForceSolver` without `#[cfg]`-splitting this type.
pub struct StructEngine<'n, S: SatSolver> {
    network: &'n Network,
    solver: S,
    var_map: VarMap,
    status: Vec<CnfStatus>,
    sub_encoders: Vec<Box<dyn SubEncoder>>,
}

impl<'n, S: SatSolver> StructEngine<'n, S> {
    pub fn new(network: &'n Network, solver: S) -> Self {
        StructEngine {
            network,
            solver,
            var_map: VarMap::new(),
            status: vec![CnfStatus::empty(); network.node_num()],
            sub_encoders: Vec::new(),
        }
    }

    pub fn network(&self) -> &Network {
        self.network
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    pub fn gvar_map(&self) -> FrameView<'_> {
        FrameView {
            map: &self.var_map,
            frame: 1,
        }
    }

    pub fn hvar_map(&self) -> FrameView<'_> {
        FrameView {
            map: &self.var_map,
            frame: 0,
        }
    }

    /// Full cross-frame access, needed by the `Justifier` when a PPI
    /// back-trace crosses a DFF into the previous frame.
    pub fn var_map(&self) -> &VarMap {
        &self.var_map
    }

    /// Returns the literal for `(node, frame)`, polarity-adjusted by
    /// `a.value()`; lazily materializes CNF for `node`'s TFI closure at
    /// that frame.
    pub fn conv_to_literal(&mut self, a: Assign) -> SatLit {
        let lit = materialize(
            self.network,
            &mut self.solver,
            &mut self.var_map,
            &mut self.status,
            a.node(),
            a.frame(),
        );
        if a.value() {
            lit
        } else {
            -lit
        }
    }

    /// Ensures CNF for the TFI closures of `current_roots` (frame 1) and
    /// `prev_roots` (frame 0); idempotent. Then gives every attached
    /// sub-encoder a chance to extend the CNF over the freshly
    /// materialized variables.
    pub fn make_cnf(&mut self, current_roots: &[NodeId], prev_roots: &[NodeId]) {
        let (clauses_before, _) = self.solver.cnf_size();
        for &r in current_roots {
            materialize(self.network, &mut self.solver, &mut self.var_map, &mut self.status, r, 1);
        }
        for &r in prev_roots {
            materialize(self.network, &mut self.solver, &mut self.var_map, &mut self.status, r, 0);
        }
        let mut subs = std::mem::take(&mut self.sub_encoders);
        for sub in subs.iter_mut() {
            let mut core = EngineCore {
                solver: &mut self.solver,
                var_map: &mut self.var_map,
                status: &mut self.status,
                network: self.network,
            };
            sub.on_make_cnf(&mut core);
        }
        self.sub_encoders = subs;
        let (clauses_after, literals_after) = self.solver.cnf_size();
        trace!(
            "make_cnf: {} current root(s), {} previous-frame root(s), clauses {} -> {} ({} literals total)",
            current_roots.len(),
            prev_roots.len(),
            clauses_before,
            clauses_after,
            literals_after
        );
    }

    /// Attaches a sub-encoder; ownership transfers to the engine.
    pub fn add_subenc(&mut self, sub: Box<dyn SubEncoder>) {
        self.sub_encoders.push(sub);
    }

    /// Runs one sub-encoder's `on_make_cnf` without taking ownership of
    /// it. `add_subenc`/`make_cnf` is the form described for callers
    /// that hand a sub-encoder off permanently; `CondGen` needs to keep
    /// querying its `BoolDiffEnc` afterward, so it drives encoding
    /// through this entry point instead.
    pub fn encode_subenc<T: SubEncoder>(&mut self, sub: &mut T) {
        let mut core = EngineCore {
            solver: &mut self.solver,
            var_map: &mut self.var_map,
            status: &mut self.status,
            network: self.network,
        };
        sub.on_make_cnf(&mut core);
    }

    pub fn solve(&mut self, assumptions: &[SatLit]) -> SolveOutcome<'_> {
        self.solver.solve(assumptions)
    }

    /// Like [`solve`](Self::solve), but gives the caller a chance to
    /// read the model together with the engine's network and
    /// good-machine `VarMap` *before* the model's borrow has to end.
    /// `solve` alone can't support this: its returned `SolveOutcome`
    /// ties its model's lifetime to the whole `&mut self`, so any call
    /// back into the engine (e.g. `gvar_map()`) while that model is
    /// still live would conflict with it. Doing the read inside this
    /// method's own body works because `self.solver`, `self.var_map`
    /// and `self.network` are then disjoint field-borrows of the one
    /// `self`, not borrows mediated through another method call.
    pub fn solve_with<R>(
        &mut self,
        assumptions: &[SatLit],
        on_sat: impl FnOnce(&Network, FrameView<'_>, &dyn Model) -> R,
    ) -> SolveWithResult<R> {
        match self.solver.solve(assumptions) {
            SolveOutcome::Sat(model) => {
                let gvar = FrameView {
                    map: &self.var_map,
                    frame: 1,
                };
                SolveWithResult::Sat(on_sat(self.network, gvar, model))
            }
            SolveOutcome::Unsat => SolveWithResult::Unsat,
            SolveOutcome::Abort => SolveWithResult::Abort,
        }
    }

    pub fn checked_literal(&mut self, a: Assign) -> error::Result<SatLit> {
        self.network.checked_node(a.node())?;
        Ok(self.conv_to_literal(a))
    }

    /// Like [`solve_with`](Self::solve_with), but also hands the
    /// callback the full cross-frame `VarMap` — what `Justifier` needs
    /// to jump from a frame-1 PPI into its paired DFF input at frame 0,
    /// which a single-frame `FrameView` can't express.
    pub fn solve_with_var_map<R>(
        &mut self,
        assumptions: &[SatLit],
        on_sat: impl FnOnce(&Network, &VarMap, FrameView<'_>, &dyn Model) -> R,
    ) -> SolveWithResult<R> {
        match self.solver.solve(assumptions) {
            SolveOutcome::Sat(model) => {
                let gvar = FrameView {
                    map: &self.var_map,
                    frame: 1,
                };
                SolveWithResult::Sat(on_sat(self.network, &self.var_map, gvar, model))
            }
            SolveOutcome::Unsat => SolveWithResult::Unsat,
            SolveOutcome::Abort => SolveWithResult::Abort,
        }
    }
}

/// Reverse-topological materialization of the TFI closure of `root` at
/// `frame`, marking each visited node `CURRENT_DONE`/`PREVIOUS_DONE` so
/// repeated requests cost O(1). Free function (rather than a method) so
/// `EngineCore` and `StructEngine` can share it without either holding a
/// `&mut self` on the other.
fn materialize(
    network: &Network,
    solver: &mut dyn SatSolver,
    var_map: &mut VarMap,
    status: &mut [CnfStatus],
    root: NodeId,
    frame: FrameId,
) -> SatLit {
    let done_flag = if frame == 1 {
        CnfStatus::CURRENT_DONE
    } else {
        CnfStatus::PREVIOUS_DONE
    };

    // Iterative post-order: push the frontier, expand fanin not yet
    // visited at this frame, emit CNF once all of a node's fanin are
    // materialized.
    let mut stack = vec![(root, false)];
    while let Some((n, expanded)) = stack.pop() {
        if status[n.index()].contains(done_flag) {
            continue;
        }
        if expanded {
            emit_node_cnf(network, solver, var_map, status, n, frame);
            continue;
        }
        stack.push((n, true));
        for_each_cross_frame_fanin(network, n, frame, |fanin_node, fanin_frame| {
            if !status[fanin_node.index()].contains(frame_flag(fanin_frame)) {
                stack.push((fanin_node, false));
            }
        });
    }
    var_map
        .get(root, frame)
        .expect("materialize just emitted this node's variable")
}

fn frame_flag(frame: FrameId) -> CnfStatus {
    if frame == 1 {
        CnfStatus::CURRENT_DONE
    } else {
        CnfStatus::PREVIOUS_DONE
    }
}

/// Visits `node`'s fanin at `frame`, except that a `Ppi` which is the
/// pseudo-output side of a DFF pair reads its value from the paired
/// `Ppo`'s fanin at frame 0 instead of having ordinary fanin of its own
/// — this is how the previous-frame cone is pulled in only under the
/// transition-delay model.
fn for_each_cross_frame_fanin(
    network: &Network,
    node: NodeId,
    frame: FrameId,
    mut visit: impl FnMut(NodeId, FrameId),
) {
    let n = network.node(node);
    if n.is_ppi() {
        if frame == 1 {
            if let Some(dff_in) = n.dff_pair() {
                visit(dff_in, 0);
            }
        }
        return;
    }
    for &fi in n.fanin() {
        visit(fi, frame);
    }
}

fn emit_node_cnf(
    network: &Network,
    solver: &mut dyn SatSolver,
    var_map: &mut VarMap,
    status: &mut [CnfStatus],
    node: NodeId,
    frame: FrameId,
) {
    let done_flag = frame_flag(frame);
    if status[node.index()].contains(done_flag) {
        return;
    }
    let n = network.node(node);

    let lit = if var_map.contains(node, frame) {
        var_map.get(node, frame).unwrap()
    } else {
        let v = solver.new_variable(true);
        var_map.set(node, frame, v);
        v
    };

    match n.kind() {
        NodeKind::Ppi => {
            if frame == 1 {
                if let Some(dff_in) = n.dff_pair() {
                    let d = var_map
                        .get(dff_in, 0)
                        .expect("previous-frame cone of DFF input materialized before its output");
                    solver.add_clause(&[-lit, d]);
                    solver.add_clause(&[lit, -d]);
                }
            }
            // A true PPI with no DFF pairing is an unconstrained free
            // variable; nothing further to assert.
        }
        NodeKind::Ppo => {
            let in_lit = var_map
                .get(n.fanin()[0], frame)
                .expect("PPO's sole fanin materialized first");
            solver.add_clause(&[-lit, in_lit]);
            solver.add_clause(&[lit, -in_lit]);
        }
        NodeKind::Gate(prim) => {
            let inputs: Vec<SatLit> = n
                .fanin()
                .iter()
                .map(|&fi| var_map.get(fi, frame).expect("fanin materialized before gate"))
                .collect();
            emit_gate_cnf(solver, *prim, lit, &inputs);
        }
    }
    status[node.index()].insert(done_flag);
}

pub(crate) fn emit_gate_cnf(solver: &mut dyn SatSolver, prim: crate::network::Primitive, out: SatLit, inputs: &[SatLit]) {
    use crate::network::Primitive::*;
    match prim {
        Buf => {
            solver.add_clause(&[-out, inputs[0]]);
            solver.add_clause(&[out, -inputs[0]]);
        }
        Not => {
            solver.add_clause(&[-out, -inputs[0]]);
            solver.add_clause(&[out, inputs[0]]);
        }
        And => solver.add_andgate(out, inputs),
        Nand => solver.add_andgate(-out, inputs),
        Or => solver.add_orgate(out, inputs),
        Nor => solver.add_norgate(out, inputs),
        Xor => emit_xor_chain(solver, out, inputs, false),
        Xnor => emit_xor_chain(solver, out, inputs, true),
    }
}

/// N-ary XOR (or XNOR, when `invert`) folded left-to-right through
/// fresh intermediate variables.
fn emit_xor_chain(solver: &mut dyn SatSolver, out: SatLit, inputs: &[SatLit], invert: bool) {
    debug_assert!(!inputs.is_empty());
    let mut acc = inputs[0];
    // Fold all but the last input into a chain of binary XOR
    // auxiliaries, then tie the final XOR directly to `out` (with the
    // requested polarity) instead of allocating one variable too many.
    for &next in &inputs[1..inputs.len() - 1] {
        let aux = solver.new_variable(false);
        solver.add_xorgate(aux, acc, next);
        acc = aux;
    }
    let last = inputs[inputs.len() - 1];
    if invert {
        let tmp = solver.new_variable(false);
        solver.add_xorgate(tmp, acc, last);
        solver.add_clause(&[-out, -tmp]);
        solver.add_clause(&[out, tmp]);
    } else {
        solver.add_xorgate(out, acc, last);
    }
}
