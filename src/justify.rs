//! `Justifier`: back-propagates an internal `AssignList` to a PPI-only
//! one that still implies it, under a satisfying model.

use std::collections::HashSet;

use crate::error;
use crate::network::{Network, NodeId, Primitive};
use crate::sat::{LitValue, Model};
use crate::types::{Assign, AssignList, FrameId};
use crate::varmap::VarMap;

/// Two justification strategies, dispatched at the call site rather
/// than through a trait object — the strategy set is fixed, only the
/// choice of which one runs is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyStrategy {
    /// Plain recursive back-trace; a node reached via several paths is
    /// recorded (or recursed into) once per path.
    Just1,
    /// Same recursion, but a `(node, frame)` already visited is skipped
    /// on subsequent encounters, trading a visited-set for a smaller
    /// output cube.
    Just2,
}

pub struct Justifier {
    strategy: JustifyStrategy,
}

impl Justifier {
    pub fn new(strategy: JustifyStrategy) -> Self {
        Justifier { strategy }
    }

    /// Justifies every assignment in `target`, producing a single
    /// PPI-only `AssignList` whose conjunction still implies `target`
    /// under the good-machine CNF.
    pub fn justify(
        &self,
        network: &Network,
        var_map: &VarMap,
        model: &dyn Model,
        target: &AssignList,
    ) -> error::Result<AssignList> {
        let mut out = AssignList::new();
        let mut visited = HashSet::new();
        for a in target.iter() {
            self.visit(network, var_map, model, a.node(), a.frame(), a.value(), &mut out, &mut visited)?;
        }
        Ok(out)
    }

    fn visit(
        &self,
        network: &Network,
        var_map: &VarMap,
        model: &dyn Model,
        node: NodeId,
        frame: FrameId,
        val: bool,
        out: &mut AssignList,
        visited: &mut HashSet<(NodeId, FrameId)>,
    ) -> error::Result<()> {
        if self.strategy == JustifyStrategy::Just2 && !visited.insert((node, frame)) {
            return Ok(());
        }

        let n = network.node(node);
        if n.is_ppi() {
            if frame == 1 {
                if let Some(dff_in) = n.dff_pair() {
                    return self.visit(network, var_map, model, dff_in, 0, val, out, visited);
                }
            }
            out.push(Assign::new(node, frame, val))?;
            return Ok(());
        }

        match n.kind() {
            crate::network::NodeKind::Ppo => {
                self.visit(network, var_map, model, n.fanin()[0], frame, val, out, visited)
            }
            crate::network::NodeKind::Gate(Primitive::Buf) => {
                self.visit(network, var_map, model, n.fanin()[0], frame, val, out, visited)
            }
            crate::network::NodeKind::Gate(Primitive::Not) => {
                self.visit(network, var_map, model, n.fanin()[0], frame, !val, out, visited)
            }
            crate::network::NodeKind::Gate(prim @ (Primitive::Xor | Primitive::Xnor)) => {
                let _ = prim;
                for &fi in n.fanin() {
                    let fi_val = gval(fi, frame, var_map, model);
                    self.visit(network, var_map, model, fi, frame, fi_val, out, visited)?;
                }
                Ok(())
            }
            crate::network::NodeKind::Gate(prim) => {
                let ctrl = prim.controlling_value().expect("remaining primitives all have one");
                let ctrl_out = prim.controlling_output_value().unwrap();
                if val == ctrl_out {
                    let chosen = n
                        .fanin()
                        .iter()
                        .find(|&&fi| gval(fi, frame, var_map, model) == ctrl)
                        .copied()
                        .expect("model guarantees a controlling fanin when the output is at the controlling value");
                    self.visit(network, var_map, model, chosen, frame, ctrl, out, visited)
                } else {
                    for &fi in n.fanin() {
                        self.visit(network, var_map, model, fi, frame, !ctrl, out, visited)?;
                    }
                    Ok(())
                }
            }
            crate::network::NodeKind::Ppi => unreachable!("handled above"),
        }
    }
}

fn gval(node: NodeId, frame: FrameId, var_map: &VarMap, model: &dyn Model) -> bool {
    let lit = var_map
        .get(node, frame)
        .expect("justifier queried a node never materialized by StructEngine");
    matches!(model.value(lit), LitValue::True)
}
