//! Programmatic `Network` construction.
//!
//! File-format front ends (blif/iscas89) are out of scope for this crate;
//! `NetworkBuilder` is the seam an external loader — or a test — hangs
//! its nodes off of. Nodes must be added in topological order (every
//! fanin id must already exist when a gate is added).

use std::collections::HashMap;

use super::{
    fault::{Fault, FaultId, FaultModel, FaultVariant},
    ffr::{Ffr, FfrId, Mffc, MffcId},
    node::{Node, NodeId, NodeKind, Primitive},
    Network,
};

#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: Vec<Node>,
    /// (ppo id, paired ppi id) for flip-flops, recorded as they're added.
    dff_pairs: Vec<(NodeId, NodeId)>,
    faults: Vec<Fault>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind, fanin: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, kind, fanin));
        id
    }

    pub fn add_ppi(&mut self) -> NodeId {
        self.push(NodeKind::Ppi, Vec::new())
    }

    pub fn add_gate(&mut self, primitive: Primitive, fanin: Vec<NodeId>) -> NodeId {
        self.push(NodeKind::Gate(primitive), fanin)
    }

    pub fn add_ppo(&mut self, input: NodeId) -> NodeId {
        self.push(NodeKind::Ppo, vec![input])
    }

    /// Registers a flip-flop: `d_input` feeds the FF's pseudo-output
    /// (`Ppi`, representing `q` at the *next* frame); the returned
    /// `Ppi` is `q` for the current frame, and its time-frame-0 value is
    /// supplied by `d_input` under the transition-delay model.
    pub fn add_dff(&mut self, d_input: NodeId) -> NodeId {
        let ppo = self.add_ppo(d_input);
        let ppi = self.add_ppi();
        self.dff_pairs.push((ppo, ppi));
        ppi
    }

    pub fn add_stuck_at_fault(
        &mut self,
        target: NodeId,
        variant: FaultVariant,
    ) -> FaultId {
        let id = FaultId(self.faults.len());
        self.faults
            .push(Fault::new(id, target, variant, FaultModel::StuckAt));
        id
    }

    pub fn add_transition_fault(
        &mut self,
        target: NodeId,
        variant: FaultVariant,
    ) -> FaultId {
        let id = FaultId(self.faults.len());
        self.faults
            .push(Fault::new(id, target, variant, FaultModel::Transition));
        id
    }

    /// Finalizes the network: computes fanout lists, dominators, FFRs and
    /// MFFCs, and binds each fault to its FFR.
    pub fn build(mut self) -> Network {
        self.link_fanout();
        self.link_dff_pairs();
        let idom = self.compute_dominators();
        let (ffrs, node_ffr) = self.build_ffrs();
        let (mffcs, node_mffc) = self.build_mffcs(&ffrs, &node_ffr, &idom);

        let mut nodes = self.nodes;
        for (n, d) in idom.iter().enumerate() {
            nodes[n].set_dominator(*d);
        }
        for (id, ffr) in ffrs.iter().enumerate() {
            for &n in ffr.nodes() {
                nodes[n.0].set_ffr(FfrId(id), ffr.root());
            }
        }
        for (id, mffc) in mffcs.iter().enumerate() {
            for &ffr_id in mffc.ffr_members() {
                for &n in ffrs[ffr_id.0].nodes() {
                    nodes[n.0].set_mffc(MffcId(id));
                }
            }
        }

        let has_prev_state = !self.dff_pairs.is_empty();
        let mut faults = self.faults;
        assign_fault_representatives(&mut faults, &nodes);
        let mut ffrs = ffrs;
        let mut mffcs = mffcs;
        let _ = &node_mffc;
        for f in &faults {
            if let Some(ffr_id) = nodes[f.origin_node().0].ffr() {
                ffrs[ffr_id.0].push_fault(f.id());
            }
            if let Some(mffc_id) = nodes[f.origin_node().0].mffc() {
                mffcs[mffc_id.0].push_fault(f.id());
            }
        }

        Network {
            nodes,
            ffrs,
            mffcs,
            faults,
            has_prev_state,
        }
    }

    fn link_fanout(&mut self) {
        let edges: Vec<(NodeId, NodeId)> = self
            .nodes
            .iter()
            .flat_map(|n| n.fanin().iter().map(move |&fi| (fi, n.id())))
            .collect();
        for (src, dst) in edges {
            self.nodes[src.0].push_fanout(dst);
        }
    }

    fn link_dff_pairs(&mut self) {
        for &(ppo, ppi) in &self.dff_pairs {
            self.nodes[ppo.0].set_dff_pair(ppi);
            self.nodes[ppi.0].set_dff_pair(ppo);
        }
    }

    /// Reverse-topological order: since nodes were added with every fanin
    /// preceding its consumer, simply reversing insertion order yields an
    /// order where every fanout of `n` is processed before `n`.
    fn reverse_topo_order(&self) -> Vec<NodeId> {
        (0..self.nodes.len()).rev().map(NodeId).collect()
    }

    /// Structural (post-)dominators: `idom[n]` is the nearest node that
    /// every path from `n` to an external output passes through, or
    /// `None` if no such single node exists (n's fanout paths reach
    /// distinct, non-reconverging outputs). Computed with the standard
    /// Cooper/Harvey/Kennedy intersect algorithm, which needs only one
    /// pass here because the graph is acyclic.
    fn compute_dominators(&self) -> Vec<Option<NodeId>> {
        let order = self.reverse_topo_order();
        let mut rank = vec![0usize; self.nodes.len()];
        for (i, n) in order.iter().enumerate() {
            rank[n.0] = i;
        }
        let mut idom: Vec<Option<NodeId>> = vec![None; self.nodes.len()];

        fn intersect(
            mut a: NodeId,
            mut b: NodeId,
            rank: &[usize],
            idom: &[Option<NodeId>],
        ) -> Option<NodeId> {
            loop {
                if a == b {
                    return Some(a);
                }
                while rank[a.0] > rank[b.0] {
                    a = idom[a.0]?;
                }
                while rank[b.0] > rank[a.0] {
                    b = idom[b.0]?;
                }
            }
        }

        for &n in &order {
            let node = &self.nodes[n.0];
            if node.is_ppo() {
                idom[n.0] = None;
                continue;
            }
            let mut chosen: Option<NodeId> = None;
            for &fo in node.fanout() {
                chosen = match chosen {
                    None => Some(fo),
                    Some(c) => intersect(c, fo, &rank, &idom),
                };
                if chosen.is_none() {
                    break;
                }
            }
            idom[n.0] = chosen;
        }
        idom
    }

    /// Builds FFRs: every node with fanout != 1 (or a `Ppo`) roots a new
    /// FFR, which absorbs the backward chain of single-fanout
    /// non-root nodes feeding it.
    fn build_ffrs(&self) -> (Vec<Ffr>, HashMap<NodeId, FfrId>) {
        let is_root = |n: &Node| n.fanout().len() != 1 || n.is_ppo();
        let mut ffrs = Vec::new();
        let mut node_ffr = HashMap::new();

        for node in &self.nodes {
            if !is_root(node) {
                continue;
            }
            let ffr_id = FfrId(ffrs.len());
            let mut ffr = Ffr::new(ffr_id, node.id());
            ffr.push_node(node.id());
            node_ffr.insert(node.id(), ffr_id);

            let mut stack: Vec<NodeId> = node.fanin().to_vec();
            while let Some(n) = stack.pop() {
                let nref = &self.nodes[n.0];
                if is_root(nref) {
                    continue;
                }
                ffr.push_node(n);
                node_ffr.insert(n, ffr_id);
                stack.extend_from_slice(nref.fanin());
            }
            ffrs.push(ffr);
        }
        (ffrs, node_ffr)
    }

    /// Groups FFRs into MFFCs by following each FFR root's dominator
    /// chain to its topmost ancestor (a node with no further dominator,
    /// i.e. a true reconvergence point or a `Ppo`). This slightly
    /// over-merges relative to a full MFFC computation (it will fold
    /// several nested dominance regions under one PPO into a single
    /// MFFC rather than splitting at every internal stem) — acceptable
    /// here because none of `StructEngine`/`BoolDiffEnc`/`CondGen`
    /// operate at MFFC granularity; only `Network::mffc_num()` and fault
    /// bucketing consume it.
    fn build_mffcs(
        &self,
        ffrs: &[Ffr],
        node_ffr: &HashMap<NodeId, FfrId>,
        idom: &[Option<NodeId>],
    ) -> (Vec<Mffc>, HashMap<NodeId, MffcId>) {
        let topmost = |mut n: NodeId| -> NodeId {
            loop {
                match idom[n.0] {
                    Some(d) if node_ffr.contains_key(&d) => n = d,
                    _ => return n,
                }
            }
        };

        let mut root_to_mffc: HashMap<NodeId, MffcId> = HashMap::new();
        let mut mffcs = Vec::new();
        let mut node_mffc = HashMap::new();

        for ffr in ffrs {
            let top = topmost(ffr.root());
            let mffc_id = *root_to_mffc.entry(top).or_insert_with(|| {
                let id = MffcId(mffcs.len());
                mffcs.push(Mffc::new(id, top));
                id
            });
            mffcs[mffc_id.0].push_ffr(ffr.id());
            for &n in ffr.nodes() {
                node_mffc.insert(n, mffc_id);
            }
        }
        (mffcs, node_mffc)
    }
}

fn assign_fault_representatives(faults: &mut [Fault], _nodes: &[Node]) {
    // Faults that target the same node with the same stuck-at polarity
    // collapse to one representative.
    let mut seen: HashMap<(NodeId, bool), FaultId> = HashMap::new();
    for i in 0..faults.len() {
        let fval = match faults[i].variant() {
            FaultVariant::Stem { fval } => Some(*fval),
            FaultVariant::Branch { fval, .. } => Some(*fval),
            FaultVariant::GateExhaustive { .. } => None,
        };
        let Some(fval) = fval else { continue };
        let key = (faults[i].origin_node(), fval);
        match seen.get(&key) {
            Some(&rep) if rep != faults[i].id() => faults[i].set_rep_of(rep),
            _ => {
                seen.insert(key, faults[i].id());
            }
        }
    }
}
