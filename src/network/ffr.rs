//! Fanout-Free Regions and Maximal Fanout-Free Cones.

use super::{FaultId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FfrId(pub(crate) usize);

impl FfrId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MffcId(pub(crate) usize);

impl MffcId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A maximal single-output subtree ending at a branch point (or a PPO).
/// Every non-`Ppo` node belongs to exactly one FFR; the FFR's root has
/// fanout != 1 or is a PPO.
#[derive(Debug, Clone)]
pub struct Ffr {
    id: FfrId,
    root: NodeId,
    nodes: Vec<NodeId>,
    faults: Vec<FaultId>,
}

impl Ffr {
    pub(crate) fn new(id: FfrId, root: NodeId) -> Self {
        Ffr {
            id,
            root,
            nodes: Vec::new(),
            faults: Vec::new(),
        }
    }

    pub fn id(&self) -> FfrId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn faults(&self) -> &[FaultId] {
        &self.faults
    }

    pub(crate) fn push_node(&mut self, n: NodeId) {
        self.nodes.push(n);
    }

    pub(crate) fn push_fault(&mut self, f: FaultId) {
        self.faults.push(f);
    }
}

/// A maximal cone of nodes dominated by a single output node. Partitions
/// the logic under dominator analysis; an FFR belongs to exactly one
/// MFFC.
#[derive(Debug, Clone)]
pub struct Mffc {
    id: MffcId,
    root: NodeId,
    ffr_members: Vec<FfrId>,
    fault_members: Vec<FaultId>,
}

impl Mffc {
    pub(crate) fn new(id: MffcId, root: NodeId) -> Self {
        Mffc {
            id,
            root,
            ffr_members: Vec::new(),
            fault_members: Vec::new(),
        }
    }

    pub fn id(&self) -> MffcId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn ffr_members(&self) -> &[FfrId] {
        &self.ffr_members
    }

    pub fn fault_members(&self) -> &[FaultId] {
        &self.fault_members
    }

    pub(crate) fn push_ffr(&mut self, f: FfrId) {
        self.ffr_members.push(f);
    }

    pub(crate) fn push_fault(&mut self, f: FaultId) {
        self.fault_members.push(f);
    }
}
