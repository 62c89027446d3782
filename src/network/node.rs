//! `Node` and the primitive gate vocabulary.

use super::{FfrId, MffcId};

/// 0-based, unique within its `Network`. Stable for the life of the
/// `Network` (the newtype-over-`usize` idiom mirrors
/// `splr::types::idx`'s `VarId`/`ClauseId`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A combinational primitive. `Buf`/`Not` are unary; the rest are
/// n-ary (fanin list length >= 2, except where a circuit legitimately
/// degenerates a gate to one input during optimization — this crate does
/// not itself optimize, so fanin arity is whatever the builder gave it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Buf,
    Not,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
}

impl Primitive {
    /// The controlling value of this gate's inputs, if it has one.
    /// `And`/`Nand` are controlled by `0`; `Or`/`Nor` by `1`.
    /// `Buf`/`Not`/`Xor`/`Xnor` have no controlling value.
    pub fn controlling_value(self) -> Option<bool> {
        match self {
            Primitive::And | Primitive::Nand => Some(false),
            Primitive::Or | Primitive::Nor => Some(true),
            _ => None,
        }
    }

    /// The gate's output value when an input is held at the controlling
    /// value.
    pub fn controlling_output_value(self) -> Option<bool> {
        match self {
            Primitive::And | Primitive::Or => self.controlling_value(),
            Primitive::Nand | Primitive::Nor => self.controlling_value().map(|v| !v),
            _ => None,
        }
    }

    /// Evaluates the gate given its fanin values (good- or faulty-machine,
    /// caller's choice — this function is pure Boolean algebra).
    pub fn eval(self, inputs: &[bool]) -> bool {
        match self {
            Primitive::Buf => inputs[0],
            Primitive::Not => !inputs[0],
            Primitive::And => inputs.iter().all(|&v| v),
            Primitive::Nand => !inputs.iter().all(|&v| v),
            Primitive::Or => inputs.iter().any(|&v| v),
            Primitive::Nor => !inputs.iter().any(|&v| v),
            Primitive::Xor => inputs.iter().fold(false, |acc, &v| acc ^ v),
            Primitive::Xnor => !inputs.iter().fold(false, |acc, &v| acc ^ v),
        }
    }
}

/// What kind of node this is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A true primary input, or a flip-flop's pseudo-output.
    Ppi,
    /// A true primary output, or a flip-flop's pseudo-input. A PPO has no
    /// fanout.
    Ppo,
    /// A logic gate of the given primitive.
    Gate(Primitive),
}

/// One node in the circuit DAG.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    /// Ordered, stable for the `Network`'s lifetime.
    fanin: Vec<NodeId>,
    fanout: Vec<NodeId>,
    dominator: Option<NodeId>,
    ffr_root: Option<NodeId>,
    ffr: Option<FfrId>,
    mffc: Option<MffcId>,
    /// For a `Ppo` that is a flip-flop input: the paired `Ppi` (the same
    /// flip-flop's output), used by `StructEngine` to cross time-frames.
    dff_pair: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, fanin: Vec<NodeId>) -> Self {
        Node {
            id,
            kind,
            fanin,
            fanout: Vec::new(),
            dominator: None,
            ffr_root: None,
            ffr: None,
            mffc: None,
            dff_pair: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn primitive(&self) -> Option<Primitive> {
        match self.kind {
            NodeKind::Gate(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_ppo(&self) -> bool {
        matches!(self.kind, NodeKind::Ppo)
    }

    pub fn is_ppi(&self) -> bool {
        matches!(self.kind, NodeKind::Ppi)
    }

    pub fn fanin(&self) -> &[NodeId] {
        &self.fanin
    }

    pub fn fanout(&self) -> &[NodeId] {
        &self.fanout
    }

    /// A node is an FFR root iff its fanout count is != 1 or it is a PPO.
    pub fn is_ffr_root(&self) -> bool {
        self.fanout.len() != 1 || self.is_ppo()
    }

    pub fn dominator(&self) -> Option<NodeId> {
        self.dominator
    }

    pub fn ffr(&self) -> Option<FfrId> {
        self.ffr
    }

    pub fn mffc(&self) -> Option<MffcId> {
        self.mffc
    }

    pub fn dff_pair(&self) -> Option<NodeId> {
        self.dff_pair
    }

    pub(crate) fn push_fanout(&mut self, n: NodeId) {
        self.fanout.push(n);
    }

    pub(crate) fn set_dominator(&mut self, d: Option<NodeId>) {
        self.dominator = d;
    }

    pub(crate) fn set_ffr(&mut self, ffr: FfrId, root: NodeId) {
        self.ffr = Some(ffr);
        self.ffr_root = Some(root);
    }

    pub(crate) fn set_mffc(&mut self, mffc: MffcId) {
        self.mffc = Some(mffc);
    }

    pub(crate) fn set_dff_pair(&mut self, other: NodeId) {
        self.dff_pair = Some(other);
    }
}
