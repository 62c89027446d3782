//! Crate `types` provides the shared value types every encoder and
//! driver passes around: time-framed assignments, cubes, and detection
//! conditions.

use crate::error::{self, DtpgError};
use crate::network::NodeId;

/// `0` is the previous frame (used only under the transition-delay
/// model), `1` is the current frame.
pub type FrameId = u8;

/// A single (node, time-frame, value) assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assign {
    node: NodeId,
    frame: FrameId,
    value: bool,
}

impl Assign {
    pub fn new(node: NodeId, frame: FrameId, value: bool) -> Self {
        Assign { node, frame, value }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn frame(&self) -> FrameId {
        self.frame
    }

    pub fn value(&self) -> bool {
        self.value
    }
}

/// An ordered list of `Assign`s interpreted as a conjunction (a cube).
/// Duplicate `(node, frame)` entries with conflicting values are a
/// structural error, not a panic — callers that build cubes from
/// possibly-overlapping sources (e.g. a mandatory condition unioned with
/// a cube) must go through [`AssignList::push`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignList {
    assigns: Vec<Assign>,
}

impl AssignList {
    pub fn new() -> Self {
        AssignList {
            assigns: Vec::new(),
        }
    }

    pub fn from_vec(assigns: Vec<Assign>) -> error::Result<Self> {
        let mut list = AssignList::new();
        for a in assigns {
            list.push(a)?;
        }
        Ok(list)
    }

    /// Adds an assignment, checking for a conflicting prior entry on the
    /// same `(node, frame)`.
    pub fn push(&mut self, a: Assign) -> error::Result<()> {
        if let Some(existing) = self
            .assigns
            .iter()
            .find(|e| e.node == a.node && e.frame == a.frame)
        {
            if existing.value != a.value {
                return Err(DtpgError::ConflictingAssignment {
                    node: a.node,
                    frame: a.frame,
                    existing: existing.value,
                    new: a.value,
                });
            }
            return Ok(());
        }
        self.assigns.push(a);
        Ok(())
    }

    /// Like [`push`](Self::push), but used internally where the caller
    /// already knows the entry cannot conflict (fresh cubes built by this
    /// crate's own encoders).
    pub(crate) fn push_unchecked(&mut self, a: Assign) -> error::Result<()> {
        self.push(a)
    }

    pub fn len(&self) -> usize {
        self.assigns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assign> {
        self.assigns.iter()
    }

    pub fn as_slice(&self) -> &[Assign] {
        &self.assigns
    }

    pub fn contains(&self, node: NodeId, frame: FrameId) -> Option<bool> {
        self.assigns
            .iter()
            .find(|a| a.node == node && a.frame == frame)
            .map(|a| a.value)
    }

    /// Removes the given assignment if present (by `(node, frame)`);
    /// used by `CondGen` to subtract a mandatory condition from a cube.
    pub fn remove(&mut self, node: NodeId, frame: FrameId) {
        self.assigns.retain(|a| !(a.node == node && a.frame == frame));
    }

    pub fn union(&self, other: &AssignList) -> error::Result<AssignList> {
        let mut out = self.clone();
        for a in other.iter() {
            out.push(*a)?;
        }
        Ok(out)
    }
}

impl IntoIterator for AssignList {
    type Item = Assign;
    type IntoIter = std::vec::IntoIter<Assign>;
    fn into_iter(self) -> Self::IntoIter {
        self.assigns.into_iter()
    }
}

impl FromIterator<Assign> for AssignList {
    fn from_iter<T: IntoIterator<Item = Assign>>(iter: T) -> Self {
        AssignList {
            assigns: iter.into_iter().collect(),
        }
    }
}

/// The outcome of `CondGen` for one FFR root, and the shape of a lowered
/// assumption set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetCond {
    /// `mandatory` is necessary and sufficient together with any one
    /// cube of `cover` (`cover` is never empty here).
    Detected {
        mandatory: AssignList,
        cover: Vec<AssignList>,
    },
    /// The whole-FFR enumeration aborted, but per-output enumeration
    /// succeeded for at least one output; `cover` is one cube list per
    /// successful output, `outputs` names the outputs that could not be
    /// resolved (may be empty).
    PartialDetected {
        mandatory: AssignList,
        cover: Vec<AssignList>,
        outputs: Vec<NodeId>,
    },
    /// Every attempt (whole-FFR and per-output) aborted.
    Overflow { outputs: Vec<NodeId> },
    /// Propagation is provably impossible from this root.
    Undetected,
}

impl DetCond {
    pub fn is_detected(&self) -> bool {
        matches!(self, DetCond::Detected { .. })
    }

    pub fn is_undetected(&self) -> bool {
        matches!(self, DetCond::Undetected)
    }

    /// Validates the struct-level invariants from the data model table:
    /// `Detected` has a non-empty cover and no outputs; `Overflow` has no
    /// cover but non-empty outputs; `Undetected` has neither.
    pub fn check_invariants(&self) -> error::Result<()> {
        match self {
            DetCond::Detected { cover, .. } => {
                if cover.is_empty() {
                    return Err(DtpgError::ImpossibleState(
                        "Detected DetCond with empty cover".into(),
                    ));
                }
            }
            DetCond::Overflow { outputs } => {
                if outputs.is_empty() {
                    return Err(DtpgError::ImpossibleState(
                        "Overflow DetCond with empty output list".into(),
                    ));
                }
            }
            DetCond::Undetected => {}
            DetCond::PartialDetected { cover, .. } => {
                if cover.is_empty() {
                    return Err(DtpgError::ImpossibleState(
                        "PartialDetected DetCond with empty cover".into(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// The outcome of generating a test for one fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DtpgResult {
    Detected(TestVector),
    Untestable,
    /// Alias `Abort` in spec prose: the solver could not decide within
    /// its resource budget.
    Undetected,
}

/// A primary-input assignment sufficient to detect a fault, expressed
/// per time-frame (frame 0 only populated under the transition model).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TestVector {
    pub frame1: Vec<(NodeId, bool)>,
    pub frame0: Vec<(NodeId, bool)>,
}
