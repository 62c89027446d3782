//! `VarMap`: the bijection {(node, time-frame) → SAT literal}.
//!
//! Built incrementally by `StructEngine` and never handed out mutably to
//! anything else; the good-machine map and the fault-frame map used by
//! `BoolDiffEnc` are both instances of this same type, distinguished only
//! by which `StructEngine`/`BoolDiffEnc` owns them.

use crate::network::NodeId;
use crate::sat::SatLit;
use crate::types::FrameId;

/// Frame 0 (previous) and frame 1 (current); indexed `[frame as usize]`.
#[derive(Debug, Clone, Default)]
pub struct VarMap {
    frames: [Vec<Option<SatLit>>; 2],
}

impl VarMap {
    pub fn new() -> Self {
        VarMap {
            frames: [Vec::new(), Vec::new()],
        }
    }

    pub fn get(&self, node: NodeId, frame: FrameId) -> Option<SatLit> {
        self.frames[frame as usize].get(node.index()).copied().flatten()
    }

    pub fn contains(&self, node: NodeId, frame: FrameId) -> bool {
        self.get(node, frame).is_some()
    }

    /// Records the literal for `(node, frame)`. Idempotent: setting the
    /// same literal twice is a no-op; setting a *different* literal for
    /// an already-assigned slot is a caller bug (`debug_assert!`s,
    /// rather than a typed error, since it can only happen if
    /// `StructEngine`'s own memoization flags are inconsistent with this
    /// map, which is this crate's bug, not a caller's).
    pub(crate) fn set(&mut self, node: NodeId, frame: FrameId, lit: SatLit) {
        let slot = &mut self.frames[frame as usize];
        if slot.len() <= node.index() {
            slot.resize(node.index() + 1, None);
        }
        match slot[node.index()] {
            Some(existing) => debug_assert_eq!(existing, lit, "VarMap literal reassigned"),
            None => slot[node.index()] = Some(lit),
        }
    }
}
