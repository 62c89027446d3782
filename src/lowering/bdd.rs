//! The legacy `bdd` variant: size-estimation only, never materializes
//! clauses. Builds a reduced, ordered BDD per cube, then repeatedly
//! ORs the two smallest together (by node count) until the next
//! combination would exceed a size threshold, then estimates CNF size
//! per surviving BDD node.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use crate::error;
use crate::types::AssignList;

/// Node count above which combining two BDDs is no longer attempted —
/// an arbitrary but fixed cutoff standing in for the "threshold" the
/// design notes leave unspecified.
const SIZE_THRESHOLD: usize = 4096;

type NodeId = usize;
const ZERO: NodeId = usize::MAX;
const ONE: NodeId = usize::MAX - 1;

fn is_terminal(n: NodeId) -> bool {
    n == ZERO || n == ONE
}

struct BddArena {
    // (var, low, high) keyed by structural hash for canonical sharing.
    nodes: Vec<(i64, NodeId, NodeId)>,
    unique: HashMap<(i64, NodeId, NodeId), NodeId>,
    and_memo: HashMap<(NodeId, NodeId), NodeId>,
    or_memo: HashMap<(NodeId, NodeId), NodeId>,
    not_memo: HashMap<NodeId, NodeId>,
}

impl BddArena {
    fn new() -> Self {
        BddArena {
            nodes: Vec::new(),
            unique: HashMap::new(),
            and_memo: HashMap::new(),
            or_memo: HashMap::new(),
            not_memo: HashMap::new(),
        }
    }

    fn mk(&mut self, var: i64, low: NodeId, high: NodeId) -> NodeId {
        if low == high {
            return low;
        }
        let key = (var, low, high);
        if let Some(&id) = self.unique.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(key);
        self.unique.insert(key, id);
        id
    }

    fn var_of(&self, n: NodeId) -> i64 {
        self.nodes[n].0
    }
    fn low_of(&self, n: NodeId) -> NodeId {
        self.nodes[n].1
    }
    fn high_of(&self, n: NodeId) -> NodeId {
        self.nodes[n].2
    }

    /// One literal's chain: `var` true takes the `high` branch, the
    /// rest of the cube's chain; `var` false goes straight to `ZERO`
    /// (a cube is a single conjunctive path).
    fn from_cube(&mut self, mut lits: Vec<i64>) -> NodeId {
        lits.sort_by_key(|l| l.abs());
        let mut node = ONE;
        for &l in lits.iter().rev() {
            let var = l.abs();
            node = if l > 0 {
                self.mk(var, ZERO, node)
            } else {
                self.mk(var, node, ZERO)
            };
        }
        node
    }

    fn not(&mut self, n: NodeId) -> NodeId {
        match n {
            ZERO => ONE,
            ONE => ZERO,
            _ => {
                if let Some(&v) = self.not_memo.get(&n) {
                    return v;
                }
                let var = self.var_of(n);
                let (low, high) = (self.low_of(n), self.high_of(n));
                let nl = self.not(low);
                let nh = self.not(high);
                let r = self.mk(var, nl, nh);
                self.not_memo.insert(n, r);
                r
            }
        }
    }

    fn or(&mut self, a: NodeId, b: NodeId) -> NodeId {
        if a == ONE || b == ONE {
            return ONE;
        }
        if a == ZERO {
            return b;
        }
        if b == ZERO || a == b {
            return a;
        }
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&v) = self.or_memo.get(&key) {
            return v;
        }
        let (va, vb) = (self.var_of(a), self.var_of(b));
        let result = if va == vb {
            let lo = self.or(self.low_of(a), self.low_of(b));
            let hi = self.or(self.high_of(a), self.high_of(b));
            self.mk(va, lo, hi)
        } else if va < vb {
            let lo = self.or(self.low_of(a), b);
            let hi = self.or(self.high_of(a), b);
            self.mk(va, lo, hi)
        } else {
            let lo = self.or(a, self.low_of(b));
            let hi = self.or(a, self.high_of(b));
            self.mk(vb, lo, hi)
        };
        self.or_memo.insert(key, result);
        result
    }

    /// Distinct reachable internal node count (terminals excluded).
    fn size(&self, root: NodeId) -> usize {
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![root];
        while let Some(n) = stack.pop() {
            if is_terminal(n) || !seen.insert(n) {
                continue;
            }
            stack.push(self.low_of(n));
            stack.push(self.high_of(n));
        }
        seen.len()
    }
}

pub(super) fn estimate(cover: &[AssignList]) -> error::Result<(usize, usize)> {
    if cover.is_empty() {
        return Ok((0, 0));
    }
    let mut arena = BddArena::new();
    let mut heap: BinaryHeap<Reverse<(usize, NodeId)>> = BinaryHeap::new();
    for cube in cover {
        if cube.is_empty() {
            return Err(crate::error::DtpgError::ImpossibleState(
                "bdd size estimate given an empty cube".into(),
            ));
        }
        let lits = super::synthetic_lits(cube).into_iter().map(|l| l as i64).collect();
        let root = arena.from_cube(lits);
        heap.push(Reverse((arena.size(root), root)));
    }

    let mut finished = Vec::new();
    while heap.len() > 1 {
        let Reverse((sa, a)) = heap.pop().expect("len > 1");
        let Reverse((sb, b)) = heap.pop().expect("len > 1");
        let combined = arena.or(a, b);
        let combined_size = arena.size(combined);
        if combined_size > SIZE_THRESHOLD {
            finished.push(a);
            finished.push(b);
            continue;
        }
        let _ = (sa, sb);
        heap.push(Reverse((combined_size, combined)));
    }
    if let Some(Reverse((_, last))) = heap.pop() {
        finished.push(last);
    }

    let mut visited = std::collections::HashSet::new();
    let mut clauses = 0usize;
    let mut literals = 0usize;
    let mut stack: Vec<NodeId> = finished;
    while let Some(n) = stack.pop() {
        if is_terminal(n) || !visited.insert(n) {
            continue;
        }
        let low = arena.low_of(n);
        let high = arena.high_of(n);
        let (c, l) = if low == ZERO || high == ZERO {
            (2, 2)
        } else if low == ONE || high == ONE {
            (1, 3)
        } else {
            (2, 6)
        };
        clauses += c;
        literals += l;
        stack.push(low);
        stack.push(high);
    }
    Ok((clauses, literals))
}
