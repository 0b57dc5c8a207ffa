//! Broad-Phase BVH - dynamic AABB tree over body bounds
//!
//! Leaves store a "fat" box (exact bounds grown by `margin`) so small motions
//! do not touch the tree. A leaf is only reinserted once its body's exact box
//! leaves the fat box. Internal nodes always bound the union of their children.
//!
//! Insertion walks down choosing the child whose perimeter grows the least
//! (2D analogue of the surface-area heuristic).
//!
//! `query_pairs` reports every pair of leaves whose fat boxes overlap. Fat
//! boxes contain exact boxes, so overlapping bodies are never missed; the
//! extra pairs are discarded by the narrow phase.

use crate::domain::handle::{ArenaHandle, BodyHandle};
use crate::rigid_body::Vec2;

use super::aabb::Aabb;

const NULL_NODE: u32 = u32::MAX;

/// Default fat margin added on every side of a leaf box
pub const DEFAULT_MARGIN: f32 = 0.1;

#[derive(Clone, Copy, Debug)]
enum NodeKind {
    Leaf(BodyHandle),
    Internal { left: u32, right: u32 },
    Free,
}

#[derive(Clone, Copy, Debug)]
struct Node {
    aabb: Aabb,
    parent: u32,
    kind: NodeKind,
}

#[derive(Clone, Debug)]
pub struct Bvh {
    nodes: Vec<Node>,
    free_list: Vec<u32>,
    root: u32,
    /// Leaf node per body slot index
    leaves: Vec<Option<(BodyHandle, u32)>>,
    margin: f32,
}

impl Default for Bvh {
    fn default() -> Self {
        Self::new(DEFAULT_MARGIN)
    }
}

impl Bvh {
    pub fn new(margin: f32) -> Self {
        Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            root: NULL_NODE,
            leaves: Vec::new(),
            margin,
        }
    }

    pub fn len(&self) -> usize {
        self.leaves.iter().filter(|l| l.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.root == NULL_NODE
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.leaves.clear();
        self.root = NULL_NODE;
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.leaf_of(handle).is_some()
    }

    /// Fat box currently stored for the body
    pub fn fat_aabb(&self, handle: BodyHandle) -> Option<Aabb> {
        self.leaf_of(handle).map(|node| self.nodes[node as usize].aabb)
    }

    /// Insert a body. An existing leaf in the same slot is replaced.
    pub fn insert(&mut self, handle: BodyHandle, aabb: Aabb) {
        let slot = handle.index() as usize;
        if slot >= self.leaves.len() {
            self.leaves.resize(slot + 1, None);
        }
        let existing = self.leaves[slot];
        if let Some((old, _)) = existing {
            self.remove(old);
        }

        let node = self.alloc_node(Node {
            aabb: aabb.fattened(self.margin),
            parent: NULL_NODE,
            kind: NodeKind::Leaf(handle),
        });
        self.insert_leaf(node);
        self.leaves[slot] = Some((handle, node));
    }

    pub fn remove(&mut self, handle: BodyHandle) -> bool {
        let Some(node) = self.leaf_of(handle) else {
            return false;
        };
        self.remove_leaf(node);
        self.free_node(node);
        self.leaves[handle.index() as usize] = None;
        true
    }

    /// Refresh a body's bounds. Returns true if the leaf had to be reinserted.
    pub fn update(&mut self, handle: BodyHandle, aabb: Aabb) -> bool {
        let Some(node) = self.leaf_of(handle) else {
            self.insert(handle, aabb);
            return true;
        };
        if self.nodes[node as usize].aabb.contains(&aabb) {
            return false;
        }
        self.remove_leaf(node);
        self.nodes[node as usize].aabb = aabb.fattened(self.margin);
        self.insert_leaf(node);
        true
    }

    /// All unordered leaf pairs with overlapping fat boxes, sorted, no self pairs.
    pub fn query_pairs(&self) -> Vec<(BodyHandle, BodyHandle)> {
        let mut pairs = Vec::new();
        let mut stack = Vec::with_capacity(64);

        for &(handle, leaf) in self.leaves.iter().flatten() {
            let query = self.nodes[leaf as usize].aabb;
            self.visit_overlaps(&query, &mut stack, |other| {
                if other.index() > handle.index() {
                    pairs.push((handle, other));
                }
            });
        }

        pairs.sort_unstable();
        pairs
    }

    /// Bodies whose fat box overlaps `aabb`, in handle order
    pub fn query(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        let mut out = Vec::new();
        let mut stack = Vec::with_capacity(64);
        self.visit_overlaps(aabb, &mut stack, |h| out.push(h));
        out.sort_unstable();
        out
    }

    /// Bodies whose fat box is crossed by the segment `origin + t * dir`, `t` in `[0, max_t]`
    pub fn ray_candidates(&self, origin: Vec2, dir: Vec2, max_t: f32) -> Vec<BodyHandle> {
        let mut out = Vec::new();
        if self.root == NULL_NODE {
            return out;
        }
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if node.aabb.ray_fraction(origin, dir, max_t).is_none() {
                continue;
            }
            match node.kind {
                NodeKind::Leaf(h) => out.push(h),
                NodeKind::Internal { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
                NodeKind::Free => {}
            }
        }
        out.sort_unstable();
        out
    }

    /// Check the containment invariants (used by tests)
    pub fn validate(&self) -> bool {
        if self.root == NULL_NODE {
            return self.leaves.iter().all(|l| l.is_none());
        }
        self.validate_node(self.root, NULL_NODE)
    }

    fn validate_node(&self, index: u32, parent: u32) -> bool {
        let node = &self.nodes[index as usize];
        if node.parent != parent {
            return false;
        }
        match node.kind {
            NodeKind::Leaf(_) => true,
            NodeKind::Internal { left, right } => {
                let l = &self.nodes[left as usize];
                let r = &self.nodes[right as usize];
                node.aabb.contains(&l.aabb)
                    && node.aabb.contains(&r.aabb)
                    && self.validate_node(left, index)
                    && self.validate_node(right, index)
            }
            NodeKind::Free => false,
        }
    }

    fn leaf_of(&self, handle: BodyHandle) -> Option<u32> {
        match self.leaves.get(handle.index() as usize) {
            Some(Some((h, node))) if *h == handle => Some(*node),
            _ => None,
        }
    }

    fn visit_overlaps(&self, aabb: &Aabb, stack: &mut Vec<u32>, mut f: impl FnMut(BodyHandle)) {
        if self.root == NULL_NODE {
            return;
        }
        stack.clear();
        stack.push(self.root);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !node.aabb.overlaps(aabb) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf(h) => f(h),
                NodeKind::Internal { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
                NodeKind::Free => {}
            }
        }
    }

    fn alloc_node(&mut self, node: Node) -> u32 {
        if let Some(index) = self.free_list.pop() {
            self.nodes[index as usize] = node;
            index
        } else {
            self.nodes.push(node);
            (self.nodes.len() - 1) as u32
        }
    }

    fn free_node(&mut self, index: u32) {
        self.nodes[index as usize].kind = NodeKind::Free;
        self.nodes[index as usize].parent = NULL_NODE;
        self.free_list.push(index);
    }

    fn children(&self, index: u32) -> Option<(u32, u32)> {
        match self.nodes[index as usize].kind {
            NodeKind::Internal { left, right } => Some((left, right)),
            _ => None,
        }
    }

    /// Cost of descending into `child` when inserting `leaf_aabb`
    fn descend_cost(&self, child: u32, leaf_aabb: &Aabb, inheritance: f32) -> f32 {
        let node = &self.nodes[child as usize];
        let combined = node.aabb.union(leaf_aabb).perimeter();
        match node.kind {
            NodeKind::Leaf(_) => combined + inheritance,
            _ => combined - node.aabb.perimeter() + inheritance,
        }
    }

    fn insert_leaf(&mut self, leaf: u32) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent = NULL_NODE;
            return;
        }

        let leaf_aabb = self.nodes[leaf as usize].aabb;
        let mut index = self.root;
        while let Some((left, right)) = self.children(index) {
            let area = self.nodes[index as usize].aabb.perimeter();
            let combined = self.nodes[index as usize].aabb.union(&leaf_aabb).perimeter();
            let cost = 2.0 * combined;
            let inheritance = 2.0 * (combined - area);

            let cost_left = self.descend_cost(left, &leaf_aabb, inheritance);
            let cost_right = self.descend_cost(right, &leaf_aabb, inheritance);

            if cost < cost_left && cost < cost_right {
                break;
            }
            index = if cost_left <= cost_right { left } else { right };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling as usize].parent;
        let new_parent = self.alloc_node(Node {
            aabb: leaf_aabb.union(&self.nodes[sibling as usize].aabb),
            parent: old_parent,
            kind: NodeKind::Internal { left: sibling, right: leaf },
        });

        if old_parent == NULL_NODE {
            self.root = new_parent;
        } else {
            self.replace_child(old_parent, sibling, new_parent);
        }
        self.nodes[sibling as usize].parent = new_parent;
        self.nodes[leaf as usize].parent = new_parent;

        self.refit_upwards(old_parent);
    }

    fn remove_leaf(&mut self, leaf: u32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf as usize].parent;
        let grand_parent = self.nodes[parent as usize].parent;
        let sibling = match self.children(parent) {
            Some((left, right)) if left == leaf => right,
            Some((left, _)) => left,
            None => return,
        };

        if grand_parent == NULL_NODE {
            self.root = sibling;
            self.nodes[sibling as usize].parent = NULL_NODE;
            self.free_node(parent);
        } else {
            self.replace_child(grand_parent, parent, sibling);
            self.nodes[sibling as usize].parent = grand_parent;
            self.free_node(parent);
            self.refit_upwards(grand_parent);
        }
        self.nodes[leaf as usize].parent = NULL_NODE;
    }

    fn replace_child(&mut self, parent: u32, old: u32, new: u32) {
        if let NodeKind::Internal { left, right } = &mut self.nodes[parent as usize].kind {
            if *left == old {
                *left = new;
            } else {
                *right = new;
            }
        }
    }

    fn refit_upwards(&mut self, mut index: u32) {
        while index != NULL_NODE {
            if let Some((left, right)) = self.children(index) {
                let aabb = self.nodes[left as usize].aabb.union(&self.nodes[right as usize].aabb);
                self.nodes[index as usize].aabb = aabb;
            }
            index = self.nodes[index as usize].parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(i: u32) -> BodyHandle {
        BodyHandle::from_parts(i, 0)
    }

    fn unit_box(x: f32, y: f32) -> Aabb {
        Aabb::from_center(Vec2::new(x, y), Vec2::new(0.5, 0.5))
    }

    /// Deterministic scatter so the test needs no RNG crate
    fn scatter(i: u32) -> (f32, f32) {
        let mut s = i.wrapping_mul(2654435761).wrapping_add(12345);
        s ^= s >> 13;
        let x = (s % 200) as f32 * 0.1;
        s = s.wrapping_mul(1103515245).wrapping_add(12345);
        let y = ((s >> 8) % 200) as f32 * 0.1;
        (x, y)
    }

    #[test]
    fn no_false_negatives_against_brute_force() {
        let mut bvh = Bvh::default();
        let mut boxes = Vec::new();
        for i in 0..120 {
            let (x, y) = scatter(i);
            let aabb = unit_box(x, y);
            bvh.insert(handle(i), aabb);
            boxes.push(aabb);
        }
        // Move half of them to force reinsertion
        for i in (0..120).step_by(2) {
            let (x, y) = scatter(i + 1000);
            boxes[i as usize] = unit_box(x, y);
            bvh.update(handle(i), boxes[i as usize]);
        }
        assert!(bvh.validate());

        let pairs = bvh.query_pairs();
        for i in 0..boxes.len() {
            for j in (i + 1)..boxes.len() {
                if boxes[i].overlaps(&boxes[j]) {
                    assert!(
                        pairs.contains(&(handle(i as u32), handle(j as u32))),
                        "missing pair {} {}",
                        i,
                        j
                    );
                }
            }
        }
        for (a, b) in pairs.iter() {
            assert!(a.index() < b.index());
        }
    }

    #[test]
    fn small_motion_stays_in_fat_box() {
        let mut bvh = Bvh::default();
        bvh.insert(handle(0), unit_box(0.0, 0.0));
        assert!(!bvh.update(handle(0), unit_box(0.05, 0.0)));
        assert!(bvh.update(handle(0), unit_box(1.0, 0.0)));
        assert!(bvh.validate());
    }

    #[test]
    fn remove_drops_pairs() {
        let mut bvh = Bvh::default();
        bvh.insert(handle(0), unit_box(0.0, 0.0));
        bvh.insert(handle(1), unit_box(0.5, 0.0));
        bvh.insert(handle(2), unit_box(0.9, 0.0));
        assert_eq!(bvh.query_pairs().len(), 3);
        assert!(bvh.remove(handle(1)));
        assert!(!bvh.remove(handle(1)));
        assert_eq!(bvh.query_pairs(), vec![(handle(0), handle(2))]);
        assert!(bvh.validate());
        assert_eq!(bvh.len(), 2);
    }

    #[test]
    fn stale_generation_does_not_remove_new_leaf() {
        let mut bvh = Bvh::default();
        bvh.insert(handle(0), unit_box(0.0, 0.0));
        let newer = BodyHandle::from_parts(0, 1);
        bvh.insert(newer, unit_box(3.0, 0.0));
        assert!(!bvh.contains(handle(0)));
        assert!(!bvh.remove(handle(0)));
        assert!(bvh.contains(newer));
    }
}
