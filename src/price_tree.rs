//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// A self-balancing (AVL) binary search tree keyed by price, generic over its payload `V`. One
// `PriceTree<V>` instance is used per book side/kind (bids, asks, stop-bids, stop-asks) — rather
// than threading a "which tree am I" discriminant through a single shared implementation (the
// original's `OrderCategory` flag, which could be passed incorrectly on level deletion), each
// caller simply owns its own tree instance and there is no flag to get wrong.
//
// Nodes live in an arena (`Vec<Option<Node<V>>>`) addressed by index rather than raw/boxed
// pointers, so there is no `unsafe` anywhere in this module. Freed slots are recycled via a
// free list.
//
// The cached book edge (best bid / lowest ask / etc) is never incrementally patched on removal —
// it is recomputed by a real O(log n) walk to the tree's true minimum or maximum every time the
// tree's shape changes. The original's edge-pointer patch used the deleted node's *parent* as the
// new edge, which is only correct if the parent happens to be the in-order neighbor; walking the
// tree is the same order of complexity and cannot be wrong.
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use crate::types::Price;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// The cached edge tracks the maximum price (highest bid, highest stop-ask trigger).
    Max,
    /// The cached edge tracks the minimum price (lowest ask, lowest stop-bid trigger).
    Min,
}

#[derive(Debug, Clone)]
struct Node<V> {
    price: Price,
    value: V,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    height: i32,
}

/// An AVL tree mapping `Price -> V`, with O(1) access to the edge value (min or max) and O(log n)
/// insert/remove/lookup.
#[derive(Debug, Clone)]
pub struct PriceTree<V> {
    nodes: Vec<Option<Node<V>>>,
    free: Vec<usize>,
    root: Option<usize>,
    by_price: HashMap<Price, usize>,
    edge: Option<usize>,
    edge_kind: EdgeKind,
}

impl<V> PriceTree<V> {
    pub fn new(edge_kind: EdgeKind) -> Self {
        PriceTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            by_price: HashMap::new(),
            edge: None,
            edge_kind,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_price.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_price.len()
    }

    pub fn contains(&self, price: Price) -> bool {
        self.by_price.contains_key(&price)
    }

    pub fn get(&self, price: Price) -> Option<&V> {
        let idx = *self.by_price.get(&price)?;
        Some(&self.node(idx).value)
    }

    pub fn get_mut(&mut self, price: Price) -> Option<&mut V> {
        let idx = *self.by_price.get(&price)?;
        Some(&mut self.node_mut(idx).value)
    }

    /// The price at the cached edge (min or max, per `edge_kind`).
    pub fn edge_price(&self) -> Option<Price> {
        self.edge.map(|idx| self.node(idx).price)
    }

    pub fn edge_value(&self) -> Option<&V> {
        self.edge.map(|idx| &self.node(idx).value)
    }

    pub fn edge_value_mut(&mut self) -> Option<&mut V> {
        let idx = self.edge?;
        Some(&mut self.node_mut(idx).value)
    }

    /// Inserts a new price level. Returns `false` without modifying the tree if `price` is
    /// already present — callers must check `contains`/`get_mut` first if they mean to update.
    pub fn insert(&mut self, price: Price, value: V) -> bool {
        if self.by_price.contains_key(&price) {
            return false;
        }
        let idx = self.alloc(price, value);
        match self.root {
            None => self.root = Some(idx),
            Some(root) => {
                let mut cur = root;
                loop {
                    let cur_price = self.node(cur).price;
                    let next = if price < cur_price {
                        self.node(cur).left
                    } else {
                        self.node(cur).right
                    };
                    match next {
                        Some(n) => cur = n,
                        None => {
                            if price < cur_price {
                                self.node_mut(cur).left = Some(idx);
                            } else {
                                self.node_mut(cur).right = Some(idx);
                            }
                            self.node_mut(idx).parent = Some(cur);
                            break;
                        }
                    }
                }
                self.rebalance_path(Some(cur));
            }
        }
        self.by_price.insert(price, idx);
        self.recompute_edge();
        true
    }

    /// Removes and returns the value at `price`, if present.
    pub fn remove(&mut self, price: Price) -> Option<V> {
        let idx = *self.by_price.get(&price)?;
        let value = self.remove_node(idx);
        self.by_price.remove(&price);
        self.recompute_edge();
        Some(value)
    }

    pub fn iter_in_order(&self) -> Vec<(Price, &V)> {
        let mut out = Vec::with_capacity(self.len());
        self.collect_in_order(self.root, &mut out);
        out
    }

    fn collect_in_order<'a>(&'a self, idx: Option<usize>, out: &mut Vec<(Price, &'a V)>) {
        let Some(idx) = idx else { return };
        let node = self.node(idx);
        self.collect_in_order(node.left, out);
        out.push((node.price, &node.value));
        self.collect_in_order(node.right, out);
    }

    /// Verifies BST ordering, AVL balance, and edge-cache correctness. Intended for
    /// `debug_assert!`-gated invariant checks, not the hot path.
    pub fn check_invariants(&self) -> Result<(), String> {
        self.check_subtree(self.root, None, None)?;
        let expected_edge = match self.edge_kind {
            EdgeKind::Max => self.root.map(|r| self.max_node(r)),
            EdgeKind::Min => self.root.map(|r| self.min_node(r)),
        };
        if expected_edge != self.edge {
            return Err(format!(
                "edge cache mismatch: cached {:?}, true {:?}",
                self.edge.map(|i| self.node(i).price),
                expected_edge.map(|i| self.node(i).price)
            ));
        }
        Ok(())
    }

    fn check_subtree(
        &self,
        idx: Option<usize>,
        lo: Option<Price>,
        hi: Option<Price>,
    ) -> Result<i32, String> {
        let Some(idx) = idx else { return Ok(0) };
        let node = self.node(idx);
        if let Some(lo) = lo {
            if node.price <= lo {
                return Err(format!("BST order violated at price {}", node.price));
            }
        }
        if let Some(hi) = hi {
            if node.price >= hi {
                return Err(format!("BST order violated at price {}", node.price));
            }
        }
        let lh = self.check_subtree(node.left, lo, Some(node.price))?;
        let rh = self.check_subtree(node.right, Some(node.price), hi)?;
        if (lh - rh).abs() > 1 {
            return Err(format!("AVL balance violated at price {}", node.price));
        }
        let expected_height = 1 + lh.max(rh);
        if expected_height != node.height {
            return Err(format!(
                "cached height {} != computed height {} at price {}",
                node.height, expected_height, node.price
            ));
        }
        Ok(expected_height)
    }

    // -- internal arena/tree machinery --------------------------------------------------------

    fn node(&self, idx: usize) -> &Node<V> {
        self.nodes[idx].as_ref().expect("dangling tree index")
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<V> {
        self.nodes[idx].as_mut().expect("dangling tree index")
    }

    fn alloc(&mut self, price: Price, value: V) -> usize {
        let node = Node {
            price,
            value,
            parent: None,
            left: None,
            right: None,
            height: 1,
        };
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn height(&self, idx: Option<usize>) -> i32 {
        idx.map_or(0, |i| self.node(i).height)
    }

    fn update_height(&mut self, idx: usize) {
        let (l, r) = {
            let n = self.node(idx);
            (n.left, n.right)
        };
        let h = 1 + self.height(l).max(self.height(r));
        self.node_mut(idx).height = h;
    }

    /// Signed left-height minus right-height. The original computed `abs(left - right)` and so
    /// could not tell a left-heavy tree from a right-heavy one when choosing a rotation case.
    fn balance_factor(&self, idx: usize) -> i32 {
        let (l, r) = {
            let n = self.node(idx);
            (n.left, n.right)
        };
        self.height(l) - self.height(r)
    }

    fn rotate_left(&mut self, x: usize) -> usize {
        let y = self.node(x).right.expect("rotate_left requires right child");
        let t2 = self.node(y).left;
        self.node_mut(x).right = t2;
        if let Some(t2) = t2 {
            self.node_mut(t2).parent = Some(x);
        }
        let x_parent = self.node(x).parent;
        self.node_mut(y).left = Some(x);
        self.node_mut(y).parent = x_parent;
        self.node_mut(x).parent = Some(y);
        match x_parent {
            None => self.root = Some(y),
            Some(p) => {
                if self.node(p).left == Some(x) {
                    self.node_mut(p).left = Some(y);
                } else {
                    self.node_mut(p).right = Some(y);
                }
            }
        }
        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: usize) -> usize {
        let y = self.node(x).left.expect("rotate_right requires left child");
        let t2 = self.node(y).right;
        self.node_mut(x).left = t2;
        if let Some(t2) = t2 {
            self.node_mut(t2).parent = Some(x);
        }
        let x_parent = self.node(x).parent;
        self.node_mut(y).right = Some(x);
        self.node_mut(y).parent = x_parent;
        self.node_mut(x).parent = Some(y);
        match x_parent {
            None => self.root = Some(y),
            Some(p) => {
                if self.node(p).left == Some(x) {
                    self.node_mut(p).left = Some(y);
                } else {
                    self.node_mut(p).right = Some(y);
                }
            }
        }
        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Updates `idx`'s height and rebalances it if needed, returning the index that now occupies
    /// `idx`'s former structural position (itself, unless a rotation replaced it).
    fn rebalance_at(&mut self, idx: usize) -> usize {
        self.update_height(idx);
        let bf = self.balance_factor(idx);
        if bf > 1 {
            let left = self.node(idx).left.expect("bf > 1 implies a left child");
            if self.balance_factor(left) < 0 {
                self.rotate_left(left);
            }
            self.rotate_right(idx)
        } else if bf < -1 {
            let right = self.node(idx).right.expect("bf < -1 implies a right child");
            if self.balance_factor(right) > 0 {
                self.rotate_right(right);
            }
            self.rotate_left(idx)
        } else {
            idx
        }
    }

    fn rebalance_path(&mut self, mut node: Option<usize>) {
        while let Some(idx) = node {
            let new_root = self.rebalance_at(idx);
            node = self.node(new_root).parent;
        }
    }

    fn min_node(&self, mut idx: usize) -> usize {
        while let Some(l) = self.node(idx).left {
            idx = l;
        }
        idx
    }

    fn max_node(&self, mut idx: usize) -> usize {
        while let Some(r) = self.node(idx).right {
            idx = r;
        }
        idx
    }

    fn recompute_edge(&mut self) {
        self.edge = self.root.map(|r| match self.edge_kind {
            EdgeKind::Max => self.max_node(r),
            EdgeKind::Min => self.min_node(r),
        });
    }

    fn swap_price_value(&mut self, a: usize, b: usize) {
        let mut na = self.nodes[a].take().expect("dangling tree index");
        let mut nb = self.nodes[b].take().expect("dangling tree index");
        std::mem::swap(&mut na.price, &mut nb.price);
        std::mem::swap(&mut na.value, &mut nb.value);
        self.nodes[a] = Some(na);
        self.nodes[b] = Some(nb);
    }

    fn remove_node(&mut self, mut target: usize) -> V {
        let (left, right) = {
            let n = self.node(target);
            (n.left, n.right)
        };
        if left.is_some() && right.is_some() {
            let succ = self.min_node(right.unwrap());
            self.swap_price_value(target, succ);
            let swapped_price = self.node(target).price;
            self.by_price.insert(swapped_price, target);
            target = succ;
        }
        let node = self.nodes[target].take().expect("dangling tree index");
        let child = node.left.or(node.right);
        if let Some(c) = child {
            self.node_mut(c).parent = node.parent;
        }
        match node.parent {
            None => self.root = child,
            Some(p) => {
                if self.node(p).left == Some(target) {
                    self.node_mut(p).left = child;
                } else {
                    self.node_mut(p).right = child;
                }
            }
        }
        self.free.push(target);
        self.rebalance_path(node.parent);
        node.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut tree = PriceTree::new(EdgeKind::Max);
        tree.insert(100, "a");
        tree.insert(90, "b");
        tree.insert(110, "c");
        assert_eq!(tree.get(90), Some(&"b"));
        assert_eq!(tree.len(), 3);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn duplicate_insert_is_noop() {
        let mut tree = PriceTree::new(EdgeKind::Max);
        assert!(tree.insert(100, "a"));
        assert!(!tree.insert(100, "b"));
        assert_eq!(tree.get(100), Some(&"a"));
    }

    #[test]
    fn max_edge_tracks_highest_price() {
        let mut tree = PriceTree::new(EdgeKind::Max);
        for p in [50, 70, 30, 90, 10, 60, 80] {
            tree.insert(p, p);
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.edge_price(), Some(90));
    }

    #[test]
    fn min_edge_tracks_lowest_price() {
        let mut tree = PriceTree::new(EdgeKind::Min);
        for p in [50, 70, 30, 90, 10, 60, 80] {
            tree.insert(p, p);
            tree.check_invariants().unwrap();
        }
        assert_eq!(tree.edge_price(), Some(10));
    }

    #[test]
    fn remove_leaf_rebalances_and_updates_edge() {
        let mut tree = PriceTree::new(EdgeKind::Max);
        for p in [50, 30, 70, 20, 40, 60, 90] {
            tree.insert(p, p);
        }
        tree.check_invariants().unwrap();
        assert_eq!(tree.remove(90), Some(90));
        tree.check_invariants().unwrap();
        assert_eq!(tree.edge_price(), Some(70));
    }

    #[test]
    fn remove_node_with_two_children_preserves_ordering() {
        let mut tree = PriceTree::new(EdgeKind::Min);
        for p in [50, 30, 70, 20, 40, 60, 90, 35, 45] {
            tree.insert(p, p);
        }
        tree.check_invariants().unwrap();
        assert_eq!(tree.remove(30), Some(30));
        tree.check_invariants().unwrap();
        let prices: Vec<Price> = tree.iter_in_order().into_iter().map(|(p, _)| p).collect();
        let mut expected: Vec<Price> = vec![50, 70, 20, 40, 60, 90, 35, 45];
        expected.sort();
        assert_eq!(prices, expected);
    }

    #[test]
    fn remove_root_repeatedly_drains_tree() {
        let mut tree = PriceTree::new(EdgeKind::Max);
        let prices = [50, 30, 70, 20, 40, 60, 90, 10, 25, 35, 45, 55, 65, 80, 95];
        for p in prices {
            tree.insert(p, p);
        }
        let mut remaining: Vec<Price> = prices.to_vec();
        while let Some(edge) = tree.edge_price() {
            tree.remove(edge);
            tree.check_invariants().unwrap();
            remaining.retain(|&p| p != edge);
            assert_eq!(tree.edge_price(), remaining.iter().copied().max());
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn ascending_insertion_order_stays_balanced() {
        let mut tree = PriceTree::new(EdgeKind::Max);
        for p in 1..=200 {
            tree.insert(p, p);
        }
        tree.check_invariants().unwrap();
        assert_eq!(tree.edge_price(), Some(200));
    }

    #[test]
    fn arena_slots_are_recycled_after_removal() {
        let mut tree: PriceTree<i64> = PriceTree::new(EdgeKind::Max);
        for p in 1..=50 {
            tree.insert(p, p);
        }
        for p in 1..=50 {
            tree.remove(p);
        }
        assert!(tree.is_empty());
        for p in 1..=50 {
            tree.insert(p, p);
        }
        tree.check_invariants().unwrap();
        assert!(tree.nodes.len() < 150, "arena should recycle freed slots");
    }
}
