use crate::common::{Direction, Node, NodeId};
use log::warn;

/// Flat storage for the nodes of any number of disjoint splay trees.
///
/// Nodes refer to each other by index. A tree is identified by the index of its root, and every
/// structural operation takes the root(s) it works on and returns the resulting root(s). Slots
/// of released nodes are recycled by later allocations.
#[derive(Debug, Default)]
pub struct SplayArena {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
}

impl SplayArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }

    pub fn key(&self, id: NodeId) -> i64 {
        self.nodes[id].key
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Allocates a detached single-node tree.
    pub fn alloc(&mut self, key: i64) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.nodes[id] = Node::new(key);
            id
        } else {
            self.nodes.push(Node::new(key));
            self.nodes.len() - 1
        }
    }

    /// Returns a node's slot to the free list. The node must already be fully detached.
    pub fn release(&mut self, id: NodeId) {
        debug_assert!({
            let node = &self.nodes[id];
            node.parent.is_none() && node.left.is_none() && node.right.is_none()
        });
        self.free.push(id);
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
    }

    /// Sum of all keys in the tree rooted at `root`; zero for the empty tree.
    pub fn aggregate(&self, root: Option<NodeId>) -> i128 {
        root.map_or(0, |id| self.nodes[id].aggregate)
    }

    pub fn update_aggregate(&mut self, id: Option<NodeId>) {
        let Some(id) = id else {
            return;
        };
        let node = &self.nodes[id];
        let sum = self.aggregate(node.left) + node.key as i128 + self.aggregate(node.right);
        self.nodes[id].aggregate = sum;
    }

    /// Attaches `child` at `parent.arm(dir)`, overwriting whatever was there.
    fn link(&mut self, parent: NodeId, dir: Direction, child: Option<NodeId>) {
        *self.node_mut(parent).arm_mut(dir) = child;
        if let Some(c) = child {
            self.node_mut(c).parent = Some(parent);
        }
    }

    /// Detaches and returns the subtree at `parent.arm(dir)`, then fixes `parent`'s aggregate.
    pub fn cut(&mut self, parent: NodeId, dir: Direction) -> Option<NodeId> {
        let child = self.node_mut(parent).arm_mut(dir).take();
        if let Some(c) = child {
            self.node_mut(c).parent = None;
        }
        self.update_aggregate(Some(parent));
        child
    }

    /// Makes whoever pointed at `old` (a parent slot, or nobody if `old` was a root) point at
    /// `new` instead.
    fn replace_in_parent(&mut self, grandparent: Option<NodeId>, old: NodeId, new: NodeId) {
        self.node_mut(new).parent = grandparent;
        if let Some(g) = grandparent {
            let dir = self
                .node(g)
                .side_of(old)
                .expect("parent link without matching child link");
            *self.node_mut(g).arm_mut(dir) = Some(new);
        }
    }

    fn side_in_parent(&self, id: NodeId, parent: NodeId) -> Direction {
        self.node(parent)
            .side_of(id)
            .expect("parent link without matching child link")
    }

    /// zig: rotates `v` above its parent. No-op on a root.
    pub fn rotate_single(&mut self, v: NodeId) {
        let Some(p) = self.parent(v) else {
            return;
        };
        // Before (dir == Left):
        //      P
        //   V     c
        //  a b
        // After:
        //     V
        //  a     P
        //       b c
        let dir = self.side_in_parent(v, p);
        let grandparent = self.parent(p);
        let subtree_b = self.node(v).arm(dir.opposite());
        self.link(p, dir, subtree_b);
        self.replace_in_parent(grandparent, p, v);
        self.link(v, dir.opposite(), Some(p));
        self.update_aggregate(Some(p));
        self.update_aggregate(Some(v));
    }

    /// zig-zig or zig-zag: moves `v` two levels up. Falls back to a single rotation if `v` has
    /// no grandparent.
    pub fn rotate_double(&mut self, v: NodeId) {
        let Some(p) = self.parent(v) else {
            return;
        };
        let Some(g) = self.parent(p) else {
            self.rotate_single(v);
            return;
        };
        let parent_dir = self.side_in_parent(v, p);
        let grandparent_dir = self.side_in_parent(p, g);
        if parent_dir == grandparent_dir {
            // zigzig (dir == Left)
            // Before:
            //           G
            //        P     d
            //     V     c
            //    a b
            // After:
            //     V
            //  a     P
            //      b    G
            //          c d
            self.rotate_single(p);
            self.rotate_single(v);
        } else {
            // zigzag (grandparent_dir == Left)
            // Before:
            //           G
            //     P           d
            //  a     V
            //       b c
            // After:
            //           V
            //     P           G
            //  a     b     c     d
            let great_grandparent = self.parent(g);
            let subtree_b = self.node(v).arm(grandparent_dir);
            let subtree_c = self.node(v).arm(parent_dir);
            self.link(p, parent_dir, subtree_b);
            self.link(g, grandparent_dir, subtree_c);
            self.replace_in_parent(great_grandparent, g, v);
            self.link(v, grandparent_dir, Some(p));
            self.link(v, parent_dir, Some(g));
            self.update_aggregate(Some(g));
            self.update_aggregate(Some(p));
            self.update_aggregate(Some(v));
        }
    }

    /// Rotates `v` up until it is the root of its tree, and returns it as the new root.
    pub fn splay(&mut self, v: Option<NodeId>) -> Option<NodeId> {
        let v = v?;
        while let Some(p) = self.parent(v) {
            if self.parent(p).is_none() {
                self.rotate_single(v);
            } else {
                self.rotate_double(v);
            }
        }
        Some(v)
    }

    /// Searches `key` below `root` and splays the last node visited.
    ///
    /// Returns `(exact match, new root)`. On a miss the new root is the in-order neighbour of
    /// `key` that the search ended at.
    pub fn find_and_splay(
        &mut self,
        root: Option<NodeId>,
        key: i64,
    ) -> (Option<NodeId>, Option<NodeId>) {
        let Some(mut current) = root else {
            return (None, None);
        };
        let found = loop {
            let node = self.node(current);
            let next = match key.cmp(&node.key) {
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
                std::cmp::Ordering::Equal => break true,
            };
            match next {
                Some(n) => current = n,
                None => break false,
            }
        };
        let new_root = self.splay(Some(current));
        (found.then_some(current), new_root)
    }

    /// Partitions the tree into keys `< key` and keys `>= key`.
    pub fn split(&mut self, root: Option<NodeId>, key: i64) -> (Option<NodeId>, Option<NodeId>) {
        let (_, Some(new_root)) = self.find_and_splay(root, key) else {
            return (None, None);
        };
        if self.key(new_root) < key {
            let right = self.cut(new_root, Direction::Right);
            (Some(new_root), right)
        } else {
            let left = self.cut(new_root, Direction::Left);
            (left, Some(new_root))
        }
    }

    /// Concatenates two trees. Every key in `left` must be less than every key in `right`;
    /// this is not checked.
    pub fn merge(&mut self, left: Option<NodeId>, right: Option<NodeId>) -> Option<NodeId> {
        let Some(left) = left else {
            return right;
        };
        if right.is_none() {
            return Some(left);
        }
        debug_assert!(self.parent(left).is_none());
        let max = self.last(left);
        self.splay(Some(max));
        debug_assert!(self.node(max).right.is_none());
        self.link(max, Direction::Right, right);
        self.update_aggregate(Some(max));
        Some(max)
    }

    fn extreme(&self, mut id: NodeId, dir: Direction) -> NodeId {
        while let Some(next) = self.node(id).arm(dir) {
            id = next;
        }
        id
    }

    /// Smallest-key node below `id`, without splaying.
    pub fn first(&self, id: NodeId) -> NodeId {
        self.extreme(id, Direction::Left)
    }

    /// Largest-key node below `id`, without splaying.
    pub fn last(&self, id: NodeId) -> NodeId {
        self.extreme(id, Direction::Right)
    }

    /// In-order successor of `id` within its tree, walking parent links.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.node(id).right {
            return Some(self.first(right));
        }
        let mut child = id;
        while let Some(parent) = self.parent(child) {
            if self.node(parent).left == Some(child) {
                return Some(parent);
            }
            child = parent;
        }
        None
    }

    /// Checks ordering, aggregates, parent links and single ownership for the whole tree.
    pub fn is_consistent(&self, root: Option<NodeId>) -> bool {
        let Some(root) = root else {
            return true;
        };
        if self.parent(root).is_some() {
            warn!("root {root} has a parent");
            return false;
        }
        let mut seen = vec![false; self.nodes.len()];
        // (node, expected parent, exclusive lower bound, exclusive upper bound)
        let mut todo = vec![(root, None, None, None)];
        let mut consistent = true;
        while let Some((id, parent, lo, hi)) = todo.pop() {
            if seen[id] {
                warn!("node {id} is reachable twice");
                return false;
            }
            seen[id] = true;
            let node = self.node(id);
            if node.parent != parent {
                warn!(
                    "node {id} has parent {:?}, expected {parent:?}",
                    node.parent
                );
                consistent = false;
            }
            if lo.is_some_and(|lo: i64| node.key <= lo) || hi.is_some_and(|hi: i64| node.key >= hi)
            {
                warn!(
                    "node {id} with key {} violates ordering: lo={lo:?}, hi={hi:?}",
                    node.key
                );
                consistent = false;
            }
            let expected = self.aggregate(node.left) + node.key as i128 + self.aggregate(node.right);
            if node.aggregate != expected {
                warn!(
                    "node {id} has aggregate {}, expected {expected}",
                    node.aggregate
                );
                consistent = false;
            }
            if let Some(left) = node.left {
                todo.push((left, Some(id), lo, Some(node.key)));
            }
            if let Some(right) = node.right {
                todo.push((right, Some(id), Some(node.key), hi));
            }
        }
        consistent
    }
}
