//! Ordered tree of disjoint network blocks.
//!
//! [`RangeTree`] is a binary search tree keyed on address position. Every node holds one
//! [`Cidr`]; the left subtree only holds networks entirely before it and the right subtree
//! only networks entirely after it. The tree keeps itself canonical:
//! - stored networks never overlap
//! - no two stored networks are halves of one bigger network (they are merged on insert)

mod node;
mod validate;

use crate::models::Cidr;
use num_bigint::BigUint;
use std::cmp::Ordering;

use self::node::{Node, NodeArena};
pub use self::node::NodeId;
pub use self::validate::Violation;

/// Canonical set of network blocks, see the [module docs](self).
///
/// The tree is not balanced. Merging keeps it small for contiguous allocations, and every
/// walk is iterative, so a degenerate shape costs time but not stack.
#[derive(Clone, Debug, Default)]
pub struct RangeTree {
    nodes: NodeArena,
    root: Option<NodeId>,
}

impl RangeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of stored network blocks.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of addresses covered by the tree.
    pub fn size(&self) -> BigUint {
        self.iter().map(Cidr::size).sum()
    }

    /// The network stored at `id`.
    pub fn net(&self, id: NodeId) -> &Cidr {
        &self.nodes[id].net
    }

    /// Make sure every address of `net` is in the tree.
    ///
    /// Networks covered by `net` are absorbed into it. Afterwards the new block is merged
    /// with its neighbours for as long as one of them is its other half.
    pub fn insert(&mut self, net: Cidr) {
        let mut candidate = net;
        loop {
            let Some(id) = self.place(candidate) else {
                return;
            };

            let merged = self
                .prev(id)
                .and_then(|prev| self.nodes[prev].net.can_combine_with(&candidate))
                .or_else(|| {
                    self.next(id)
                        .and_then(|next| candidate.can_combine_with(&self.nodes[next].net))
                });

            match merged {
                Some(parent) => {
                    log::trace!("merging {candidate} into {parent}");
                    candidate = parent;
                }
                None => return,
            }
        }
    }

    /// Make sure no address of `net` is in the tree, keeping every other address.
    pub fn remove_net(&mut self, net: &Cidr) {
        for id in self.overlapping(net) {
            let existing = self.delete(id);
            if net.contains_net(&existing) {
                log::trace!("removed {existing}");
                continue;
            }

            // existing strictly contains net, the pieces left over can't merge with anything
            let pieces = existing.difference(net);
            log::trace!(
                "split {existing} into {} blocks around {net}",
                pieces.len()
            );
            for piece in pieces {
                self.attach(piece);
            }
        }
    }

    /// True if one stored network holds every address of `net`.
    pub fn contains(&self, net: &Cidr) -> bool {
        self.find_containing(net).is_some()
    }

    /// Node with the lowest network.
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.leftmost(root))
    }

    /// Node with the highest network.
    pub fn last(&self) -> Option<NodeId> {
        self.root.map(|root| self.rightmost(root))
    }

    /// In-order successor of `id`.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.leftmost(right));
        }
        let mut child = id;
        let mut up = self.nodes[id].up;
        while let Some(parent) = up {
            if self.nodes[parent].left == Some(child) {
                return Some(parent);
            }
            child = parent;
            up = self.nodes[parent].up;
        }
        None
    }

    /// In-order predecessor of `id`.
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes[id].left {
            return Some(self.rightmost(left));
        }
        let mut child = id;
        let mut up = self.nodes[id].up;
        while let Some(parent) = up {
            if self.nodes[parent].right == Some(child) {
                return Some(parent);
            }
            child = parent;
            up = self.nodes[parent].up;
        }
        None
    }

    /// Stored networks in ascending order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            next: self.first(),
        }
    }

    /// Call `visit` on every stored network in ascending order.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&Cidr),
    {
        for net in self.iter() {
            visit(net);
        }
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    fn find_containing(&self, net: &Cidr) -> Option<NodeId> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            if node.net.contains_net(net) {
                return Some(id);
            }
            current = match net.position(&node.net) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                // net is bigger than the node, no single node can hold it
                Ordering::Equal => return None,
            };
        }
        None
    }

    /// Every node whose network shares an address with `net`.
    fn overlapping(&self, net: &Cidr) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut pending: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = pending.pop() {
            let node = &self.nodes[id];
            match net.position(&node.net) {
                Ordering::Less => pending.extend(node.left),
                Ordering::Greater => pending.extend(node.right),
                Ordering::Equal => {
                    found.push(id);
                    pending.extend(node.left);
                    pending.extend(node.right);
                }
            }
        }
        found
    }

    /// Store `net` unless a node already covers it. Nodes covered by `net` are dropped.
    fn place(&mut self, net: Cidr) -> Option<NodeId> {
        if self.find_containing(&net).is_some() {
            return None;
        }
        // nothing contains net, so whatever overlaps it lies inside it
        for id in self.overlapping(&net) {
            let absorbed = self.delete(id);
            log::trace!("{net} absorbs {absorbed}");
        }
        Some(self.attach(net))
    }

    /// Add `net` as a new leaf. `net` must not overlap any stored network.
    fn attach(&mut self, net: Cidr) -> NodeId {
        let mut parent = None;
        let mut go_left = false;
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id];
            let position = net.position(&node.net);
            debug_assert_ne!(position, Ordering::Equal, "{net} overlaps {}", node.net);
            parent = Some(id);
            go_left = position == Ordering::Less;
            current = if go_left { node.left } else { node.right };
        }

        let id = self.nodes.alloc(Node::leaf(net, parent));
        match parent {
            None => self.root = Some(id),
            Some(parent) if go_left => self.nodes[parent].left = Some(id),
            Some(parent) => self.nodes[parent].right = Some(id),
        }
        id
    }

    /// Unlink node `id` and return its network. Other node ids stay valid.
    fn delete(&mut self, id: NodeId) -> Cidr {
        let Node { left, right, .. } = self.nodes[id];
        match (left, right) {
            (None, _) => self.transplant(id, right),
            (_, None) => self.transplant(id, left),
            (Some(left), Some(right)) => {
                let successor = self.leftmost(right);
                if successor != right {
                    let successor_right = self.nodes[successor].right;
                    self.transplant(successor, successor_right);
                    self.nodes[successor].right = Some(right);
                    self.nodes[right].up = Some(successor);
                }
                self.transplant(id, Some(successor));
                self.nodes[successor].left = Some(left);
                self.nodes[left].up = Some(successor);
            }
        }
        self.nodes.release(id).net
    }

    /// Put `replacement` where `id` hangs in the tree.
    fn transplant(&mut self, id: NodeId, replacement: Option<NodeId>) {
        let up = self.nodes[id].up;
        match up {
            None => self.root = replacement,
            Some(parent) if self.nodes[parent].left == Some(id) => {
                self.nodes[parent].left = replacement
            }
            Some(parent) => self.nodes[parent].right = replacement,
        }
        if let Some(replacement) = replacement {
            self.nodes[replacement].up = up;
        }
    }
}

/// Ascending iterator over the networks of a [`RangeTree`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    tree: &'a RangeTree,
    next: Option<NodeId>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Cidr;

    fn next(&mut self) -> Option<&'a Cidr> {
        let id = self.next?;
        self.next = self.tree.next(id);
        Some(self.tree.net(id))
    }
}

impl<'a> IntoIterator for &'a RangeTree {
    type Item = &'a Cidr;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
