use std::ops::{Index, IndexMut};

use crate::models::Cidr;

/// Handle to a node of a [`super::RangeTree`]. Only meaningful for the tree that returned
/// it, and only until that node is removed or merged away.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct NodeId(usize);

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) net: Cidr,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    /// Parent link, only used to walk upwards.
    pub(crate) up: Option<NodeId>,
}

impl Node {
    pub(crate) fn leaf(net: Cidr, up: Option<NodeId>) -> Self {
        Self {
            net,
            left: None,
            right: None,
            up,
        }
    }
}

/// Node storage. Freed slots are reused by later allocations.
#[derive(Clone, Debug, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
}

impl NodeArena {
    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn release(&mut self, id: NodeId) -> Node {
        match self.slots[id.0].take() {
            Some(node) => {
                self.free.push(id.0);
                node
            }
            None => panic!("released node {} twice", id.0),
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match &self.slots[id.0] {
            Some(node) => node,
            None => panic!("node {} was already removed", id.0),
        }
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => panic!("node {} was already removed", id.0),
        }
    }
}
