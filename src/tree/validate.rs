//! Self-check of the tree invariants, for tests and debugging.

use itertools::Itertools;
use std::cmp::Ordering;

use super::{NodeId, RangeTree};
use crate::models::Cidr;

/// A broken invariant found by [`RangeTree::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    #[error("root {0} has a parent link")]
    RootHasParent(Cidr),
    #[error("{child} hangs under {parent} but links to another parent")]
    BrokenParentLink { parent: Cidr, child: Cidr },
    #[error("{first} and {second} overlap")]
    Overlap { first: Cidr, second: Cidr },
    #[error("{second} comes after {first} in the tree but is not after it")]
    OutOfOrder { first: Cidr, second: Cidr },
    #[error("{first} and {second} should have been merged into {merged}")]
    Combinable {
        first: Cidr,
        second: Cidr,
        merged: Cidr,
    },
    #[error("{reachable} nodes reachable from the root but {stored} stored")]
    NodeCount { reachable: usize, stored: usize },
}

impl RangeTree {
    /// Walk the whole tree and report every broken invariant. An empty list means the tree
    /// is canonical.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        if let Some(root) = self.root {
            if self.nodes[root].up.is_some() {
                violations.push(Violation::RootHasParent(self.nodes[root].net));
            }
        }

        let in_order = self.in_order_by_links(&mut violations);
        if in_order.len() != self.nodes.len() {
            violations.push(Violation::NodeCount {
                reachable: in_order.len(),
                stored: self.nodes.len(),
            });
        }

        for (first, second) in in_order.iter().map(|&id| self.nodes[id].net).tuple_windows() {
            match first.position(&second) {
                Ordering::Less => {}
                Ordering::Equal => violations.push(Violation::Overlap { first, second }),
                Ordering::Greater => violations.push(Violation::OutOfOrder { first, second }),
            }
            if let Some(merged) = first.can_combine_with(&second) {
                violations.push(Violation::Combinable {
                    first,
                    second,
                    merged,
                });
            }
        }

        violations
    }

    /// In-order node list following child links only, checking parent links on the way.
    /// Stops early when it meets more nodes than are stored, which means the links form a cycle.
    fn in_order_by_links(&self, violations: &mut Vec<Violation>) -> Vec<NodeId> {
        let mut in_order = Vec::new();
        let mut pending: Vec<NodeId> = Vec::new();
        let mut pushed = 0;
        let mut current = self.root;

        while current.is_some() || !pending.is_empty() {
            while let Some(id) = current {
                pushed += 1;
                if pushed > self.nodes.len() {
                    return in_order;
                }
                pending.push(id);
                current = self.nodes[id].left;
            }
            let Some(id) = pending.pop() else {
                break;
            };
            in_order.push(id);

            let node = &self.nodes[id];
            for child in [node.left, node.right].into_iter().flatten() {
                if self.nodes[child].up != Some(id) {
                    violations.push(Violation::BrokenParentLink {
                        parent: node.net,
                        child: self.nodes[child].net,
                    });
                }
            }
            current = node.right;
        }

        in_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidr(text: &str) -> Cidr {
        Cidr::new(text).unwrap()
    }

    #[test]
    fn test_canonical_tree_is_valid() {
        let mut tree = RangeTree::new();
        for net in ["10.0.0.0/24", "10.0.2.0/24", "192.168.0.0/16", "2001:db8::/32"] {
            tree.insert(cidr(net));
        }
        assert!(tree.validate().is_empty());
    }

    #[test]
    fn test_reports_combinable_neighbours() {
        let mut tree = RangeTree::new();
        tree.insert(cidr("10.0.0.0/25"));
        tree.attach(cidr("10.0.0.128/25"));
        assert_eq!(
            tree.validate(),
            vec![Violation::Combinable {
                first: cidr("10.0.0.0/25"),
                second: cidr("10.0.0.128/25"),
                merged: cidr("10.0.0.0/24"),
            }]
        );
    }

    #[test]
    fn test_reports_overlap() {
        let mut tree = RangeTree::new();
        tree.insert(cidr("10.0.0.0/24"));
        let id = tree.attach(cidr("10.0.1.0/24"));
        tree.nodes[id].net = cidr("10.0.0.0/23");
        let violations = tree.validate();
        assert!(violations.contains(&Violation::Overlap {
            first: cidr("10.0.0.0/24"),
            second: cidr("10.0.0.0/23"),
        }));
    }

    #[test]
    fn test_reports_out_of_order() {
        let mut tree = RangeTree::new();
        tree.insert(cidr("10.0.0.0/24"));
        let id = tree.attach(cidr("10.0.5.0/24"));
        tree.nodes[id].net = cidr("9.0.0.0/24");
        assert_eq!(
            tree.validate(),
            vec![Violation::OutOfOrder {
                first: cidr("10.0.0.0/24"),
                second: cidr("9.0.0.0/24"),
            }]
        );
    }

    #[test]
    fn test_reports_broken_links() {
        let mut tree = RangeTree::new();
        tree.insert(cidr("10.0.0.0/24"));
        let child = tree.attach(cidr("10.0.5.0/24"));
        tree.nodes[child].up = None;
        let root = tree.root.unwrap();
        tree.nodes[root].up = Some(child);

        let violations = tree.validate();
        assert!(violations.contains(&Violation::RootHasParent(cidr("10.0.0.0/24"))));
        assert!(violations.contains(&Violation::BrokenParentLink {
            parent: cidr("10.0.0.0/24"),
            child: cidr("10.0.5.0/24"),
        }));
        assert_eq!(
            violations[0].to_string(),
            "root 10.0.0.0/24 has a parent link"
        );
    }

    #[test]
    fn test_reports_unreachable_nodes() {
        let mut tree = RangeTree::new();
        tree.insert(cidr("10.0.0.0/24"));
        let child = tree.attach(cidr("10.0.5.0/24"));
        let root = tree.root.unwrap();
        tree.nodes[root].right = None;
        tree.nodes[child].up = None;
        assert_eq!(
            tree.validate(),
            vec![Violation::NodeCount {
                reachable: 1,
                stored: 2,
            }]
        );
    }
}
