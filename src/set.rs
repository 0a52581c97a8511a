//! Set of IP addresses stored as canonical CIDR blocks.
//!
//! [`IpSet`] wraps a [`RangeTree`] and speaks in addresses and networks. Set algebra always
//! builds a new set and leaves both operands untouched.

use crate::models::Cidr;
use crate::tree::{Iter, RangeTree, Violation};
use itertools::Itertools;
use num_bigint::BigUint;
use std::fmt;
use std::net::IpAddr;

/// Set of IPv4 and IPv6 addresses.
///
/// # Examples
/// ```
/// use cidr_set::{Cidr, IpSet};
///
/// let mut set = IpSet::new();
/// set.insert_net(Cidr::new("10.0.0.0/24").unwrap());
/// set.remove("10.0.0.1".parse().unwrap());
/// assert!(set.contains("10.0.0.2".parse().unwrap()));
/// assert_eq!(set.len(), 8);
/// ```
#[derive(Clone, Debug, Default)]
pub struct IpSet {
    tree: RangeTree,
}

impl IpSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single address.
    pub fn insert(&mut self, ip: IpAddr) {
        self.insert_net(Cidr::host(ip));
    }

    /// Add every address of `net`.
    pub fn insert_net(&mut self, net: Cidr) {
        self.tree.insert(net);
    }

    /// Remove a single address.
    pub fn remove(&mut self, ip: IpAddr) {
        self.remove_net(&Cidr::host(ip));
    }

    /// Remove every address of `net`, wherever it is stored.
    pub fn remove_net(&mut self, net: &Cidr) {
        self.tree.remove_net(net);
    }

    /// True if the set holds the address.
    pub fn contains(&self, ip: IpAddr) -> bool {
        self.contains_net(&Cidr::host(ip))
    }

    /// True if the set holds every address of `net`.
    pub fn contains_net(&self, net: &Cidr) -> bool {
        self.tree.contains(net)
    }

    /// Every address in either set, as a new set.
    pub fn union(&self, other: &IpSet) -> IpSet {
        let mut result = IpSet::new();
        result.extend(self.iter().copied());
        result.extend(other.iter().copied());
        log::debug!(
            "union of {} and {} blocks has {} blocks",
            self.len(),
            other.len(),
            result.len()
        );
        result
    }

    /// Addresses of this set that are not in `other`, as a new set.
    pub fn difference(&self, other: &IpSet) -> IpSet {
        let mut result = IpSet::new();
        result.extend(self.iter().copied());
        for net in other.iter() {
            result.remove_net(net);
        }
        log::debug!(
            "difference of {} and {} blocks has {} blocks",
            self.len(),
            other.len(),
            result.len()
        );
        result
    }

    /// Addresses in both sets, as a new set.
    ///
    /// In two canonical sets any overlap means one block holds the other, so keeping each
    /// block that the other set fully contains, from both sides, covers the whole overlap.
    pub fn intersection(&self, other: &IpSet) -> IpSet {
        let mut result = IpSet::new();
        for net in self.iter().filter(|net| other.contains_net(net)) {
            result.insert_net(*net);
        }
        for net in other.iter().filter(|net| self.contains_net(net)) {
            result.insert_net(*net);
        }
        log::debug!(
            "intersection of {} and {} blocks has {} blocks",
            self.len(),
            other.len(),
            result.len()
        );
        result
    }

    /// The first `limit` addresses of the set in ascending order. A `limit` of 0 means no
    /// limit, though no single block yields more than [`crate::models::EXPAND_LIMIT`].
    pub fn get_ips(&self, limit: usize) -> Vec<IpAddr> {
        let limit = if limit == 0 { usize::MAX } else { limit };
        let mut ips = Vec::new();
        for net in self.iter() {
            let remaining = limit - ips.len();
            if remaining == 0 {
                break;
            }
            ips.extend(net.expand(remaining));
        }
        ips
    }

    /// Stored blocks in CIDR notation, ascending.
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(|net| net.to_string()).collect()
    }

    /// Stored blocks, ascending.
    pub fn iter(&self) -> Iter<'_> {
        self.tree.iter()
    }

    /// Number of stored blocks, not addresses. See [`IpSet::size`].
    pub fn len(&self) -> usize {
        self.tree.num_nodes()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Number of addresses in the set.
    pub fn size(&self) -> BigUint {
        self.tree.size()
    }

    /// Broken invariants of the underlying tree; empty when the set is canonical.
    pub fn validate(&self) -> Vec<Violation> {
        self.tree.validate()
    }
}

impl PartialEq for IpSet {
    fn eq(&self, other: &IpSet) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for IpSet {}

impl Extend<Cidr> for IpSet {
    fn extend<T: IntoIterator<Item = Cidr>>(&mut self, iter: T) {
        for net in iter {
            self.insert_net(net);
        }
    }
}

impl FromIterator<Cidr> for IpSet {
    fn from_iter<T: IntoIterator<Item = Cidr>>(iter: T) -> Self {
        let mut set = IpSet::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a IpSet {
    type Item = &'a Cidr;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl fmt::Display for IpSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.iter().join(", "))
    }
}
