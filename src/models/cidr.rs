//! CIDR network blocks for both address families.
//!
//! Provides [`Cidr`], a canonical network (host bits always zero), together with the range
//! arithmetic the set tree is built on: containment, halving, combining, difference and
//! address expansion.

use super::address::{addr_to_bits, bits_to_addr, cut_addr, host_mask, increment_addr, parse_ip};
use super::{AddressFamily, CidrError};
use num_bigint::BigUint;
use num_traits::One;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::net::IpAddr;
use std::str::FromStr;

/// Most addresses [`Cidr::expand`] will ever yield for one network.
pub const EXPAND_LIMIT: usize = 1 << 30;

/// Network address with a prefix length, e.g. `10.0.0.0/24` or `2001:db8::/64`.
///
/// The address never has bits set past the prefix. Ordering is by address, then prefix
/// length, with every IPv4 network before every IPv6 network.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub struct Cidr {
    addr: IpAddr,
    mask: u8,
}

impl Cidr {
    /// Create a new [`Cidr`] from a CIDR string (e.g. "10.0.0.0/24").
    ///
    /// Unlike most CIDR parsers this refuses a network whose host part is not zero, so
    /// `203.0.113.1/24` and `2001:db8::1/64` are errors rather than being truncated.
    pub fn new(addr_cidr: &str) -> Result<Cidr, CidrError> {
        let addr_cidr = addr_cidr.trim();
        let malformed = || CidrError::Malformed(addr_cidr.to_string());

        let (addr, mask) = addr_cidr.split_once('/').ok_or_else(malformed)?;
        let addr = parse_ip(addr).map_err(|_| malformed())?;
        if mask.is_empty() || !mask.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let mask: u8 = mask.parse().map_err(|_| malformed())?;

        Cidr::from_parts(addr, mask)
    }

    /// Build a network from an address and prefix length, rejecting non-zero host bits.
    pub fn from_parts(addr: IpAddr, mask: u8) -> Result<Cidr, CidrError> {
        let network = cut_addr(addr, mask)?;
        if network != addr {
            return Err(CidrError::NonZeroHost(format!("{addr}/{mask}")));
        }
        Ok(Cidr { addr, mask })
    }

    /// The single-host network (`/32` or `/128`) holding `addr`.
    pub fn host(addr: IpAddr) -> Cidr {
        Cidr {
            addr,
            mask: AddressFamily::of(&addr).bits(),
        }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    /// The prefix length.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.addr)
    }

    /// Number of bits past the prefix.
    pub fn host_bits(&self) -> u8 {
        self.family().bits() - self.mask
    }

    /// Number of addresses in the network, network and broadcast included.
    pub fn size(&self) -> BigUint {
        BigUint::one() << usize::from(self.host_bits())
    }

    /// Get the lowest (network) address in the subnet.
    pub fn network_addr(&self) -> IpAddr {
        self.addr
    }

    /// Get the highest (broadcast) address in the subnet.
    pub fn broadcast_addr(&self) -> IpAddr {
        bits_to_addr(self.hi(), self.family())
    }

    fn lo(&self) -> u128 {
        addr_to_bits(self.addr)
    }

    fn hi(&self) -> u128 {
        self.lo() | host_mask(self.mask, self.family())
    }

    /// Check if an IP address is contained within this subnet.
    pub fn contains(&self, ip: IpAddr) -> bool {
        if AddressFamily::of(&ip) != self.family() {
            return false;
        }
        let bits = addr_to_bits(ip);
        self.lo() <= bits && bits <= self.hi()
    }

    /// True if every address of `inner` is in this network, including when they are equal.
    /// Networks of different families never contain each other.
    pub fn contains_net(&self, inner: &Cidr) -> bool {
        self.family() == inner.family()
            && self.mask <= inner.mask
            && self.lo() <= inner.lo()
            && inner.hi() <= self.hi()
    }

    /// True if the two networks share at least one address.
    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.contains_net(other) || other.contains_net(self)
    }

    /// Where this network lies relative to `other`: `Less` when entirely before it,
    /// `Greater` when entirely after it and `Equal` when the two overlap.
    ///
    /// IPv4 networks are always before IPv6 networks.
    pub fn position(&self, other: &Cidr) -> Ordering {
        match self.family().cmp(&other.family()) {
            Ordering::Equal => {
                if self.hi() < other.lo() {
                    Ordering::Less
                } else if self.lo() > other.hi() {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            }
            by_family => by_family,
        }
    }

    /// Split the network into two equally sized halves. The first keeps the address, the
    /// second has the next bit set. A single-host network has no halves.
    pub fn divide_in_half(&self) -> Option<(Cidr, Cidr)> {
        if self.host_bits() == 0 {
            return None;
        }
        let family = self.family();
        let mask = self.mask + 1;
        let extra_one = 1u128 << (family.bits() - mask);

        let first = Cidr {
            addr: self.addr,
            mask,
        };
        let second = Cidr {
            addr: bits_to_addr(self.lo() | extra_one, family),
            mask,
        };
        Some((first, second))
    }

    /// If this network and `other` are the two halves of one network twice the size,
    /// returns that network.
    pub fn can_combine_with(&self, other: &Cidr) -> Option<Cidr> {
        if self == other || self.family() != other.family() || self.mask != other.mask {
            return None;
        }
        if self.mask == 0 {
            return None;
        }
        let mask = self.mask - 1;
        let parent = Cidr {
            addr: cut_addr(self.addr, mask).ok()?,
            mask,
        };
        parent.contains_net(other).then_some(parent)
    }

    /// Returns this network minus `other`.
    ///
    /// The result is ordered from the largest block to the smallest, *not* by address.
    pub fn difference(&self, other: &Cidr) -> Vec<Cidr> {
        if other.contains_net(self) {
            return Vec::new();
        }
        if !self.contains_net(other) {
            return vec![*self];
        }

        // self strictly contains other: keep the half without it, keep cutting the other half
        let mut result = Vec::new();
        let mut current = *self;
        while current != *other {
            let Some((first, second)) = current.divide_in_half() else {
                break;
            };
            if first.contains_net(other) {
                result.push(second);
                current = first;
            } else {
                result.push(first);
                current = second;
            }
        }
        result
    }

    /// Iterate over the addresses of the network in ascending order, at most `limit` of
    /// them and never more than [`EXPAND_LIMIT`].
    pub fn expand(&self, limit: usize) -> Expand {
        let host_bits = u32::from(self.host_bits());
        let cap = if host_bits < EXPAND_LIMIT.trailing_zeros() {
            1usize << host_bits
        } else {
            EXPAND_LIMIT
        };
        Expand {
            next: self.addr,
            remaining: limit.min(cap),
        }
    }
}

/// Ascending addresses of a network, see [`Cidr::expand`]. Clone it to walk the same
/// addresses again.
#[derive(Debug, Clone)]
pub struct Expand {
    next: IpAddr,
    remaining: usize,
}

impl Iterator for Expand {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.next = increment_addr(current);
        self.remaining -= 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Expand {}

impl FusedIterator for Expand {}

impl FromStr for Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cidr::new(s)
    }
}

impl From<IpAddr> for Cidr {
    fn from(addr: IpAddr) -> Self {
        Cidr::host(addr)
    }
}

impl Serialize for Cidr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D>(deserializer: D) -> Result<Cidr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cidr::new(&s).map_err(de::Error::custom)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.mask)
    }
}
