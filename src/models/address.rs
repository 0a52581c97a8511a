//! Address helpers shared by both address families.
//!
//! Addresses are plain [`IpAddr`] values. Arithmetic is done on the address widened to a
//! `u128`, so one set of functions covers 4-byte and 16-byte addresses alike.

use super::CidrError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Maximum length for an IPv4 prefix (32 bits).
pub const IPV4_LENGTH: u8 = 32;
/// Maximum length for an IPv6 prefix (128 bits).
pub const IPV6_LENGTH: u8 = 128;

/// Width of an address. A 4-byte address and a 16-byte address are never the same family,
/// even when the 16-byte one is an IPv4-mapped form of the other.
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Copy, Clone, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::V4,
            IpAddr::V6(_) => AddressFamily::V6,
        }
    }

    /// Number of bits in an address of this family.
    pub fn bits(self) -> u8 {
        match self {
            AddressFamily::V4 => IPV4_LENGTH,
            AddressFamily::V6 => IPV6_LENGTH,
        }
    }

    /// Number of bytes in an address of this family.
    pub fn bytes(self) -> usize {
        usize::from(self.bits() / 8)
    }
}

/// Widen an address to its numeric value.
pub fn addr_to_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

/// Build an address of `family` from a numeric value. Bits above the family width are dropped.
pub fn bits_to_addr(bits: u128, family: AddressFamily) -> IpAddr {
    match family {
        AddressFamily::V4 => IpAddr::V4(Ipv4Addr::from((bits & family_mask(family)) as u32)),
        AddressFamily::V6 => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

/// The all-zero address of a family (`0.0.0.0` or `::`).
pub fn zero_addr(family: AddressFamily) -> IpAddr {
    bits_to_addr(0, family)
}

/// Parse a single address.
///
/// Dotted IPv4 text gives a 4-byte address. Anything with colons gives a 16-byte address,
/// so `::ffff:10.0.0.1` stays IPv6 and is not equal to `10.0.0.1`.
pub fn parse_ip(text: &str) -> Result<IpAddr, CidrError> {
    let text = text.trim();
    text.parse().map_err(|_| CidrError::Malformed(text.to_string()))
}

/// All bits of the family set.
pub(crate) fn family_mask(family: AddressFamily) -> u128 {
    host_mask(0, family)
}

/// The bits past a prefix of `len`. `len` must not exceed the family width.
pub(crate) fn host_mask(len: u8, family: AddressFamily) -> u128 {
    let host_bits = family.bits() - len;
    if host_bits == IPV6_LENGTH {
        u128::MAX
    } else {
        (1u128 << host_bits) - 1
    }
}

/// Convert a prefix length to a network mask for `family`.
///
/// # Examples
/// ```
/// use cidr_set::models::{get_cidr_mask, AddressFamily};
/// assert_eq!(get_cidr_mask(24, AddressFamily::V4).unwrap(), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8, family: AddressFamily) -> Result<u128, CidrError> {
    let max = family.bits();
    if len > max {
        Err(CidrError::PrefixTooLong { len, max })
    } else {
        Ok(family_mask(family) ^ host_mask(len, family))
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: IpAddr, len: u8) -> Result<IpAddr, CidrError> {
    let family = AddressFamily::of(&addr);
    let mask = get_cidr_mask(len, family)?;
    Ok(bits_to_addr(addr_to_bits(addr) & mask, family))
}

/// Calculate the broadcast (last) address for a given IP and prefix length.
pub fn broadcast_addr(addr: IpAddr, len: u8) -> Result<IpAddr, CidrError> {
    let family = AddressFamily::of(&addr);
    let mask = get_cidr_mask(len, family)?;
    let network_bits = addr_to_bits(addr) & mask;
    Ok(bits_to_addr(network_bits | host_mask(len, family), family))
}

/// Returns the address plus one. The highest address wraps around to all-zero.
pub fn increment_addr(addr: IpAddr) -> IpAddr {
    let family = AddressFamily::of(&addr);
    bits_to_addr(addr_to_bits(addr).wrapping_add(1), family)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(text: &str) -> IpAddr {
        parse_ip(text).unwrap()
    }

    #[test]
    fn test_get_cidr_mask() {
        let v4 = AddressFamily::V4;
        assert_eq!(get_cidr_mask(0, v4).unwrap(), 0x00000000);
        assert_eq!(get_cidr_mask(8, v4).unwrap(), 0xFF000000);
        assert_eq!(get_cidr_mask(16, v4).unwrap(), 0xFFFF0000);
        assert_eq!(get_cidr_mask(32, v4).unwrap(), 0xFFFFFFFF);
        assert_eq!(
            get_cidr_mask(33, v4).unwrap_err(),
            CidrError::PrefixTooLong { len: 33, max: 32 }
        );

        let v6 = AddressFamily::V6;
        assert_eq!(get_cidr_mask(0, v6).unwrap(), 0);
        assert_eq!(get_cidr_mask(64, v6).unwrap(), u128::MAX << 64);
        assert_eq!(get_cidr_mask(128, v6).unwrap(), u128::MAX);
        assert!(get_cidr_mask(129, v6).is_err());
    }

    #[test]
    fn test_cut_addr() {
        let addr = ip("192.168.1.42");
        assert_eq!(cut_addr(addr, 24).unwrap(), ip("192.168.1.0"));
        assert_eq!(cut_addr(addr, 16).unwrap(), ip("192.168.0.0"));
        assert_eq!(cut_addr(addr, 8).unwrap(), ip("192.0.0.0"));
        assert_eq!(cut_addr(addr, 32).unwrap(), addr);
        assert!(cut_addr(addr, 33).is_err());

        assert_eq!(cut_addr(ip("10.1.66.3"), 18).unwrap(), ip("10.1.64.0"));
        assert_eq!(cut_addr(ip("2001:db8::"), 24).unwrap(), ip("2001:d00::"));
    }

    #[test]
    fn test_broadcast_addr() {
        assert_eq!(
            broadcast_addr(ip("203.0.113.0"), 24).unwrap(),
            ip("203.0.113.255")
        );
        assert_eq!(broadcast_addr(ip("10.0.0.0"), 16).unwrap(), ip("10.0.255.255"));
        assert_eq!(broadcast_addr(ip("10.1.66.3"), 18).unwrap(), ip("10.1.127.255"));
        assert_eq!(broadcast_addr(ip("192.168.1.0"), 32).unwrap(), ip("192.168.1.0"));
        assert_eq!(
            broadcast_addr(ip("2001:db8::"), 64).unwrap(),
            ip("2001:db8::ffff:ffff:ffff:ffff")
        );
        assert_eq!(
            broadcast_addr(ip("2001:db8::"), 24).unwrap(),
            ip("2001:dff:ffff:ffff:ffff:ffff:ffff:ffff")
        );
        assert_eq!(
            broadcast_addr(ip("::"), 0).unwrap(),
            ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")
        );
    }

    #[test]
    fn test_increment_addr() {
        assert_eq!(increment_addr(ip("10.0.0.255")), ip("10.0.1.0"));
        assert_eq!(increment_addr(ip("2001:db8::ffff")), ip("2001:db8::1:0"));
        // overflow wraps instead of failing
        assert_eq!(increment_addr(ip("255.255.255.255")), ip("0.0.0.0"));
        assert_eq!(
            increment_addr(ip("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")),
            ip("::")
        );
    }

    #[test]
    fn test_parse_ip_keeps_families_apart() {
        assert_eq!(ip("0.0.0.0"), zero_addr(AddressFamily::V4));
        assert_eq!(ip("::"), zero_addr(AddressFamily::V6));
        assert!(ip("10.0.0.1").is_ipv4());
        assert!(ip("::ffff:10.0.0.1").is_ipv6());
        assert_ne!(ip("10.0.0.1"), ip("::ffff:10.0.0.1"));
        assert_eq!(AddressFamily::of(&ip("::ffff:10.0.0.1")).bytes(), 16);
        assert_eq!(AddressFamily::of(&ip("10.0.0.1")).bytes(), 4);

        assert_eq!(
            parse_ip("10.0.324.0").unwrap_err(),
            CidrError::Malformed("10.0.324.0".to_string())
        );
    }
}
