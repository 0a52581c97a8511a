//! Address and network arithmetic.
//!
//! This module contains the value types the set is built from:
//! - [`Cidr`] - a canonical network block of either address family
//! - [`AddressFamily`] - 4-byte or 16-byte addresses
//! - [`CidrError`] - parse failures

mod address;
mod cidr;
mod error;

// Re-export public types
pub use address::{
    addr_to_bits, bits_to_addr, broadcast_addr, cut_addr, get_cidr_mask, increment_addr,
    parse_ip, zero_addr, AddressFamily, IPV4_LENGTH, IPV6_LENGTH,
};
pub use cidr::{Cidr, Expand, EXPAND_LIMIT};
pub use error::CidrError;
