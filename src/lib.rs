//! Sets of IPv4 and IPv6 addresses kept as the smallest list of disjoint CIDR blocks.
//!
//! - [`models`] - address and network arithmetic
//! - [`tree`] - the ordered block tree that keeps the set canonical
//! - [`set`] - the address set API
//! - [`input`] - CIDR list files
//! - [`config`] - binary settings and logging

pub mod config;
pub mod input;
pub mod models;
pub mod set;
pub mod tree;

pub use models::{Cidr, CidrError};
pub use set::IpSet;
