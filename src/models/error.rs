//! Errors raised while parsing addresses and networks.

/// Error returned when text or a raw prefix length can't be turned into a [`super::Cidr`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CidrError {
    /// The text is not an address or a CIDR network.
    #[error("invalid address or network: {0}")]
    Malformed(String),
    /// The prefix length is longer than the address family allows.
    #[error("network length {len} is too long, maximum is {max}")]
    PrefixTooLong { len: u8, max: u8 },
    /// The address has bits set past the prefix length, e.g. `10.0.20.0/20`.
    #[error("host part of {0} is not zero")]
    NonZeroHost(String),
}

impl CidrError {
    /// True for every error caused by unparsable input, as opposed to a non-canonical network.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, CidrError::NonZeroHost(_))
    }
}
