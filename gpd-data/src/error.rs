//! # Error handling

use core::convert::From;

/// Errors
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    /// Not enough space for the operation
    NotEnoughSpace,
    /// Wrong number of bytes provided to the operation
    WrongNumberOfBytes,
    /// The value provided is invalid
    InvalidValue,
    /// A received frame is malformed or does not match the expected layout
    InvalidFrame,
    /// The security level is not supported
    UnsupportedSecurityLevel,
    /// There is no key for the operation
    NoKey,
    /// The attribute value is unsupported
    UnsupportedAttributeValue,
    /// A crypto error has occurred
    CryptoError(gpd_crypto::Error),
}

impl From<gpd_crypto::Error> for Error {
    fn from(error: gpd_crypto::Error) -> Self {
        Self::CryptoError(error)
    }
}
