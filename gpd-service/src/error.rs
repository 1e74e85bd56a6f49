use core::convert::From;

use crate::platform::PlatformError;

/// Errors
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    /// A received frame is malformed or truncated
    InvalidFrame,
    /// The message integrity code of a received frame did not match
    AuthenticationFailed,
    /// Application command attempted before commissioning
    NotCommissioned,
    /// The radio failed to switch channel or to send
    RadioError,
    /// The frame counter can not be advanced without reusing a value
    CounterExhausted,
    /// The channel schedule is inconsistent
    InvalidSchedule,
    /// The device configuration is inconsistent
    InvalidConfiguration,
    /// Persistent storage failed
    StorageError,
    /// The security level requires a key that is not installed
    NoKey,
    /// Frame encoding error
    DataError(gpd_data::Error),
    /// Crypto backend error
    CryptoError(gpd_crypto::Error),
}

impl From<gpd_data::Error> for Error {
    fn from(error: gpd_data::Error) -> Self {
        match error {
            gpd_data::Error::InvalidFrame | gpd_data::Error::WrongNumberOfBytes => {
                Self::InvalidFrame
            }
            gpd_data::Error::NoKey => Self::NoKey,
            gpd_data::Error::CryptoError(error) => Self::from(error),
            _ => Self::DataError(error),
        }
    }
}

impl From<gpd_crypto::Error> for Error {
    fn from(error: gpd_crypto::Error) -> Self {
        match error {
            gpd_crypto::Error::IntegrityCheckFailed => Self::AuthenticationFailed,
            _ => Self::CryptoError(error),
        }
    }
}

impl From<PlatformError> for Error {
    fn from(error: PlatformError) -> Self {
        match error {
            PlatformError::Radio => Self::RadioError,
            PlatformError::Storage => Self::StorageError,
        }
    }
}
