#![no_std]
#![warn(missing_docs)]

//! Crypto backend trait used by the Green Power device core
//!
//! The Green Power security transform only needs CCM* with a 13 octet nonce
//! and a 128-bit key. Backends implement [`CryptoBackend`] and are handed to
//! the security manager by the application.

/// Length of the message length field (L) in octets, 15 - nonce length
pub const LENGTH_FIELD_LENGTH: usize = 2;
/// Cipher block length
pub const BLOCK_SIZE: usize = 16;
/// Key length, 128-bit keys are used
pub const KEY_SIZE: usize = 16;
/// CCM* nonce length
pub const NONCE_SIZE: usize = 13;

/// Crypto backend error codes
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Error {
    /// Operation is not implemented
    NotImplemented,
    /// The key has a invalid size
    InvalidKeySize,
    /// The data has a invalid size
    InvalidDataSize,
    /// The nonce has a invalid size
    InvalidNonceSize,
    /// The message integrity code (MIC) has invalid size
    InvalidIntegrityCodeSize,
    /// The message integrity code (MIC) check failed
    IntegrityCheckFailed,
    /// Generic backend error
    BackendError,
    /// Other error, probably a error code from the backend
    Other(u32),
}

/// Trait for implementing a crypto backend
pub trait CryptoBackend {
    /// Encrypt using CCM*
    ///
    /// Writes the encrypted message into `message_output` and the integrity
    /// code into `mic`, the length of `mic` selects the MIC length. Returns
    /// the number of octets written to `message_output`.
    fn ccmstar_encrypt(
        &mut self,
        key: &[u8],
        nonce: &[u8],
        message: &[u8],
        mic: &mut [u8],
        additional_data: &[u8],
        message_output: &mut [u8],
    ) -> Result<usize, Error>;

    /// Decrypt using CCM*
    ///
    /// Fails with [`Error::IntegrityCheckFailed`] when `mic` does not
    /// authenticate the message and additional data.
    fn ccmstar_decrypt(
        &mut self,
        key: &[u8],
        nonce: &[u8],
        message: &[u8],
        mic: &[u8],
        additional_data: &[u8],
        message_output: &mut [u8],
    ) -> Result<usize, Error>;
}
