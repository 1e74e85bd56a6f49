#![no_std]

//! CCM* backend built on the RustCrypto `aes` and `ccm` crates

use gpd_crypto::{CryptoBackend, Error, KEY_SIZE, NONCE_SIZE};

use aes::Aes128;
use ccm::{
    aead::{generic_array::GenericArray, AeadInPlace, KeyInit},
    consts::{U13, U16, U4, U8},
    Ccm,
};

type AesCcmMic4 = Ccm<Aes128, U4, U13>;
type AesCcmMic8 = Ccm<Aes128, U8, U13>;
type AesCcmMic16 = Ccm<Aes128, U16, U13>;

/// Software CCM* backend
#[derive(Default)]
pub struct RustCryptoBackend;

fn check_sizes(key: &[u8], nonce: &[u8], message: &[u8], output: &[u8]) -> Result<(), Error> {
    if key.len() != KEY_SIZE {
        return Err(Error::InvalidKeySize);
    }
    if nonce.len() != NONCE_SIZE {
        return Err(Error::InvalidNonceSize);
    }
    if output.len() < message.len() {
        return Err(Error::InvalidDataSize);
    }
    Ok(())
}

macro_rules! encrypt_with {
    ($cipher:ty, $key:expr, $nonce:expr, $aad:expr, $buffer:expr, $mic:expr) => {{
        let cipher = <$cipher>::new($key);
        let tag = cipher
            .encrypt_in_place_detached($nonce, $aad, $buffer)
            .map_err(|_| Error::BackendError)?;
        $mic.copy_from_slice(tag.as_slice());
    }};
}

macro_rules! decrypt_with {
    ($cipher:ty, $key:expr, $nonce:expr, $aad:expr, $buffer:expr, $mic:expr) => {{
        let cipher = <$cipher>::new($key);
        cipher
            .decrypt_in_place_detached($nonce, $aad, $buffer, GenericArray::from_slice($mic))
            .map_err(|_| Error::IntegrityCheckFailed)?;
    }};
}

impl CryptoBackend for RustCryptoBackend {
    fn ccmstar_encrypt(
        &mut self,
        key: &[u8],
        nonce: &[u8],
        message: &[u8],
        mic: &mut [u8],
        additional_data: &[u8],
        message_output: &mut [u8],
    ) -> Result<usize, Error> {
        check_sizes(key, nonce, message, message_output)?;
        let key: &GenericArray<u8, U16> = GenericArray::from_slice(key);
        let nonce: &GenericArray<u8, U13> = GenericArray::from_slice(nonce);
        let length = message.len();
        let buffer = &mut message_output[..length];
        buffer.copy_from_slice(message);
        match mic.len() {
            4 => encrypt_with!(AesCcmMic4, key, nonce, additional_data, buffer, mic),
            8 => encrypt_with!(AesCcmMic8, key, nonce, additional_data, buffer, mic),
            16 => encrypt_with!(AesCcmMic16, key, nonce, additional_data, buffer, mic),
            0 => return Err(Error::NotImplemented),
            _ => return Err(Error::InvalidIntegrityCodeSize),
        }
        Ok(length)
    }

    fn ccmstar_decrypt(
        &mut self,
        key: &[u8],
        nonce: &[u8],
        message: &[u8],
        mic: &[u8],
        additional_data: &[u8],
        message_output: &mut [u8],
    ) -> Result<usize, Error> {
        check_sizes(key, nonce, message, message_output)?;
        let key: &GenericArray<u8, U16> = GenericArray::from_slice(key);
        let nonce: &GenericArray<u8, U13> = GenericArray::from_slice(nonce);
        let length = message.len();
        let buffer = &mut message_output[..length];
        buffer.copy_from_slice(message);
        match mic.len() {
            4 => decrypt_with!(AesCcmMic4, key, nonce, additional_data, buffer, mic),
            8 => decrypt_with!(AesCcmMic8, key, nonce, additional_data, buffer, mic),
            16 => decrypt_with!(AesCcmMic16, key, nonce, additional_data, buffer, mic),
            0 => return Err(Error::NotImplemented),
            _ => return Err(Error::InvalidIntegrityCodeSize),
        }
        Ok(length)
    }
}
