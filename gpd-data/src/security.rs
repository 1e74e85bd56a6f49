//! # Green Power security transform
//!
//! Frames secured with level 2 carry a 4 octet MIC over header and payload.
//! Level 3 also encrypts the command identifier and payload.
//!
//! ```text
//! Nonce, 13 octets
//! | Source 8 | Frame counter 4 | Control 1 |
//! ```

use byteorder::{ByteOrder, LittleEndian};

use gpd_crypto::{CryptoBackend, NONCE_SIZE};

use crate::common::address::{EXTENDED_ADDRESS_SIZE, SOURCE_IDENTIFIER_SIZE};
use crate::common::key::{Key, DEFAULT_LINK_KEY, KEY_SIZE};
use crate::device::{GpdAddress, SecurityLevel};
use crate::frame::{Direction, GpdfHeader, MAX_FRAME_SIZE, MIC_SIZE};
use crate::pack::PackFixed;
use crate::utils::{clear, ensure_space};
use crate::Error;

/// Nonce security control octet, frames sent by the device
pub const NONCE_CONTROL_FROM_DEVICE: u8 = 0x05;
/// Nonce security control octet, frames sent to the device
pub const NONCE_CONTROL_TO_DEVICE: u8 = 0xc5;

/// Build the CCM* nonce for a frame sent by or to `address`
pub fn nonce(address: &GpdAddress, frame_counter: u32, direction: Direction) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    match address {
        GpdAddress::SourceId(source) => {
            if direction == Direction::FromDevice {
                LittleEndian::write_u32(&mut nonce[0..4], *source);
            }
            LittleEndian::write_u32(&mut nonce[4..8], *source);
        }
        GpdAddress::Ieee { address, .. } => {
            LittleEndian::write_u64(&mut nonce[0..8], u64::from(*address));
        }
    }
    LittleEndian::write_u32(&mut nonce[8..12], frame_counter);
    nonce[12] = match direction {
        Direction::FromDevice => NONCE_CONTROL_FROM_DEVICE,
        Direction::ToDevice => NONCE_CONTROL_TO_DEVICE,
    };
    nonce
}

/// Additional data authenticated with a transported key
fn key_additional_data(address: &GpdAddress, data: &mut [u8; EXTENDED_ADDRESS_SIZE]) -> usize {
    match address {
        GpdAddress::SourceId(source) => {
            LittleEndian::write_u32(&mut data[..SOURCE_IDENTIFIER_SIZE], *source);
            SOURCE_IDENTIFIER_SIZE
        }
        GpdAddress::Ieee { address, .. } => {
            LittleEndian::write_u64(&mut data[..], u64::from(*address));
            EXTENDED_ADDRESS_SIZE
        }
    }
}

/// Applies the Green Power security transform using a crypto backend
pub struct CryptoProvider<Backend> {
    backend: Backend,
}

impl<Backend> CryptoProvider<Backend>
where
    Backend: CryptoBackend,
{
    /// Create a new provider using `backend`
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Secure a frame in place
    ///
    /// `length` covers header, command identifier and payload, the MIC is
    /// appended after it. Returns the new frame length.
    pub fn protect(
        &mut self,
        address: &GpdAddress,
        header: &GpdfHeader,
        header_length: usize,
        length: usize,
        key: &Key,
        frame: &mut [u8],
    ) -> Result<usize, Error> {
        let level = header.security_level();
        if level == SecurityLevel::None {
            return Ok(length);
        }
        let frame_counter = header.frame_counter.ok_or(Error::InvalidFrame)?;
        if header_length >= length || length > MAX_FRAME_SIZE {
            return Err(Error::InvalidFrame);
        }
        ensure_space(frame, length + MIC_SIZE)?;
        let nonce = nonce(address, frame_counter, header.direction());
        let mut mic = [0u8; MIC_SIZE];
        match level {
            SecurityLevel::Full => {
                self.backend.ccmstar_encrypt(
                    key.as_bytes(),
                    &nonce,
                    &[],
                    &mut mic,
                    &frame[..length],
                    &mut [],
                )?;
            }
            SecurityLevel::FullEncrypted => {
                let mut message = [0u8; MAX_FRAME_SIZE];
                let message_length = length - header_length;
                message[..message_length].copy_from_slice(&frame[header_length..length]);
                let (additional_data, output) = frame.split_at_mut(header_length);
                let result = self.backend.ccmstar_encrypt(
                    key.as_bytes(),
                    &nonce,
                    &message[..message_length],
                    &mut mic,
                    additional_data,
                    &mut output[..message_length],
                );
                clear(&mut message);
                result?;
            }
            SecurityLevel::Reduced => return Err(Error::UnsupportedSecurityLevel),
            SecurityLevel::None => (),
        }
        frame[length..length + MIC_SIZE].copy_from_slice(&mic);
        Ok(length + MIC_SIZE)
    }

    /// Verify, and for level 3 decrypt, a received frame in place
    ///
    /// `length` includes the MIC. Returns the length without the MIC.
    pub fn unprotect(
        &mut self,
        address: &GpdAddress,
        header: &GpdfHeader,
        header_length: usize,
        length: usize,
        key: &Key,
        frame: &mut [u8],
    ) -> Result<usize, Error> {
        let level = header.security_level();
        if level == SecurityLevel::None {
            return Ok(length);
        }
        let frame_counter = header.frame_counter.ok_or(Error::InvalidFrame)?;
        if length > frame.len() || length < header_length + 1 + MIC_SIZE {
            return Err(Error::InvalidFrame);
        }
        let payload_end = length - MIC_SIZE;
        let mut mic = [0u8; MIC_SIZE];
        mic.copy_from_slice(&frame[payload_end..length]);
        let nonce = nonce(address, frame_counter, header.direction());
        match level {
            SecurityLevel::Full => {
                self.backend.ccmstar_decrypt(
                    key.as_bytes(),
                    &nonce,
                    &[],
                    &mic,
                    &frame[..payload_end],
                    &mut [],
                )?;
            }
            SecurityLevel::FullEncrypted => {
                let mut message = [0u8; MAX_FRAME_SIZE];
                let message_length = payload_end - header_length;
                message[..message_length].copy_from_slice(&frame[header_length..payload_end]);
                let (additional_data, output) = frame.split_at_mut(header_length);
                let result = self.backend.ccmstar_decrypt(
                    key.as_bytes(),
                    &nonce,
                    &message[..message_length],
                    &mic,
                    additional_data,
                    &mut output[..message_length],
                );
                clear(&mut message);
                result?;
            }
            SecurityLevel::Reduced => return Err(Error::UnsupportedSecurityLevel),
            SecurityLevel::None => (),
        }
        Ok(payload_end)
    }

    /// Encrypt a key for transport with the default link key
    ///
    /// Returns the encrypted key and its MIC.
    pub fn encrypt_key(
        &mut self,
        address: &GpdAddress,
        direction: Direction,
        frame_counter: u32,
        key: &Key,
    ) -> Result<(Key, u32), Error> {
        let nonce = nonce(address, frame_counter, direction);
        let mut additional_data = [0u8; EXTENDED_ADDRESS_SIZE];
        let additional_length = key_additional_data(address, &mut additional_data);
        let mut output = [0u8; KEY_SIZE];
        let mut mic = [0u8; MIC_SIZE];
        self.backend.ccmstar_encrypt(
            DEFAULT_LINK_KEY.as_bytes(),
            &nonce,
            key.as_bytes(),
            &mut mic,
            &additional_data[..additional_length],
            &mut output,
        )?;
        Ok((Key::from(output), LittleEndian::read_u32(&mic)))
    }

    /// Decrypt a transported key, fails when the MIC does not match
    pub fn decrypt_key(
        &mut self,
        address: &GpdAddress,
        direction: Direction,
        frame_counter: u32,
        key: &Key,
        mic: u32,
    ) -> Result<Key, Error> {
        let nonce = nonce(address, frame_counter, direction);
        let mut additional_data = [0u8; EXTENDED_ADDRESS_SIZE];
        let additional_length = key_additional_data(address, &mut additional_data);
        let mut mic_data = [0u8; MIC_SIZE];
        LittleEndian::write_u32(&mut mic_data, mic);
        let mut output = [0u8; KEY_SIZE];
        self.backend.ccmstar_decrypt(
            DEFAULT_LINK_KEY.as_bytes(),
            &nonce,
            key.as_bytes(),
            &mic_data,
            &additional_data[..additional_length],
            &mut output,
        )?;
        let key = Key::unpack(&output)?;
        clear(&mut output);
        Ok(key)
    }
}
