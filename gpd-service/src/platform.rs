//! Services the device core needs from the board
//!
//! The radio driver, the timer used for receive windows and non-volatile
//! storage are reached through [`Platform`]. Every call is blocking.

use gpd_data::device::{KeyType, SecurityLevel};
use gpd_data::Key;

/// Platform failure
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlatformError {
    /// The radio failed
    Radio,
    /// Non-volatile storage failed
    Storage,
}

/// Commissioning outcome of a bidirectional device, kept across power cycles
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CommissioningRecord {
    /// Operational channel
    pub channel: u8,
    /// PAN identifier handed out by the sink
    pub pan_id: Option<u16>,
    /// Security level in use
    pub security_level: SecurityLevel,
    /// Type of the key in use
    pub key_type: KeyType,
    /// Key in use
    pub key: Option<Key>,
}

/// Board support for the device core
pub trait Platform {
    /// Switch the radio to `channel`
    fn set_channel(&mut self, channel: u8) -> Result<(), PlatformError>;

    /// Send `data` once on `channel`
    fn send(&mut self, channel: u8, data: &[u8]) -> Result<(), PlatformError>;

    /// Receive one frame into `buffer`, waiting at most `timeout_ms`
    ///
    /// Returns the frame length, or `None` when nothing arrived.
    fn receive(&mut self, timeout_ms: u32, buffer: &mut [u8]) -> Option<usize>;

    /// Store the next frame counter to use
    fn persist_counter(&mut self, counter: u32) -> Result<(), PlatformError>;

    /// Load the stored frame counter
    fn load_counter(&mut self) -> Option<u32>;

    /// Store, or with `None` erase, the commissioning record
    fn persist_commissioning(
        &mut self,
        _record: Option<&CommissioningRecord>,
    ) -> Result<(), PlatformError> {
        Ok(())
    }

    /// Load the commissioning record
    fn load_commissioning(&mut self) -> Option<CommissioningRecord> {
        None
    }
}
