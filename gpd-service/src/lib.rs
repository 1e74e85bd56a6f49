//! # gpd-service
//!
//! Control core of a Zigbee Green Power device: commissioning, command
//! transmission and the receive window of bidirectional devices.
//!
//! The board is reached through the [`Platform`] trait, cryptography through
//! a [`CryptoBackend`].

#![cfg_attr(not(any(test, feature = "config")), no_std)]

use gpd_crypto::CryptoBackend;

use gpd_data::{
    command::CommandIdentifier,
    device::{DeviceConfig, SecurityLevel},
    frame::{self, GpdfHeader, MAX_FRAME_SIZE},
    pack::Pack,
    Key,
};

mod button;
pub mod cluster_library;
mod commissioning;
#[cfg(feature = "config")]
pub mod config;
mod dispatch;
mod error;
pub mod platform;
mod receive;
mod schedule;
mod security;
#[cfg(test)]
mod testing;

pub use button::ButtonMask;
pub use cluster_library::{AttributeStore, ClusterAttributes};
pub use commissioning::{CommissioningMode, CommissioningState, PowerMode};
#[cfg(feature = "config")]
pub use config::Configuration;
pub use dispatch::Command;
pub use error::Error;
pub use platform::{CommissioningRecord, Platform, PlatformError};
pub use receive::ReceivedCommand;
pub use schedule::{transmit, transmit_on_channel, ChannelGroup, TxSchedule, MAX_CHANNELS};
pub use security::SecurityManager;

use commissioning::Phase;

/// Default receive window in milliseconds
pub const DEFAULT_RX_TIMEOUT: u32 = 5;

/// Where a frame is sent
#[derive(Clone, Copy, Debug, PartialEq)]
enum Target {
    /// Active channel group of the schedule
    Schedule,
    /// Single channel, repeated per the schedule
    Channel(u8),
}

/// Green Power device
pub struct GpdContext<P, CB> {
    platform: P,
    security: SecurityManager<CB>,
    config: DeviceConfig,
    schedule: TxSchedule,
    group: ChannelGroup,
    state: CommissioningState,
    mode: CommissioningMode,
    power_mode: PowerMode,
    phase: Phase,
    probe: usize,
    operational_channel: Option<u8>,
    pan_id: Option<u16>,
    rx_timeout: u32,
    buffer: [u8; MAX_FRAME_SIZE],
}

impl<P, CB> GpdContext<P, CB>
where
    P: Platform,
    CB: CryptoBackend,
{
    /// Set up an uncommissioned device
    ///
    /// Devices with RX capability use bidirectional commissioning. `key` is
    /// the pre-installed device key, if any. The frame counter resumes from
    /// the value stored by the platform.
    pub fn new(
        platform: P,
        crypto_backend: CB,
        key: Option<Key>,
        config: DeviceConfig,
        schedule: TxSchedule,
    ) -> Result<Self, Error> {
        if let Err(error) = config.validate() {
            log::error!("Invalid device configuration, {:?}", error);
            return Err(Error::InvalidConfiguration);
        }
        let mut platform = platform;
        let mut security = SecurityManager::new(
            crypto_backend,
            key,
            config.security_level(),
            config.extended_options.key_type,
        );
        security.restore_counter(&mut platform);
        let mode = if config.options.rx_on_capability {
            CommissioningMode::Bidirectional
        } else {
            CommissioningMode::Unidirectional
        };
        Ok(Self {
            platform,
            security,
            config,
            schedule,
            group: ChannelGroup::new(),
            state: CommissioningState::Uncommissioned,
            mode,
            power_mode: PowerMode::Battery,
            phase: Phase::ChannelRequest,
            probe: 0,
            operational_channel: None,
            pan_id: None,
            rx_timeout: DEFAULT_RX_TIMEOUT,
            buffer: [0u8; MAX_FRAME_SIZE],
        })
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn schedule(&self) -> &TxSchedule {
        &self.schedule
    }

    /// Active channel group
    pub fn channel_group(&self) -> ChannelGroup {
        self.group
    }

    pub fn state(&self) -> CommissioningState {
        self.state
    }

    pub fn mode(&self) -> CommissioningMode {
        self.mode
    }

    /// Operational channel learned during bidirectional commissioning
    pub fn operational_channel(&self) -> Option<u8> {
        self.operational_channel
    }

    /// PAN identifier handed out by the sink
    pub fn pan_id(&self) -> Option<u16> {
        self.pan_id
    }

    pub fn security_level(&self) -> SecurityLevel {
        self.security.security_level()
    }

    /// Frame counter the next frame will carry
    pub fn frame_counter(&self) -> u32 {
        self.security.frame_counter()
    }

    pub fn rx_timeout(&self) -> u32 {
        self.rx_timeout
    }

    /// Receive window used while commissioning, in milliseconds
    pub fn set_rx_timeout(&mut self, timeout_ms: u32) {
        self.rx_timeout = timeout_ms;
    }

    /// Build, secure and transmit a data frame
    fn send_frame(
        &mut self,
        command: CommandIdentifier,
        payload: &[u8],
        security_level: SecurityLevel,
        rx_after_tx: bool,
        target: Target,
    ) -> Result<(), Error> {
        let frame_counter = self.security.next_frame_counter(&mut self.platform)?;
        let header =
            GpdfHeader::for_device(&self.config, security_level, frame_counter, rx_after_tx);
        let (header_length, length) = frame::build(&header, command, payload, &mut self.buffer)?;
        let length = self.security.protect(
            &self.config.address,
            &header,
            header_length,
            length,
            &mut self.buffer,
        )?;
        self.transmit_buffer(command, length, target)
    }

    /// Build and transmit a maintenance frame
    fn send_maintenance(
        &mut self,
        command: CommandIdentifier,
        payload: &[u8],
        target: Target,
    ) -> Result<(), Error> {
        let header = GpdfHeader::maintenance();
        let (_, length) = frame::build(&header, command, payload, &mut self.buffer)?;
        self.transmit_buffer(command, length, target)
    }

    fn transmit_buffer(
        &mut self,
        command: CommandIdentifier,
        length: usize,
        target: Target,
    ) -> Result<(), Error> {
        let frame = &self.buffer[..length];
        let result = match target {
            Target::Schedule => transmit(&mut self.platform, &self.schedule, &self.group, frame),
            Target::Channel(channel) => transmit_on_channel(
                &mut self.platform,
                channel,
                self.schedule.repetitions(),
                frame,
            ),
        };
        match result {
            Ok(()) => {
                log::info!("< {:?}, {} octets", command, length);
                Ok(())
            }
            Err(error) => {
                log::error!("< Failed to send {:?}, {:?}", command, error);
                Err(error)
            }
        }
    }

    /// Pack a payload into a scratch buffer and send it as a data frame
    fn send_packed<T, E>(
        &mut self,
        command: CommandIdentifier,
        payload: &T,
        security_level: SecurityLevel,
        rx_after_tx: bool,
        target: Target,
    ) -> Result<(), Error>
    where
        T: Pack<T, E>,
        Error: From<E>,
    {
        let mut data = [0u8; MAX_FRAME_SIZE];
        let used = payload.pack(&mut data)?;
        self.send_frame(command, &data[..used], security_level, rx_after_tx, target)
    }
}
