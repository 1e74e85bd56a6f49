//! # Commissioning
//!
//! Unidirectional devices announce themselves with commissioning GPDFs and
//! consider themselves commissioned once an application command is sent.
//!
//! Bidirectional devices run three phases, one per call to `step`:
//!
//! 1. Channel request, find the operational channel of a sink
//! 2. Commissioning, exchange the commissioning GPDF and reply
//! 3. Success, confirm using the new security settings

use heapless::Vec;

use gpd_crypto::CryptoBackend;
use gpd_data::{
    command::CommandIdentifier,
    commands::{ChannelConfiguration, ChannelRequest, Commissioning, CommissioningReply},
    device::SecurityLevel,
    pack::Pack,
};

use crate::platform::CommissioningRecord;
use crate::schedule::MAX_CHANNELS;
use crate::{Error, GpdContext, Platform, Target};

/// Commissioning state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommissioningState {
    /// Not commissioned
    Uncommissioned,
    /// Commissioning has started
    CommissioningInProgress,
    /// Commissioned, application commands can be sent
    Commissioned,
    /// Waiting for a sink to accept decommissioning
    Decommissioning,
}

/// Commissioning mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommissioningMode {
    /// The device never receives
    Unidirectional,
    /// The device receives after transmitting
    Bidirectional,
}

/// Channel probing heuristic of bidirectional commissioning
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerMode {
    /// Probe a whole channel group per step
    Battery,
    /// Probe a single channel per step
    Batteryless,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    ChannelRequest,
    Commissioning,
    Success,
}

impl<P, CB> GpdContext<P, CB>
where
    P: Platform,
    CB: CryptoBackend,
{
    pub fn is_commissioned(&self) -> bool {
        self.state == CommissioningState::Commissioned
    }

    /// Probe channel groups while searching for a sink
    pub fn battery_mode(&mut self) {
        self.power_mode = PowerMode::Battery;
    }

    /// Probe single channels while searching for a sink
    pub fn batteryless_mode(&mut self) {
        self.power_mode = PowerMode::Batteryless;
    }

    pub fn power_mode(&self) -> PowerMode {
        self.power_mode
    }

    /// Perform one commissioning step
    ///
    /// Call repeatedly until `is_commissioned` returns true. Errors other than
    /// authentication failures are returned without changing the state.
    pub fn step(&mut self) -> Result<(), Error> {
        match self.mode {
            CommissioningMode::Unidirectional => self.unidirectional_step(),
            CommissioningMode::Bidirectional => self.bidirectional_step(),
        }
    }

    /// Decommission the device
    ///
    /// A unidirectional device is always reset, the send result is still
    /// returned. A bidirectional device is only reset when a sink answers
    /// within the receive window with a frame secured at the active level,
    /// `Ok(false)` means it stays commissioned.
    pub fn decommission(&mut self) -> Result<bool, Error> {
        let security_level = self.security.security_level();
        match self.mode {
            CommissioningMode::Unidirectional => {
                let result = self.send_frame(
                    CommandIdentifier::Decommissioning,
                    &[],
                    security_level,
                    false,
                    Target::Schedule,
                );
                self.state = CommissioningState::Uncommissioned;
                result.map(|_| true)
            }
            CommissioningMode::Bidirectional => {
                if self.state != CommissioningState::Commissioned {
                    return Err(Error::NotCommissioned);
                }
                let channel = self.operational_channel.ok_or(Error::NotCommissioned)?;
                self.state = CommissioningState::Decommissioning;
                if let Err(error) = self.send_frame(
                    CommandIdentifier::Decommissioning,
                    &[],
                    security_level,
                    true,
                    Target::Channel(channel),
                ) {
                    self.state = CommissioningState::Commissioned;
                    return Err(error);
                }
                let accepted = match self.wait_rx(self.rx_timeout) {
                    Ok(Some(received))
                        if !security_level.is_secured() || received.frame_counter.is_some() =>
                    {
                        log::info!("> Decommissioning accepted, {:?}", received.command);
                        true
                    }
                    Ok(Some(received)) => {
                        log::warn!("> Unsecured {:?} ignored", received.command);
                        false
                    }
                    Ok(None) => false,
                    Err(error) => {
                        log::warn!("> Decommissioning reply rejected, {:?}", error);
                        false
                    }
                };
                if !accepted {
                    log::warn!("Decommissioning not accepted");
                    self.state = CommissioningState::Commissioned;
                    return Ok(false);
                }
                self.state = CommissioningState::Uncommissioned;
                self.phase = Phase::ChannelRequest;
                self.operational_channel = None;
                self.pan_id = None;
                self.security.install(
                    None,
                    self.config.security_level(),
                    self.config.extended_options.key_type,
                );
                self.platform.persist_commissioning(None)?;
                Ok(true)
            }
        }
    }

    /// Resume a bidirectional device from its stored commissioning record
    ///
    /// Returns true when the device is commissioned afterwards.
    pub fn bidirectional_operational_init(&mut self) -> bool {
        if self.mode != CommissioningMode::Bidirectional {
            return false;
        }
        match self.platform.load_commissioning() {
            Some(record) => {
                log::info!("Resuming on channel {}", record.channel);
                self.security
                    .install(record.key, record.security_level, record.key_type);
                self.operational_channel = Some(record.channel);
                self.pan_id = record.pan_id;
                self.state = CommissioningState::Commissioned;
                true
            }
            None => false,
        }
    }

    fn send_commissioning(&mut self, rx_after_tx: bool, target: Target) -> Result<(), Error> {
        // The frame is stamped with the counter handed out next
        let frame_counter = self.security.frame_counter();
        let extended = self.config.extended_options;
        let (key, key_mic) = match (extended.key_present, extended.key_encryption) {
            (true, true) => {
                let (key, mic) = self
                    .security
                    .encrypt_key(&self.config.address, frame_counter)?;
                (Some(key), Some(mic))
            }
            (true, false) => (Some(self.security.key().ok_or(Error::NoKey)?), None),
            (false, _) => (None, None),
        };
        let commissioning = Commissioning::from_config(&self.config, key, key_mic, frame_counter);
        self.send_packed(
            CommandIdentifier::Commissioning,
            &commissioning,
            SecurityLevel::None,
            rx_after_tx,
            target,
        )
    }

    fn unidirectional_step(&mut self) -> Result<(), Error> {
        if self.state == CommissioningState::Commissioned {
            return Ok(());
        }
        self.send_commissioning(false, Target::Schedule)?;
        self.group.advance(&self.schedule);
        self.state = CommissioningState::CommissioningInProgress;
        Ok(())
    }

    fn bidirectional_step(&mut self) -> Result<(), Error> {
        match self.state {
            CommissioningState::Commissioned => return Ok(()),
            CommissioningState::Uncommissioned => self.phase = Phase::ChannelRequest,
            _ => (),
        }
        let result = match self.phase {
            Phase::ChannelRequest => self.channel_request_phase(),
            Phase::Commissioning => self.commissioning_phase(),
            Phase::Success => self.success_phase(),
        };
        let completed = matches!(result, Ok(()) | Err(Error::AuthenticationFailed));
        if completed && self.state == CommissioningState::Uncommissioned {
            self.state = CommissioningState::CommissioningInProgress;
        }
        result
    }

    /// Send a channel request on `channel` and listen for the configuration
    fn probe_channel(&mut self, channel: u8) -> Result<bool, Error> {
        let request = ChannelRequest {
            next_channel: channel,
            second_next_channel: channel,
        };
        let mut data = [0u8; 1];
        let used = request.pack(&mut data)?;
        self.send_maintenance(
            CommandIdentifier::ChannelRequest,
            &data[..used],
            Target::Channel(channel),
        )?;
        match self.wait_rx(self.rx_timeout) {
            Ok(Some(received)) if received.command == CommandIdentifier::ChannelConfiguration => {
                let (configuration, _) = ChannelConfiguration::unpack(&received.payload)?;
                log::info!(
                    "> Channel configuration, operational channel {}",
                    configuration.operational_channel
                );
                self.operational_channel = Some(configuration.operational_channel);
                self.phase = Phase::Commissioning;
                Ok(true)
            }
            Ok(Some(received)) => {
                log::warn!("> Unexpected {:?} on channel {}", received.command, channel);
                Ok(false)
            }
            Ok(None) => Ok(false),
            Err(Error::InvalidFrame) | Err(Error::AuthenticationFailed) => Ok(false),
            Err(error) => Err(error),
        }
    }

    fn channel_request_phase(&mut self) -> Result<(), Error> {
        match self.power_mode {
            PowerMode::Battery => {
                let channels: Vec<u8, MAX_CHANNELS> =
                    Vec::from_slice(self.group.channels(&self.schedule))
                        .map_err(|_| Error::InvalidSchedule)?;
                for channel in channels {
                    if self.probe_channel(channel)? {
                        return Ok(());
                    }
                }
                self.group.advance(&self.schedule);
                Ok(())
            }
            PowerMode::Batteryless => {
                let channels = self.schedule.channels();
                let channel = channels[self.probe % channels.len()];
                self.probe = (self.probe + 1) % channels.len();
                self.probe_channel(channel)?;
                Ok(())
            }
        }
    }

    fn commissioning_phase(&mut self) -> Result<(), Error> {
        let channel = match self.operational_channel {
            Some(channel) => channel,
            None => {
                self.phase = Phase::ChannelRequest;
                return Ok(());
            }
        };
        self.send_commissioning(true, Target::Channel(channel))?;
        let received = match self.wait_rx(self.rx_timeout)? {
            Some(received) => received,
            None => {
                log::info!("No commissioning reply");
                return Ok(());
            }
        };
        if received.command != CommandIdentifier::CommissioningReply {
            log::warn!("> Unexpected {:?} while commissioning", received.command);
            return Ok(());
        }
        let (reply, _) = CommissioningReply::unpack(&received.payload)?;
        let key = match (reply.key, reply.key_protection) {
            (Some(key), Some(protection)) => Some(self.security.decrypt_key(
                &self.config.address,
                protection.frame_counter,
                &key,
                protection.mic,
            )?),
            (Some(_), None) if self.requires_key_protection() => {
                log::warn!("> Commissioning reply with unprotected key");
                return Err(Error::AuthenticationFailed);
            }
            (key, _) => key,
        };
        if reply.security_level == SecurityLevel::Reduced {
            return Err(Error::DataError(gpd_data::Error::UnsupportedSecurityLevel));
        }
        if reply.security_level.is_secured() && key.is_none() && self.security.key().is_none() {
            return Err(Error::NoKey);
        }
        log::info!(
            "> Commissioning reply, level {:?} key type {:?}",
            reply.security_level,
            reply.key_type
        );
        self.security
            .install(key, reply.security_level, reply.key_type);
        self.pan_id = reply.pan_id;
        self.phase = Phase::Success;
        Ok(())
    }

    fn requires_key_protection(&self) -> bool {
        self.config.security_level().is_secured() || self.config.extended_options.key_encryption
    }

    fn success_phase(&mut self) -> Result<(), Error> {
        let channel = match self.operational_channel {
            Some(channel) => channel,
            None => {
                self.phase = Phase::ChannelRequest;
                return Ok(());
            }
        };
        let security_level = self.security.security_level();
        self.send_frame(
            CommandIdentifier::Success,
            &[],
            security_level,
            false,
            Target::Channel(channel),
        )?;
        let record = CommissioningRecord {
            channel,
            pan_id: self.pan_id,
            security_level,
            key_type: self.security.key_type(),
            key: self.security.key(),
        };
        self.platform.persist_commissioning(Some(&record))?;
        self.state = CommissioningState::Commissioned;
        self.phase = Phase::ChannelRequest;
        log::info!("Commissioned on channel {}", channel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gpd_crypto_rust_crypto::RustCryptoBackend;
    use gpd_data::{
        device::{GpdAddress, KeyType},
        frame::{Direction, GpdfHeader},
        security::CryptoProvider,
        Key,
    };

    use crate::testing::{
        context, maintenance_frame, sensor_config, sink_frame, switch_config, TestContext,
        DEVICE_KEY,
    };
    use crate::{Command, TxSchedule};

    const NETWORK_KEY: [u8; 16] = [
        0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54, 0x32,
        0x10,
    ];

    fn sensor() -> TestContext {
        context(sensor_config(), TxSchedule::new(&[11, 15, 20], 3, 1).unwrap())
    }

    fn channels(gpd: &TestContext) -> std::vec::Vec<u8> {
        gpd.platform().sent.iter().map(|(c, _)| *c).collect()
    }

    fn reply(address: &GpdAddress, mic_mask: u32) -> std::vec::Vec<u8> {
        let mut provider = CryptoProvider::new(RustCryptoBackend::default());
        let (key, mic) = provider
            .encrypt_key(address, Direction::ToDevice, 5, &Key::from(NETWORK_KEY))
            .unwrap();
        let reply = CommissioningReply {
            pan_id: Some(0x1a62),
            key: Some(key),
            key_protection: Some(gpd_data::commands::commissioning::KeyProtection {
                mic: mic ^ mic_mask,
                frame_counter: 5,
            }),
            security_level: SecurityLevel::FullEncrypted,
            key_type: KeyType::IndividualKey,
        };
        let mut payload = [0u8; 32];
        let used = reply.pack(&mut payload).unwrap();
        sink_frame(
            address,
            CommandIdentifier::CommissioningReply,
            &payload[..used],
            SecurityLevel::None,
            &Key::from(DEVICE_KEY),
            0,
        )
    }

    /// Run the channel request phase, the sink answers the probe on channel 15
    fn channel_found(gpd: &mut TestContext) {
        gpd.platform_mut().push_silence();
        gpd.platform_mut()
            .push_frame(&maintenance_frame(CommandIdentifier::ChannelConfiguration, &[0x09]));
        gpd.step().unwrap();
        assert_eq!(gpd.operational_channel(), Some(20));
        gpd.platform_mut().sent.clear();
    }

    #[test]
    fn unidirectional_commissioning() {
        let mut config = switch_config();
        for command in [
            CommandIdentifier::On,
            CommandIdentifier::Off,
            CommandIdentifier::Toggle,
        ] {
            config.commands.push(command).unwrap();
        }
        config.application_information.commands_present = true;
        config.options.application_info_present = true;
        let mut gpd = context(config, TxSchedule::new(&[11, 15, 20, 25], 2, 2).unwrap());
        assert_eq!(gpd.mode(), CommissioningMode::Unidirectional);
        assert_eq!(gpd.state(), CommissioningState::Uncommissioned);
        assert_eq!(
            gpd.send_command(&Command::on(), false),
            Err(Error::NotCommissioned)
        );
        assert!(gpd.platform().sent.is_empty());

        gpd.step().unwrap();
        assert_eq!(gpd.state(), CommissioningState::CommissioningInProgress);
        assert_eq!(channels(&gpd), [11, 15]);
        // Device type, options, application information and command list
        assert_eq!(
            gpd.platform().sent[0].1,
            [0x0c, 0x78, 0x56, 0x34, 0x12, 0xe0, 0x02, 0x04, 0x04, 0x03, 0x21, 0x20, 0x22]
        );
        assert_eq!(gpd.platform().sent[1], gpd.platform().sent[0]);
        assert_eq!(gpd.channel_group().index(), 1);

        gpd.platform_mut().sent.clear();
        gpd.send_command(&Command::on(), false).unwrap();
        assert!(gpd.is_commissioned());
        assert_eq!(channels(&gpd), [20, 25]);
        assert_eq!(gpd.platform().sent[1].1, [0x0c, 0x78, 0x56, 0x34, 0x12, 0x21]);
        assert_eq!(gpd.frame_counter(), 2);

        gpd.platform_mut().sent.clear();
        gpd.step().unwrap();
        assert!(gpd.platform().sent.is_empty());

        assert_eq!(gpd.decommission(), Ok(true));
        assert_eq!(gpd.state(), CommissioningState::Uncommissioned);
        assert_eq!(channels(&gpd), [20, 25]);
        assert_eq!(gpd.platform().sent[0].1, [0x0c, 0x78, 0x56, 0x34, 0x12, 0xe1]);
    }

    #[test]
    fn radio_error_keeps_state() {
        let mut gpd = context(switch_config(), TxSchedule::new(&[11, 15], 1, 1).unwrap());
        gpd.platform_mut().fail_send = true;
        assert_eq!(gpd.step(), Err(Error::RadioError));
        assert_eq!(gpd.state(), CommissioningState::Uncommissioned);
        assert_eq!(gpd.channel_group().index(), 0);

        let mut gpd = sensor();
        gpd.platform_mut().fail_send = true;
        assert_eq!(gpd.step(), Err(Error::RadioError));
        assert_eq!(gpd.state(), CommissioningState::Uncommissioned);
    }

    #[test]
    fn failed_step_keeps_state() {
        let mut gpd = sensor();
        // Channel configuration without payload
        gpd.platform_mut()
            .push_frame(&maintenance_frame(CommandIdentifier::ChannelConfiguration, &[]));
        assert_eq!(gpd.step(), Err(Error::InvalidFrame));
        assert_eq!(gpd.state(), CommissioningState::Uncommissioned);
        assert_eq!(gpd.operational_channel(), None);

        gpd.platform_mut().push_silence();
        gpd.step().unwrap();
        assert_eq!(gpd.state(), CommissioningState::CommissioningInProgress);
    }

    #[test]
    fn bidirectional_commissioning() {
        let mut gpd = sensor();
        let address = gpd.config().address;
        assert_eq!(gpd.mode(), CommissioningMode::Bidirectional);

        gpd.platform_mut().push_silence();
        gpd.platform_mut()
            .push_frame(&maintenance_frame(CommandIdentifier::ChannelConfiguration, &[0x09]));
        gpd.step().unwrap();
        assert_eq!(gpd.state(), CommissioningState::CommissioningInProgress);
        assert_eq!(gpd.operational_channel(), Some(20));
        assert_eq!(
            gpd.platform().sent,
            [(11, vec![0x0d, 0xe3, 0x00]), (15, vec![0x0d, 0xe3, 0x44])]
        );
        assert_eq!(gpd.frame_counter(), 0);

        gpd.platform_mut().sent.clear();
        gpd.platform_mut().push_frame(&reply(&address, 0));
        gpd.step().unwrap();
        assert_eq!(gpd.state(), CommissioningState::CommissioningInProgress);
        assert_eq!(gpd.pan_id(), Some(0x1a62));
        assert_eq!(gpd.security_level(), SecurityLevel::FullEncrypted);
        let (channel, frame) = gpd.platform().sent[0].clone();
        assert_eq!(channel, 20);
        assert_eq!(
            frame[..9],
            [0x8c, 0x60, 0x78, 0x56, 0x34, 0x12, 0xe0, 0xfe, 0x82]
        );
        assert_eq!(frame[9], 0xf3);
        assert_eq!(frame[30..], [0x00, 0x00, 0x00, 0x00]);
        let mut encrypted = [0u8; 16];
        encrypted.copy_from_slice(&frame[10..26]);
        let mic = u32::from_le_bytes([frame[26], frame[27], frame[28], frame[29]]);
        let mut provider = CryptoProvider::new(RustCryptoBackend::default());
        assert_eq!(
            provider.decrypt_key(&address, Direction::FromDevice, 0, &Key::from(encrypted), mic),
            Ok(Key::from(DEVICE_KEY))
        );

        gpd.platform_mut().sent.clear();
        gpd.step().unwrap();
        assert!(gpd.is_commissioned());
        let (channel, frame) = gpd.platform().sent[0].clone();
        assert_eq!(channel, 20);
        let mut data = frame.clone();
        let (header, header_length) = GpdfHeader::unpack(&data).unwrap();
        assert_eq!(header.frame_counter, Some(1));
        assert_eq!(header.security_level(), SecurityLevel::FullEncrypted);
        let end = provider
            .unprotect(
                &address,
                &header,
                header_length,
                data.len(),
                &Key::from(NETWORK_KEY),
                &mut data,
            )
            .unwrap();
        assert_eq!(data[header_length..end], [0xe2]);
        assert_eq!(
            gpd.platform().record,
            Some(CommissioningRecord {
                channel: 20,
                pan_id: Some(0x1a62),
                security_level: SecurityLevel::FullEncrypted,
                key_type: KeyType::IndividualKey,
                key: Some(Key::from(NETWORK_KEY)),
            })
        );
        assert_eq!(gpd.platform().timeouts, [5, 5, 5]);

        gpd.platform_mut().sent.clear();
        gpd.send_command(&Command::toggle(), false).unwrap();
        assert_eq!(channels(&gpd), [20]);
        assert_eq!(gpd.frame_counter(), 3);
    }

    #[test]
    fn rejected_commissioning_reply() {
        let mut gpd = sensor();
        let address = gpd.config().address;
        channel_found(&mut gpd);

        gpd.platform_mut().push_frame(&reply(&address, 1));
        assert_eq!(gpd.step(), Err(Error::AuthenticationFailed));
        assert_eq!(gpd.state(), CommissioningState::CommissioningInProgress);
        assert_eq!(gpd.security_level(), SecurityLevel::FullEncrypted);
        assert_eq!(gpd.pan_id(), None);

        // No reply, the commissioning GPDF is sent again
        gpd.platform_mut().sent.clear();
        gpd.step().unwrap();
        assert_eq!(channels(&gpd), [20]);
        assert_eq!(gpd.platform().sent[0].1[6], 0xe0);
        assert_eq!(gpd.state(), CommissioningState::CommissioningInProgress);
    }

    #[test]
    fn unprotected_key_in_reply() {
        let mut gpd = sensor();
        let address = gpd.config().address;
        channel_found(&mut gpd);

        let plain = CommissioningReply {
            pan_id: Some(0x1a62),
            key: Some(Key::from(NETWORK_KEY)),
            key_protection: None,
            security_level: SecurityLevel::FullEncrypted,
            key_type: KeyType::IndividualKey,
        };
        let mut payload = [0u8; 32];
        let used = plain.pack(&mut payload).unwrap();
        let frame = sink_frame(
            &address,
            CommandIdentifier::CommissioningReply,
            &payload[..used],
            SecurityLevel::None,
            &Key::from(DEVICE_KEY),
            0,
        );
        gpd.platform_mut().push_frame(&frame);
        assert_eq!(gpd.step(), Err(Error::AuthenticationFailed));
        assert_eq!(gpd.state(), CommissioningState::CommissioningInProgress);
        assert_eq!(gpd.pan_id(), None);

        // The device key is still the installed one, the reply was not used
        gpd.platform_mut().push_frame(&reply(&address, 0));
        gpd.step().unwrap();
        gpd.platform_mut().sent.clear();
        gpd.step().unwrap();
        assert!(gpd.is_commissioned());
        assert_eq!(gpd.platform().record.unwrap().key, Some(Key::from(NETWORK_KEY)));
    }

    #[test]
    fn battery_probing() {
        let mut gpd = context(sensor_config(), TxSchedule::new(&[11, 15, 20, 25], 2, 1).unwrap());
        gpd.step().unwrap();
        assert_eq!(channels(&gpd), [11, 15]);
        gpd.step().unwrap();
        assert_eq!(channels(&gpd), [11, 15, 20, 25]);
        assert_eq!(gpd.operational_channel(), None);
    }

    #[test]
    fn batteryless_probing() {
        let mut gpd = context(sensor_config(), TxSchedule::new(&[11, 15, 20, 25], 2, 1).unwrap());
        gpd.batteryless_mode();
        assert_eq!(gpd.power_mode(), PowerMode::Batteryless);
        for _ in 0..5 {
            gpd.step().unwrap();
        }
        assert_eq!(channels(&gpd), [11, 15, 20, 25, 11]);
        gpd.platform_mut()
            .push_frame(&maintenance_frame(CommandIdentifier::ChannelConfiguration, &[0x04]));
        gpd.step().unwrap();
        assert_eq!(gpd.operational_channel(), Some(15));
    }

    fn commissioned() -> TestContext {
        let mut gpd = sensor();
        gpd.platform_mut().record = Some(CommissioningRecord {
            channel: 20,
            pan_id: None,
            security_level: SecurityLevel::FullEncrypted,
            key_type: KeyType::IndividualKey,
            key: Some(Key::from(NETWORK_KEY)),
        });
        assert!(gpd.bidirectional_operational_init());
        gpd
    }

    #[test]
    fn operational_init() {
        let mut gpd = context(switch_config(), TxSchedule::new(&[11], 1, 1).unwrap());
        assert!(!gpd.bidirectional_operational_init());

        let mut gpd = sensor();
        assert!(!gpd.bidirectional_operational_init());
        assert_eq!(gpd.state(), CommissioningState::Uncommissioned);

        let mut gpd = commissioned();
        assert!(gpd.is_commissioned());
        assert_eq!(gpd.operational_channel(), Some(20));
        gpd.step().unwrap();
        assert!(gpd.platform().sent.is_empty());
    }

    #[test]
    fn bidirectional_decommissioning() {
        let mut gpd = sensor();
        assert_eq!(gpd.decommission(), Err(Error::NotCommissioned));

        let mut gpd = commissioned();
        let address = gpd.config().address;
        gpd.platform_mut().push_silence();
        assert_eq!(gpd.decommission(), Ok(false));
        assert!(gpd.is_commissioned());
        assert_eq!(channels(&gpd), [20]);
        let (header, _) = GpdfHeader::unpack(&gpd.platform().sent[0].1).unwrap();
        assert!(header.extended_frame_control.unwrap().rx_after_tx);

        // A reply secured with a different key is not an answer
        let forged = sink_frame(
            &address,
            CommandIdentifier::CommissioningReply,
            &[0x00],
            SecurityLevel::FullEncrypted,
            &Key::from(DEVICE_KEY),
            9,
        );
        gpd.platform_mut().push_frame(&forged);
        assert_eq!(gpd.decommission(), Ok(false));
        assert!(gpd.is_commissioned());

        // Unsecured frames do not answer a device secured at level 3
        let unsecured = sink_frame(
            &address,
            CommandIdentifier::ChannelConfiguration,
            &[0x04],
            SecurityLevel::None,
            &Key::from(NETWORK_KEY),
            0,
        );
        gpd.platform_mut().push_frame(&unsecured);
        assert_eq!(gpd.decommission(), Ok(false));
        assert!(gpd.is_commissioned());
        gpd.platform_mut()
            .push_frame(&maintenance_frame(CommandIdentifier::ChannelConfiguration, &[0x04]));
        assert_eq!(gpd.decommission(), Ok(false));
        assert!(gpd.is_commissioned());
        assert_eq!(gpd.operational_channel(), Some(20));

        let accepted = sink_frame(
            &address,
            CommandIdentifier::CommissioningReply,
            &[0x00],
            SecurityLevel::FullEncrypted,
            &Key::from(NETWORK_KEY),
            10,
        );
        gpd.platform_mut().push_frame(&accepted);
        assert_eq!(gpd.decommission(), Ok(true));
        assert_eq!(gpd.state(), CommissioningState::Uncommissioned);
        assert_eq!(gpd.operational_channel(), None);
        assert_eq!(gpd.platform().record, None);
        assert_eq!(
            gpd.send_command(&Command::on(), false),
            Err(Error::NotCommissioned)
        );
    }
}
