//! Receive window of bidirectional devices

use core::convert::TryFrom;

use heapless::Vec;

use gpd_crypto::CryptoBackend;
use gpd_data::{
    command::CommandIdentifier,
    device::GpdAddress,
    frame::{Direction, FrameType, GpdfHeader, MAX_FRAME_SIZE},
    pack::Pack,
};

use crate::commissioning::Phase;
use crate::{CommissioningState, Error, GpdContext, Platform};

/// Frame received from a sink
#[derive(Clone, Debug, PartialEq)]
pub struct ReceivedCommand {
    /// Command identifier
    pub command: CommandIdentifier,
    /// Command payload, decrypted
    pub payload: Vec<u8, MAX_FRAME_SIZE>,
    /// Frame counter of secured frames
    pub frame_counter: Option<u32>,
}

fn addressed_to(header: &GpdfHeader, address: &GpdAddress) -> bool {
    let direction = match header.extended_frame_control {
        Some(extended) => extended.direction,
        None if header.frame_control.frame_type == FrameType::Maintenance => Direction::ToDevice,
        None => Direction::FromDevice,
    };
    if direction != Direction::ToDevice {
        return false;
    }
    match (address, header.source_id, header.endpoint) {
        (GpdAddress::SourceId(own), Some(source), _) => *own == source,
        (GpdAddress::Ieee { endpoint, .. }, _, Some(received)) => {
            received == *endpoint || received == 0x00 || received == 0xff
        }
        _ => true,
    }
}

impl<P, CB> GpdContext<P, CB>
where
    P: Platform,
    CB: CryptoBackend,
{
    /// Listen for one frame for at most `timeout_ms`
    ///
    /// Returns `Ok(None)` when nothing arrived. Frames sent by other devices,
    /// or addressed to another device, are reported as `InvalidFrame`.
    /// Secured frames failing authentication yield `AuthenticationFailed`,
    /// as do frames secured below the active level of a commissioned device
    /// and maintenance frames outside the channel request phase.
    pub fn wait_rx(&mut self, timeout_ms: u32) -> Result<Option<ReceivedCommand>, Error> {
        let mut data = [0u8; MAX_FRAME_SIZE];
        let length = match self.platform.receive(timeout_ms, &mut data) {
            Some(length) => length,
            None => return Ok(None),
        };
        if length > MAX_FRAME_SIZE {
            log::warn!("> Frame too large, {} octets", length);
            return Err(Error::InvalidFrame);
        }
        let (header, header_length) = GpdfHeader::unpack(&data[..length])?;
        if !addressed_to(&header, &self.config.address) {
            log::warn!("> Frame not for this device");
            return Err(Error::InvalidFrame);
        }
        self.check_security_level(&header)?;
        let length = self.security.unprotect(
            &self.config.address,
            &header,
            header_length,
            length,
            &mut data,
        )?;
        if length <= header_length {
            return Err(Error::InvalidFrame);
        }
        let command =
            CommandIdentifier::try_from(data[header_length]).map_err(|_| Error::InvalidFrame)?;
        let payload =
            Vec::from_slice(&data[header_length + 1..length]).map_err(|_| Error::InvalidFrame)?;
        log::info!("> {:?}, {} octets", command, payload.len());
        Ok(Some(ReceivedCommand {
            command,
            payload,
            frame_counter: header.frame_counter,
        }))
    }

    fn check_security_level(&self, header: &GpdfHeader) -> Result<(), Error> {
        let operational = matches!(
            self.state,
            CommissioningState::Commissioned | CommissioningState::Decommissioning
        );
        if header.frame_control.frame_type == FrameType::Maintenance {
            if operational || self.phase != Phase::ChannelRequest {
                log::warn!("> Maintenance frame outside channel request");
                return Err(Error::AuthenticationFailed);
            }
            return Ok(());
        }
        let active = self.security.security_level();
        if operational && u8::from(header.security_level()) < u8::from(active) {
            log::warn!(
                "> Frame secured with {:?}, expected {:?}",
                header.security_level(),
                active
            );
            return Err(Error::AuthenticationFailed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use gpd_data::{
        device::{KeyType, SecurityLevel},
        frame::{ExtendedFrameControl, FrameControl},
        ExtendedAddress, Key,
    };

    use crate::platform::CommissioningRecord;
    use crate::testing::{
        context, maintenance_frame, sensor_config, sink_frame, TestContext, DEVICE_KEY, SOURCE_ID,
    };
    use crate::TxSchedule;

    fn sensor() -> TestContext {
        let mut gpd = context(sensor_config(), TxSchedule::new(&[15], 1, 1).unwrap());
        gpd.platform_mut().record = Some(CommissioningRecord {
            channel: 15,
            pan_id: None,
            security_level: SecurityLevel::FullEncrypted,
            key_type: KeyType::IndividualKey,
            key: Some(Key::from(DEVICE_KEY)),
        });
        gpd.bidirectional_operational_init();
        gpd
    }

    #[test]
    fn receive_nothing() {
        let mut gpd = sensor();
        assert_eq!(gpd.wait_rx(10), Ok(None));
        assert_eq!(gpd.platform().timeouts, [10]);
    }

    #[test]
    fn receive_secured() {
        let mut gpd = sensor();
        let frame = sink_frame(
            &GpdAddress::SourceId(SOURCE_ID),
            CommandIdentifier::WriteAttributes,
            &[0x00, 0x01, 0x00, 0x04, 0x20, 0x00, 0x20, 0x1e],
            SecurityLevel::FullEncrypted,
            &Key::from(DEVICE_KEY),
            0x0102,
        );
        // Payload is encrypted on the air
        assert_ne!(frame[11..19], [0x00, 0x01, 0x00, 0x04, 0x20, 0x00, 0x20, 0x1e]);
        gpd.platform_mut().push_frame(&frame);
        let received = gpd.wait_rx(5).unwrap().unwrap();
        assert_eq!(received.command, CommandIdentifier::WriteAttributes);
        assert_eq!(
            received.payload[..],
            [0x00, 0x01, 0x00, 0x04, 0x20, 0x00, 0x20, 0x1e]
        );
        assert_eq!(received.frame_counter, Some(0x0102));
    }

    #[test]
    fn reject_tampered() {
        let mut gpd = sensor();
        let mut frame = sink_frame(
            &GpdAddress::SourceId(SOURCE_ID),
            CommandIdentifier::ReadAttributes,
            &[0x00, 0x01, 0x00, 0x02, 0x20, 0x00],
            SecurityLevel::FullEncrypted,
            &Key::from(DEVICE_KEY),
            3,
        );
        frame[11] ^= 0x01;
        gpd.platform_mut().push_frame(&frame);
        assert_eq!(gpd.wait_rx(5), Err(Error::AuthenticationFailed));

        gpd.platform_mut().push_frame(&frame[..8]);
        assert_eq!(gpd.wait_rx(5), Err(Error::InvalidFrame));
    }

    #[test]
    fn reject_other_devices() {
        let mut gpd = sensor();
        let frame = sink_frame(
            &GpdAddress::SourceId(0x8765_4321),
            CommandIdentifier::ChannelConfiguration,
            &[0x04],
            SecurityLevel::None,
            &Key::from(DEVICE_KEY),
            0,
        );
        gpd.platform_mut().push_frame(&frame);
        assert_eq!(gpd.wait_rx(5), Err(Error::InvalidFrame));

        // Sent by a device, not a sink
        gpd.platform_mut()
            .push_frame(&[0x0c, 0x78, 0x56, 0x34, 0x12, 0x20]);
        assert_eq!(gpd.wait_rx(5), Err(Error::InvalidFrame));

        // Unknown command identifier
        let mut gpd = context(sensor_config(), TxSchedule::new(&[15], 1, 1).unwrap());
        gpd.platform_mut()
            .push_frame(&[0x8c, 0xa0, 0x78, 0x56, 0x34, 0x12, 0x5f]);
        assert_eq!(gpd.wait_rx(5), Err(Error::InvalidFrame));
    }

    #[test]
    fn reject_below_active_level() {
        let mut gpd = sensor();
        let address = GpdAddress::SourceId(SOURCE_ID);
        let payload = [0x00, 0x01, 0x00, 0x04, 0x20, 0x00, 0x20, 0x1e];
        let key = Key::from(DEVICE_KEY);
        for level in [SecurityLevel::None, SecurityLevel::Full] {
            let frame = sink_frame(
                &address,
                CommandIdentifier::WriteAttributes,
                &payload,
                level,
                &key,
                4,
            );
            gpd.platform_mut().push_frame(&frame);
            assert_eq!(gpd.wait_rx(5), Err(Error::AuthenticationFailed));
        }
        gpd.platform_mut()
            .push_frame(&maintenance_frame(CommandIdentifier::ChannelConfiguration, &[0x04]));
        assert_eq!(gpd.wait_rx(5), Err(Error::AuthenticationFailed));

        // Maintenance frames are fine while searching for a channel
        let mut gpd = context(sensor_config(), TxSchedule::new(&[15], 1, 1).unwrap());
        gpd.platform_mut()
            .push_frame(&maintenance_frame(CommandIdentifier::ChannelConfiguration, &[0x04]));
        let received = gpd.wait_rx(5).unwrap().unwrap();
        assert_eq!(received.command, CommandIdentifier::ChannelConfiguration);
        assert_eq!(received.frame_counter, None);
    }

    #[test]
    fn endpoint_addressing() {
        let address = GpdAddress::Ieee {
            address: ExtendedAddress::new(0x0011_2233_4455_6677),
            endpoint: 2,
        };
        let header = |endpoint| GpdfHeader {
            frame_control: FrameControl {
                frame_type: FrameType::Data,
                auto_commissioning: false,
                extended: true,
            },
            extended_frame_control: Some(ExtendedFrameControl {
                application_id: address.application_id(),
                security_level: SecurityLevel::None,
                security_key: false,
                rx_after_tx: false,
                direction: Direction::ToDevice,
            }),
            source_id: None,
            endpoint: Some(endpoint),
            frame_counter: None,
        };
        assert!(addressed_to(&header(2), &address));
        assert!(addressed_to(&header(0x00), &address));
        assert!(addressed_to(&header(0xff), &address));
        assert!(!addressed_to(&header(3), &address));
    }
}
