//! # Green Power device frame (GPDF) network header
//!
//! ```text
//! | FC 1 | [Ext FC 1] | [SrcID 4] | [Endpoint 1] | [Counter 4] | Command 1 | Payload | [MIC 4] |
//! ```

use byteorder::{ByteOrder, LittleEndian};

use crate::command::CommandIdentifier;
use crate::device::{ApplicationId, DeviceConfig, GpdAddress, SecurityLevel};
use crate::pack::{Pack, PackFixed};
use crate::utils::{ensure_length, ensure_space};
use crate::Error;

/// Largest GPDF handed to the radio
pub const MAX_FRAME_SIZE: usize = 120;
/// Length of the message integrity code
pub const MIC_SIZE: usize = 4;
/// Protocol version of Green Power frames
pub const PROTOCOL_VERSION: u8 = 3;

/// Frame type sub-field
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameType {
    /// Data frame
    Data = 0b00,
    /// Maintenance frame
    Maintenance = 0b01,
}

impl TryFrom<u8> for FrameType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value & 0b11 {
            0b00 => Ok(FrameType::Data),
            0b01 => Ok(FrameType::Maintenance),
            _ => Err(Error::InvalidFrame),
        }
    }
}

/// Direction sub-field
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Sent by the device
    FromDevice = 0,
    /// Sent by a sink or proxy to the device
    ToDevice = 1,
}

/// Network frame control
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FrameControl {
    /// Frame type
    pub frame_type: FrameType,
    /// Auto-commissioning
    pub auto_commissioning: bool,
    /// Extended frame control follows
    pub extended: bool,
}

impl PackFixed<FrameControl, Error> for FrameControl {
    fn pack(&self, data: &mut [u8]) -> Result<(), Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = self.frame_type as u8
            | PROTOCOL_VERSION << 2
            | (self.auto_commissioning as u8) << 6
            | (self.extended as u8) << 7;
        Ok(())
    }

    fn unpack(data: &[u8]) -> Result<Self, Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        if (data[0] >> 2) & 0b1111 != PROTOCOL_VERSION {
            return Err(Error::InvalidFrame);
        }
        Ok(Self {
            frame_type: FrameType::try_from(data[0])?,
            auto_commissioning: (data[0] >> 6) & 0b1 == 1,
            extended: (data[0] >> 7) & 0b1 == 1,
        })
    }
}

/// Extended network frame control
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExtendedFrameControl {
    /// Application identifier
    pub application_id: ApplicationId,
    /// Security level
    pub security_level: SecurityLevel,
    /// Individual key is used, otherwise a shared key
    pub security_key: bool,
    /// The device keeps the receiver on after this frame
    pub rx_after_tx: bool,
    /// Direction
    pub direction: Direction,
}

impl PackFixed<ExtendedFrameControl, Error> for ExtendedFrameControl {
    fn pack(&self, data: &mut [u8]) -> Result<(), Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = u8::from(self.application_id)
            | u8::from(self.security_level) << 3
            | (self.security_key as u8) << 5
            | (self.rx_after_tx as u8) << 6
            | (self.direction as u8) << 7;
        Ok(())
    }

    fn unpack(data: &[u8]) -> Result<Self, Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        let application_id =
            ApplicationId::try_from(data[0] & 0b111).map_err(|_| Error::InvalidFrame)?;
        let security_level = SecurityLevel::try_from((data[0] >> 3) & 0b11)?;
        let direction = if (data[0] >> 7) & 0b1 == 1 {
            Direction::ToDevice
        } else {
            Direction::FromDevice
        };
        Ok(Self {
            application_id,
            security_level,
            security_key: (data[0] >> 5) & 0b1 == 1,
            rx_after_tx: (data[0] >> 6) & 0b1 == 1,
            direction,
        })
    }
}

/// GPDF network header
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpdfHeader {
    /// Frame control
    pub frame_control: FrameControl,
    /// Extended frame control
    pub extended_frame_control: Option<ExtendedFrameControl>,
    /// Source identifier, application id 0 data frames only
    pub source_id: Option<u32>,
    /// Endpoint, application id 2 only
    pub endpoint: Option<u8>,
    /// Security frame counter, security level 2 and 3 only
    pub frame_counter: Option<u32>,
}

impl GpdfHeader {
    /// Header for a data frame sent by the device
    ///
    /// The extended frame control is included when the application id is 2,
    /// the frame is secured or RX-after-TX is requested.
    pub fn for_device(
        config: &DeviceConfig,
        security_level: SecurityLevel,
        frame_counter: u32,
        rx_after_tx: bool,
    ) -> Self {
        let application_id = config.application_id();
        let extended = application_id == ApplicationId::Ieee
            || security_level != SecurityLevel::None
            || rx_after_tx;
        let extended_frame_control = if extended {
            Some(ExtendedFrameControl {
                application_id,
                security_level,
                security_key: config.extended_options.key_type.is_individual(),
                rx_after_tx,
                direction: Direction::FromDevice,
            })
        } else {
            None
        };
        let (source_id, endpoint) = match config.address {
            GpdAddress::SourceId(source) => (Some(source), None),
            GpdAddress::Ieee { endpoint, .. } => (None, Some(endpoint)),
        };
        let frame_counter = if security_level.is_secured() {
            Some(frame_counter)
        } else {
            None
        };
        Self {
            frame_control: FrameControl {
                frame_type: FrameType::Data,
                auto_commissioning: false,
                extended,
            },
            extended_frame_control,
            source_id,
            endpoint,
            frame_counter,
        }
    }

    /// Header for a maintenance frame, which carries no addressing
    pub fn maintenance() -> Self {
        Self {
            frame_control: FrameControl {
                frame_type: FrameType::Maintenance,
                auto_commissioning: false,
                extended: false,
            },
            extended_frame_control: None,
            source_id: None,
            endpoint: None,
            frame_counter: None,
        }
    }

    /// Security level, none without extended frame control
    pub fn security_level(&self) -> SecurityLevel {
        self.extended_frame_control
            .map_or(SecurityLevel::None, |fc| fc.security_level)
    }

    /// Application id, 0 without extended frame control
    pub fn application_id(&self) -> ApplicationId {
        self.extended_frame_control
            .map_or(ApplicationId::SourceId, |fc| fc.application_id)
    }

    /// Direction, from the device without extended frame control
    pub fn direction(&self) -> Direction {
        self.extended_frame_control
            .map_or(Direction::FromDevice, |fc| fc.direction)
    }
}

impl Pack<GpdfHeader, Error> for GpdfHeader {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let length = 1
            + self.extended_frame_control.map_or(0, |_| 1)
            + self.source_id.map_or(0, |_| 4)
            + self.endpoint.map_or(0, |_| 1)
            + self.frame_counter.map_or(0, |_| 4);
        ensure_space(data, length)?;
        self.frame_control.pack(&mut data[..1])?;
        let mut offset = 1;
        if let Some(extended) = self.extended_frame_control {
            extended.pack(&mut data[offset..=offset])?;
            offset += 1;
        }
        if let Some(source) = self.source_id {
            LittleEndian::write_u32(&mut data[offset..offset + 4], source);
            offset += 4;
        }
        if let Some(endpoint) = self.endpoint {
            data[offset] = endpoint;
            offset += 1;
        }
        if let Some(counter) = self.frame_counter {
            LittleEndian::write_u32(&mut data[offset..offset + 4], counter);
            offset += 4;
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        ensure_length(data, 1)?;
        let frame_control = FrameControl::unpack(&data[..1])?;
        let mut offset = 1;
        let extended_frame_control = if frame_control.extended {
            ensure_length(data, offset + 1)?;
            let extended = ExtendedFrameControl::unpack(&data[offset..=offset])?;
            offset += 1;
            Some(extended)
        } else {
            None
        };
        let mut header = Self {
            frame_control,
            extended_frame_control,
            source_id: None,
            endpoint: None,
            frame_counter: None,
        };
        let application_id = header.application_id();
        if application_id == ApplicationId::SourceId && frame_control.frame_type == FrameType::Data
        {
            ensure_length(data, offset + 4)?;
            header.source_id = Some(LittleEndian::read_u32(&data[offset..offset + 4]));
            offset += 4;
        }
        if application_id == ApplicationId::Ieee {
            ensure_length(data, offset + 1)?;
            header.endpoint = Some(data[offset]);
            offset += 1;
        }
        match header.security_level() {
            SecurityLevel::None => (),
            SecurityLevel::Full | SecurityLevel::FullEncrypted => {
                ensure_length(data, offset + 4)?;
                header.frame_counter = Some(LittleEndian::read_u32(&data[offset..offset + 4]));
                offset += 4;
            }
            SecurityLevel::Reduced => return Err(Error::UnsupportedSecurityLevel),
        }
        Ok((header, offset))
    }
}

/// Write header, command identifier and payload into `data`
///
/// Returns the total length. Space for the MIC is not included, the
/// security transform appends it.
pub fn build(
    header: &GpdfHeader,
    command: CommandIdentifier,
    payload: &[u8],
    data: &mut [u8],
) -> Result<(usize, usize), Error> {
    let header_length = header.pack(data)?;
    let length = header_length + 1 + payload.len();
    ensure_space(data, length)?;
    if length + header.frame_counter.map_or(0, |_| MIC_SIZE) > MAX_FRAME_SIZE {
        return Err(Error::NotEnoughSpace);
    }
    data[header_length] = command.into();
    data[header_length + 1..length].copy_from_slice(payload);
    Ok((header_length, length))
}

#[cfg(all(test, not(feature = "core")))]
mod tests {
    use super::*;
    use crate::common::address::ExtendedAddress;
    use crate::device::{DeviceIdentifier, KeyType};

    fn source_device() -> DeviceConfig {
        DeviceConfig::new(
            GpdAddress::SourceId(0x8765_4321),
            DeviceIdentifier::OnOffSwitch,
        )
    }

    #[test]
    fn unsecured_header() {
        let config = source_device();
        let header = GpdfHeader::for_device(&config, SecurityLevel::None, 7, false);
        assert!(header.extended_frame_control.is_none());
        assert_eq!(header.frame_counter, None);
        let mut data = [0u8; 16];
        let used = header.pack(&mut data).unwrap();
        assert_eq!(used, 5);
        assert_eq!(data[..used], [0x0c, 0x21, 0x43, 0x65, 0x87]);

        let (unpacked, used) = GpdfHeader::unpack(&data[..5]).unwrap();
        assert_eq!(used, 5);
        assert_eq!(unpacked, header);
    }

    #[test]
    fn secured_header() {
        let mut config = source_device();
        config.extended_options.key_type = KeyType::IndividualKey;
        let header = GpdfHeader::for_device(&config, SecurityLevel::FullEncrypted, 0x0102_0304, true);
        let mut data = [0u8; 16];
        let used = header.pack(&mut data).unwrap();
        assert_eq!(used, 10);
        assert_eq!(
            data[..used],
            [0x8c, 0x78, 0x21, 0x43, 0x65, 0x87, 0x04, 0x03, 0x02, 0x01]
        );
        let (unpacked, used) = GpdfHeader::unpack(&data[..used]).unwrap();
        assert_eq!(used, 10);
        assert_eq!(unpacked.frame_counter, Some(0x0102_0304));
        assert_eq!(unpacked.security_level(), SecurityLevel::FullEncrypted);
        assert!(unpacked.extended_frame_control.unwrap().rx_after_tx);
    }

    #[test]
    fn rx_after_tx_adds_extended_control() {
        let config = source_device();
        let header = GpdfHeader::for_device(&config, SecurityLevel::None, 0, true);
        let mut data = [0u8; 16];
        let used = header.pack(&mut data).unwrap();
        assert_eq!(data[..2], [0x8c, 0x40]);
        assert_eq!(used, 6);
    }

    #[test]
    fn ieee_header() {
        let config = DeviceConfig::new(
            GpdAddress::Ieee {
                address: ExtendedAddress::new(0x0011_2233_4455_6677),
                endpoint: 0x55,
            },
            DeviceIdentifier::SimpleSensor,
        );
        let header = GpdfHeader::for_device(&config, SecurityLevel::None, 0, false);
        let mut data = [0u8; 16];
        let used = header.pack(&mut data).unwrap();
        assert_eq!(data[..used], [0x8c, 0x02, 0x55]);
    }

    #[test]
    fn maintenance_header() {
        let header = GpdfHeader::maintenance();
        let mut data = [0u8; 4];
        assert_eq!(header.pack(&mut data), Ok(1));
        assert_eq!(data[0], 0x0d);
        let (unpacked, used) = GpdfHeader::unpack(&data[..1]).unwrap();
        assert_eq!(used, 1);
        assert_eq!(unpacked.frame_control.frame_type, FrameType::Maintenance);
    }

    #[test]
    fn invalid_headers() {
        // Protocol version 2
        assert_eq!(GpdfHeader::unpack(&[0x08]), Err(Error::InvalidFrame));
        // Reserved frame type
        assert_eq!(GpdfHeader::unpack(&[0x0e]), Err(Error::InvalidFrame));
        // Truncated source identifier
        assert_eq!(
            GpdfHeader::unpack(&[0x0c, 0x21, 0x43]),
            Err(Error::WrongNumberOfBytes)
        );
        // Reserved application id
        assert_eq!(GpdfHeader::unpack(&[0x8c, 0x01]), Err(Error::InvalidFrame));
    }

    #[test]
    fn build_frame() {
        let config = source_device();
        let header = GpdfHeader::for_device(&config, SecurityLevel::None, 0, false);
        let mut data = [0u8; MAX_FRAME_SIZE];
        let (header_length, length) =
            build(&header, CommandIdentifier::Toggle, &[], &mut data).unwrap();
        assert_eq!(header_length, 5);
        assert_eq!(length, 6);
        assert_eq!(data[..length], [0x0c, 0x21, 0x43, 0x65, 0x87, 0x22]);

        let payload = [0u8; MAX_FRAME_SIZE];
        assert_eq!(
            build(&header, CommandIdentifier::AttributeReporting, &payload, &mut data),
            Err(Error::NotEnoughSpace)
        );
    }
}
