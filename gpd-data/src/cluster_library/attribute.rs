//! ZCL attribute data types and values

use byteorder::{ByteOrder, LittleEndian};
use heapless::Vec;

use crate::utils::{ensure_length, ensure_space};
use crate::Error;

/// Largest octet or character string carried in an attribute value
pub const MAX_STRING_LENGTH: usize = 32;

/// String value of a octet or character string attribute
pub type StringValue = Vec<u8, MAX_STRING_LENGTH>;

extended_enum!(
    /// Attribute data type
    AttributeDataType, u8,
    /// No data
    None => 0x00,
    /// 8-bit data
    Data8 => 0x08,
    /// 16-bit data
    Data16 => 0x09,
    /// 32-bit data
    Data32 => 0x0b,
    /// Boolean
    Boolean => 0x10,
    /// 8-bit bitmap
    Bitmap8 => 0x18,
    /// 16-bit bitmap
    Bitmap16 => 0x19,
    /// 24-bit bitmap
    Bitmap24 => 0x1a,
    /// 32-bit bitmap
    Bitmap32 => 0x1b,
    /// Unsigned 8-bit integer
    Unsigned8 => 0x20,
    /// Unsigned 16-bit integer
    Unsigned16 => 0x21,
    /// Unsigned 24-bit integer
    Unsigned24 => 0x22,
    /// Unsigned 32-bit integer
    Unsigned32 => 0x23,
    /// Unsigned 48-bit integer
    Unsigned48 => 0x25,
    /// Signed 8-bit integer
    Signed8 => 0x28,
    /// Signed 16-bit integer
    Signed16 => 0x29,
    /// Signed 32-bit integer
    Signed32 => 0x2b,
    /// 8-bit enumeration
    Enumeration8 => 0x30,
    /// 16-bit enumeration
    Enumeration16 => 0x31,
    /// Single precision floating point
    FloatingPoint32 => 0x39,
    /// Octet string
    OctetString => 0x41,
    /// Character string
    CharacterString => 0x42,
    /// UTC time
    UtcTime => 0xe2,
    /// Cluster identifier
    ClusterIdentifier => 0xe8,
    /// Attribute identifier
    AttributeIdentifier => 0xe9,
    /// IEEE address
    IeeeAddress => 0xf0,
);

impl AttributeDataType {
    /// Size of the value on the wire, `None` for strings
    pub fn num_octets(self) -> Option<usize> {
        match self {
            AttributeDataType::None => Some(0),
            AttributeDataType::Data8
            | AttributeDataType::Boolean
            | AttributeDataType::Bitmap8
            | AttributeDataType::Unsigned8
            | AttributeDataType::Signed8
            | AttributeDataType::Enumeration8 => Some(1),
            AttributeDataType::Data16
            | AttributeDataType::Bitmap16
            | AttributeDataType::Unsigned16
            | AttributeDataType::Signed16
            | AttributeDataType::Enumeration16
            | AttributeDataType::ClusterIdentifier
            | AttributeDataType::AttributeIdentifier => Some(2),
            AttributeDataType::Bitmap24 | AttributeDataType::Unsigned24 => Some(3),
            AttributeDataType::Data32
            | AttributeDataType::Bitmap32
            | AttributeDataType::Unsigned32
            | AttributeDataType::Signed32
            | AttributeDataType::FloatingPoint32
            | AttributeDataType::UtcTime => Some(4),
            AttributeDataType::Unsigned48 => Some(6),
            AttributeDataType::IeeeAddress => Some(8),
            AttributeDataType::OctetString | AttributeDataType::CharacterString => None,
        }
    }
}

/// Attribute value
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// No data
    None,
    /// 8-bit data
    Data8(u8),
    /// 16-bit data
    Data16(u16),
    /// 32-bit data
    Data32(u32),
    /// Boolean
    Boolean(bool),
    /// 8-bit bitmap
    Bitmap8(u8),
    /// 16-bit bitmap
    Bitmap16(u16),
    /// 24-bit bitmap
    Bitmap24(u32),
    /// 32-bit bitmap
    Bitmap32(u32),
    /// Unsigned 8-bit integer
    Unsigned8(u8),
    /// Unsigned 16-bit integer
    Unsigned16(u16),
    /// Unsigned 24-bit integer
    Unsigned24(u32),
    /// Unsigned 32-bit integer
    Unsigned32(u32),
    /// Unsigned 48-bit integer
    Unsigned48(u64),
    /// Signed 8-bit integer
    Signed8(i8),
    /// Signed 16-bit integer
    Signed16(i16),
    /// Signed 32-bit integer
    Signed32(i32),
    /// 8-bit enumeration
    Enumeration8(u8),
    /// 16-bit enumeration
    Enumeration16(u16),
    /// Single precision floating point
    FloatingPoint32(f32),
    /// Octet string, `None` is the invalid value
    OctetString(Option<StringValue>),
    /// Character string, `None` is the invalid value
    CharacterString(Option<StringValue>),
    /// UTC time, seconds since 2000-01-01
    UtcTime(u32),
    /// Cluster identifier
    ClusterIdentifier(u16),
    /// Attribute identifier
    AttributeIdentifier(u16),
    /// IEEE address
    IeeeAddress(u64),
}

impl AttributeValue {
    /// Data type of the value
    pub fn data_type(&self) -> AttributeDataType {
        match self {
            AttributeValue::None => AttributeDataType::None,
            AttributeValue::Data8(_) => AttributeDataType::Data8,
            AttributeValue::Data16(_) => AttributeDataType::Data16,
            AttributeValue::Data32(_) => AttributeDataType::Data32,
            AttributeValue::Boolean(_) => AttributeDataType::Boolean,
            AttributeValue::Bitmap8(_) => AttributeDataType::Bitmap8,
            AttributeValue::Bitmap16(_) => AttributeDataType::Bitmap16,
            AttributeValue::Bitmap24(_) => AttributeDataType::Bitmap24,
            AttributeValue::Bitmap32(_) => AttributeDataType::Bitmap32,
            AttributeValue::Unsigned8(_) => AttributeDataType::Unsigned8,
            AttributeValue::Unsigned16(_) => AttributeDataType::Unsigned16,
            AttributeValue::Unsigned24(_) => AttributeDataType::Unsigned24,
            AttributeValue::Unsigned32(_) => AttributeDataType::Unsigned32,
            AttributeValue::Unsigned48(_) => AttributeDataType::Unsigned48,
            AttributeValue::Signed8(_) => AttributeDataType::Signed8,
            AttributeValue::Signed16(_) => AttributeDataType::Signed16,
            AttributeValue::Signed32(_) => AttributeDataType::Signed32,
            AttributeValue::Enumeration8(_) => AttributeDataType::Enumeration8,
            AttributeValue::Enumeration16(_) => AttributeDataType::Enumeration16,
            AttributeValue::FloatingPoint32(_) => AttributeDataType::FloatingPoint32,
            AttributeValue::OctetString(_) => AttributeDataType::OctetString,
            AttributeValue::CharacterString(_) => AttributeDataType::CharacterString,
            AttributeValue::UtcTime(_) => AttributeDataType::UtcTime,
            AttributeValue::ClusterIdentifier(_) => AttributeDataType::ClusterIdentifier,
            AttributeValue::AttributeIdentifier(_) => AttributeDataType::AttributeIdentifier,
            AttributeValue::IeeeAddress(_) => AttributeDataType::IeeeAddress,
        }
    }

    /// Number of octets the value occupies on the wire
    pub fn size(&self) -> usize {
        match self {
            AttributeValue::OctetString(Some(value))
            | AttributeValue::CharacterString(Some(value)) => 1 + value.len(),
            AttributeValue::OctetString(None) | AttributeValue::CharacterString(None) => 1,
            _ => self.data_type().num_octets().unwrap_or(0),
        }
    }

    /// Serialise the value without its type tag
    pub fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let size = self.size();
        ensure_space(data, size)?;
        match self {
            AttributeValue::None => (),
            AttributeValue::Data8(v)
            | AttributeValue::Bitmap8(v)
            | AttributeValue::Unsigned8(v)
            | AttributeValue::Enumeration8(v) => data[0] = *v,
            AttributeValue::Boolean(v) => data[0] = *v as u8,
            AttributeValue::Signed8(v) => data[0] = *v as u8,
            AttributeValue::Data16(v)
            | AttributeValue::Bitmap16(v)
            | AttributeValue::Unsigned16(v)
            | AttributeValue::Enumeration16(v)
            | AttributeValue::ClusterIdentifier(v)
            | AttributeValue::AttributeIdentifier(v) => LittleEndian::write_u16(&mut data[..2], *v),
            AttributeValue::Signed16(v) => LittleEndian::write_i16(&mut data[..2], *v),
            AttributeValue::Bitmap24(v) | AttributeValue::Unsigned24(v) => {
                if *v > 0x00ff_ffff {
                    return Err(Error::InvalidValue);
                }
                LittleEndian::write_u24(&mut data[..3], *v)
            }
            AttributeValue::Data32(v)
            | AttributeValue::Bitmap32(v)
            | AttributeValue::Unsigned32(v)
            | AttributeValue::UtcTime(v) => LittleEndian::write_u32(&mut data[..4], *v),
            AttributeValue::Signed32(v) => LittleEndian::write_i32(&mut data[..4], *v),
            AttributeValue::FloatingPoint32(v) => LittleEndian::write_f32(&mut data[..4], *v),
            AttributeValue::Unsigned48(v) => {
                if *v > 0x0000_ffff_ffff_ffff {
                    return Err(Error::InvalidValue);
                }
                LittleEndian::write_u48(&mut data[..6], *v)
            }
            AttributeValue::IeeeAddress(v) => LittleEndian::write_u64(&mut data[..8], *v),
            AttributeValue::OctetString(value) | AttributeValue::CharacterString(value) => {
                match value {
                    Some(value) => {
                        data[0] = value.len() as u8;
                        data[1..size].copy_from_slice(value);
                    }
                    None => data[0] = 0xff,
                }
            }
        }
        Ok(size)
    }

    /// De-serialise a value of `data_type`
    pub fn unpack(data: &[u8], data_type: AttributeDataType) -> Result<(Self, usize), Error> {
        if let Some(num_octets) = data_type.num_octets() {
            ensure_length(data, num_octets)?;
        }
        let value = match data_type {
            AttributeDataType::None => AttributeValue::None,
            AttributeDataType::Data8 => AttributeValue::Data8(data[0]),
            AttributeDataType::Data16 => AttributeValue::Data16(LittleEndian::read_u16(data)),
            AttributeDataType::Data32 => AttributeValue::Data32(LittleEndian::read_u32(data)),
            AttributeDataType::Boolean => match data[0] {
                0x00 => AttributeValue::Boolean(false),
                0x01 => AttributeValue::Boolean(true),
                _ => return Err(Error::InvalidValue),
            },
            AttributeDataType::Bitmap8 => AttributeValue::Bitmap8(data[0]),
            AttributeDataType::Bitmap16 => AttributeValue::Bitmap16(LittleEndian::read_u16(data)),
            AttributeDataType::Bitmap24 => AttributeValue::Bitmap24(LittleEndian::read_u24(data)),
            AttributeDataType::Bitmap32 => AttributeValue::Bitmap32(LittleEndian::read_u32(data)),
            AttributeDataType::Unsigned8 => AttributeValue::Unsigned8(data[0]),
            AttributeDataType::Unsigned16 => {
                AttributeValue::Unsigned16(LittleEndian::read_u16(data))
            }
            AttributeDataType::Unsigned24 => {
                AttributeValue::Unsigned24(LittleEndian::read_u24(data))
            }
            AttributeDataType::Unsigned32 => {
                AttributeValue::Unsigned32(LittleEndian::read_u32(data))
            }
            AttributeDataType::Unsigned48 => {
                AttributeValue::Unsigned48(LittleEndian::read_u48(data))
            }
            AttributeDataType::Signed8 => AttributeValue::Signed8(data[0] as i8),
            AttributeDataType::Signed16 => AttributeValue::Signed16(LittleEndian::read_i16(data)),
            AttributeDataType::Signed32 => AttributeValue::Signed32(LittleEndian::read_i32(data)),
            AttributeDataType::Enumeration8 => AttributeValue::Enumeration8(data[0]),
            AttributeDataType::Enumeration16 => {
                AttributeValue::Enumeration16(LittleEndian::read_u16(data))
            }
            AttributeDataType::FloatingPoint32 => {
                AttributeValue::FloatingPoint32(LittleEndian::read_f32(data))
            }
            AttributeDataType::UtcTime => AttributeValue::UtcTime(LittleEndian::read_u32(data)),
            AttributeDataType::ClusterIdentifier => {
                AttributeValue::ClusterIdentifier(LittleEndian::read_u16(data))
            }
            AttributeDataType::AttributeIdentifier => {
                AttributeValue::AttributeIdentifier(LittleEndian::read_u16(data))
            }
            AttributeDataType::IeeeAddress => {
                AttributeValue::IeeeAddress(LittleEndian::read_u64(data))
            }
            AttributeDataType::OctetString | AttributeDataType::CharacterString => {
                let (value, used) = unpack_string(data)?;
                let value = if data_type == AttributeDataType::OctetString {
                    AttributeValue::OctetString(value)
                } else {
                    AttributeValue::CharacterString(value)
                };
                return Ok((value, used));
            }
        };
        Ok((value, data_type.num_octets().unwrap_or(0)))
    }
}

fn unpack_string(data: &[u8]) -> Result<(Option<StringValue>, usize), Error> {
    ensure_length(data, 1)?;
    if data[0] == 0xff {
        return Ok((None, 1));
    }
    let length = data[0] as usize;
    ensure_length(data, 1 + length)?;
    let value = Vec::from_slice(&data[1..=length]).map_err(|_| Error::UnsupportedAttributeValue)?;
    Ok((Some(value), 1 + length))
}

#[cfg(all(test, not(feature = "core")))]
mod tests {
    use super::*;

    #[test]
    fn pack_values() {
        let mut data = [0u8; 16];
        assert_eq!(AttributeValue::Unsigned8(33).pack(&mut data), Ok(1));
        assert_eq!(data[0], 33);
        assert_eq!(AttributeValue::Unsigned16(0xabcd).pack(&mut data), Ok(2));
        assert_eq!(data[..2], [0xcd, 0xab]);
        assert_eq!(AttributeValue::Signed16(-2).pack(&mut data), Ok(2));
        assert_eq!(data[..2], [0xfe, 0xff]);
        assert_eq!(AttributeValue::Unsigned24(0x010203).pack(&mut data), Ok(3));
        assert_eq!(data[..3], [0x03, 0x02, 0x01]);
        assert_eq!(
            AttributeValue::Unsigned24(0x0100_0000).pack(&mut data),
            Err(Error::InvalidValue)
        );
        assert_eq!(
            AttributeValue::IeeeAddress(0x1001_feef_dccd_baab).pack(&mut data),
            Ok(8)
        );
        assert_eq!(data[..8], [0xab, 0xba, 0xcd, 0xdc, 0xef, 0xfe, 0x01, 0x10]);
        assert_eq!(AttributeValue::Boolean(true).pack(&mut data), Ok(1));
        assert_eq!(data[0], 1);
        assert_eq!(
            AttributeValue::Unsigned32(1).pack(&mut data[..3]),
            Err(Error::NotEnoughSpace)
        );
    }

    #[test]
    fn pack_strings() {
        let mut data = [0u8; 16];
        let value = AttributeValue::CharacterString(Some(Vec::from_slice(b"gpd").unwrap()));
        assert_eq!(value.size(), 4);
        assert_eq!(value.pack(&mut data), Ok(4));
        assert_eq!(data[..4], [0x03, b'g', b'p', b'd']);
        assert_eq!(
            AttributeValue::unpack(&data[..4], AttributeDataType::CharacterString),
            Ok((value, 4))
        );

        let value = AttributeValue::OctetString(None);
        assert_eq!(value.pack(&mut data), Ok(1));
        assert_eq!(data[0], 0xff);
        assert_eq!(
            AttributeValue::unpack(&data[..1], AttributeDataType::OctetString),
            Ok((value, 1))
        );
        assert_eq!(
            AttributeValue::unpack(&[0x05, 0x01], AttributeDataType::OctetString),
            Err(Error::WrongNumberOfBytes)
        );
    }

    #[test]
    fn unpack_values() {
        assert_eq!(
            AttributeValue::unpack(&[0x21, 0x00], AttributeDataType::Unsigned8),
            Ok((AttributeValue::Unsigned8(0x21), 1))
        );
        assert_eq!(
            AttributeValue::unpack(&[0x01, 0x02, 0x03, 0x04], AttributeDataType::Unsigned32),
            Ok((AttributeValue::Unsigned32(0x0403_0201), 4))
        );
        assert_eq!(
            AttributeValue::unpack(&[0x02], AttributeDataType::Boolean),
            Err(Error::InvalidValue)
        );
        assert_eq!(
            AttributeValue::unpack(&[0x01], AttributeDataType::Unsigned16),
            Err(Error::WrongNumberOfBytes)
        );
        assert_eq!(AttributeDataType::Unsigned48.num_octets(), Some(6));
        assert_eq!(AttributeDataType::try_from(0x21), Ok(AttributeDataType::Unsigned16));
        assert_eq!(AttributeDataType::try_from(0x4c), Err(Error::InvalidValue));
    }
}
