//! Green Power attribute commands
//!
//! Reports, requests and read responses are sent by the device. Read and
//! write attributes are received from a sink.

use heapless::Vec;

use crate::cluster_library::{
    AccessFlags, AttributeDataType, AttributeRecord, AttributeValue, ClusterLibraryStatus,
};
use crate::command::CommandIdentifier;
use crate::frame::MAX_FRAME_SIZE;
use crate::pack::Pack;
use crate::utils::{ensure_space, read_u16, write_u16};
use crate::Error;

/// Options bit, the command carries more than one cluster record
pub const OPTION_MULTI_RECORD: u8 = 0x01;
/// Options bit, a manufacturer code follows the options
pub const OPTION_MANUFACTURER_PRESENT: u8 = 0x02;

/// Largest number of attribute identifiers in a single cluster record
pub const MAX_ATTRIBUTE_IDENTIFIERS: usize = MAX_FRAME_SIZE / 2;

fn pack_record(record: &AttributeRecord, data: &mut [u8]) -> Result<usize, Error> {
    ensure_space(data, 3)?;
    write_u16(data, 0, record.identifier)?;
    data[2] = record.data_type().into();
    Ok(3 + record.value.pack(&mut data[3..])?)
}

/// Attribute reporting, 0xa0 or manufacturer specific 0xa1
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttributeReport<'a> {
    /// Cluster the attributes belong to
    pub cluster: u16,
    /// Reported attributes
    pub attributes: &'a [AttributeRecord],
}

impl<'a> AttributeReport<'a> {
    /// Manufacturer code shared by the reported attributes
    ///
    /// Fails when standard and manufacturer specific attributes are mixed,
    /// or when manufacturer codes differ.
    pub fn manufacturer(&self) -> Result<Option<u16>, Error> {
        let mut attributes = self.attributes.iter();
        let first = match attributes.next() {
            Some(attribute) => attribute.manufacturer(),
            None => return Err(Error::InvalidValue),
        };
        if attributes.all(|a| a.manufacturer() == first) {
            Ok(first)
        } else {
            Err(Error::InvalidValue)
        }
    }

    /// Command identifier to send the report with
    pub fn command(&self) -> Result<CommandIdentifier, Error> {
        match self.manufacturer()? {
            Some(_) => Ok(CommandIdentifier::ManufacturerAttributeReporting),
            None => Ok(CommandIdentifier::AttributeReporting),
        }
    }

    /// Serialise the report payload
    pub fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let mut offset = 0;
        if let Some(manufacturer) = self.manufacturer()? {
            offset = write_u16(data, offset, manufacturer)?;
        }
        offset = write_u16(data, offset, self.cluster)?;
        for attribute in self.attributes.iter() {
            offset += pack_record(attribute, &mut data[offset..])?;
        }
        Ok(offset)
    }
}

/// Request attributes, 0xa4
///
/// Asks the sink to send write attributes for the listed attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeRequest<'a> {
    /// Cluster the attributes belong to
    pub cluster: u16,
    /// Manufacturer code for manufacturer specific attributes
    pub manufacturer: Option<u16>,
    /// Requested attribute identifiers
    pub attributes: &'a [u16],
}

impl<'a> AttributeRequest<'a> {
    /// Serialise the request payload
    pub fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let length = self.attributes.len() * 2;
        if length > u8::MAX as usize {
            return Err(Error::InvalidValue);
        }
        let header = AttributeCommandHeader {
            options: 0,
            manufacturer: self.manufacturer,
        };
        let mut offset = header.pack(data)?;
        offset += ClusterBlock {
            cluster: self.cluster,
            length: length as u8,
        }
        .pack(&mut data[offset..])?;
        for identifier in self.attributes.iter() {
            offset = write_u16(data, offset, *identifier)?;
        }
        Ok(offset)
    }
}

/// Read attributes response, 0xa5
///
/// Answers each requested identifier with a status record, attributes
/// that are unknown or not exposed yield `UnsupportedAttribute`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadAttributesResponse<'a> {
    /// Cluster the attributes belong to
    pub cluster: u16,
    /// Manufacturer code of the request
    pub manufacturer: Option<u16>,
    /// Requested attribute identifiers
    pub requested: &'a [u16],
    /// Attributes of the cluster
    pub attributes: &'a [AttributeRecord],
}

impl<'a> ReadAttributesResponse<'a> {
    fn lookup(&self, identifier: u16) -> Result<&'a AttributeRecord, ClusterLibraryStatus> {
        let attribute = self
            .attributes
            .iter()
            .find(|a| a.identifier == identifier && a.manufacturer() == self.manufacturer)
            .ok_or(ClusterLibraryStatus::UnsupportedAttribute)?;
        if attribute.access.contains(AccessFlags::INTERNAL) {
            Err(ClusterLibraryStatus::UnsupportedAttribute)
        } else if attribute.access.contains(AccessFlags::WRITE_ONLY) {
            Err(ClusterLibraryStatus::WriteOnly)
        } else {
            Ok(attribute)
        }
    }

    /// Serialise the response payload
    pub fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        let header = AttributeCommandHeader {
            options: 0,
            manufacturer: self.manufacturer,
        };
        let mut offset = header.pack(data)?;
        let block_offset = offset;
        offset += ClusterBlock {
            cluster: self.cluster,
            length: 0,
        }
        .pack(&mut data[offset..])?;
        let records_offset = offset;
        for identifier in self.requested.iter() {
            offset = write_u16(data, offset, *identifier)?;
            ensure_space(data, offset + 1)?;
            match self.lookup(*identifier) {
                Ok(attribute) => {
                    data[offset] = ClusterLibraryStatus::Success.into();
                    offset += 1;
                    ensure_space(data, offset + 1)?;
                    data[offset] = attribute.data_type().into();
                    offset += 1;
                    offset += attribute.value.pack(&mut data[offset..])?;
                }
                Err(status) => {
                    data[offset] = status.into();
                    offset += 1;
                }
            }
        }
        let length = offset - records_offset;
        if length > u8::MAX as usize {
            return Err(Error::NotEnoughSpace);
        }
        data[block_offset + 2] = length as u8;
        Ok(offset)
    }
}

/// Options and manufacturer code leading an attribute command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeCommandHeader {
    /// Options, without the manufacturer present bit
    pub options: u8,
    /// Manufacturer code
    pub manufacturer: Option<u16>,
}

impl AttributeCommandHeader {
    /// More than one cluster record follows
    pub fn multi_record(&self) -> bool {
        self.options & OPTION_MULTI_RECORD == OPTION_MULTI_RECORD
    }
}

impl Pack<AttributeCommandHeader, Error> for AttributeCommandHeader {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        ensure_space(data, 1)?;
        let options = self.options & !OPTION_MANUFACTURER_PRESENT;
        match self.manufacturer {
            Some(manufacturer) => {
                data[0] = options | OPTION_MANUFACTURER_PRESENT;
                write_u16(data, 1, manufacturer)
            }
            None => {
                data[0] = options;
                Ok(1)
            }
        }
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        let options = *data.first().ok_or(Error::InvalidFrame)?;
        if options & OPTION_MANUFACTURER_PRESENT == OPTION_MANUFACTURER_PRESENT {
            let (manufacturer, used) = read_u16(data, 1).map_err(|_| Error::InvalidFrame)?;
            Ok((
                Self {
                    options: options & !OPTION_MANUFACTURER_PRESENT,
                    manufacturer: Some(manufacturer),
                },
                used,
            ))
        } else {
            Ok((
                Self {
                    options,
                    manufacturer: None,
                },
                1,
            ))
        }
    }
}

/// Cluster record header, cluster identifier and length of the records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClusterBlock {
    /// Cluster identifier
    pub cluster: u16,
    /// Length of the records following
    pub length: u8,
}

impl Pack<ClusterBlock, Error> for ClusterBlock {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        ensure_space(data, 3)?;
        write_u16(data, 0, self.cluster)?;
        data[2] = self.length;
        Ok(3)
    }

    /// Fails with `InvalidFrame` when the records do not fit in `data`
    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        let (cluster, _) = read_u16(data, 0).map_err(|_| Error::InvalidFrame)?;
        let length = *data.get(2).ok_or(Error::InvalidFrame)?;
        if data.len() < 3 + length as usize {
            return Err(Error::InvalidFrame);
        }
        Ok((ClusterBlock { cluster, length }, 3))
    }
}

/// Attribute identifiers of a read attributes cluster record
pub fn read_attribute_identifiers(
    data: &[u8],
) -> Result<Vec<u16, MAX_ATTRIBUTE_IDENTIFIERS>, Error> {
    if data.len() % 2 != 0 {
        return Err(Error::InvalidFrame);
    }
    let mut identifiers = Vec::new();
    for chunk in data.chunks_exact(2) {
        let (identifier, _) = read_u16(chunk, 0)?;
        identifiers
            .push(identifier)
            .map_err(|_| Error::InvalidFrame)?;
    }
    Ok(identifiers)
}

fn parse_write_record(
    data: &[u8],
    manufacturer: Option<u16>,
    attributes: &[AttributeRecord],
) -> Result<(usize, AttributeValue, usize), Error> {
    let (identifier, _) = read_u16(data, 0).map_err(|_| Error::InvalidFrame)?;
    let data_type = *data.get(2).ok_or(Error::InvalidFrame)?;
    let index = attributes
        .iter()
        .position(|a| a.identifier == identifier && a.manufacturer() == manufacturer)
        .ok_or(Error::InvalidFrame)?;
    let data_type = AttributeDataType::try_from(data_type).map_err(|_| Error::InvalidFrame)?;
    if data_type != attributes[index].data_type() {
        return Err(Error::InvalidFrame);
    }
    if attributes[index].access.contains(AccessFlags::READ_ONLY) {
        return Err(Error::InvalidValue);
    }
    let (value, used) = AttributeValue::unpack(&data[3..], data_type).map_err(|_| Error::InvalidFrame)?;
    Ok((index, value, 3 + used))
}

/// Apply the records of a write attributes cluster record to `attributes`
///
/// Only attributes with the `manufacturer` code of the command header are
/// candidates. Every record is checked before any attribute is changed.
/// Truncated records, unknown identifiers and data types that differ from
/// the attribute's type fail with `InvalidFrame`, writing a read only
/// attribute with `InvalidValue`. Returns the number of attributes written.
pub fn write_attributes(
    data: &[u8],
    manufacturer: Option<u16>,
    attributes: &mut [AttributeRecord],
) -> Result<usize, Error> {
    let mut offset = 0;
    while offset < data.len() {
        let (_, _, used) = parse_write_record(&data[offset..], manufacturer, attributes)?;
        offset += used;
    }
    let mut offset = 0;
    let mut count = 0;
    while offset < data.len() {
        let (index, value, used) =
            parse_write_record(&data[offset..], manufacturer, attributes)?;
        attributes[index].value = value;
        offset += used;
        count += 1;
    }
    Ok(count)
}
