//! Attribute commands sent by a sink
//!
//! Read attributes are answered with a read attributes response per cluster
//! record, write attributes update the application's attribute store.

use heapless::Vec;

use gpd_crypto::CryptoBackend;
use gpd_data::{
    cluster_library::{
        commands::{
            read_attribute_identifiers, write_attributes, AttributeCommandHeader, ClusterBlock,
            ReadAttributesResponse,
        },
        AttributeRecord,
    },
    command::CommandIdentifier,
    pack::Pack,
};

use crate::{Command, Error, GpdContext, Platform, ReceivedCommand};

/// Attributes the application exposes, per cluster
pub trait AttributeStore {
    /// Attributes of `cluster`
    fn attributes(&self, cluster: u16) -> Option<&[AttributeRecord]>;
    /// Attributes of `cluster`, for writing
    fn attributes_mut(&mut self, cluster: u16) -> Option<&mut [AttributeRecord]>;
}

/// Attributes of a single cluster
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterAttributes<const N: usize> {
    pub cluster: u16,
    pub attributes: Vec<AttributeRecord, N>,
}

impl<const N: usize> ClusterAttributes<N> {
    pub fn new(cluster: u16, attributes: &[AttributeRecord]) -> Result<Self, Error> {
        let attributes = Vec::from_slice(attributes)
            .map_err(|_| Error::DataError(gpd_data::Error::NotEnoughSpace))?;
        Ok(Self {
            cluster,
            attributes,
        })
    }
}

impl<const N: usize> AttributeStore for [ClusterAttributes<N>] {
    fn attributes(&self, cluster: u16) -> Option<&[AttributeRecord]> {
        self.iter()
            .find(|c| c.cluster == cluster)
            .map(|c| &c.attributes[..])
    }

    fn attributes_mut(&mut self, cluster: u16) -> Option<&mut [AttributeRecord]> {
        self.iter_mut()
            .find(|c| c.cluster == cluster)
            .map(|c| &mut c.attributes[..])
    }
}

impl<P, CB> GpdContext<P, CB>
where
    P: Platform,
    CB: CryptoBackend,
{
    /// Handle a read or write attributes command received from a sink
    ///
    /// Returns the number of cluster records handled. Unknown clusters are
    /// answered with unsupported attribute status on read and rejected on
    /// write.
    pub fn handle_attribute_command<S>(
        &mut self,
        received: &ReceivedCommand,
        store: &mut S,
    ) -> Result<usize, Error>
    where
        S: AttributeStore + ?Sized,
    {
        let payload = &received.payload[..];
        let (header, mut offset) = AttributeCommandHeader::unpack(payload)?;
        let mut handled = 0;
        while offset < payload.len() {
            let (block, used) = ClusterBlock::unpack(&payload[offset..])?;
            offset += used;
            let records = &payload[offset..offset + block.length as usize];
            offset += block.length as usize;
            match received.command {
                CommandIdentifier::ReadAttributes => {
                    let requested = read_attribute_identifiers(records)?;
                    let attributes = store.attributes(block.cluster).unwrap_or(&[]);
                    log::info!(
                        "> Read attributes, cluster {:04x}, {} attributes",
                        block.cluster,
                        requested.len()
                    );
                    let response = ReadAttributesResponse {
                        cluster: block.cluster,
                        manufacturer: header.manufacturer,
                        requested: &requested,
                        attributes,
                    };
                    self.send_command(&Command::ReadAttributesResponse(response), false)?;
                }
                CommandIdentifier::WriteAttributes => {
                    let attributes = store
                        .attributes_mut(block.cluster)
                        .ok_or(Error::InvalidFrame)?;
                    let count = write_attributes(records, header.manufacturer, attributes)?;
                    log::info!(
                        "> Write attributes, cluster {:04x}, {} attributes",
                        block.cluster,
                        count
                    );
                }
                command => {
                    log::warn!("> {:?} is not an attribute command", command);
                    return Err(Error::InvalidFrame);
                }
            }
            handled += 1;
            if !header.multi_record() {
                break;
            }
        }
        Ok(handled)
    }
}
