//! Attribute commands exchanged between a device and a sink

mod attributes;

pub use attributes::{
    read_attribute_identifiers, write_attributes, AttributeCommandHeader, AttributeReport,
    AttributeRequest, ClusterBlock, ReadAttributesResponse, MAX_ATTRIBUTE_IDENTIFIERS,
    OPTION_MANUFACTURER_PRESENT, OPTION_MULTI_RECORD,
};
