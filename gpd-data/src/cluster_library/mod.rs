//! # Cluster Library (ZCL)
//!
//! Attribute records and the Green Power attribute commands. Cluster
//! behaviour is left to the application.

mod attribute;
pub mod commands;

pub use attribute::{AttributeDataType, AttributeValue, StringValue, MAX_STRING_LENGTH};

use bitflags::bitflags;

/// Manufacturer code of attributes that are not manufacturer specific
pub const NON_MANUFACTURER_SPECIFIC: u16 = 0xffff;
/// Global cluster revision attribute
pub const ATTRIBUTE_CLUSTER_REVISION: u16 = 0xfffd;

/// Cluster identifiers
pub mod cluster {
    /// Basic
    pub const BASIC: u16 = 0x0000;
    /// Power configuration
    pub const POWER_CONFIGURATION: u16 = 0x0001;
    /// Identify
    pub const IDENTIFY: u16 = 0x0003;
    /// Scenes
    pub const SCENES: u16 = 0x0005;
    /// On/off
    pub const ON_OFF: u16 = 0x0006;
    /// Poll control
    pub const POLL_CONTROL: u16 = 0x0020;
    /// IAS zone
    pub const IAS_ZONE: u16 = 0x0500;
}

/// Power configuration attribute identifiers
pub mod power_configuration {
    /// Battery voltage, in 100 mV
    pub const BATTERY_VOLTAGE: u16 = 0x0020;
    /// Battery size
    pub const BATTERY_SIZE: u16 = 0x0031;
    /// Battery quantity
    pub const BATTERY_QUANTITY: u16 = 0x0033;
    /// Battery rated voltage, in 100 mV
    pub const BATTERY_RATED_VOLTAGE: u16 = 0x0034;
    /// Battery alarm mask
    pub const BATTERY_ALARM_MASK: u16 = 0x0035;
    /// Battery voltage minimum threshold, in 100 mV
    pub const BATTERY_VOLTAGE_MIN_THRESHOLD: u16 = 0x0036;
    /// Battery size, built in
    pub const BATTERY_SIZE_BUILT_IN: u8 = 0x02;
}

/// IAS zone attribute identifiers
pub mod ias_zone {
    /// Zone state
    pub const ZONE_STATE: u16 = 0x0000;
    /// Zone type
    pub const ZONE_TYPE: u16 = 0x0001;
    /// Zone status
    pub const ZONE_STATUS: u16 = 0x0002;
    /// IAS CIE address
    pub const IAS_CIE_ADDRESS: u16 = 0x0010;
    /// Zone identifier
    pub const ZONE_ID: u16 = 0x0011;
}

extended_enum!(
    /// Cluster library status codes used in attribute responses
    ClusterLibraryStatus, u8,
    /// Operation was successful.
    Success => 0x00,
    /// Operation was not successful.
    Failure => 0x01,
    /// The specified attribute does not exist on the device.
    UnsupportedAttribute => 0x86,
    /// Out of range error, or set to a reserved value.
    InvalidValue => 0x87,
    /// Attempt to write a read only attribute.
    ReadOnly => 0x88,
    /// The data type given for an attribute is incorrect.
    InvalidDataType => 0x8d,
    /// Attempt to read a write only attribute.
    WriteOnly => 0x8f,
);

bitflags! {
    /// Attribute access flags
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AccessFlags: u8 {
        /// Read only
        const READ_ONLY = 0x01;
        /// Write only
        const WRITE_ONLY = 0x02;
        /// Reportable
        const REPORTING = 0x04;
        /// Shared between endpoints
        const SINGLETON = 0x08;
        /// Part of a scene
        const SCENE = 0x10;
        /// Manufacturer specific
        const MANUFACTURER_SPECIFIC = 0x20;
        /// Not exposed over the air
        const INTERNAL = 0x40;
    }
}

/// Attribute held by the application
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeRecord {
    /// Attribute identifier
    pub identifier: u16,
    /// Access flags
    pub access: AccessFlags,
    /// Manufacturer code, `NON_MANUFACTURER_SPECIFIC` for standard attributes
    pub manufacturer_code: u16,
    /// Current value, which also gives the data type
    pub value: AttributeValue,
}

impl AttributeRecord {
    /// Standard attribute
    pub fn new(identifier: u16, access: AccessFlags, value: AttributeValue) -> Self {
        Self {
            identifier,
            access,
            manufacturer_code: NON_MANUFACTURER_SPECIFIC,
            value,
        }
    }

    /// Manufacturer specific attribute
    pub fn manufacturer_specific(
        identifier: u16,
        access: AccessFlags,
        manufacturer_code: u16,
        value: AttributeValue,
    ) -> Self {
        Self {
            identifier,
            access: access | AccessFlags::MANUFACTURER_SPECIFIC,
            manufacturer_code,
            value,
        }
    }

    /// Data type of the attribute
    pub fn data_type(&self) -> AttributeDataType {
        self.value.data_type()
    }

    /// Manufacturer code when the attribute is manufacturer specific
    pub fn manufacturer(&self) -> Option<u16> {
        if self.access.contains(AccessFlags::MANUFACTURER_SPECIFIC) {
            Some(self.manufacturer_code)
        } else {
            None
        }
    }
}

/// Find attribute `identifier` in `attributes`
pub fn find_attribute(attributes: &[AttributeRecord], identifier: u16) -> Option<&AttributeRecord> {
    attributes.iter().find(|a| a.identifier == identifier)
}
