//! # Device identity and commissioning configuration
//!
//! The static description of a Green Power device, as announced in the
//! commissioning GPDF.

use heapless::Vec;

use crate::command::CommandIdentifier;
use crate::common::address::{ExtendedAddress, SOURCE_IDENTIFIER_ALL, SOURCE_IDENTIFIER_UNSPECIFIED};
use crate::pack::PackFixed;
use crate::Error;

/// Maximum number of commands announced in the commissioning GPDF
pub const MAX_COMMANDS: usize = 32;
/// Maximum number of server or client clusters, the count is a nibble
pub const MAX_CLUSTERS: usize = 15;

extended_enum!(
    /// Green Power device type, announced during commissioning
    DeviceIdentifier, u8,
    /// Simple generic 1-state switch
    SimpleGenericOneStateSwitch => 0x00,
    /// Simple generic 2-state switch
    SimpleGenericTwoStateSwitch => 0x01,
    /// On/off switch
    OnOffSwitch => 0x02,
    /// Level control switch
    LevelControlSwitch => 0x03,
    /// Simple sensor
    SimpleSensor => 0x04,
    /// Advanced generic 1-state switch
    AdvancedGenericOneStateSwitch => 0x05,
    /// Advanced generic 2-state switch
    AdvancedGenericTwoStateSwitch => 0x06,
    /// Generic 8-contact switch
    GenericEightContactSwitch => 0x07,
    /// Color dimmer switch
    ColorDimmerSwitch => 0x10,
    /// Light sensor
    LightSensor => 0x11,
    /// Occupancy sensor
    OccupancySensor => 0x12,
    /// Door lock controller
    DoorLockController => 0x20,
    /// Temperature sensor
    TemperatureSensor => 0x30,
    /// Pressure sensor
    PressureSensor => 0x31,
    /// Flow sensor
    FlowSensor => 0x32,
    /// Temperature and humidity sensor
    EnvironmentSensor => 0x33,
    /// Manufacturer specific
    ManufacturerSpecific => 0xfe,
    /// Undefined device type
    Undefined => 0xff,
);

extended_enum!(
    /// Addressing mode of the device
    ApplicationId, u8,
    /// Addressed by 32-bit source identifier
    SourceId => 0b000,
    /// Addressed by IEEE address and endpoint
    Ieee => 0b010,
);

extended_enum!(
    /// GPDF security level
    SecurityLevel, u8,
    /// No security
    None => 0b00,
    /// 1 octet frame counter and 2 octet MIC, deprecated and not supported
    Reduced => 0b01,
    /// 4 octet frame counter and 4 octet MIC
    Full => 0b10,
    /// Encryption, 4 octet frame counter and 4 octet MIC
    FullEncrypted => 0b11,
);

impl SecurityLevel {
    /// Frames carry a frame counter and a MIC
    pub fn is_secured(self) -> bool {
        matches!(self, SecurityLevel::Full | SecurityLevel::FullEncrypted)
    }
}

extended_enum!(
    /// Security key type
    KeyType, u8,
    /// No key
    NoKey => 0b000,
    /// Zigbee network key
    NetworkKey => 0b001,
    /// Green Power group key
    GroupKey => 0b010,
    /// Group key derived from the network key
    NetworkDerivedGroupKey => 0b011,
    /// Out-of-box individual key
    IndividualKey => 0b100,
    /// Individual key derived from the group key
    DerivedIndividualKey => 0b111,
);

impl KeyType {
    /// The key is individual to the device, which selects the security key
    /// bit in the extended frame control
    pub fn is_individual(self) -> bool {
        matches!(self, KeyType::IndividualKey | KeyType::DerivedIndividualKey)
    }
}

const OPTION_MAC_SEQUENCE_NUMBER: u8 = 0x01;
const OPTION_RX_ON: u8 = 0x02;
const OPTION_APPLICATION_INFORMATION: u8 = 0x04;
const OPTION_PAN_ID_REQUEST: u8 = 0x10;
const OPTION_SECURITY_KEY_REQUEST: u8 = 0x20;
const OPTION_FIXED_LOCATION: u8 = 0x40;
const OPTION_EXTENDED_OPTIONS: u8 = 0x80;

/// Commissioning options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommissioningOptions {
    /// MAC sequence numbers are incremental instead of random
    pub mac_sequence_number_capability: bool,
    /// The device can receive in operational mode
    pub rx_on_capability: bool,
    /// Application information field follows
    pub application_info_present: bool,
    /// The device requests a PAN identifier
    pub pan_id_request: bool,
    /// The device requests a Green Power security key
    pub security_key_request: bool,
    /// The device will not change its location
    pub fixed_location: bool,
    /// Extended options field follows
    pub extended_options_present: bool,
}

impl PackFixed<CommissioningOptions, Error> for CommissioningOptions {
    fn pack(&self, data: &mut [u8]) -> Result<(), Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = self.mac_sequence_number_capability as u8
            | (self.rx_on_capability as u8) << 1
            | (self.application_info_present as u8) << 2
            | (self.pan_id_request as u8) << 4
            | (self.security_key_request as u8) << 5
            | (self.fixed_location as u8) << 6
            | (self.extended_options_present as u8) << 7;
        Ok(())
    }

    fn unpack(data: &[u8]) -> Result<Self, Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        let byte = data[0];
        Ok(Self {
            mac_sequence_number_capability: byte & OPTION_MAC_SEQUENCE_NUMBER != 0,
            rx_on_capability: byte & OPTION_RX_ON != 0,
            application_info_present: byte & OPTION_APPLICATION_INFORMATION != 0,
            pan_id_request: byte & OPTION_PAN_ID_REQUEST != 0,
            security_key_request: byte & OPTION_SECURITY_KEY_REQUEST != 0,
            fixed_location: byte & OPTION_FIXED_LOCATION != 0,
            extended_options_present: byte & OPTION_EXTENDED_OPTIONS != 0,
        })
    }
}

/// Commissioning extended options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtendedOptions {
    /// Highest security level the device supports
    pub security_level_capabilities: SecurityLevel,
    /// Key type in use
    pub key_type: KeyType,
    /// The key is carried in the commissioning GPDF
    pub key_present: bool,
    /// The carried key is encrypted
    pub key_encryption: bool,
    /// The outgoing frame counter is carried in the commissioning GPDF
    pub outgoing_counter_present: bool,
}

impl Default for ExtendedOptions {
    fn default() -> Self {
        Self {
            security_level_capabilities: SecurityLevel::None,
            key_type: KeyType::NoKey,
            key_present: false,
            key_encryption: false,
            outgoing_counter_present: false,
        }
    }
}

impl PackFixed<ExtendedOptions, Error> for ExtendedOptions {
    fn pack(&self, data: &mut [u8]) -> Result<(), Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = u8::from(self.security_level_capabilities)
            | u8::from(self.key_type) << 2
            | (self.key_present as u8) << 5
            | (self.key_encryption as u8) << 6
            | (self.outgoing_counter_present as u8) << 7;
        Ok(())
    }

    fn unpack(data: &[u8]) -> Result<Self, Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        let byte = data[0];
        Ok(Self {
            security_level_capabilities: SecurityLevel::try_from(byte & 0b11)?,
            key_type: KeyType::try_from((byte >> 2) & 0b111)?,
            key_present: (byte >> 5) & 0b1 == 1,
            key_encryption: (byte >> 6) & 0b1 == 1,
            outgoing_counter_present: (byte >> 7) & 0b1 == 1,
        })
    }
}

/// Commissioning application information
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplicationInformation {
    /// Manufacturer identifier follows
    pub manufacturer_id_present: bool,
    /// Model identifier follows
    pub model_id_present: bool,
    /// Command list follows
    pub commands_present: bool,
    /// Cluster list follows
    pub cluster_list_present: bool,
    /// Switch information follows
    pub switch_info_present: bool,
    /// An application description command will follow the commissioning GPDF
    pub application_description_follows: bool,
}

impl PackFixed<ApplicationInformation, Error> for ApplicationInformation {
    fn pack(&self, data: &mut [u8]) -> Result<(), Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        data[0] = self.manufacturer_id_present as u8
            | (self.model_id_present as u8) << 1
            | (self.commands_present as u8) << 2
            | (self.cluster_list_present as u8) << 3
            | (self.switch_info_present as u8) << 4
            | (self.application_description_follows as u8) << 5;
        Ok(())
    }

    fn unpack(data: &[u8]) -> Result<Self, Error> {
        if data.len() != 1 {
            return Err(Error::WrongNumberOfBytes);
        }
        let byte = data[0];
        Ok(Self {
            manufacturer_id_present: byte & 0x01 != 0,
            model_id_present: byte & 0x02 != 0,
            commands_present: byte & 0x04 != 0,
            cluster_list_present: byte & 0x08 != 0,
            switch_info_present: byte & 0x10 != 0,
            application_description_follows: byte & 0x20 != 0,
        })
    }
}

/// How the device is addressed on the air
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GpdAddress {
    /// 32-bit source identifier, application id 0
    SourceId(u32),
    /// IEEE address and endpoint, application id 2
    Ieee {
        /// IEEE address
        address: ExtendedAddress,
        /// Endpoint
        endpoint: u8,
    },
}

impl GpdAddress {
    /// Application id matching the addressing mode
    pub fn application_id(&self) -> ApplicationId {
        match self {
            GpdAddress::SourceId(_) => ApplicationId::SourceId,
            GpdAddress::Ieee { .. } => ApplicationId::Ieee,
        }
    }
}

/// Static device configuration
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceConfig {
    /// Manufacturer identifier
    pub manufacturer: u16,
    /// Model identifier
    pub model: u16,
    /// Device address
    pub address: GpdAddress,
    /// Device type
    pub device_id: DeviceIdentifier,
    /// Commissioning options
    pub options: CommissioningOptions,
    /// Commissioning extended options
    pub extended_options: ExtendedOptions,
    /// Commissioning application information
    pub application_information: ApplicationInformation,
    /// Commands the device may send
    pub commands: Vec<CommandIdentifier, MAX_COMMANDS>,
    /// Server clusters
    pub server_clusters: Vec<u16, MAX_CLUSTERS>,
    /// Client clusters
    pub client_clusters: Vec<u16, MAX_CLUSTERS>,
}

impl DeviceConfig {
    /// Create a configuration with no optional fields announced
    pub fn new(address: GpdAddress, device_id: DeviceIdentifier) -> Self {
        Self {
            manufacturer: 0,
            model: 0,
            address,
            device_id,
            options: CommissioningOptions::default(),
            extended_options: ExtendedOptions::default(),
            application_information: ApplicationInformation::default(),
            commands: Vec::new(),
            server_clusters: Vec::new(),
            client_clusters: Vec::new(),
        }
    }

    /// Application id of the device
    pub fn application_id(&self) -> ApplicationId {
        self.address.application_id()
    }

    /// Security level the device operates at
    pub fn security_level(&self) -> SecurityLevel {
        if self.options.extended_options_present {
            self.extended_options.security_level_capabilities
        } else {
            SecurityLevel::None
        }
    }

    /// Check that the flags agree with the configured lists and values
    pub fn validate(&self) -> Result<(), Error> {
        if let GpdAddress::SourceId(source) = self.address {
            if source == SOURCE_IDENTIFIER_UNSPECIFIED || source == SOURCE_IDENTIFIER_ALL {
                return Err(Error::InvalidValue);
            }
        }
        let level = self.extended_options.security_level_capabilities;
        if level == SecurityLevel::Reduced {
            return Err(Error::UnsupportedSecurityLevel);
        }
        if !self.options.extended_options_present
            && (level != SecurityLevel::None || self.extended_options != ExtendedOptions::default())
        {
            return Err(Error::InvalidValue);
        }
        if level.is_secured() && self.extended_options.key_type == KeyType::NoKey {
            return Err(Error::InvalidValue);
        }
        let info = &self.application_information;
        if !self.options.application_info_present && *info != ApplicationInformation::default() {
            return Err(Error::InvalidValue);
        }
        if info.switch_info_present {
            return Err(Error::InvalidValue);
        }
        if info.commands_present && self.commands.is_empty() {
            return Err(Error::InvalidValue);
        }
        if info.cluster_list_present
            && self.server_clusters.is_empty()
            && self.client_clusters.is_empty()
        {
            return Err(Error::InvalidValue);
        }
        Ok(())
    }
}
