//! Device configuration file
//!
//! ```toml
//! [device]
//! source_id = 0x12345678
//! device_id = 0x02
//! commands = [0x20, 0x21, 0x22]
//!
//! [security]
//! level = 3
//! key_type = 4
//! key = "c0c1c2c3c4c5c6c7c8c9cacbcccdcecf"
//!
//! [schedule]
//! channels = [11, 15, 20, 25]
//! group_size = 2
//! repetitions = 3
//! ```

use std::str::FromStr;
use std::string::String;
use std::vec::Vec;

use serde_derive::Deserialize;

use gpd_data::{
    command::CommandIdentifier,
    device::{
        ApplicationInformation, DeviceConfig, DeviceIdentifier, GpdAddress, KeyType,
        SecurityLevel,
    },
    ExtendedAddress, Key,
};

use crate::{CommissioningMode, Error, PowerMode, TxSchedule, DEFAULT_RX_TIMEOUT};

#[derive(Debug, Deserialize)]
struct DeviceSection {
    source_id: Option<u32>,
    ieee_address: Option<String>,
    endpoint: Option<u8>,
    device_id: u8,
    manufacturer: Option<u16>,
    model: Option<u16>,
    #[serde(default)]
    commands: Vec<u8>,
    #[serde(default)]
    server_clusters: Vec<u16>,
    #[serde(default)]
    client_clusters: Vec<u16>,
    #[serde(default)]
    rx_on: bool,
    #[serde(default)]
    mac_sequence_number: bool,
    #[serde(default)]
    pan_id_request: bool,
    #[serde(default)]
    security_key_request: bool,
    #[serde(default)]
    fixed_location: bool,
}

#[derive(Debug, Deserialize)]
struct SecuritySection {
    level: u8,
    key_type: u8,
    key: Option<String>,
    #[serde(default)]
    key_in_commissioning: bool,
    #[serde(default)]
    key_encryption: bool,
    #[serde(default = "default_true")]
    outgoing_counter: bool,
}

#[derive(Debug, Deserialize)]
struct ScheduleSection {
    channels: Vec<u8>,
    group_size: u8,
    repetitions: u8,
}

#[derive(Debug, Default, Deserialize)]
struct ModeSection {
    #[serde(default)]
    batteryless: bool,
    rx_timeout: Option<u32>,
}

fn default_true() -> bool {
    true
}

/// Device configuration read from TOML
#[derive(Debug, Deserialize)]
pub struct Configuration {
    device: DeviceSection,
    security: Option<SecuritySection>,
    schedule: ScheduleSection,
    #[serde(default)]
    mode: ModeSection,
}

impl FromStr for Configuration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str::<Configuration>(s).map_err(|error| {
            log::error!("Failed to parse configuration, {}", error);
            Error::InvalidConfiguration
        })
    }
}

fn invalid<E: core::fmt::Debug>(error: E) -> Error {
    log::error!("Invalid configuration, {:?}", error);
    Error::InvalidConfiguration
}

impl Configuration {
    fn address(&self) -> Result<GpdAddress, Error> {
        let device = &self.device;
        match (device.source_id, &device.ieee_address) {
            (Some(source_id), None) => Ok(GpdAddress::SourceId(source_id)),
            (None, Some(address)) => {
                let address = u64::from_str_radix(address, 16).map_err(invalid)?;
                Ok(GpdAddress::Ieee {
                    address: ExtendedAddress::new(address),
                    endpoint: device.endpoint.unwrap_or(0x01),
                })
            }
            _ => Err(invalid("exactly one of source_id and ieee_address is required")),
        }
    }

    /// Static device configuration, validated
    pub fn device_config(&self) -> Result<DeviceConfig, Error> {
        let device = &self.device;
        let device_id = DeviceIdentifier::try_from(device.device_id).map_err(invalid)?;
        let mut config = DeviceConfig::new(self.address()?, device_id);
        config.options.rx_on_capability = device.rx_on;
        config.options.mac_sequence_number_capability = device.mac_sequence_number;
        config.options.pan_id_request = device.pan_id_request;
        config.options.security_key_request = device.security_key_request;
        config.options.fixed_location = device.fixed_location;

        if let Some(security) = &self.security {
            config.options.extended_options_present = true;
            let extended = &mut config.extended_options;
            extended.security_level_capabilities =
                SecurityLevel::try_from(security.level).map_err(invalid)?;
            extended.key_type = KeyType::try_from(security.key_type).map_err(invalid)?;
            extended.key_present = security.key_in_commissioning;
            extended.key_encryption = security.key_in_commissioning && security.key_encryption;
            extended.outgoing_counter_present = security.outgoing_counter;
        }

        let info = &mut config.application_information;
        if let Some(manufacturer) = device.manufacturer {
            info.manufacturer_id_present = true;
            config.manufacturer = manufacturer;
        }
        if let Some(model) = device.model {
            info.model_id_present = true;
            config.model = model;
        }
        for identifier in device.commands.iter() {
            let command = CommandIdentifier::try_from(*identifier).map_err(invalid)?;
            config.commands.push(command).map_err(invalid)?;
        }
        info.commands_present = !config.commands.is_empty();
        config
            .server_clusters
            .extend_from_slice(&device.server_clusters)
            .map_err(invalid)?;
        config
            .client_clusters
            .extend_from_slice(&device.client_clusters)
            .map_err(invalid)?;
        info.cluster_list_present =
            !config.server_clusters.is_empty() || !config.client_clusters.is_empty();
        config.options.application_info_present =
            config.application_information != ApplicationInformation::default();

        config.validate().map_err(invalid)?;
        Ok(config)
    }

    pub fn schedule(&self) -> Result<TxSchedule, Error> {
        let schedule = &self.schedule;
        TxSchedule::new(&schedule.channels, schedule.group_size, schedule.repetitions)
    }

    /// Pre-installed device key
    pub fn key(&self) -> Result<Option<Key>, Error> {
        match self.security.as_ref().and_then(|s| s.key.as_ref()) {
            Some(key) => Ok(Some(Key::from_str(key).map_err(invalid)?)),
            None => Ok(None),
        }
    }

    pub fn mode(&self) -> CommissioningMode {
        if self.device.rx_on {
            CommissioningMode::Bidirectional
        } else {
            CommissioningMode::Unidirectional
        }
    }

    pub fn power_mode(&self) -> PowerMode {
        if self.mode.batteryless {
            PowerMode::Batteryless
        } else {
            PowerMode::Battery
        }
    }

    /// Receive window in milliseconds
    pub fn rx_timeout(&self) -> u32 {
        self.mode.rx_timeout.unwrap_or(DEFAULT_RX_TIMEOUT)
    }
}
