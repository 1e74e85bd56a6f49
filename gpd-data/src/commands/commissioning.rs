//! Commissioning and commissioning reply payloads

use heapless::Vec;

use crate::command::CommandIdentifier;
use crate::common::key::{Key, KEY_SIZE};
use crate::device::{
    ApplicationInformation, CommissioningOptions, DeviceConfig, DeviceIdentifier,
    ExtendedOptions, KeyType, SecurityLevel, MAX_CLUSTERS, MAX_COMMANDS,
};
use crate::pack::{Pack, PackFixed};
use crate::utils::{ensure_length, ensure_space, read_u16, read_u32, write_u16, write_u32};
use crate::Error;

/// Commissioning GPDF payload
///
/// Optional fields are written when the corresponding option flag is set.
#[derive(Clone, Debug, PartialEq)]
pub struct Commissioning {
    /// Device type
    pub device_id: DeviceIdentifier,
    /// Options
    pub options: CommissioningOptions,
    /// Extended options, used when `options.extended_options_present`
    pub extended_options: ExtendedOptions,
    /// Device key, possibly encrypted
    pub key: Option<Key>,
    /// MIC of the encrypted key
    pub key_mic: Option<u32>,
    /// Outgoing frame counter
    pub outgoing_counter: Option<u32>,
    /// Application information, used when `options.application_info_present`
    pub application_information: ApplicationInformation,
    /// Manufacturer identifier
    pub manufacturer_id: u16,
    /// Model identifier
    pub model_id: u16,
    /// Commands the device may send
    pub commands: Vec<CommandIdentifier, MAX_COMMANDS>,
    /// Server clusters
    pub server_clusters: Vec<u16, MAX_CLUSTERS>,
    /// Client clusters
    pub client_clusters: Vec<u16, MAX_CLUSTERS>,
}

impl Commissioning {
    /// Commissioning payload announcing `config`
    ///
    /// `key` and `key_mic` are what goes on the air, the key already
    /// encrypted when key encryption is configured.
    pub fn from_config(
        config: &DeviceConfig,
        key: Option<Key>,
        key_mic: Option<u32>,
        outgoing_counter: u32,
    ) -> Self {
        let extended = &config.extended_options;
        Self {
            device_id: config.device_id,
            options: config.options,
            extended_options: config.extended_options,
            key: if extended.key_present { key } else { None },
            key_mic: if extended.key_present && extended.key_encryption {
                key_mic
            } else {
                None
            },
            outgoing_counter: if extended.outgoing_counter_present {
                Some(outgoing_counter)
            } else {
                None
            },
            application_information: config.application_information,
            manufacturer_id: config.manufacturer,
            model_id: config.model,
            commands: config.commands.clone(),
            server_clusters: config.server_clusters.clone(),
            client_clusters: config.client_clusters.clone(),
        }
    }
}

impl Pack<Commissioning, Error> for Commissioning {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        ensure_space(data, 2)?;
        data[0] = self.device_id.into();
        self.options.pack(&mut data[1..2])?;
        let mut offset = 2;
        if self.options.extended_options_present {
            let extended = &self.extended_options;
            ensure_space(data, offset + 1)?;
            extended.pack(&mut data[offset..=offset])?;
            offset += 1;
            if extended.key_present {
                let key = self.key.ok_or(Error::InvalidValue)?;
                ensure_space(data, offset + KEY_SIZE)?;
                key.pack(&mut data[offset..offset + KEY_SIZE])?;
                offset += KEY_SIZE;
                if extended.key_encryption {
                    offset = write_u32(data, offset, self.key_mic.ok_or(Error::InvalidValue)?)?;
                }
            }
            if extended.outgoing_counter_present {
                let counter = self.outgoing_counter.ok_or(Error::InvalidValue)?;
                offset = write_u32(data, offset, counter)?;
            }
        }
        if self.options.application_info_present {
            let info = &self.application_information;
            if info.switch_info_present {
                return Err(Error::InvalidValue);
            }
            ensure_space(data, offset + 1)?;
            info.pack(&mut data[offset..=offset])?;
            offset += 1;
            if info.manufacturer_id_present {
                offset = write_u16(data, offset, self.manufacturer_id)?;
            }
            if info.model_id_present {
                offset = write_u16(data, offset, self.model_id)?;
            }
            if info.commands_present {
                ensure_space(data, offset + 1 + self.commands.len())?;
                data[offset] = self.commands.len() as u8;
                offset += 1;
                for command in self.commands.iter() {
                    data[offset] = (*command).into();
                    offset += 1;
                }
            }
            if info.cluster_list_present {
                ensure_space(data, offset + 1)?;
                data[offset] = self.server_clusters.len() as u8
                    | (self.client_clusters.len() as u8) << 4;
                offset += 1;
                for cluster in self.server_clusters.iter().chain(self.client_clusters.iter()) {
                    offset = write_u16(data, offset, *cluster)?;
                }
            }
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        ensure_length(data, 2)?;
        let device_id = DeviceIdentifier::try_from(data[0])?;
        let options = CommissioningOptions::unpack(&data[1..2])?;
        let mut offset = 2;
        let mut extended_options = ExtendedOptions::default();
        let mut key = None;
        let mut key_mic = None;
        let mut outgoing_counter = None;
        if options.extended_options_present {
            ensure_length(data, offset + 1)?;
            extended_options = ExtendedOptions::unpack(&data[offset..=offset])?;
            offset += 1;
            if extended_options.key_present {
                ensure_length(data, offset + KEY_SIZE)?;
                key = Some(Key::unpack(&data[offset..offset + KEY_SIZE])?);
                offset += KEY_SIZE;
                if extended_options.key_encryption {
                    let (mic, used) = read_u32(data, offset)?;
                    key_mic = Some(mic);
                    offset = used;
                }
            }
            if extended_options.outgoing_counter_present {
                let (counter, used) = read_u32(data, offset)?;
                outgoing_counter = Some(counter);
                offset = used;
            }
        }
        let mut commissioning = Self {
            device_id,
            options,
            extended_options,
            key,
            key_mic,
            outgoing_counter,
            application_information: ApplicationInformation::default(),
            manufacturer_id: 0,
            model_id: 0,
            commands: Vec::new(),
            server_clusters: Vec::new(),
            client_clusters: Vec::new(),
        };
        if options.application_info_present {
            ensure_length(data, offset + 1)?;
            let info = ApplicationInformation::unpack(&data[offset..=offset])?;
            offset += 1;
            if info.manufacturer_id_present {
                let (value, used) = read_u16(data, offset)?;
                commissioning.manufacturer_id = value;
                offset = used;
            }
            if info.model_id_present {
                let (value, used) = read_u16(data, offset)?;
                commissioning.model_id = value;
                offset = used;
            }
            if info.commands_present {
                ensure_length(data, offset + 1)?;
                let count = data[offset] as usize;
                offset += 1;
                ensure_length(data, offset + count)?;
                for identifier in data[offset..offset + count].iter() {
                    let command = CommandIdentifier::try_from(*identifier)?;
                    commissioning
                        .commands
                        .push(command)
                        .map_err(|_| Error::InvalidValue)?;
                }
                offset += count;
            }
            if info.cluster_list_present {
                ensure_length(data, offset + 1)?;
                let servers = (data[offset] & 0x0f) as usize;
                let clients = (data[offset] >> 4) as usize;
                offset += 1;
                for n in 0..servers + clients {
                    let (cluster, used) = read_u16(data, offset)?;
                    offset = used;
                    let list = if n < servers {
                        &mut commissioning.server_clusters
                    } else {
                        &mut commissioning.client_clusters
                    };
                    list.push(cluster).map_err(|_| Error::InvalidValue)?;
                }
            }
            if info.switch_info_present {
                return Err(Error::InvalidValue);
            }
            commissioning.application_information = info;
        }
        Ok((commissioning, offset))
    }
}

/// Protection of a key carried in a commissioning reply
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyProtection {
    /// MIC of the encrypted key
    pub mic: u32,
    /// Frame counter used for the key encryption nonce
    pub frame_counter: u32,
}

/// Commissioning reply payload
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommissioningReply {
    /// PAN identifier of the network
    pub pan_id: Option<u16>,
    /// Key to use, possibly encrypted
    pub key: Option<Key>,
    /// Set when the key is encrypted
    pub key_protection: Option<KeyProtection>,
    /// Security level to use
    pub security_level: SecurityLevel,
    /// Type of the key
    pub key_type: KeyType,
}

impl Pack<CommissioningReply, Error> for CommissioningReply {
    fn pack(&self, data: &mut [u8]) -> Result<usize, Error> {
        if self.key_protection.is_some() && self.key.is_none() {
            return Err(Error::InvalidValue);
        }
        ensure_space(data, 1)?;
        data[0] = self.pan_id.is_some() as u8
            | (self.key.is_some() as u8) << 1
            | (self.key_protection.is_some() as u8) << 2
            | u8::from(self.security_level) << 3
            | u8::from(self.key_type) << 5;
        let mut offset = 1;
        if let Some(pan_id) = self.pan_id {
            offset = write_u16(data, offset, pan_id)?;
        }
        if let Some(key) = self.key {
            ensure_space(data, offset + KEY_SIZE)?;
            key.pack(&mut data[offset..offset + KEY_SIZE])?;
            offset += KEY_SIZE;
        }
        if let Some(protection) = self.key_protection {
            offset = write_u32(data, offset, protection.mic)?;
            offset = write_u32(data, offset, protection.frame_counter)?;
        }
        Ok(offset)
    }

    fn unpack(data: &[u8]) -> Result<(Self, usize), Error> {
        ensure_length(data, 1)?;
        let options = data[0];
        let security_level = SecurityLevel::try_from((options >> 3) & 0b11)?;
        let key_type = KeyType::try_from(options >> 5)?;
        let mut offset = 1;
        let pan_id = if options & 0x01 != 0 {
            let (pan_id, used) = read_u16(data, offset)?;
            offset = used;
            Some(pan_id)
        } else {
            None
        };
        let key = if options & 0x02 != 0 {
            ensure_length(data, offset + KEY_SIZE)?;
            let key = Key::unpack(&data[offset..offset + KEY_SIZE])?;
            offset += KEY_SIZE;
            Some(key)
        } else {
            None
        };
        let key_protection = if key.is_some() && options & 0x04 != 0 {
            let (mic, used) = read_u32(data, offset)?;
            let (frame_counter, used) = read_u32(data, used)?;
            offset = used;
            Some(KeyProtection { mic, frame_counter })
        } else {
            None
        };
        Ok((
            Self {
                pan_id,
                key,
                key_protection,
                security_level,
                key_type,
            },
            offset,
        ))
    }
}
