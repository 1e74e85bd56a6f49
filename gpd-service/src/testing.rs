//! Fixtures shared by the service tests

use std::vec::Vec;

use gpd_crypto_rust_crypto::RustCryptoBackend;
use gpd_data::{
    command::CommandIdentifier,
    device::{DeviceConfig, DeviceIdentifier, GpdAddress, KeyType, SecurityLevel},
    frame::{
        self, Direction, ExtendedFrameControl, FrameControl, FrameType, GpdfHeader,
        MAX_FRAME_SIZE,
    },
    security::CryptoProvider,
    Key,
};

use crate::platform::mock::MockPlatform;
use crate::{GpdContext, TxSchedule};

pub const SOURCE_ID: u32 = 0x1234_5678;
pub const DEVICE_KEY: [u8; 16] = [
    0xc0, 0xc1, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xcb, 0xcc, 0xcd, 0xce, 0xcf,
];

pub type TestContext = GpdContext<MockPlatform, RustCryptoBackend>;

/// Unidirectional on/off switch without security
pub fn switch_config() -> DeviceConfig {
    DeviceConfig::new(GpdAddress::SourceId(SOURCE_ID), DeviceIdentifier::OnOffSwitch)
}

/// Bidirectional sensor with an individual key, operating at level 3
pub fn sensor_config() -> DeviceConfig {
    let mut config = DeviceConfig::new(
        GpdAddress::SourceId(SOURCE_ID),
        DeviceIdentifier::ManufacturerSpecific,
    );
    config.options.rx_on_capability = true;
    config.options.extended_options_present = true;
    config.extended_options.security_level_capabilities = SecurityLevel::FullEncrypted;
    config.extended_options.key_type = KeyType::IndividualKey;
    config.extended_options.key_present = true;
    config.extended_options.key_encryption = true;
    config.extended_options.outgoing_counter_present = true;
    config
}

pub fn context(config: DeviceConfig, schedule: TxSchedule) -> TestContext {
    GpdContext::new(
        MockPlatform::default(),
        RustCryptoBackend::default(),
        Some(Key::from(DEVICE_KEY)),
        config,
        schedule,
    )
    .unwrap()
}

/// Frame from a sink to the device
pub fn sink_frame(
    address: &GpdAddress,
    command: CommandIdentifier,
    payload: &[u8],
    security_level: SecurityLevel,
    key: &Key,
    frame_counter: u32,
) -> Vec<u8> {
    let (source_id, endpoint) = match address {
        GpdAddress::SourceId(source) => (Some(*source), None),
        GpdAddress::Ieee { endpoint, .. } => (None, Some(*endpoint)),
    };
    let header = GpdfHeader {
        frame_control: FrameControl {
            frame_type: FrameType::Data,
            auto_commissioning: false,
            extended: true,
        },
        extended_frame_control: Some(ExtendedFrameControl {
            application_id: address.application_id(),
            security_level,
            security_key: true,
            rx_after_tx: false,
            direction: Direction::ToDevice,
        }),
        source_id,
        endpoint,
        frame_counter: if security_level.is_secured() {
            Some(frame_counter)
        } else {
            None
        },
    };
    let mut data = [0u8; MAX_FRAME_SIZE];
    let (header_length, length) = frame::build(&header, command, payload, &mut data).unwrap();
    let mut provider = CryptoProvider::new(RustCryptoBackend::default());
    let length = if security_level.is_secured() {
        provider
            .protect(address, &header, header_length, length, key, &mut data)
            .unwrap()
    } else {
        length
    };
    data[..length].to_vec()
}

/// Unsecured maintenance frame from a sink
pub fn maintenance_frame(command: CommandIdentifier, payload: &[u8]) -> Vec<u8> {
    let mut data = [0u8; MAX_FRAME_SIZE];
    let (_, length) =
        frame::build(&GpdfHeader::maintenance(), command, payload, &mut data).unwrap();
    data[..length].to_vec()
}

