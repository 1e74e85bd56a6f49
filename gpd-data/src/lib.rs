//! # gpd-data - Zigbee Green Power device frames
//!
//! Reading and writing of Green Power device frames (GPDF): the network
//! header, command payloads, attribute records and the security transform.
//!

#![warn(missing_docs)]
#![cfg_attr(feature = "core", no_std)]

#[macro_use]
mod utils;

pub mod cluster_library; // ZCL
pub mod command;
pub mod commands;
pub mod common;
pub mod device;
pub mod error;
pub mod frame; // NWK
pub mod pack;
pub mod security;

pub use common::address::ExtendedAddress;
pub use common::key::Key;
pub use error::Error;

pub use utils::clear;
