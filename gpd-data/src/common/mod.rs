//! # Common structs
//!
//! Addresses and security key data.

pub mod address;
pub mod key;
