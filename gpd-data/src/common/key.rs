//! # Security key material

use core::fmt;
use core::str;

use crate::pack::PackFixed;
use crate::Error;

/// Key length
pub use gpd_crypto::KEY_SIZE;

/// Default trust center link key, "ZigBeeAlliance09"
///
/// Used to protect keys exchanged during Green Power commissioning.
pub const DEFAULT_LINK_KEY: Key = Key([
    0x5a, 0x69, 0x67, 0x42, 0x65, 0x65, 0x41, 0x6c, 0x6c, 0x69, 0x61, 0x6e, 0x63, 0x65, 0x30, 0x39,
]);

/// Key
///
/// 128-bit key used for security operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    /// Key octets
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl PackFixed<Key, Error> for Key {
    fn pack(&self, data: &mut [u8]) -> Result<(), Error> {
        if data.len() != KEY_SIZE {
            return Err(Error::NotEnoughSpace);
        }
        data.copy_from_slice(&self.0);
        Ok(())
    }

    fn unpack(data: &[u8]) -> Result<Self, Error> {
        if data.len() != KEY_SIZE {
            return Err(Error::WrongNumberOfBytes);
        }
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(data);
        Ok(Key(key))
    }
}

impl PartialEq<[u8; KEY_SIZE]> for Key {
    fn eq(&self, other: &[u8; KEY_SIZE]) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl From<[u8; KEY_SIZE]> for Key {
    fn from(value: [u8; KEY_SIZE]) -> Self {
        Key(value)
    }
}

impl From<Key> for [u8; KEY_SIZE] {
    fn from(value: Key) -> Self {
        value.0
    }
}

impl str::FromStr for Key {
    type Err = Error;

    /// Parse a key written as 32 hexadecimal digits
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != KEY_SIZE * 2 || !s.is_ascii() {
            return Err(Error::WrongNumberOfBytes);
        }
        let mut key = [0u8; KEY_SIZE];
        for (n, byte) in key.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[n * 2..n * 2 + 2], 16).map_err(|_| Error::InvalidValue)?;
        }
        Ok(Key(key))
    }
}

#[cfg(all(test, not(feature = "core")))]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn default_link_key() {
        assert_eq!(&DEFAULT_LINK_KEY.as_bytes()[..], b"ZigBeeAlliance09");
        assert_eq!(
            format!("{}", DEFAULT_LINK_KEY),
            "5a6967426565416c6c69616e63653039"
        );
    }

    #[test]
    fn parse_key() {
        let a = Key::from_str("f0e1d2c3b4a5968778695a4b3c2d1e0f").unwrap();
        assert_eq!(
            a,
            [
                0xf0, 0xe1, 0xd2, 0xc3, 0xb4, 0xa5, 0x96, 0x87, 0x78, 0x69, 0x5a, 0x4b, 0x3c, 0x2d,
                0x1e, 0x0f
            ]
        );
        assert_eq!(Key::from_str("f0e1"), Err(Error::WrongNumberOfBytes));
        assert_eq!(
            Key::from_str("x0e1d2c3b4a5968778695a4b3c2d1e0f"),
            Err(Error::InvalidValue)
        );
    }

    #[test]
    fn pack_key() {
        let key = Key::unpack(b"ZigBeeAlliance09").unwrap();
        assert_eq!(key, DEFAULT_LINK_KEY);
        let mut data = [0u8; 16];
        key.pack(&mut data).unwrap();
        assert_eq!(&data, b"ZigBeeAlliance09");
        assert_eq!(key.pack(&mut data[..15]), Err(Error::NotEnoughSpace));
        assert_eq!(Key::unpack(&data[..15]), Err(Error::WrongNumberOfBytes));
    }
}
