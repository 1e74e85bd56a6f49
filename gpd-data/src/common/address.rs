//! # Device addresses

use crate::pack::PackFixed;
use crate::Error;

use byteorder::{ByteOrder, LittleEndian};

/// Extended address size
pub const EXTENDED_ADDRESS_SIZE: usize = 8;
/// Source identifier size
pub const SOURCE_IDENTIFIER_SIZE: usize = 4;

/// Source identifier value reserved for "unspecified"
pub const SOURCE_IDENTIFIER_UNSPECIFIED: u32 = 0x0000_0000;
/// Source identifier value reserved for "all"
pub const SOURCE_IDENTIFIER_ALL: u32 = 0xffff_ffff;

/// 64-bit extended (IEEE) address
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ExtendedAddress(u64);

impl ExtendedAddress {
    /// Create a address from its numeric value
    pub fn new(address: u64) -> Self {
        Self(address)
    }
}

impl PackFixed<ExtendedAddress, Error> for ExtendedAddress {
    fn pack(&self, data: &mut [u8]) -> Result<(), Error> {
        if data.len() == EXTENDED_ADDRESS_SIZE {
            LittleEndian::write_u64(data, self.0);
            Ok(())
        } else {
            Err(Error::NotEnoughSpace)
        }
    }

    fn unpack(data: &[u8]) -> Result<Self, Error> {
        if data.len() == EXTENDED_ADDRESS_SIZE {
            Ok(ExtendedAddress(LittleEndian::read_u64(data)))
        } else {
            Err(Error::WrongNumberOfBytes)
        }
    }
}

impl From<u64> for ExtendedAddress {
    fn from(value: u64) -> Self {
        ExtendedAddress(value)
    }
}

impl From<ExtendedAddress> for u64 {
    fn from(value: ExtendedAddress) -> Self {
        value.0
    }
}

impl core::fmt::Display for ExtendedAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let octets = self.0.to_be_bytes();
        for (n, octet) in octets.iter().enumerate() {
            if n > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", octet)?;
        }
        Ok(())
    }
}

#[cfg(all(test, not(feature = "core")))]
mod tests {
    use super::*;

    #[test]
    fn extended_address() {
        let a = ExtendedAddress::unpack(&[0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]).unwrap();
        assert_eq!(u64::from(a), 0x1122_3344_5566_7788);
        assert_eq!(format!("{}", a), "11:22:33:44:55:66:77:88");
        let mut data = [0u8; 8];
        a.pack(&mut data).unwrap();
        assert_eq!(data, [0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]);
        assert_eq!(a.pack(&mut data[..4]), Err(Error::NotEnoughSpace));
    }
}
