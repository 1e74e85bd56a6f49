use byteorder::{ByteOrder, LittleEndian};

use crate::Error;

/// Creates an enum from a list of name and wire value pairs, along with
/// conversions from and to the wire type.
///
/// Converting an unknown wire value fails with `Error::InvalidValue`.
#[macro_export]
macro_rules! extended_enum {
    ($(#[$outer:meta])* $name:ident, $ty:ty, $($(#[$inner:meta])* $var:ident => $val:expr),+ $(,)*) => (

        $(#[$outer])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum $name {
            $(
                $(#[$inner])*
                $var,
            )*
        }

        impl core::convert::TryFrom<$ty> for $name {
            type Error = $crate::error::Error;

            fn try_from(v: $ty) -> Result<Self, Self::Error> {
                match v {
                    $( $val => Ok($name::$var),)*
                    _ => Err($crate::error::Error::InvalidValue),
                }
            }
        }

        impl From<$name> for $ty {
            fn from(v: $name) -> Self {
                match v {
                    $( $name::$var => $val, )*
                }
            }
        }

        impl PartialEq<$name> for $ty {
            fn eq(&self, other: &$name) -> bool {
                match *other {
                    $( $name::$var => *self == $val, )*
                }
            }
        }
    );
}

/// Zero a buffer, used to wipe key material from scratch buffers
pub fn clear(slice: &mut [u8]) {
    for v in slice.iter_mut() {
        *v = 0;
    }
}

/// Check that `data` holds at least `length` octets
pub(crate) fn ensure_length(data: &[u8], length: usize) -> Result<(), Error> {
    if data.len() < length {
        Err(Error::WrongNumberOfBytes)
    } else {
        Ok(())
    }
}

/// Check that `data` has room for `length` octets
pub(crate) fn ensure_space(data: &[u8], length: usize) -> Result<(), Error> {
    if data.len() < length {
        Err(Error::NotEnoughSpace)
    } else {
        Ok(())
    }
}

/// Write a little endian `u16` at `offset`, returning the offset after it
pub(crate) fn write_u16(data: &mut [u8], offset: usize, value: u16) -> Result<usize, Error> {
    ensure_space(data, offset + 2)?;
    LittleEndian::write_u16(&mut data[offset..offset + 2], value);
    Ok(offset + 2)
}

pub(crate) fn write_u32(data: &mut [u8], offset: usize, value: u32) -> Result<usize, Error> {
    ensure_space(data, offset + 4)?;
    LittleEndian::write_u32(&mut data[offset..offset + 4], value);
    Ok(offset + 4)
}

/// Read a little endian `u16` at `offset`, returning it and the offset after it
pub(crate) fn read_u16(data: &[u8], offset: usize) -> Result<(u16, usize), Error> {
    ensure_length(data, offset + 2)?;
    Ok((LittleEndian::read_u16(&data[offset..offset + 2]), offset + 2))
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<(u32, usize), Error> {
    ensure_length(data, offset + 4)?;
    Ok((LittleEndian::read_u32(&data[offset..offset + 4]), offset + 4))
}
