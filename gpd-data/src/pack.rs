//! # Traits for packing and unpacking
//!
//! Everything that goes on the air is serialised into, or parsed from, a
//! caller provided byte slice. No allocation takes place.

/// Packing of data with a fixed size, such as option bytes and addresses
pub trait PackFixed<T, E> {
    /// Serialise into buffer, the buffer must have the exact size
    fn pack(&self, data: &mut [u8]) -> Result<(), E>;
    /// De-serialise from buffer, returning object or error
    fn unpack(data: &[u8]) -> Result<T, E>;
}

/// Packing of data with variable size
pub trait Pack<T, E> {
    /// Serialise into buffer, returning number of bytes written or error
    fn pack(&self, data: &mut [u8]) -> Result<usize, E>;
    /// De-serialise from buffer, returning object and number of bytes used
    /// or error
    fn unpack(data: &[u8]) -> Result<(T, usize), E>;
}
