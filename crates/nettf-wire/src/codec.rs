//! Big-endian pack/unpack helpers for the fixed-width integers on the wire.
//!
//! The codec performs explicit byte shuffling rather than relying on
//! `to_ne_bytes`/`from_ne_bytes`, so encoded bytes are bit-identical
//! regardless of the host's native endianness.

/// Encodes `value` as 4 big-endian bytes.
#[must_use]
pub fn write_u32_be(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Decodes 4 big-endian bytes into a `u32`.
#[must_use]
pub fn read_u32_be(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Encodes `value` as 8 big-endian bytes.
#[must_use]
pub fn write_u64_be(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decodes 8 big-endian bytes into a `u64`.
#[must_use]
pub fn read_u64_be(bytes: [u8; 8]) -> u64 {
    u64::from_be_bytes(bytes)
}
