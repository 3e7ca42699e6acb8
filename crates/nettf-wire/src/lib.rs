#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `nettf-wire` owns the bit-identical-on-any-host parts of the NETTF
//! protocol: the four frame magics, big-endian integer packing, and the
//! fixed-layout headers that precede a frame's filename/target/content
//! payload. Nothing in this crate touches a socket or the filesystem; it is
//! pure encode/decode logic shared by the sender and receiver halves of
//! `nettf-engine`.
//!
//! # Design
//!
//! - [`Magic`] identifies which of the four frame kinds follows.
//! - [`codec`] packs/unpacks `u32`/`u64` as big-endian, independent of host
//!   endianness.
//! - [`FileHeader`], [`TargetedFileHeader`], [`DirHeader`],
//!   [`TargetedDirHeader`], and [`EntryHeader`] are the fixed-width headers
//!   from the wire format. Each exposes `encode`/`decode` pairs that round
//!   trip exactly.
//!
//! # Invariants
//!
//! - Every multi-byte integer is big-endian on the wire, regardless of host
//!   architecture.
//! - Header decoding never allocates; headers are fixed-size byte arrays.

mod codec;
mod header;
mod magic;

pub use codec::{read_u32_be, read_u64_be, write_u32_be, write_u64_be};
pub use header::{DirHeader, EntryHeader, FileHeader, TargetedDirHeader, TargetedFileHeader};
pub use magic::{Magic, MagicError, MAGIC_LEN};
