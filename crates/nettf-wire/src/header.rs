use crate::codec::{read_u64_be, write_u64_be};

/// Header following a `FILE` magic: declared content length and filename
/// length, both `u64` big-endian. 16 bytes on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    /// Declared size of the file content that follows the filename.
    pub file_size: u64,
    /// Length in bytes of the filename payload that follows this header.
    pub filename_len: u64,
}

impl FileHeader {
    /// Encoded length in bytes.
    pub const LEN: usize = 16;

    /// Encodes this header to its 16-byte wire representation.
    #[must_use]
    pub fn encode(self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..8].copy_from_slice(&write_u64_be(self.file_size));
        out[8..16].copy_from_slice(&write_u64_be(self.filename_len));
        out
    }

    /// Decodes a header from its 16-byte wire representation.
    #[must_use]
    pub fn decode(bytes: [u8; Self::LEN]) -> Self {
        let file_size = read_u64_be(bytes[0..8].try_into().expect("8-byte slice"));
        let filename_len = read_u64_be(bytes[8..16].try_into().expect("8-byte slice"));
        Self {
            file_size,
            filename_len,
        }
    }

    /// Whether this header is the DIR-frame end-of-tree sentinel: both
    /// fields zero.
    #[must_use]
    pub const fn is_sentinel(self) -> bool {
        self.file_size == 0 && self.filename_len == 0
    }
}

/// Header following a `TARG` magic: [`FileHeader`] plus a target-directory
/// length. 24 bytes on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetedFileHeader {
    /// The embedded file header.
    pub file: FileHeader,
    /// Length in bytes of the target-directory payload.
    pub target_dir_len: u64,
}

impl TargetedFileHeader {
    /// Encoded length in bytes.
    pub const LEN: usize = FileHeader::LEN + 8;

    /// Encodes this header to its 24-byte wire representation.
    #[must_use]
    pub fn encode(self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..FileHeader::LEN].copy_from_slice(&self.file.encode());
        out[FileHeader::LEN..Self::LEN].copy_from_slice(&write_u64_be(self.target_dir_len));
        out
    }

    /// Decodes a header from its 24-byte wire representation.
    #[must_use]
    pub fn decode(bytes: [u8; Self::LEN]) -> Self {
        let file = FileHeader::decode(bytes[0..FileHeader::LEN].try_into().expect("16 bytes"));
        let target_dir_len = read_u64_be(bytes[FileHeader::LEN..Self::LEN].try_into().expect("8 bytes"));
        Self { file, target_dir_len }
    }
}

/// Header following a `DIR ` magic: total entry count, total content size,
/// and base-name length, all `u64` big-endian. 24 bytes on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirHeader {
    /// Number of regular-file entries the sender declares it will transmit.
    pub total_files: u64,
    /// Sum of the content sizes of every declared entry.
    pub total_size: u64,
    /// Length in bytes of the tree's base-name payload.
    pub base_path_len: u64,
}

impl DirHeader {
    /// Encoded length in bytes.
    pub const LEN: usize = 24;

    /// Encodes this header to its 24-byte wire representation.
    #[must_use]
    pub fn encode(self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..8].copy_from_slice(&write_u64_be(self.total_files));
        out[8..16].copy_from_slice(&write_u64_be(self.total_size));
        out[16..24].copy_from_slice(&write_u64_be(self.base_path_len));
        out
    }

    /// Decodes a header from its 24-byte wire representation.
    #[must_use]
    pub fn decode(bytes: [u8; Self::LEN]) -> Self {
        Self {
            total_files: read_u64_be(bytes[0..8].try_into().expect("8 bytes")),
            total_size: read_u64_be(bytes[8..16].try_into().expect("8 bytes")),
            base_path_len: read_u64_be(bytes[16..24].try_into().expect("8 bytes")),
        }
    }
}

/// Header following a `TDIR` magic: [`DirHeader`] plus a target-directory
/// length. 32 bytes on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetedDirHeader {
    /// The embedded directory header.
    pub dir: DirHeader,
    /// Length in bytes of the target-directory payload.
    pub target_dir_len: u64,
}

impl TargetedDirHeader {
    /// Encoded length in bytes.
    pub const LEN: usize = DirHeader::LEN + 8;

    /// Encodes this header to its 32-byte wire representation.
    #[must_use]
    pub fn encode(self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..DirHeader::LEN].copy_from_slice(&self.dir.encode());
        out[DirHeader::LEN..Self::LEN].copy_from_slice(&write_u64_be(self.target_dir_len));
        out
    }

    /// Decodes a header from its 32-byte wire representation.
    #[must_use]
    pub fn decode(bytes: [u8; Self::LEN]) -> Self {
        let dir = DirHeader::decode(bytes[0..DirHeader::LEN].try_into().expect("24 bytes"));
        let target_dir_len =
            read_u64_be(bytes[DirHeader::LEN..Self::LEN].try_into().expect("8 bytes"));
        Self { dir, target_dir_len }
    }
}

/// Per-entry header inside a directory tree: identical layout to
/// [`FileHeader`], reused with a distinct name since its `filename_len`
/// field addresses a tree-relative path rather than a basename, and an
/// all-zero instance is the DIR-frame sentinel.
pub type EntryHeader = FileHeader;
