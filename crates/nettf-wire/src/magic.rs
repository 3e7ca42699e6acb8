use std::fmt;

use thiserror::Error;

/// Length in bytes of a frame's leading magic tag.
pub const MAGIC_LEN: usize = 4;

/// The four frame kinds a connection can carry, identified by a 4-byte
/// big-endian magic tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Magic {
    /// Single file, no target redirection. ASCII `"FILE"`.
    File,
    /// Directory tree, no target redirection. ASCII `"DIR "`.
    Dir,
    /// Single file with a target subdirectory. ASCII `"TARG"`.
    Targ,
    /// Directory tree with a target subdirectory. ASCII `"TDIR"`.
    Tdir,
}

impl Magic {
    const FILE_BYTES: [u8; MAGIC_LEN] = *b"FILE";
    const DIR_BYTES: [u8; MAGIC_LEN] = *b"DIR ";
    const TARG_BYTES: [u8; MAGIC_LEN] = *b"TARG";
    const TDIR_BYTES: [u8; MAGIC_LEN] = *b"TDIR";

    /// Returns the 4 ASCII bytes this magic is transmitted as.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; MAGIC_LEN] {
        match self {
            Self::File => Self::FILE_BYTES,
            Self::Dir => Self::DIR_BYTES,
            Self::Targ => Self::TARG_BYTES,
            Self::Tdir => Self::TDIR_BYTES,
        }
    }

    /// Parses a magic tag from its 4-byte wire representation.
    ///
    /// # Errors
    ///
    /// Returns [`MagicError::Unknown`] if `bytes` does not match one of the
    /// four recognised tags.
    pub const fn from_bytes(bytes: [u8; MAGIC_LEN]) -> Result<Self, MagicError> {
        match bytes {
            Self::FILE_BYTES => Ok(Self::File),
            Self::DIR_BYTES => Ok(Self::Dir),
            Self::TARG_BYTES => Ok(Self::Targ),
            Self::TDIR_BYTES => Ok(Self::Tdir),
            other => Err(MagicError::Unknown(other)),
        }
    }

    /// Whether this frame kind carries a whole directory tree, as opposed to
    /// a single file.
    #[must_use]
    pub const fn is_tree(self) -> bool {
        matches!(self, Self::Dir | Self::Tdir)
    }

    /// Whether this frame kind carries a receiver-side target redirection.
    #[must_use]
    pub const fn has_target(self) -> bool {
        matches!(self, Self::Targ | Self::Tdir)
    }
}

impl fmt::Display for Magic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ascii = std::str::from_utf8(&self.to_bytes()).unwrap_or("????");
        write!(f, "{ascii}")
    }
}

/// Error returned when a 4-byte tag does not match a known [`Magic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MagicError {
    /// The bytes read did not match `FILE`, `DIR `, `TARG`, or `TDIR`.
    #[error("unrecognised frame magic: {0:02x?}")]
    Unknown([u8; MAGIC_LEN]),
}
