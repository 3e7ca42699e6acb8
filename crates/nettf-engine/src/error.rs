use std::io;
use std::path::PathBuf;

use nettf_courier::CourierError;
use thiserror::Error;

/// Stable error taxonomy for the frame engine. Variant names are part of
/// the user-visible diagnostic contract: every failure is reported as a
/// single line tagged with the variant name, e.g. `PathRejected: ...`.
#[derive(Debug, Error)]
pub enum NettfError {
    /// Underlying socket/transport error.
    #[error("TransportError: {0}")]
    TransportError(#[source] io::Error),

    /// Unexpected EOF mid-frame: the peer closed the connection before the
    /// declared length was transferred.
    #[error("PeerClosed: peer closed connection after {transferred} of {requested} bytes")]
    PeerClosed {
        /// Bytes transferred before the peer closed.
        transferred: usize,
        /// Bytes that were requested.
        requested: usize,
    },

    /// Local filesystem error (open/stat/read/write/mkdir).
    #[error("FileError: {action} {path:?}: {source}")]
    FileError {
        /// What was being attempted, e.g. "open", "stat", "mkdir".
        action: &'static str,
        /// Path the action was attempted against.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A received path (target directory or tree-relative entry) violated
    /// the sanitization rules.
    #[error("PathRejected: {reason} ({path:?})")]
    PathRejected {
        /// Human-readable reason the path was rejected.
        reason: &'static str,
        /// The offending path, as received on the wire.
        path: String,
    },

    /// The 4-byte magic did not match any recognised frame kind.
    #[error("UnknownFrame: {0:02x?}")]
    UnknownFrame([u8; 4]),

    /// Cancellation escalated to `Forced`.
    #[error("Interrupted: transfer aborted by cancellation request")]
    Interrupted,

    /// The source file yielded fewer bytes than its declared size.
    #[error("ShortRead: {path:?} declared {declared} bytes, read only {actual}")]
    ShortRead {
        /// Path of the source file.
        path: PathBuf,
        /// Size declared in the file's stat metadata.
        declared: u64,
        /// Bytes actually read before EOF.
        actual: u64,
    },

    /// An internally inconsistent header, e.g. `filename_len == 0` for a
    /// non-sentinel entry.
    #[error("HeaderInvalid: {0}")]
    HeaderInvalid(&'static str),

    /// An allocation failed (e.g. a declared length too large to buffer).
    #[error("ResourceExhausted: {0}")]
    ResourceExhausted(&'static str),
}

impl From<CourierError> for NettfError {
    fn from(err: CourierError) -> Self {
        match err {
            CourierError::PeerClosed {
                transferred,
                requested,
            } => Self::PeerClosed {
                transferred,
                requested,
            },
            CourierError::Io(source) => Self::TransportError(source),
        }
    }
}

/// Result alias used throughout the frame engine.
pub type NettfResult<T> = Result<T, NettfError>;
