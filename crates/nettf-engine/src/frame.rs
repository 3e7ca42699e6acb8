use std::path::PathBuf;
use std::time::Duration;

/// What the sender was asked to transmit: either a single regular file or
/// a whole directory tree, each optionally redirected under a receiver-side
/// target subdirectory.
///
/// This is the polymorphism §9's "Design Notes" calls for: the four wire
/// magics collapse to two source shapes crossed with "has a target or not".
#[derive(Debug, Clone)]
pub enum SendRequest {
    /// A single regular file (`FILE` or `TARG`).
    File {
        /// Path to the source file to read and stat.
        source: PathBuf,
        /// Optional receiver-side target subdirectory.
        target_dir: Option<String>,
    },
    /// A directory tree (`DIR` or `TDIR`).
    Tree {
        /// Path to the source directory to walk.
        source: PathBuf,
        /// Optional receiver-side target subdirectory.
        target_dir: Option<String>,
    },
}

/// Outcome of a completed transfer, returned by both
/// [`crate::send_frame`] and [`crate::receive_frame`] on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSummary {
    /// Number of regular files transferred (`1` for a single-file frame).
    pub files: u64,
    /// Total content bytes transferred.
    pub bytes: u64,
}

impl TransferSummary {
    pub(crate) const fn single_file(bytes: u64) -> Self {
        Self { files: 1, bytes }
    }

    pub(crate) const fn tree(files: u64, bytes: u64) -> Self {
        Self { files, bytes }
    }
}

/// Elapsed-time pair used internally to feed [`nettf_chunker::AdaptiveState::update`].
pub(crate) fn secs_f64(duration: Duration) -> f64 {
    duration.as_secs_f64()
}
