#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `nettf-courier` supplies the two full-length transfer primitives every
//! higher layer of NETTF relies on: `send_exact` and `recv_exact`. TCP makes
//! no length guarantee per syscall — a single `read`/`write` call may
//! transfer fewer bytes than requested — so every caller that needs
//! "exactly N bytes" semantics goes through this crate instead of calling
//! [`std::io::Read`]/[`std::io::Write`] directly.
//!
//! # Design
//!
//! Both operations loop until the requested length has been transferred or
//! a terminal condition is hit:
//!
//! - A short read/write continues the loop with an adjusted remaining
//!   length.
//! - A `0`-byte read/write is treated as the peer having closed the
//!   connection and reported as [`CourierError::PeerClosed`].
//! - Any other I/O failure is reported as [`CourierError::Io`].
//!
//! This crate performs no cancellation polling itself — callers that need
//! cooperative interruption (the frame engine) check their own cancellation
//! signal between courier calls, since a single `send_exact`/`recv_exact`
//! call may itself block for an unbounded time with no deadline at this
//! layer.

use std::io::{self, Read, Write};

use thiserror::Error;

/// Error surfaced by [`send_exact`]/[`recv_exact`].
#[derive(Debug, Error)]
pub enum CourierError {
    /// The peer closed the connection before the requested length was
    /// transferred.
    #[error("peer closed connection after {transferred} of {requested} bytes")]
    PeerClosed {
        /// Bytes successfully transferred before the peer closed.
        transferred: usize,
        /// Bytes that were requested.
        requested: usize,
    },
    /// An underlying I/O error occurred.
    #[error("transport error: {0}")]
    Io(#[source] io::Error),
}

/// Writes all of `buf` to `writer`, looping over partial writes.
///
/// # Errors
///
/// Returns [`CourierError::PeerClosed`] if a `write` call returns `0` before
/// `buf` is exhausted, or [`CourierError::Io`] on any other I/O failure.
pub fn send_exact<W: Write + ?Sized>(writer: &mut W, buf: &[u8]) -> Result<(), CourierError> {
    let mut sent = 0usize;
    while sent < buf.len() {
        match writer.write(&buf[sent..]) {
            Ok(0) => {
                return Err(CourierError::PeerClosed {
                    transferred: sent,
                    requested: buf.len(),
                });
            }
            Ok(n) => sent += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CourierError::Io(e)),
        }
    }
    Ok(())
}

/// Fills `buf` completely from `reader`, looping over partial reads.
///
/// # Errors
///
/// Returns [`CourierError::PeerClosed`] if a `read` call returns `0` before
/// `buf` is filled, or [`CourierError::Io`] on any other I/O failure.
pub fn recv_exact<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<(), CourierError> {
    let mut received = 0usize;
    while received < buf.len() {
        match reader.read(&mut buf[received..]) {
            Ok(0) => {
                return Err(CourierError::PeerClosed {
                    transferred: received,
                    requested: buf.len(),
                });
            }
            Ok(n) => received += n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CourierError::Io(e)),
        }
    }
    Ok(())
}
