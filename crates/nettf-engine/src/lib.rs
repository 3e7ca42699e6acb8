#![deny(unsafe_code)]
#![deny(missing_docs)]

//! # Overview
//!
//! `nettf-engine` is the Frame Engine: magic dispatch, header parse/emit,
//! path sanitization, recursive directory walk/reconstruction, chunked
//! content streaming, and interruption polling. It is the component every
//! other NETTF crate exists to serve — [`nettf_wire`] supplies the bytes on
//! the wire, [`nettf_courier`] supplies full-length I/O, and
//! [`nettf_chunker`] supplies the read/write granularity this crate drives
//! through both the sender and receiver loops.
//!
//! Nothing in this crate opens a TCP listener or connects a socket — every
//! public entry point is generic over [`std::io::Read`] + [`std::io::Write`],
//! so the engine can be driven over a real [`std::net::TcpStream`], a
//! loopback pair, or an in-memory buffer in tests.
//!
//! # Design
//!
//! - [`cancel`] — the process-wide cooperative cancellation signal.
//! - [`error`] — the stable [`error::NettfError`] taxonomy.
//! - [`sanitize`] — the receiver-side path security boundary.
//! - [`walk`] — sender-side directory-tree snapshotting.
//! - [`frame`] — the request/outcome types shared by sender and receiver.
//! - [`sender`] exposes [`send_frame`]; [`receiver`] exposes [`receive_frame`].
//!
//! # Invariants
//!
//! - Exactly one open file at a time per connection; exactly one directory
//!   walk in progress per send.
//! - The receiver never writes outside the directory it was told to root
//!   itself under: every filesystem path it produces has passed
//!   [`sanitize::sanitize_relative_path`] or [`sanitize::sanitize_filename`].
//! - `DIR` frames terminate on the zero/zero sentinel; `TDIR` frames
//!   terminate after exactly `total_files` entries. This asymmetry is
//!   preserved intentionally, not unified.

pub mod cancel;
pub mod error;
mod frame;
mod receiver;
mod sanitize;
mod sender;
mod walk;

pub use cancel::{CancelState, CancelToken};
pub use error::{NettfError, NettfResult};
pub use frame::{SendRequest, TransferSummary};
pub use receiver::{receive_frame, receive_frame_with_initial_chunk_size};
pub use sanitize::{sanitize_filename, sanitize_relative_path, MAX_PATH_LEN};
pub use sender::{send_frame, send_frame_with_initial_chunk_size};
pub use walk::{snapshot_tree, TreeEntry, TreeSnapshot};
