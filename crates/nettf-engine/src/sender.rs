use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;

use nettf_chunker::AdaptiveState;
use nettf_courier::send_exact;
use nettf_wire::{
    DirHeader, FileHeader, Magic, TargetedDirHeader, TargetedFileHeader,
};

use crate::cancel::{CancelState, CancelToken};
use crate::error::{NettfError, NettfResult};
use crate::frame::{secs_f64, SendRequest, TransferSummary};
use crate::sanitize::sanitize_relative_path;
use crate::walk::snapshot_tree;

/// Sends `request` over `stream`, driving `cancel` for cooperative
/// interruption between chunks.
///
/// # Errors
///
/// See the failure semantics table in spec §4.4.8: [`NettfError::FileError`]
/// for local stat/open failures (surfaced before any wire bytes are
/// written), [`NettfError::PathRejected`] for a bad target directory,
/// [`NettfError::ShortRead`] if a source file shrinks mid-transfer, and
/// [`NettfError::TransportError`]/[`NettfError::PeerClosed`]/
/// [`NettfError::Interrupted`] for stream-level failures.
pub fn send_frame<S: Read + Write>(
    stream: &mut S,
    request: &SendRequest,
    cancel: &CancelToken,
) -> NettfResult<TransferSummary> {
    send_frame_with_initial_chunk_size(stream, request, cancel, nettf_chunker::INITIAL_CHUNK_SIZE)
}

/// Like [`send_frame`], but seeds the adaptive chunker's starting chunk
/// size from `initial_chunk_size` instead of
/// [`nettf_chunker::INITIAL_CHUNK_SIZE`]. The CLI front-end uses this to
/// honor a configured `default_chunk_initial`.
pub fn send_frame_with_initial_chunk_size<S: Read + Write>(
    stream: &mut S,
    request: &SendRequest,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    tracing::info!(?request, "frame send starting");
    let result = match request {
        SendRequest::File { source, target_dir } => {
            send_file(stream, source, target_dir.as_deref(), cancel, initial_chunk_size)
        }
        SendRequest::Tree { source, target_dir } => {
            send_tree(stream, source, target_dir.as_deref(), cancel, initial_chunk_size)
        }
    };
    match &result {
        Ok(summary) => tracing::info!(files = summary.files, bytes = summary.bytes, "frame send complete"),
        Err(error) => tracing::error!(%error, "frame send failed"),
    }
    result
}

fn send_file<S: Read + Write>(
    stream: &mut S,
    source: &Path,
    target_dir: Option<&str>,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    let metadata = std::fs::metadata(source).map_err(|e| NettfError::FileError {
        action: "stat",
        path: source.to_path_buf(),
        source: e,
    })?;
    let file_size = metadata.len();

    let basename = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(NettfError::PathRejected {
            reason: "source path has no file name component",
            path: source.display().to_string(),
        })?;

    if let Some(target) = target_dir {
        sanitize_relative_path(target)?;
    }

    let mut file = std::fs::File::open(source).map_err(|e| NettfError::FileError {
        action: "open",
        path: source.to_path_buf(),
        source: e,
    })?;

    let magic = if target_dir.is_some() { Magic::Targ } else { Magic::File };
    send_exact(stream, &magic.to_bytes())?;

    if let Some(target) = target_dir {
        let header = TargetedFileHeader {
            file: FileHeader {
                file_size,
                filename_len: basename.len() as u64,
            },
            target_dir_len: target.len() as u64,
        };
        send_exact(stream, &header.encode())?;
        send_exact(stream, basename.as_bytes())?;
        send_exact(stream, target.as_bytes())?;
    } else {
        let header = FileHeader {
            file_size,
            filename_len: basename.len() as u64,
        };
        send_exact(stream, &header.encode())?;
        send_exact(stream, basename.as_bytes())?;
    }

    let sent = stream_file_content(stream, &mut file, source, file_size, cancel, initial_chunk_size)?;
    Ok(TransferSummary::single_file(sent))
}

fn send_tree<S: Read + Write>(
    stream: &mut S,
    source: &Path,
    target_dir: Option<&str>,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    let snapshot = snapshot_tree(source)?;

    let base_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(NettfError::PathRejected {
            reason: "source directory has no file name component",
            path: source.display().to_string(),
        })?;

    if let Some(target) = target_dir {
        sanitize_relative_path(target)?;
    }

    let magic = if target_dir.is_some() { Magic::Tdir } else { Magic::Dir };
    send_exact(stream, &magic.to_bytes())?;

    let dir_header = DirHeader {
        total_files: snapshot.entries.len() as u64,
        total_size: snapshot.total_size,
        base_path_len: base_name.len() as u64,
    };

    if let Some(target) = target_dir {
        let header = TargetedDirHeader {
            dir: dir_header,
            target_dir_len: target.len() as u64,
        };
        send_exact(stream, &header.encode())?;
        send_exact(stream, base_name.as_bytes())?;
        send_exact(stream, target.as_bytes())?;
    } else {
        send_exact(stream, &dir_header.encode())?;
        send_exact(stream, base_name.as_bytes())?;
    }

    let mut chunker = AdaptiveState::with_initial_chunk_size(snapshot.total_size, initial_chunk_size);
    let mut total_sent = 0u64;

    for entry in &snapshot.entries {
        let mut file = std::fs::File::open(&entry.absolute_path).map_err(|e| NettfError::FileError {
            action: "open",
            path: entry.absolute_path.clone(),
            source: e,
        })?;

        let entry_header = FileHeader {
            file_size: entry.size,
            filename_len: entry.relative_path.len() as u64,
        };
        send_exact(stream, &entry_header.encode())?;
        send_exact(stream, entry.relative_path.as_bytes())?;

        total_sent += stream_file_content_with(
            stream,
            &mut file,
            &entry.absolute_path,
            entry.size,
            cancel,
            &mut chunker,
        )?;
    }

    if magic == Magic::Dir {
        let sentinel = FileHeader {
            file_size: 0,
            filename_len: 0,
        };
        send_exact(stream, &sentinel.encode())?;
    }

    Ok(TransferSummary::tree(snapshot.entries.len() as u64, total_sent))
}

fn stream_file_content<S: Write, F: Read>(
    stream: &mut S,
    file: &mut F,
    source_path: &Path,
    file_size: u64,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<u64> {
    let mut chunker = AdaptiveState::with_initial_chunk_size(file_size, initial_chunk_size);
    stream_file_content_with(stream, file, source_path, file_size, cancel, &mut chunker)
}

fn stream_file_content_with<S: Write, F: Read>(
    stream: &mut S,
    file: &mut F,
    source_path: &Path,
    file_size: u64,
    cancel: &CancelToken,
    chunker: &mut AdaptiveState,
) -> NettfResult<u64> {
    let mut sent = 0u64;
    let mut buf = vec![0u8; chunker.get_chunk_size() as usize];

    while sent < file_size {
        match cancel.poll() {
            CancelState::Forced => return Err(NettfError::Interrupted),
            CancelState::RequestedOnce => {
                tracing::warn!("cancellation requested; finishing in-flight transfer");
                cancel.acknowledge_prompt();
            }
            CancelState::Continue => {}
        }

        let want = chunker.get_chunk_size() as u64;
        let remaining = file_size - sent;
        let to_read = want.min(remaining) as usize;
        buf.resize(to_read, 0);

        let read = file.read(&mut buf).map_err(|e| NettfError::FileError {
            action: "read",
            path: source_path.to_path_buf(),
            source: e,
        })?;

        if read == 0 {
            return Err(NettfError::ShortRead {
                path: source_path.to_path_buf(),
                declared: file_size,
                actual: sent,
            });
        }

        let started = Instant::now();
        send_exact(stream, &buf[..read])?;
        let elapsed = started.elapsed();

        sent += read as u64;
        chunker.update(read as u64, secs_f64(elapsed).max(f64::MIN_POSITIVE));
    }

    Ok(sent)
}
