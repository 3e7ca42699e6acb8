use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use nettf_chunker::AdaptiveState;
use nettf_courier::recv_exact;
use nettf_wire::{
    DirHeader, EntryHeader, FileHeader, Magic, TargetedDirHeader, TargetedFileHeader,
};

use crate::cancel::{CancelState, CancelToken};
use crate::error::{NettfError, NettfResult};
use crate::frame::{secs_f64, TransferSummary};
use crate::sanitize::{sanitize_filename, sanitize_relative_path};

/// Receives a single frame over `stream`, materializing it under `root`.
///
/// Dispatches on the leading 4-byte magic (§4.4.6) and delegates to the
/// matching single-file or directory-tree receive routine. The frame kind
/// is not known ahead of time, unlike [`crate::send_frame`], which is why
/// this entry point has no `SendRequest`-shaped counterpart — the wire
/// itself carries the request.
///
/// # Errors
///
/// Returns [`NettfError::UnknownFrame`] if the leading 4 bytes do not match
/// one of the four recognised magics, and otherwise the same error
/// taxonomy as [`crate::send_frame`]'s receive-side counterparts:
/// [`NettfError::PathRejected`] for a bad target or entry path,
/// [`NettfError::FileError`] for local mkdir/open/write failures, and
/// transport errors from [`nettf_courier`].
pub fn receive_frame<S: Read + Write>(
    stream: &mut S,
    root: &Path,
    cancel: &CancelToken,
) -> NettfResult<TransferSummary> {
    receive_frame_with_initial_chunk_size(stream, root, cancel, nettf_chunker::INITIAL_CHUNK_SIZE)
}

/// Like [`receive_frame`], but seeds the adaptive chunker's starting chunk
/// size from `initial_chunk_size` instead of
/// [`nettf_chunker::INITIAL_CHUNK_SIZE`]. The CLI front-end uses this to
/// honor a configured `default_chunk_initial`.
pub fn receive_frame_with_initial_chunk_size<S: Read + Write>(
    stream: &mut S,
    root: &Path,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    let mut magic_bytes = [0u8; nettf_wire::MAGIC_LEN];
    recv_exact(stream, &mut magic_bytes)?;
    let magic = match Magic::from_bytes(magic_bytes) {
        Ok(magic) => magic,
        Err(_) => {
            tracing::error!(bytes = ?magic_bytes, "frame receive failed: unknown magic");
            return Err(NettfError::UnknownFrame(magic_bytes));
        }
    };

    tracing::info!(%magic, "frame receive starting");
    let result = match magic {
        Magic::File => receive_file(stream, root, cancel, initial_chunk_size),
        Magic::Targ => receive_targeted_file(stream, root, cancel, initial_chunk_size),
        Magic::Dir => receive_tree(stream, root, cancel, initial_chunk_size),
        Magic::Tdir => receive_targeted_tree(stream, root, cancel, initial_chunk_size),
    };
    match &result {
        Ok(summary) => tracing::info!(files = summary.files, bytes = summary.bytes, "frame receive complete"),
        Err(error) => tracing::error!(%error, "frame receive failed"),
    }
    result
}

fn receive_targeted_file<S: Read + Write>(
    stream: &mut S,
    root: &Path,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    let mut header_bytes = [0u8; TargetedFileHeader::LEN];
    recv_exact(stream, &mut header_bytes)?;
    let header = TargetedFileHeader::decode(header_bytes);

    let target = recv_string(stream, header.target_dir_len)?;
    let target_path = sanitize_relative_path(&target)?;

    receive_file_body(stream, root, &target_path, header.file, cancel, initial_chunk_size)
}

fn receive_file<S: Read + Write>(
    stream: &mut S,
    root: &Path,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    let mut header_bytes = [0u8; FileHeader::LEN];
    recv_exact(stream, &mut header_bytes)?;
    let header = FileHeader::decode(header_bytes);

    receive_file_body(stream, root, &PathBuf::new(), header, cancel, initial_chunk_size)
}

fn receive_file_body<S: Read + Write>(
    stream: &mut S,
    root: &Path,
    target_subdir: &Path,
    header: FileHeader,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    let filename = recv_string(stream, header.filename_len)?;
    let filename = sanitize_filename(&filename)?;

    let dest_dir = root.join(target_subdir);
    std::fs::create_dir_all(&dest_dir).map_err(|e| NettfError::FileError {
        action: "mkdir",
        path: dest_dir.clone(),
        source: e,
    })?;

    let dest_path = dest_dir.join(filename);
    let mut out = std::fs::File::create(&dest_path).map_err(|e| NettfError::FileError {
        action: "create",
        path: dest_path.clone(),
        source: e,
    })?;

    let mut chunker = AdaptiveState::with_initial_chunk_size(header.file_size, initial_chunk_size);
    let received = receive_content(stream, &mut out, &dest_path, header.file_size, cancel, &mut chunker)?;
    Ok(TransferSummary::single_file(received))
}

fn receive_tree<S: Read + Write>(
    stream: &mut S,
    root: &Path,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    let mut header_bytes = [0u8; DirHeader::LEN];
    recv_exact(stream, &mut header_bytes)?;
    let header = DirHeader::decode(header_bytes);

    receive_tree_body(
        stream,
        root,
        &PathBuf::new(),
        header,
        Termination::Sentinel,
        cancel,
        initial_chunk_size,
    )
}

fn receive_targeted_tree<S: Read + Write>(
    stream: &mut S,
    root: &Path,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    let mut header_bytes = [0u8; TargetedDirHeader::LEN];
    recv_exact(stream, &mut header_bytes)?;
    let header = TargetedDirHeader::decode(header_bytes);

    let target = recv_string(stream, header.target_dir_len)?;
    let target_path = sanitize_relative_path(&target)?;

    receive_tree_body(
        stream,
        root,
        &target_path,
        header.dir,
        Termination::ExactCount,
        cancel,
        initial_chunk_size,
    )
}

/// How a directory-tree frame signals "no more entries".
///
/// Kept as an explicit asymmetry rather than unified: `DIR` terminates on
/// the all-zero sentinel header and `TDIR` terminates after exactly
/// `total_files` entries regardless of sentinel bytes. A unified convention
/// would be cleaner, but the two wire forms are kept distinct for
/// compatibility.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Termination {
    /// Stop at the first all-zero entry header (DIR).
    Sentinel,
    /// Stop after exactly `total_files` entries, ignoring sentinel bytes (TDIR).
    ExactCount,
}

/// Shared DIR/TDIR body: consume the base-name string, then receive entries.
fn receive_tree_body<S: Read + Write>(
    stream: &mut S,
    root: &Path,
    target_subdir: &Path,
    header: DirHeader,
    termination: Termination,
    cancel: &CancelToken,
    initial_chunk_size: u32,
) -> NettfResult<TransferSummary> {
    let base_name = recv_string(stream, header.base_path_len)?;
    let base_name = sanitize_filename(&base_name)?;

    let dest_root = root.join(target_subdir).join(base_name);
    std::fs::create_dir_all(&dest_root).map_err(|e| NettfError::FileError {
        action: "mkdir",
        path: dest_root.clone(),
        source: e,
    })?;

    let mut chunker = AdaptiveState::with_initial_chunk_size(header.total_size, initial_chunk_size);
    let mut files_received = 0u64;
    let mut bytes_received = 0u64;

    loop {
        if termination == Termination::ExactCount && files_received >= header.total_files {
            break;
        }

        let mut entry_header_bytes = [0u8; EntryHeader::LEN];
        recv_exact(stream, &mut entry_header_bytes)?;
        let entry_header = EntryHeader::decode(entry_header_bytes);

        if termination == Termination::Sentinel && entry_header.is_sentinel() {
            break;
        }

        if entry_header.filename_len == 0 {
            return Err(NettfError::HeaderInvalid("entry filename_len == 0 for a non-sentinel entry"));
        }

        let relative = recv_string(stream, entry_header.filename_len)?;
        let relative_path = sanitize_relative_path(&relative)?;

        let dest_path = dest_root.join(&relative_path);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| NettfError::FileError {
                action: "mkdir",
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut out = std::fs::File::create(&dest_path).map_err(|e| NettfError::FileError {
            action: "create",
            path: dest_path.clone(),
            source: e,
        })?;

        bytes_received += receive_content(
            stream,
            &mut out,
            &dest_path,
            entry_header.file_size,
            cancel,
            &mut chunker,
        )?;
        files_received += 1;
    }

    Ok(TransferSummary::tree(files_received, bytes_received))
}

fn receive_content<S: Read, F: Write>(
    stream: &mut S,
    out: &mut F,
    dest_path: &Path,
    declared_size: u64,
    cancel: &CancelToken,
    chunker: &mut AdaptiveState,
) -> NettfResult<u64> {
    let mut received = 0u64;
    let mut buf = vec![0u8; chunker.get_chunk_size() as usize];

    while received < declared_size {
        match cancel.poll() {
            CancelState::Forced => return Err(NettfError::Interrupted),
            CancelState::RequestedOnce => {
                tracing::warn!("cancellation requested; finishing in-flight transfer");
                cancel.acknowledge_prompt();
            }
            CancelState::Continue => {}
        }

        let want = chunker.get_chunk_size() as u64;
        let remaining = declared_size - received;
        let to_read = want.min(remaining) as usize;
        buf.resize(to_read, 0);

        let started = Instant::now();
        recv_exact(stream, &mut buf)?;
        let elapsed = started.elapsed();

        out.write_all(&buf).map_err(|e| NettfError::FileError {
            action: "write",
            path: dest_path.to_path_buf(),
            source: e,
        })?;

        received += to_read as u64;
        chunker.update(to_read as u64, secs_f64(elapsed).max(f64::MIN_POSITIVE));
    }

    Ok(received)
}

/// Ceiling on any declared string length (target, filename, tree-entry path)
/// before it is read off the wire at all. Kept well above
/// [`crate::sanitize::MAX_PATH_LEN`] so a merely-too-long path still reaches
/// [`sanitize_relative_path`]'s own length check and is reported as
/// `PathRejected` — the variant spec §4.4.1/§7 name for that condition. This
/// cap only exists to refuse an implausible allocation request outright,
/// not to duplicate sanitization's length policy.
const MAX_DECLARED_STRING_LEN: u64 = 1024 * 1024;

fn recv_string<S: Read>(stream: &mut S, len: u64) -> NettfResult<String> {
    if len > MAX_DECLARED_STRING_LEN {
        return Err(NettfError::ResourceExhausted("declared path length exceeds maximum"));
    }

    let mut buf = vec![0u8; len as usize];
    recv_exact(stream, &mut buf)?;
    String::from_utf8(buf).map_err(|_| NettfError::HeaderInvalid("path is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::SendRequest;
    use crate::sender::send_frame;
    use std::io::Cursor;

    #[test]
    fn receiving_a_file_silently_overwrites_an_existing_one() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("hello.txt");
        std::fs::write(&source, b"new contents").unwrap();
        std::fs::write(dst_dir.path().join("hello.txt"), b"stale contents, longer than new").unwrap();

        let cancel = CancelToken::new();
        let mut wire = Cursor::new(Vec::new());
        let request = SendRequest::File {
            source,
            target_dir: None,
        };
        send_frame(&mut wire, &request, &cancel).unwrap();

        wire.set_position(0);
        receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap();

        let received = std::fs::read(dst_dir.path().join("hello.txt")).unwrap();
        assert_eq!(received, b"new contents");
    }

    #[test]
    fn round_trips_a_single_file() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("hello.txt");
        std::fs::write(&source, b"hello, nettf").unwrap();

        let cancel = CancelToken::new();
        let mut wire = Cursor::new(Vec::new());

        let request = SendRequest::File {
            source,
            target_dir: None,
        };
        send_frame(&mut wire, &request, &cancel).unwrap();

        wire.set_position(0);
        let summary = receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(summary.bytes, 12);

        let received = std::fs::read(dst_dir.path().join("hello.txt")).unwrap();
        assert_eq!(received, b"hello, nettf");
    }

    #[test]
    fn round_trips_a_targeted_file() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("a.bin");
        std::fs::write(&source, [1u8, 2, 3, 4]).unwrap();

        let cancel = CancelToken::new();
        let mut wire = Cursor::new(Vec::new());
        let request = SendRequest::File {
            source,
            target_dir: Some("incoming/today".to_owned()),
        };
        send_frame(&mut wire, &request, &cancel).unwrap();

        wire.set_position(0);
        receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap();

        let received = std::fs::read(dst_dir.path().join("incoming/today/a.bin")).unwrap();
        assert_eq!(received, [1, 2, 3, 4]);
    }

    #[test]
    fn round_trips_a_directory_tree() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let tree_root = src_dir.path().join("payload");
        std::fs::create_dir_all(tree_root.join("d/e")).unwrap();
        std::fs::write(tree_root.join("x"), [0u8; 2]).unwrap();
        std::fs::write(tree_root.join("d/y"), []).unwrap();
        std::fs::write(tree_root.join("d/e/z"), [0u8; 3]).unwrap();

        let cancel = CancelToken::new();
        let mut wire = Cursor::new(Vec::new());
        let request = SendRequest::Tree {
            source: tree_root,
            target_dir: None,
        };
        let send_summary = send_frame(&mut wire, &request, &cancel).unwrap();
        assert_eq!(send_summary.files, 3);
        assert_eq!(send_summary.bytes, 5);

        wire.set_position(0);
        let recv_summary = receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap();
        assert_eq!(recv_summary.files, 3);
        assert_eq!(recv_summary.bytes, 5);

        assert_eq!(std::fs::read(dst_dir.path().join("payload/x")).unwrap().len(), 2);
        assert_eq!(std::fs::read(dst_dir.path().join("payload/d/y")).unwrap().len(), 0);
        assert_eq!(std::fs::read(dst_dir.path().join("payload/d/e/z")).unwrap().len(), 3);
    }

    #[test]
    fn round_trips_a_targeted_directory_tree() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let tree_root = src_dir.path().join("payload");
        std::fs::create_dir_all(&tree_root).unwrap();
        std::fs::write(tree_root.join("a"), b"abc").unwrap();

        let cancel = CancelToken::new();
        let mut wire = Cursor::new(Vec::new());
        let request = SendRequest::Tree {
            source: tree_root,
            target_dir: Some("archive".to_owned()),
        };
        send_frame(&mut wire, &request, &cancel).unwrap();

        wire.set_position(0);
        receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap();

        let received = std::fs::read(dst_dir.path().join("archive/payload/a")).unwrap();
        assert_eq!(received, b"abc");
    }

    #[test]
    fn round_trips_with_a_configured_initial_chunk_size() {
        let src_dir = tempfile::tempdir().unwrap();
        let dst_dir = tempfile::tempdir().unwrap();
        let source = src_dir.path().join("payload.bin");
        std::fs::write(&source, vec![9u8; 40_000]).unwrap();

        let cancel = CancelToken::new();
        let mut wire = Cursor::new(Vec::new());
        let request = SendRequest::File {
            source,
            target_dir: None,
        };
        crate::sender::send_frame_with_initial_chunk_size(&mut wire, &request, &cancel, 16 * 1024).unwrap();

        wire.set_position(0);
        let summary =
            receive_frame_with_initial_chunk_size(&mut wire, dst_dir.path(), &cancel, 16 * 1024).unwrap();
        assert_eq!(summary.bytes, 40_000);

        let received = std::fs::read(dst_dir.path().join("payload.bin")).unwrap();
        assert_eq!(received, vec![9u8; 40_000]);
    }

    #[test]
    fn unknown_magic_is_rejected() {
        let dst_dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();
        let mut wire = Cursor::new(b"XXXX".to_vec());
        let err = receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap_err();
        assert!(matches!(err, NettfError::UnknownFrame(_)));
        assert_eq!(std::fs::read_dir(dst_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn malicious_target_traversal_is_rejected() {
        let dst_dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();

        let mut wire = Cursor::new(Vec::new());
        nettf_courier::send_exact(&mut wire, &Magic::Targ.to_bytes()).unwrap();
        let target = "../../etc";
        let header = TargetedFileHeader {
            file: FileHeader {
                file_size: 1,
                filename_len: 1,
            },
            target_dir_len: target.len() as u64,
        };
        nettf_courier::send_exact(&mut wire, &header.encode()).unwrap();
        nettf_courier::send_exact(&mut wire, b"a").unwrap();
        nettf_courier::send_exact(&mut wire, target.as_bytes()).unwrap();

        wire.set_position(0);
        let err = receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap_err();
        assert!(matches!(err, NettfError::PathRejected { .. }));
    }

    #[test]
    fn tree_entry_with_zero_filename_len_and_nonzero_size_is_header_invalid() {
        let dst_dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();

        let mut wire = Cursor::new(Vec::new());
        nettf_courier::send_exact(&mut wire, &Magic::Dir.to_bytes()).unwrap();
        let base_name = "root";
        let dir_header = DirHeader {
            total_files: 1,
            total_size: 3,
            base_path_len: base_name.len() as u64,
        };
        nettf_courier::send_exact(&mut wire, &dir_header.encode()).unwrap();
        nettf_courier::send_exact(&mut wire, base_name.as_bytes()).unwrap();

        // Non-sentinel entry: file_size > 0 but filename_len == 0.
        let bad_entry = FileHeader {
            file_size: 3,
            filename_len: 0,
        };
        nettf_courier::send_exact(&mut wire, &bad_entry.encode()).unwrap();

        wire.set_position(0);
        let err = receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap_err();
        assert!(matches!(err, NettfError::HeaderInvalid(_)));
    }

    #[test]
    fn overlong_target_is_path_rejected_not_resource_exhausted() {
        let dst_dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();

        let mut wire = Cursor::new(Vec::new());
        nettf_courier::send_exact(&mut wire, &Magic::Targ.to_bytes()).unwrap();
        let target = "a".repeat(crate::sanitize::MAX_PATH_LEN + 1);
        let header = TargetedFileHeader {
            file: FileHeader {
                file_size: 1,
                filename_len: 1,
            },
            target_dir_len: target.len() as u64,
        };
        nettf_courier::send_exact(&mut wire, &header.encode()).unwrap();
        nettf_courier::send_exact(&mut wire, b"a").unwrap();
        nettf_courier::send_exact(&mut wire, target.as_bytes()).unwrap();

        wire.set_position(0);
        let err = receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap_err();
        assert!(matches!(err, NettfError::PathRejected { .. }));
    }

    #[test]
    fn absurdly_long_declared_target_is_resource_exhausted() {
        let dst_dir = tempfile::tempdir().unwrap();
        let cancel = CancelToken::new();

        let mut wire = Cursor::new(Vec::new());
        nettf_courier::send_exact(&mut wire, &Magic::Targ.to_bytes()).unwrap();
        let header = TargetedFileHeader {
            file: FileHeader {
                file_size: 1,
                filename_len: 1,
            },
            target_dir_len: MAX_DECLARED_STRING_LEN + 1,
        };
        nettf_courier::send_exact(&mut wire, &header.encode()).unwrap();
        nettf_courier::send_exact(&mut wire, b"a").unwrap();
        // No target bytes follow: recv_string must reject the declared
        // length before attempting to read or allocate for it.

        wire.set_position(0);
        let err = receive_frame(&mut wire, dst_dir.path(), &cancel).unwrap_err();
        assert!(matches!(err, NettfError::ResourceExhausted(_)));
    }
}
