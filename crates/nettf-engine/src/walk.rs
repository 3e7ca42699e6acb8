//! Directory tree walking for the sender side of DIR/TDIR frames.
//!
//! Per §9's "Design Notes," the count pass and the stream pass must agree on
//! exactly which files are sent: the walk here is taken exactly once and
//! the resulting entry list is used for both purposes (`total_files`,
//! `total_size`) and the actual content streaming, so a mutation of the
//! source tree between "counting" and "sending" can never desynchronize
//! the declared totals from what is actually transmitted.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::NettfError;

/// A single regular file discovered while walking a tree, paired with the
/// forward-slash relative path it will be transmitted under.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// Absolute (or walk-root-relative) path to open for reading.
    pub absolute_path: PathBuf,
    /// Forward-slash–separated path relative to the tree's base, as placed
    /// on the wire.
    pub relative_path: String,
    /// Size in bytes at the time of the walk.
    pub size: u64,
}

/// A snapshot of a directory tree: every regular file beneath `root`,
/// together with the aggregate totals a DIR/TDIR header declares.
#[derive(Debug, Clone)]
pub struct TreeSnapshot {
    /// Every regular file discovered, in walk order.
    pub entries: Vec<TreeEntry>,
    /// Sum of `entries[i].size`.
    pub total_size: u64,
}

/// Walks `root` depth-first using an explicit stack (so recursion depth is
/// bounded by available heap, not native stack, on deep trees), skipping
/// `.`/`..` and any non-regular, non-directory entry (symlinks, sockets,
/// devices) silently, per §4.4.4.
///
/// # Errors
///
/// Returns [`NettfError::FileError`] if `root`, or any directory beneath
/// it, cannot be read.
pub fn snapshot_tree(root: &Path) -> Result<TreeSnapshot, NettfError> {
    let mut entries = Vec::new();
    let mut total_size = 0u64;
    let mut stack = vec![(root.to_path_buf(), String::new())];

    while let Some((dir, rel_prefix)) = stack.pop() {
        let read_dir = fs::read_dir(&dir).map_err(|source| NettfError::FileError {
            action: "read_dir",
            path: dir.clone(),
            source,
        })?;

        let mut children: Vec<_> = read_dir
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| NettfError::FileError {
                action: "read_dir entry",
                path: dir.clone(),
                source,
            })?;
        children.sort_by_key(std::fs::DirEntry::file_name);

        for child in children {
            let file_name = child.file_name();
            let name_str = file_name.to_string_lossy().into_owned();
            let relative_path = if rel_prefix.is_empty() {
                name_str.clone()
            } else {
                format!("{rel_prefix}/{name_str}")
            };

            let metadata = match child.metadata() {
                Ok(m) => m,
                // Entry disappeared between readdir and stat: skip it, the
                // same as any other non-transmittable entry.
                Err(_) => continue,
            };

            if metadata.is_dir() {
                stack.push((child.path(), relative_path));
            } else if metadata.is_file() {
                let size = metadata.len();
                total_size += size;
                entries.push(TreeEntry {
                    absolute_path: child.path(),
                    relative_path,
                    size,
                });
            }
            // Anything else (symlink, socket, device, ...) is skipped
            // silently per §4.4.4.
        }
    }

    Ok(TreeSnapshot {
        entries,
        total_size,
    })
}
