//! Contains the native recursive copy used to stage a disc's file tree.
//!
//! The copy runs in two phases:
//! 1.  Scan the source tree to learn its layout and total size.
//! 2.  Recreate directories, files and symlinks under the destination, then restore
//!     directory timestamps from the deepest level upwards.
//!
//! Modification and access times are preserved for every entry. Permission bits are
//! not, because disc filesystems are read-only and the archive must stay writable.
use crate::error::{Error, Result};
use crate::signal::StopSignal;
use filetime::FileTime;
use std::fs::{self, File, Metadata};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

// Use a 1 MiB buffer for I/O operations.
const BUFFER_SIZE: usize = 1024 * 1024;

/// Receives progress reports from a tree copy.
pub trait CopyProgress {
    /// Called once before any data is copied with the total number of bytes to copy.
    fn copy_started(&mut self, _total_bytes: u64) {}

    /// Called repeatedly with the number of bytes copied so far.
    fn copy_progress(&mut self, _bytes_copied: u64) {}
}

impl CopyProgress for () {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntryKind {
    Dir,
    File(u64),
    Symlink,
}

/// Access and modification time of an entry, as `(atime, mtime)`.
pub(crate) type Times = (FileTime, FileTime);

/// One entry of a scanned tree, relative to the tree's root.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) relative: PathBuf,
    pub(crate) kind: EntryKind,
    /// Taken before the entry is read, so reading it cannot bump the access time.
    pub(crate) times: Times,
}

/// Result of scanning a directory tree.
pub(crate) struct Scan {
    /// Entries in creation order: every directory comes before its children.
    pub(crate) entries: Vec<Entry>,
    pub(crate) total_bytes: u64,
    pub(crate) root_times: Times,
}

pub(crate) fn scan_tree(root: &Path) -> std::io::Result<Scan> {
    let mut scan = Scan {
        entries: Vec::new(),
        total_bytes: 0,
        root_times: file_times(&fs::metadata(root)?),
    };
    scan_recursive(root, Path::new(""), &mut scan)?;
    Ok(scan)
}

fn scan_recursive(root: &Path, relative: &Path, scan: &mut Scan) -> std::io::Result<()> {
    let mut children: Vec<_> =
        fs::read_dir(root.join(relative))?.collect::<std::io::Result<Vec<_>>>()?;
    children.sort_by_key(|entry| entry.file_name());

    for child in children {
        let relative = relative.join(child.file_name());
        let metadata = child.path().symlink_metadata()?;
        let file_type = metadata.file_type();
        let times = file_times(&metadata);

        if file_type.is_dir() {
            scan.entries.push(Entry {
                relative: relative.clone(),
                kind: EntryKind::Dir,
                times,
            });
            scan_recursive(root, &relative, scan)?;
        } else if file_type.is_file() {
            scan.total_bytes += metadata.len();
            scan.entries.push(Entry {
                relative,
                kind: EntryKind::File(metadata.len()),
                times,
            });
        } else if file_type.is_symlink() {
            scan.entries.push(Entry {
                relative,
                kind: EntryKind::Symlink,
                times,
            });
        } else {
            warn!(path = %relative.display(), "Skipping special file");
        }
    }

    Ok(())
}

fn file_times(metadata: &Metadata) -> Times {
    (
        FileTime::from_last_access_time(metadata),
        FileTime::from_last_modification_time(metadata),
    )
}

/// Copies one regular file chunk by chunk, reporting the running total.
fn copy_file(
    source: &Path,
    destination: &Path,
    (atime, mtime): Times,
    signal: &StopSignal,
    copied: &mut u64,
    progress: &mut dyn CopyProgress,
    buffer: &mut [u8],
) -> Result<()> {
    let mut input = File::open(source)?;
    let mut output = File::create(destination)?;

    loop {
        signal.check()?;

        let n = input.read(buffer)?;
        if n == 0 {
            break;
        }
        output.write_all(&buffer[..n])?;
        *copied += n as u64;
        progress.copy_progress(*copied);
    }
    output.flush()?;
    drop(output);

    filetime::set_file_times(destination, atime, mtime)?;
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(source: &Path, destination: &Path, (atime, mtime): Times) -> Result<()> {
    let target = fs::read_link(source)?;
    std::os::unix::fs::symlink(&target, destination)?;
    filetime::set_symlink_file_times(destination, atime, mtime)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, _destination: &Path, _times: Times) -> Result<()> {
    warn!(path = %source.display(), "Symlinks are not supported on this platform, skipping");
    Ok(())
}

/// Recursively copies the tree at `source` to `destination`, preserving timestamps.
///
/// `destination` must not exist; it is created as the copy of `source` itself, so the
/// root directory's timestamps are carried over as well.
///
/// # Arguments
///
/// * `source` - The directory to copy, typically the disc's mount point.
/// * `destination` - Where the copy is created.
/// * `signal` - Checked between chunks; a requested stop aborts the copy.
/// * `progress` - Told the total size up front and the running byte count as data is
///   copied.
///
/// # Errors
///
/// Returns [`Error::Interrupted`] if a stop is requested while copying, and
/// [`Error::Copy`] for any I/O failure, naming the entry that failed.
pub fn copy_tree(
    source: &Path,
    destination: &Path,
    signal: &StopSignal,
    progress: &mut dyn CopyProgress,
) -> Result<u64> {
    let copy_error = |entry: &Path, e: &dyn std::fmt::Display| Error::Copy {
        source_dir: source.to_path_buf(),
        destination: destination.to_path_buf(),
        reason: format!("{}: {}", entry.display(), e),
    };

    let scan = scan_tree(source).map_err(|e| copy_error(source, &e))?;
    debug!(
        entries = scan.entries.len(),
        total_bytes = scan.total_bytes,
        "Scanned source tree"
    );
    progress.copy_started(scan.total_bytes);

    fs::create_dir(destination).map_err(|e| copy_error(destination, &e))?;

    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut copied: u64 = 0;
    for entry in &scan.entries {
        let from = source.join(&entry.relative);
        let to = destination.join(&entry.relative);

        let result = match entry.kind {
            EntryKind::Dir => fs::create_dir(&to).map_err(Error::from),
            EntryKind::File(_) => copy_file(
                &from,
                &to,
                entry.times,
                signal,
                &mut copied,
                progress,
                &mut buffer,
            ),
            EntryKind::Symlink => copy_symlink(&from, &to, entry.times),
        };

        match result {
            Ok(()) => {}
            Err(Error::Interrupted) => return Err(Error::Interrupted),
            Err(e) => return Err(copy_error(&entry.relative, &e)),
        }
    }

    // Directory times change as children are created, so they are set last and
    // deepest first.
    let directories = scan
        .entries
        .iter()
        .rev()
        .filter(|entry| entry.kind == EntryKind::Dir)
        .map(|entry| (entry.relative.as_path(), entry.times))
        .chain(std::iter::once((Path::new(""), scan.root_times)));
    for (relative, (atime, mtime)) in directories {
        filetime::set_file_times(destination.join(relative), atime, mtime)
            .map_err(|e| copy_error(relative, &e))?;
    }

    Ok(copied)
}
