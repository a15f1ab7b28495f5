//! Filesystem operations module.
//!
//! This module provides the low-level operations the filing pass is built on:
//! - Listing a directory's immediate children
//! - Creating owner-only directories idempotently
//! - Moving files, with a copy fallback when a rename crosses filesystems
//! - Copying files without ever overwriting an existing destination
//!
//! Moves and copies are all-or-nothing per file: a destination only exists
//! under its final name once every byte has been written and synced.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

use crate::checksums;
use crate::error::EngineError;

/// Rename capability of the host platform.
///
/// `move_file_on` asks the platform to rename first and only copies when the
/// platform reports that the two paths live on different filesystems.
pub trait Platform {
    /// Atomically rename `from` to `to`.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// True if `err` means the rename crossed a filesystem boundary.
    fn is_cross_device(&self, err: &io::Error) -> bool;

    /// Compare a copied file against its source before the source is removed.
    fn contents_match(&self, src: &Path, dst: &Path) -> io::Result<bool> {
        checksums::same_contents(src, dst)
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativePlatform;

#[cfg(unix)]
fn cross_device_code() -> Option<i32> {
    Some(libc::EXDEV)
}

#[cfg(windows)]
fn cross_device_code() -> Option<i32> {
    // ERROR_NOT_SAME_DEVICE
    Some(17)
}

#[cfg(not(any(unix, windows)))]
fn cross_device_code() -> Option<i32> {
    None
}

impl Platform for NativePlatform {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn is_cross_device(&self, err: &io::Error) -> bool {
        match (err.raw_os_error(), cross_device_code()) {
            (Some(code), Some(exdev)) => code == exdev,
            _ => false,
        }
    }
}

/// An immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirItem {
    pub name: OsString,
    pub is_dir: bool,
}

/// List the immediate children of `dir`, sorted by name.
///
/// Symlinks are reported as files, they are not followed.
pub fn list_dir(dir: &Path) -> Result<Vec<DirItem>, EngineError> {
    let enumeration_failed = |source| EngineError::EnumerationFailed {
        path: dir.to_path_buf(),
        source,
    };

    let mut items = Vec::new();
    for entry in fs::read_dir(dir).map_err(enumeration_failed)? {
        let entry = entry.map_err(enumeration_failed)?;
        let file_type = entry.file_type().map_err(enumeration_failed)?;
        items.push(DirItem {
            name: entry.file_name(),
            is_dir: file_type.is_dir(),
        });
    }
    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(items)
}

/// True if `path` exists and is a directory.
pub fn is_dir(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Create `path` with owner-only permissions unless it already is a directory.
///
/// With `recursive`, missing ancestors are created too (also owner-only).
///
/// # Errors
/// Returns EngineError if the path exists but is not a directory, or if
/// creation fails.
pub fn ensure_dir(path: &Path, recursive: bool) -> Result<(), EngineError> {
    let creation_failed = |source| EngineError::DirectoryCreationFailed {
        path: path.to_path_buf(),
        source,
    };

    match fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(creation_failed(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            )))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(creation_failed(e)),
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    match builder.create(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && is_dir(path) => Ok(()),
        Err(e) => Err(creation_failed(e)),
    }
}

/// Move a file on the native platform. See `move_file_on`.
pub fn move_file(src: &Path, dst: &Path) -> Result<(), EngineError> {
    move_file_on(&NativePlatform, src, dst)
}

/// Move `src` to `dst`.
///
/// A rename is tried first. Only if the platform reports a cross-device
/// rename is the file copied (exclusive create, stream, sync), verified by
/// checksum and then removed from the source. Any other rename error is
/// returned as is.
///
/// On failure the source is left in place and no destination file remains.
///
/// A rename on the same filesystem replaces an existing file at `dst`, so
/// a document filed again under the same name overwrites the earlier one.
/// The copy fallback never overwrites and fails instead.
///
/// # Errors
/// `MoveFailed` for io errors, `VerificationFailed` if the copy differs.
pub fn move_file_on(
    platform: &dyn Platform,
    src: &Path,
    dst: &Path,
) -> Result<(), EngineError> {
    let move_failed = |source| EngineError::MoveFailed {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    };

    match platform.rename(src, dst) {
        Ok(()) => return Ok(()),
        Err(e) if platform.is_cross_device(&e) => {
            tracing::debug!(
                from = %src.display(),
                to = %dst.display(),
                "rename crosses filesystems, copying instead"
            );
        }
        Err(e) => return Err(move_failed(e)),
    }

    copy_exclusive(src, dst).map_err(move_failed)?;

    match platform.contents_match(src, dst) {
        Ok(true) => {}
        Ok(false) => {
            let _ = fs::remove_file(dst);
            return Err(EngineError::VerificationFailed {
                from: src.to_path_buf(),
                to: dst.to_path_buf(),
            });
        }
        Err(e) => {
            let _ = fs::remove_file(dst);
            return Err(move_failed(e));
        }
    }

    if let Err(e) = fs::remove_file(src) {
        // Keep exactly one copy.
        let _ = fs::remove_file(dst);
        return Err(move_failed(e));
    }

    Ok(())
}

/// Copy `src` to a new file at `dst`; the source is never touched.
///
/// Fails if `dst` already exists. A partially written destination is removed.
///
/// # Returns
/// Number of bytes copied
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, EngineError> {
    copy_exclusive(src, dst).map_err(|source| EngineError::CopyFailed {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source,
    })
}

fn copy_exclusive(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut from = File::open(src)?;
    let src_mtime = from.metadata().and_then(|m| m.modified()).ok();

    let mut to = OpenOptions::new().write(true).create_new(true).open(dst)?;

    // sync_all surfaces write-back errors that a silent drop would lose.
    let copied = io::copy(&mut from, &mut to).and_then(|n| to.sync_all().map(|()| n));
    drop(to);

    match copied {
        Ok(n) => {
            if let Some(mtime) = src_mtime {
                let _ = filetime::set_file_mtime(dst, filetime::FileTime::from_system_time(mtime));
            }
            Ok(n)
        }
        Err(e) => {
            let _ = fs::remove_file(dst);
            Err(e)
        }
    }
}
