//! Inbox processing.
//!
//! One inbox is filed in three phases:
//! 1. Parse every entry name and accumulate the years each destination needs
//! 2. Prepare each destination directory (create it with `force`, otherwise
//!    record it as missing) and organize it
//! 3. Copy each file to its carbon-copy location, if any, then move it into
//!    `dest/<year>/`
//!
//! Per-file problems are counted in `FileResult` and skipped. Only problems
//! with the inbox as a whole, or with preparing a destination, abort.

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use crate::accum::Accumulator;
use crate::config::Layout;
use crate::error::EngineError;
use crate::fs_ops;
use crate::model::{FileResult, ParsedName};
use crate::name;
use crate::organize::organize;
use crate::progress::ProgressCallback;

/// File every entry of `inbox`, adding counts to `result`.
///
/// Files whose destination directory is missing (without `force`) are counted
/// as failures once, when the directory is found missing, and are left in the
/// inbox untouched.
///
/// # Errors
/// Returns EngineError if the inbox is not a readable directory, a forced
/// destination cannot be created, or a destination cannot be organized.
/// Counts gathered before the error remain in `result`.
pub fn process_inbox(
    inbox: &Path,
    layout: &dyn Layout,
    force: bool,
    progress: Option<&dyn ProgressCallback>,
    result: &mut FileResult,
) -> Result<(), EngineError> {
    if !fs_ops::is_dir(inbox) {
        return Err(EngineError::InboxNotDirectory {
            path: inbox.to_path_buf(),
        });
    }

    let entries = fs_ops::list_dir(inbox)?;
    tracing::info!(inbox = %inbox.display(), entries = entries.len(), "processing inbox");
    if let Some(callback) = progress {
        callback.on_inbox_started(inbox, entries.len());
    }

    let mut parsed_files: Vec<ParsedName> = Vec::new();
    let mut acc = Accumulator::new();
    for entry in &entries {
        match name::parse_os_name(force, &entry.name) {
            Ok(parsed) => {
                acc.add(&parsed.destination, &parsed.year);
                parsed_files.push(parsed);
            }
            Err(e) => {
                let path = inbox.join(&entry.name);
                tracing::warn!(path = %path.display(), reason = e.reason(), "skipping: {}", e);
                if let Some(callback) = progress {
                    callback.on_unparsable(&path, &e);
                }
                result.failure_count += 1;
            }
        }
    }

    if acc.is_empty() {
        tracing::debug!(inbox = %inbox.display(), "nothing to file");
    } else {
        tracing::debug!(destinations = acc.len(), files = parsed_files.len(), "preparing destinations");
    }

    let mut missing: HashSet<String> = HashSet::new();
    for needs in acc.iter() {
        let dest = layout.dest(&needs.destination);
        if !fs_ops::is_dir(&dest) {
            if force {
                fs_ops::ensure_dir(&dest, true)?;
                tracing::info!(dest = %dest.display(), "created destination directory");
            } else {
                let waiting = parsed_files
                    .iter()
                    .filter(|p| p.destination == needs.destination)
                    .count() as u32;
                tracing::warn!(dest = %dest.display(), files = waiting, "destination directory is missing");
                result.failure_count += waiting;
                result.missing_dirs.insert(dest);
                missing.insert(needs.destination);
                continue;
            }
        }

        let start = Instant::now();
        let organized = organize(force, &dest, &needs.years, progress);
        result.organize_duration += start.elapsed();
        match organized {
            Ok(moved) => result.organized_count += moved,
            Err(e) => {
                if let EngineError::OrganizeFailed { moved, .. } = &e {
                    result.organized_count += moved;
                }
                return Err(e);
            }
        }
    }

    let to_file: Vec<&ParsedName> = parsed_files
        .iter()
        .filter(|p| !missing.contains(&p.destination))
        .collect();
    let total = to_file.len();

    for (index, parsed) in to_file.into_iter().enumerate() {
        let src = inbox.join(&parsed.base_name);
        if let Err(e) = file_one(&src, layout, parsed) {
            tracing::warn!(path = %src.display(), os_error = ?e.raw_os_error(), "{}", e);
            if let Some(callback) = progress {
                callback.on_file_failed(&src, &e);
            }
            result.failure_count += 1;
            continue;
        }

        result.ok_count += 1;
        if let Some(callback) = progress {
            callback.on_file_filed(index + 1, total, parsed);
        }
    }

    if let Some(callback) = progress {
        callback.on_inbox_completed(inbox, result);
    }

    Ok(())
}

/// Carbon-copy (if configured) and then move a single inbox file.
fn file_one(src: &Path, layout: &dyn Layout, parsed: &ParsedName) -> Result<(), EngineError> {
    if let Some(cc_root) = layout.cc_dest(&parsed.destination) {
        let cc_dir = cc_root.join(&parsed.year);
        fs_ops::ensure_dir(&cc_dir, true)?;
        let cc_path = cc_dir.join(&parsed.base_name);
        fs_ops::copy_file(src, &cc_path)?;
        tracing::debug!(from = %src.display(), to = %cc_path.display(), "copied");
    }

    let dst = layout
        .dest(&parsed.destination)
        .join(&parsed.year)
        .join(&parsed.base_name);
    fs_ops::move_file(src, &dst)?;
    tracing::debug!(from = %src.display(), to = %dst.display(), "filed");
    Ok(())
}
