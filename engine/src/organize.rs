//! Directory organizer.
//!
//! A filed destination directory should only contain year folders. Loose
//! dated files (dropped in by hand, or left by older versions of the layout)
//! are moved into `<dest>/<year>/`, and year folders that the current pass is
//! about to file into are created up front.

use std::collections::{BTreeSet, HashSet};
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::time::Instant;

use crate::error::EngineError;
use crate::fs_ops;
use crate::name;
use crate::progress::ProgressCallback;

/// Organize `dest_dir` and make sure every year in `years` has a folder.
///
/// Every loose file must parse (same `force` semantics as the inbox); a
/// single unparsable name fails the whole call before anything is moved.
/// Running this again on an organized directory moves nothing.
///
/// # Returns
/// Number of loose files moved into year folders
///
/// # Errors
/// `OrganizeFailed`, carrying the number of files already moved.
pub fn organize(
    force: bool,
    dest_dir: &Path,
    years: &BTreeSet<String>,
    progress: Option<&dyn ProgressCallback>,
) -> Result<u32, EngineError> {
    let start = Instant::now();
    let mut moved = 0u32;
    let failed = |moved: u32, source: EngineError| EngineError::OrganizeFailed {
        dir: dest_dir.to_path_buf(),
        moved,
        source: Box::new(source),
    };

    let mut have: HashSet<OsString> = HashSet::new();
    let mut loose = Vec::new();
    for item in fs_ops::list_dir(dest_dir).map_err(|e| failed(0, e))? {
        if item.is_dir {
            have.insert(item.name);
        } else {
            let parsed = name::parse_os_name(force, &item.name).map_err(|source| {
                failed(
                    0,
                    EngineError::Parse {
                        path: dest_dir.join(&item.name),
                        source,
                    },
                )
            })?;
            loose.push((item.name, parsed.year));
        }
    }

    let total = loose.len();
    for (index, (file_name, year)) in loose.iter().enumerate() {
        ensure_year(dest_dir, year, &mut have).map_err(|e| failed(moved, e))?;

        let from = dest_dir.join(file_name);
        let to = dest_dir.join(year).join(file_name);
        fs_ops::move_file(&from, &to).map_err(|e| failed(moved, e))?;
        tracing::debug!(from = %from.display(), to = %to.display(), "organized");
        moved += 1;

        if let Some(callback) = progress {
            callback.on_organize_progress(dest_dir, index + 1, total);
        }
    }

    for year in years {
        ensure_year(dest_dir, year, &mut have).map_err(|e| failed(moved, e))?;
    }

    if total > 0 {
        let elapsed = start.elapsed();
        tracing::info!(
            dir = %dest_dir.display(),
            moved,
            elapsed_ms = elapsed.as_millis() as u64,
            "organized directory"
        );
        if let Some(callback) = progress {
            callback.on_organized(dest_dir, moved, elapsed);
        }
    }

    Ok(moved)
}

fn ensure_year(
    dest_dir: &Path,
    year: &str,
    have: &mut HashSet<OsString>,
) -> Result<(), EngineError> {
    if have.contains(OsStr::new(year)) {
        return Ok(());
    }
    fs_ops::ensure_dir(&dest_dir.join(year), false)?;
    have.insert(OsString::from(year));
    Ok(())
}
