//! Core data model for a filing pass.
//!
//! - ParsedName: the routing information carried by a file name
//! - FileResult: counters for one inbox (or, merged, for a whole run)

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// A file name that follows the `YYYYMMDD_dest[...]` convention.
///
/// All fields are the exact substrings of the original name; the date
/// components have already been range checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    /// Full file name, e.g. `20160825_pge_taxes2016.pdf`
    pub base_name: String,
    /// Four digit year, e.g. `2016`
    pub year: String,
    /// Two digit month, e.g. `08`
    pub month: String,
    /// Two digit day of month, e.g. `25`
    pub day: String,
    /// Destination token, e.g. `pge`
    pub destination: String,
}

/// Counters for a filing pass.
///
/// Created empty, mutated while an inbox is processed, then merged into the
/// run total and read once for the summary and the verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileResult {
    /// Files moved out of an inbox into their year folder
    pub ok_count: u32,

    /// Loose files moved into year folders inside already-filed directories
    pub organized_count: u32,

    /// Time spent organizing destination directories
    pub organize_duration: Duration,

    /// Files that could not be filed
    pub failure_count: u32,

    /// Destination directories that do not exist (only without `force`)
    pub missing_dirs: BTreeSet<PathBuf>,
}

impl FileResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another result into this one.
    pub fn merge(&mut self, other: FileResult) {
        self.ok_count += other.ok_count;
        self.organized_count += other.organized_count;
        self.organize_duration += other.organize_duration;
        self.failure_count += other.failure_count;
        self.missing_dirs.extend(other.missing_dirs);
    }

    /// True if nothing failed.
    pub fn is_success(&self) -> bool {
        self.failure_count == 0
    }

    /// Human-readable summary of the counters.
    ///
    /// `elapsed` is the wall time of the whole pass.
    pub fn summarize(&self, elapsed: Duration) -> String {
        let mut out = format!(
            "{} files moved in {}.\n{} files organized in {}.\n",
            self.ok_count,
            format_duration(elapsed),
            self.organized_count,
            format_duration(self.organize_duration),
        );

        if !self.missing_dirs.is_empty() {
            out.push_str("\nThe following directories are missing:\n");
            for dir in &self.missing_dirs {
                out.push_str(&format!("    {}\n", dir.display()));
            }
            out.push_str(
                "\nYou can automatically create the above directories by running \
                 this command again with the --force flag\n",
            );
        }

        if self.failure_count > 0 {
            out.push_str(&format!("\n{} files could not be filed.\n", self.failure_count));
        }

        out
    }
}

/// Format a duration for humans: `1h 2m 3s`, `2m 3s`, `3.25s` or `120ms`.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs % 60)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs % 60)
    } else if secs > 0 {
        format!("{:.2}s", elapsed.as_secs_f64())
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}
