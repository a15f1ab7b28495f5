//! Progress reporting trait.
//!
//! This module defines the ProgressCallback trait, which decouples the filing
//! engine from the terminal. The CLI prints `(i/n)` style lines; tests record
//! the calls.

use std::path::Path;
use std::time::Duration;

use crate::error::{EngineError, ParseError};
use crate::model::{FileResult, ParsedName};

/// Receives progress updates while inboxes are filed.
///
/// All methods are called synchronously, in order, on the filing thread.
pub trait ProgressCallback {
    /// Called once an inbox has been listed.
    fn on_inbox_started(&self, inbox: &Path, entries: usize);

    /// Called for an inbox entry whose name does not parse. The file is skipped.
    fn on_unparsable(&self, path: &Path, error: &ParseError);

    /// Called after each loose file is moved into its year folder.
    fn on_organize_progress(&self, dir: &Path, current: usize, total: usize);

    /// Called when a destination directory has been organized.
    fn on_organized(&self, dir: &Path, moved: u32, elapsed: Duration);

    /// Called after an inbox file has been moved into place.
    fn on_file_filed(&self, current: usize, total: usize, file: &ParsedName);

    /// Called when an inbox file could not be copied or moved.
    fn on_file_failed(&self, path: &Path, error: &EngineError);

    /// Called when an inbox has been fully processed.
    fn on_inbox_completed(&self, inbox: &Path, result: &FileResult);
}
