//! # fileinbox engine - document filing library
//!
//! Files incoming documents from inbox directories into a dated archive tree.
//! The destination and year come from the file name itself:
//! `20160825_pge_taxes2016.pdf` goes to `<root>/filed/pge/2016/`.
//!
//! ## Overview
//!
//! A filing pass is a single, synchronous, one-shot run:
//! - Inbox names are parsed and validated (unparsable names are skipped and counted)
//! - Destination directories are prepared, and any loose files already in them
//!   are organized into year folders
//! - Each file is optionally copied to a carbon-copy location, then moved
//!   into place; a rename that crosses filesystems falls back to a verified copy
//! - Per-file failures are counted, not fatal; a summary is produced at the end
//!
//! ## Basic Usage
//!
//! ```no_run
//! use engine::{run_filing, Config};
//!
//! let config = Config::with_root("/home/me/docs");
//! let report = run_filing(&config, false, None);
//! println!("{}", report.summary());
//! if let Err(e) = report.verdict() {
//!     eprintln!("Error: {}", e);
//! }
//! ```
//!
//! ## Modules
//!
//! - **model**: ParsedName and the FileResult counters
//! - **error**: ParseError and EngineError
//! - **name**: file name parsing
//! - **accum**: per-destination year accumulation
//! - **fs_ops**: directory listing/creation, move and copy
//! - **checksums**: content verification for copy fallbacks
//! - **organize**: retrofitting loose files into year folders
//! - **inbox**: processing a single inbox
//! - **job**: running all inboxes and reporting
//! - **config**: persisted configuration and the Layout trait
//! - **progress**: progress callback trait

pub mod model;
pub mod error;
pub mod name;
pub mod accum;
pub mod fs_ops;
pub mod checksums;
pub mod organize;
pub mod inbox;
pub mod job;
pub mod config;
pub mod progress;

// Re-export main types and functions
pub use model::{FileResult, ParsedName};
pub use error::{DateField, EngineError, ParseError};
pub use name::{parse_file_name, parse_os_name};
pub use accum::{Accumulator, DestNeeds};
pub use fs_ops::{copy_file, move_file, move_file_on, NativePlatform, Platform};
pub use organize::organize;
pub use inbox::process_inbox;
pub use job::{run_filing, FilingReport, InboxFailure};
pub use config::{CcConfig, Config, ConfigStore, Layout};
pub use progress::ProgressCallback;
