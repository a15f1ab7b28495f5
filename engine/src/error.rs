//! Error types for the filing engine.
//!
//! There are two layers:
//! - `ParseError`: a file name does not follow the `YYYYMMDD_dest...` convention.
//! - `EngineError`: job-level errors, wrapping io and parse errors with the
//!   path or operation they occurred on.
//!
//! Per-file problems inside an inbox are tolerated by the processor and only
//! counted in `FileResult`; they still surface as `EngineError` values through
//! the progress callback so a UI can show them.

use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The date field that failed a range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Year,
    Month,
    Day,
}

impl Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateField::Year => write!(f, "year"),
            DateField::Month => write!(f, "month"),
            DateField::Day => write!(f, "day"),
        }
    }
}

/// Why a file name could not be turned into a `ParsedName`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The name does not have the `YYYYMMDD_dest` shape.
    #[error(
        "Unable to parse {name:?}. We expect an 8 digit value like \
         20160825_pge_taxes2016.pdf or 20160825_pge.pdf"
    )]
    Malformed { name: String },

    /// A date component is outside its valid range.
    #[error("Unexpected {field} {value:?}. We expect a value between {min} and {max}")]
    OutOfRange {
        field: DateField,
        value: String,
        min: u32,
        max: u32,
    },

    /// The year is too far ahead of the current year to be trusted.
    #[error(
        "{name} is {years_ahead} years in the future, which is highly suspect. \
         To continue, set the --force flag"
    )]
    Future { name: String, years_ahead: i32 },
}

impl ParseError {
    /// Short machine-readable reason: `malformed`, `range` or `future`.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed { .. } => "malformed",
            Self::OutOfRange { .. } => "range",
            Self::Future { .. } => "future",
        }
    }
}

/// Errors raised by the engine.
///
/// Whole-inbox failures abort processing of that inbox. The same type is used
/// for per-file failures, which the processor records and moves past.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The inbox path is missing or is not a directory
    #[error("{} does not appear to be a directory", .path.display())]
    InboxNotDirectory { path: PathBuf },

    /// Failed to list a directory
    #[error("Failed to enumerate directory: {}", .path.display())]
    EnumerationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to create a directory
    #[error("Failed to create directory: {}", .path.display())]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file name did not parse
    #[error("Unable to file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// Rename or cross-device move failed
    #[error("Unable to move {} to {}", .from.display(), .to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copy to a secondary location failed
    #[error("Unable to copy {} to {}", .from.display(), .to.display())]
    CopyFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The copied bytes do not hash to the same value as the source
    #[error(
        "Checksum mismatch after copying {} to {}",
        .from.display(),
        .to.display()
    )]
    VerificationFailed { from: PathBuf, to: PathBuf },

    /// Organizing a filed directory stopped partway
    #[error("Failed organizing {} after {moved} files", .dir.display())]
    OrganizeFailed {
        dir: PathBuf,
        moved: u32,
        #[source]
        source: Box<EngineError>,
    },

    /// The home directory could not be determined
    #[error("Unable to determine home directory")]
    NoHomeDirectory,

    /// Failed to read the configuration file
    #[error("Failed to read {}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configuration file is not valid YAML for `Config`
    #[error("Failed to parse {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to serialize or write the configuration file
    #[error("Failed to write {}: {message}", .path.display())]
    ConfigWrite { path: PathBuf, message: String },

    /// No root directory was configured
    #[error(
        "You must use the --root flag to specify a root directory. \
         This will be stored for later use."
    )]
    MissingRoot,

    /// The run tolerated per-file failures but did not fully succeed
    #[error("There were {count} failures")]
    Failures { count: u32 },
}

impl EngineError {
    /// Extract the OS error code from this error, if available.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::EnumerationFailed { source, .. }
            | Self::DirectoryCreationFailed { source, .. }
            | Self::MoveFailed { source, .. }
            | Self::CopyFailed { source, .. }
            | Self::ConfigRead { source, .. } => source.raw_os_error(),
            Self::OrganizeFailed { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }

    /// The parse failure behind this error, if any.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::OrganizeFailed { source, .. } => source.parse_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_parse_error_reasons() {
        let malformed = ParseError::Malformed { name: "x".to_string() };
        let range = ParseError::OutOfRange {
            field: DateField::Month,
            value: "13".to_string(),
            min: 1,
            max: 12,
        };
        let future = ParseError::Future { name: "x".to_string(), years_ahead: 5 };

        assert_eq!(malformed.reason(), "malformed");
        assert_eq!(range.reason(), "range");
        assert_eq!(future.reason(), "future");
    }

    #[test]
    fn test_range_message_names_field_value_and_bounds() {
        let err = ParseError::OutOfRange {
            field: DateField::Month,
            value: "13".to_string(),
            min: 1,
            max: 12,
        };
        assert_eq!(
            err.to_string(),
            "Unexpected month \"13\". We expect a value between 1 and 12"
        );
    }

    #[test]
    fn test_organize_failure_exposes_nested_source() {
        let inner = EngineError::Parse {
            path: PathBuf::from("/filed/foo/notes.txt"),
            source: ParseError::Malformed { name: "notes.txt".to_string() },
        };
        let err = EngineError::OrganizeFailed {
            dir: PathBuf::from("/filed/foo"),
            moved: 2,
            source: Box::new(inner),
        };

        assert!(err.to_string().contains("/filed/foo"));
        assert_eq!(err.parse_error().map(|e| e.reason()), Some("malformed"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_raw_os_error_from_io_source() {
        let err = EngineError::MoveFailed {
            from: PathBuf::from("a"),
            to: PathBuf::from("b"),
            source: io::Error::from_raw_os_error(2),
        };
        assert_eq!(err.raw_os_error(), Some(2));
        assert_eq!(EngineError::MissingRoot.raw_os_error(), None);
    }
}
