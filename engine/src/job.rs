//! Filing run orchestration.
//!
//! A run processes every inbox of a `Layout` in order. Each inbox gets a
//! fresh `FileResult` which is merged into the run total afterwards, so one
//! inbox failing does not stop the others and partial counts are kept.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::Layout;
use crate::error::EngineError;
use crate::inbox::process_inbox;
use crate::model::{format_duration, FileResult};
use crate::progress::ProgressCallback;

/// An inbox that could not be processed.
#[derive(Debug)]
pub struct InboxFailure {
    pub inbox: PathBuf,
    pub error: EngineError,
}

/// Outcome of a full filing run.
#[derive(Debug)]
pub struct FilingReport {
    /// Counters merged across all inboxes
    pub result: FileResult,

    /// Inboxes that aborted, in processing order
    pub inbox_failures: Vec<InboxFailure>,

    /// Wall time of the whole run
    pub elapsed: Duration,
}

impl FilingReport {
    /// Text shown to the user at the end of a run, successful or not.
    pub fn summary(&self) -> String {
        let mut out = self.result.summarize(self.elapsed);
        for failure in &self.inbox_failures {
            let _ = writeln!(
                out,
                "\nError processing {}: {}",
                failure.inbox.display(),
                error_chain(&failure.error)
            );
        }
        out
    }

    /// True if every inbox was processed and no file failed.
    pub fn is_success(&self) -> bool {
        self.inbox_failures.is_empty() && self.result.is_success()
    }

    /// Number of files that could not be filed.
    pub fn failure_count(&self) -> u32 {
        self.result.failure_count
    }

    /// Turn the report into the run's pass/fail outcome.
    ///
    /// # Errors
    /// The first inbox error, otherwise `Failures` if any file failed.
    pub fn verdict(self) -> Result<FileResult, EngineError> {
        if let Some(failure) = self.inbox_failures.into_iter().next() {
            return Err(failure.error);
        }
        if self.result.failure_count > 0 {
            return Err(EngineError::Failures {
                count: self.result.failure_count,
            });
        }
        Ok(self.result)
    }
}

/// Render an error with its chain of sources, `outer: inner: root`.
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(text, ": {}", cause);
        source = cause.source();
    }
    text
}

/// File every inbox of `layout`.
///
/// Never fails as a whole; inbox-level errors are collected in the report.
pub fn run_filing(
    layout: &dyn Layout,
    force: bool,
    progress: Option<&dyn ProgressCallback>,
) -> FilingReport {
    let start = Instant::now();
    let mut total = FileResult::new();
    let mut inbox_failures = Vec::new();

    for inbox in layout.inboxes() {
        let mut result = FileResult::new();
        if let Err(error) = process_inbox(&inbox, layout, force, progress, &mut result) {
            tracing::error!(inbox = %inbox.display(), "{}", error_chain(&error));
            inbox_failures.push(InboxFailure { inbox, error });
        }
        total.merge(result);
    }

    let elapsed = start.elapsed();
    tracing::info!(
        moved = total.ok_count,
        organized = total.organized_count,
        failures = total.failure_count,
        elapsed = %format_duration(elapsed),
        "filing run finished"
    );

    FilingReport {
        result: total,
        inbox_failures,
        elapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::fs;
    use std::path::Path;

    fn create_files(root: &Path, names: &[&str]) {
        for name in names {
            let path = root.join(name);
            if name.ends_with('/') {
                fs::create_dir_all(&path).expect("Failed to create dir");
            } else {
                fs::create_dir_all(path.parent().expect("parent")).expect("Failed to create parent");
                let base = path.file_name().expect("file name").to_string_lossy().into_owned();
                fs::write(&path, format!("contents for {}", base)).expect("Failed to write file");
            }
        }
    }

    /// Every path below `root` (directories with a trailing `/`), sorted.
    /// Each file must still hold `contents for <name>`.
    fn read_files(root: &Path) -> Vec<String> {
        fn walk(root: &Path, dir: &Path, found: &mut Vec<String>) {
            for entry in fs::read_dir(dir).expect("Failed to read dir") {
                let path = entry.expect("entry").path();
                let rel = path
                    .strip_prefix(root)
                    .expect("below root")
                    .to_string_lossy()
                    .replace('\\', "/");
                if path.is_dir() {
                    found.push(format!("{}/", rel));
                    walk(root, &path, found);
                } else {
                    let base = path.file_name().expect("file name").to_string_lossy().into_owned();
                    let contents = fs::read_to_string(&path).expect("Failed to read file");
                    assert_eq!(contents, format!("contents for {}", base), "{}", rel);
                    found.push(rel);
                }
            }
        }

        let mut found = Vec::new();
        walk(root, root, &mut found);
        found.sort();
        found
    }

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        names.sort();
        names
    }

    #[test]
    fn test_files_into_year_folders() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        create_files(
            root,
            &[
                "filed/foo/",
                "filed/bar/",
                "inbox/20160701_foo.pdf",
                "inbox/20150702_foo.pdf",
                "inbox/20160702_bar.pdf",
            ],
        );

        let report = run_filing(&Config::with_root(root), false, None);

        assert_eq!(
            read_files(root),
            sorted(&[
                "filed/",
                "filed/foo/",
                "filed/foo/2015/",
                "filed/foo/2015/20150702_foo.pdf",
                "filed/foo/2016/",
                "filed/foo/2016/20160701_foo.pdf",
                "filed/bar/",
                "filed/bar/2016/",
                "filed/bar/2016/20160702_bar.pdf",
                "inbox/",
            ])
        );
        assert_eq!(report.result.ok_count, 3);
        assert_eq!(report.failure_count(), 0);
        assert!(report.is_success());
        assert!(report.verdict().is_ok());
    }

    #[test]
    fn test_organizes_loose_files_before_filing() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        create_files(
            root,
            &[
                "filed/foo/20150701_foo.pdf",
                "filed/foo/20160702_foo.pdf",
                "inbox/20160703_foo.pdf",
            ],
        );

        let report = run_filing(&Config::with_root(root), false, None);

        assert_eq!(
            read_files(root),
            sorted(&[
                "filed/",
                "filed/foo/",
                "filed/foo/2015/",
                "filed/foo/2015/20150701_foo.pdf",
                "filed/foo/2016/",
                "filed/foo/2016/20160702_foo.pdf",
                "filed/foo/2016/20160703_foo.pdf",
                "inbox/",
            ])
        );
        assert_eq!(report.result.organized_count, 2);
        assert_eq!(report.result.ok_count, 1);
        assert!(report.verdict().is_ok());
    }

    const MISSING_START: &[&str] = &[
        "filed/foo/",
        "filed/bar/",
        "inbox/20160701_foo.pdf",
        "inbox/20160702_foo.pdf",
        "inbox/20160702_bar.pdf",
        "inbox/20160702_baz.pdf",
        "inbox/20160703_baz.pdf",
        "inbox/20160702_gus.pdf",
    ];

    #[test]
    fn test_missing_dirs_without_force() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        create_files(root, MISSING_START);

        let report = run_filing(&Config::with_root(root), false, None);

        assert_eq!(
            read_files(root),
            sorted(&[
                "filed/",
                "filed/foo/",
                "filed/foo/2016/",
                "filed/foo/2016/20160701_foo.pdf",
                "filed/foo/2016/20160702_foo.pdf",
                "filed/bar/",
                "filed/bar/2016/",
                "filed/bar/2016/20160702_bar.pdf",
                "inbox/",
                "inbox/20160702_baz.pdf",
                "inbox/20160703_baz.pdf",
                "inbox/20160702_gus.pdf",
            ])
        );
        assert_eq!(report.result.ok_count, 3);
        assert_eq!(report.failure_count(), 3);
        assert_eq!(
            report.result.missing_dirs.iter().cloned().collect::<Vec<_>>(),
            vec![root.join("filed").join("baz"), root.join("filed").join("gus")]
        );
        assert!(report.summary().contains("--force"));
        assert!(report.inbox_failures.is_empty(), "no inbox aborted");
        assert!(matches!(
            report.verdict(),
            Err(EngineError::Failures { count: 3 })
        ));
    }

    #[test]
    fn test_missing_dirs_with_force() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        create_files(root, MISSING_START);

        let report = run_filing(&Config::with_root(root), true, None);

        let found = read_files(root);
        for expected in [
            "filed/baz/2016/20160702_baz.pdf",
            "filed/baz/2016/20160703_baz.pdf",
            "filed/gus/2016/20160702_gus.pdf",
        ] {
            assert!(found.contains(&expected.to_string()), "missing {}", expected);
        }
        assert!(found.contains(&"inbox/".to_string()));
        assert!(!found.iter().any(|p| p.starts_with("inbox/2016")));
        assert_eq!(report.result.ok_count, 6);
        assert_eq!(report.failure_count(), 0);
        assert!(report.result.missing_dirs.is_empty());
    }

    #[test]
    fn test_extra_inboxes_are_independent() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = temp_dir.path();
        create_files(
            root,
            &["filed/foo/", "inbox/20160701_foo.pdf", "scans/20160801_foo.pdf"],
        );
        let config = Config {
            extra_inboxes: vec![root.join("nowhere"), root.join("scans")],
            ..Config::with_root(root)
        };

        let report = run_filing(&config, false, None);

        assert_eq!(report.result.ok_count, 2);
        assert!(root.join("filed/foo/2016/20160801_foo.pdf").is_file());
        assert_eq!(report.inbox_failures.len(), 1);
        assert_eq!(report.inbox_failures[0].inbox, root.join("nowhere"));
        assert!(report.summary().contains("does not appear to be a directory"));
        assert!(matches!(
            report.verdict(),
            Err(EngineError::InboxNotDirectory { .. })
        ));
    }

    #[test]
    fn test_error_chain_includes_sources() {
        let err = EngineError::OrganizeFailed {
            dir: PathBuf::from("/r/filed/foo"),
            moved: 0,
            source: Box::new(EngineError::InboxNotDirectory {
                path: PathBuf::from("/x"),
            }),
        };
        let text = error_chain(&err);
        assert!(text.starts_with("Failed organizing /r/filed/foo"));
        assert!(text.ends_with("/x does not appear to be a directory"));
    }
}
