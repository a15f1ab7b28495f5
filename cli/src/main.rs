//! fileinbox - Command-line interface for the filing engine.
//!
//! Resolves the root directory (flag or saved configuration), runs one filing
//! pass over every inbox and prints a summary. Exit codes: 0 on success,
//! 1 if some files could not be filed, 2 for errors that stopped the run.

use clap::Parser;
use engine::{
    job::error_chain, run_filing, Config, ConfigStore, EngineError, FileResult, FilingReport,
    ParseError, ParsedName, ProgressCallback,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// fileinbox - move files into the correct place, using their names
#[derive(Parser, Debug)]
#[command(name = "fileinbox")]
#[command(version)]
#[command(about = "Move files into the correct place, using their names.")]
struct Args {
    /// Root directory holding inbox/ and filed/. Saved into ~/.config/fileinbox/fileinbox.yaml
    #[arg(long, value_name = "PATH")]
    root: Option<PathBuf>,

    /// Create missing destination directories and accept far-future dates
    #[arg(long)]
    force: bool,

    /// Enable verbose output
    #[arg(long)]
    verbose: bool,

    /// Don't read or write configuration. Meant for testing.
    #[arg(long, hide = true)]
    skipconfig: bool,
}

/// CLI implementation of ProgressCallback, writing to stderr
struct CliProgress {
    verbose: bool,
}

impl CliProgress {
    fn new(verbose: bool) -> Self {
        CliProgress { verbose }
    }

    fn overwrite_line(line: &str) {
        eprint!("\r{}", line);
        let _ = std::io::stderr().flush();
    }
}

impl ProgressCallback for CliProgress {
    fn on_inbox_started(&self, inbox: &Path, entries: usize) {
        if self.verbose {
            eprintln!("Filing {} ({} entries)", inbox.display(), entries);
        }
    }

    fn on_unparsable(&self, path: &Path, error: &ParseError) {
        eprintln!("Unable to parse {}, skipping: {}", path.display(), error);
    }

    fn on_organize_progress(&self, dir: &Path, current: usize, total: usize) {
        Self::overwrite_line(&format!("({}/{}) organizing {}", current, total, dir.display()));
    }

    fn on_organized(&self, dir: &Path, moved: u32, elapsed: Duration) {
        eprintln!(
            "\rOrganized {} ({} files) in {}",
            dir.display(),
            moved,
            engine::model::format_duration(elapsed)
        );
    }

    fn on_file_filed(&self, current: usize, total: usize, file: &ParsedName) {
        if self.verbose {
            eprintln!("({}/{}) Filed {}", current, total, file.base_name);
        } else {
            Self::overwrite_line(&format!("({}/{}) Filed", current, total));
        }
    }

    fn on_file_failed(&self, _path: &Path, error: &EngineError) {
        eprintln!("\r{}", error_chain(error));
    }

    fn on_inbox_completed(&self, _inbox: &Path, _result: &FileResult) {
        if !self.verbose {
            eprintln!();
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,engine=debug" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Parse arguments, run the pass, print the summary
fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let store = if args.skipconfig {
        Ok(ConfigStore::ephemeral())
    } else {
        ConfigStore::user()
    };

    let exit_code = match store.and_then(|store| run_cli(&args, &store)) {
        Ok(report) => finish(report),
        Err(e) => {
            eprintln!("Error: {}", error_chain(&e));
            2
        }
    };

    std::process::exit(exit_code);
}

/// Load configuration, apply `--root`, and make sure a root is known.
fn resolve_config(args: &Args, store: &ConfigStore) -> Result<Config, EngineError> {
    match store.path() {
        Some(path) => tracing::debug!(path = %path.display(), "loading configuration"),
        None => tracing::debug!("configuration disabled"),
    }
    let mut config = store.load()?;

    if let Some(root) = &args.root {
        config.root = root.clone();
        store.save(&config)?;
    }

    if !config.has_root() {
        return Err(EngineError::MissingRoot);
    }

    Ok(config)
}

/// Main CLI logic - separated for testability
fn run_cli(args: &Args, store: &ConfigStore) -> Result<FilingReport, EngineError> {
    let config = resolve_config(args, store)?;
    tracing::debug!(root = %config.root.display(), force = args.force, "starting filing run");

    let progress = CliProgress::new(args.verbose);
    Ok(run_filing(&config, args.force, Some(&progress)))
}

/// Print the summary and map the verdict to an exit code.
fn finish(report: FilingReport) -> i32 {
    println!("\n{}", report.summary());
    tracing::debug!(
        failures = report.failure_count(),
        inbox_failures = report.inbox_failures.len(),
        "filing run verdict"
    );

    match report.verdict() {
        Ok(_) => 0,
        Err(e @ EngineError::Failures { .. }) => {
            eprintln!("Error: {}", e);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", error_chain(&e));
            2
        }
    }
}
