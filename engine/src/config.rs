//! Configuration and directory layout.
//!
//! The filing core never looks at the raw configuration; it asks a `Layout`
//! for the paths it needs. `Config` is the persisted implementation, stored
//! as YAML in `~/.config/fileinbox/fileinbox.yaml`.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::fs_ops;

/// Where inboxes and filed destinations live.
pub trait Layout {
    /// Every inbox to process, primary first.
    fn inboxes(&self) -> Vec<PathBuf>;

    /// Directory that files for `name` are filed into (year folders go below).
    fn dest(&self, name: &str) -> PathBuf;

    /// Secondary root that also receives a copy of files for `name`, if any.
    fn cc_dest(&self, name: &str) -> Option<PathBuf>;
}

/// Carbon-copy settings: destinations listed in `dests` are also copied
/// below `root`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CcConfig {
    pub root: Option<PathBuf>,
    pub dests: Vec<String>,
}

/// Persisted user configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root holding `inbox/` and `filed/`
    pub root: PathBuf,

    /// Additional inbox directories, processed after `root/inbox`
    #[serde(rename = "extrainboxes")]
    pub extra_inboxes: Vec<PathBuf>,

    pub cc: CcConfig,
}

impl Config {
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        Config {
            root: root.as_ref().to_path_buf(),
            ..Config::default()
        }
    }

    /// True if no root has been configured yet.
    pub fn has_root(&self) -> bool {
        !self.root.as_os_str().is_empty()
    }

    /// The primary inbox, `root/inbox`.
    pub fn inbox(&self) -> PathBuf {
        self.root.join("inbox")
    }
}

impl Layout for Config {
    fn inboxes(&self) -> Vec<PathBuf> {
        let mut all = vec![self.inbox()];
        all.extend(self.extra_inboxes.iter().cloned());
        all
    }

    fn dest(&self, name: &str) -> PathBuf {
        self.root.join("filed").join(name)
    }

    fn cc_dest(&self, name: &str) -> Option<PathBuf> {
        let root = self.cc.root.as_ref()?;
        if root.as_os_str().is_empty() {
            return None;
        }
        self.cc
            .dests
            .iter()
            .find(|d| d.as_str() == name)
            .map(|d| root.join(d))
    }
}

/// Reads and writes `Config` from a YAML file.
///
/// A store that does not persist (used by tests and `--skipconfig`) loads the
/// default configuration and ignores saves.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// The per-user store at `~/.config/fileinbox/fileinbox.yaml`.
    pub fn user() -> Result<Self, EngineError> {
        let home = dirs::home_dir().ok_or(EngineError::NoHomeDirectory)?;
        Ok(Self::at(home.join(".config").join("fileinbox").join("fileinbox.yaml")))
    }

    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        ConfigStore { path: Some(path.into()) }
    }

    pub fn ephemeral() -> Self {
        ConfigStore { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the configuration; a missing file yields the default.
    pub fn load(&self) -> Result<Config, EngineError> {
        let Some(path) = &self.path else {
            return Ok(Config::default());
        };

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => return Err(EngineError::ConfigRead { path: path.clone(), source }),
        };
        if text.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&text).map_err(|source| EngineError::ConfigParse {
            path: path.clone(),
            source,
        })
    }

    /// Write the configuration, creating its directory if needed.
    pub fn save(&self, config: &Config) -> Result<(), EngineError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let text = serde_yaml::to_string(config).map_err(|e| EngineError::ConfigWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_ops::ensure_dir(parent, true)?;
            }
        }

        write_owner_only(path, text.as_bytes()).map_err(|e| EngineError::ConfigWrite {
            path: path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "saved configuration");
        Ok(())
    }
}

/// Create or truncate `path`, readable and writable by the owner only.
fn write_owner_only(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}
