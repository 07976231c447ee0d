//! Receiver configuration.
//!
//! Settings are read from TOML, by default at:
//! - Linux/macOS: `~/.config/chunkwire/config.toml`
//! - Windows: `%APPDATA%/chunkwire/config.toml`
//!
//! Command-line flags override file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use chunkwire_transfer::{AssemblerConfig, DEFAULT_SESSION_TTL};
use serde::Deserialize;

/// On-disk config format. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
    /// Directory received files are written below.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// Session lifetime in seconds.
    #[serde(default)]
    pub session_ttl_secs: Option<u64>,

    /// Channel key used when none is given on the command line.
    #[serde(default)]
    pub channel: Option<String>,

    /// Largest `total_parts` a start frame may announce.
    #[serde(default)]
    pub max_parts: Option<u32>,
}

/// Flag values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub root_dir: Option<PathBuf>,
    pub session_ttl_secs: Option<u64>,
    pub channel: Option<String>,
}

/// Fully resolved receiver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverConfig {
    pub assembler: AssemblerConfig,
    pub channel: String,
}

const DEFAULT_ROOT_DIR: &str = "received";
const DEFAULT_CHANNEL: &str = "default";

impl FileConfig {
    /// Loads `path`, or the default location if `path` is `None`.
    ///
    /// A missing default file yields an empty config; a missing explicit
    /// file is an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match config_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Applies flag overrides and fills in defaults.
    pub fn resolve(self, overrides: Overrides) -> ReceiverConfig {
        let root_dir = overrides
            .root_dir
            .or(self.root_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT_DIR));
        let ttl_secs = overrides
            .session_ttl_secs
            .or(self.session_ttl_secs)
            .unwrap_or(DEFAULT_SESSION_TTL.as_secs());
        let channel = overrides
            .channel
            .or(self.channel)
            .unwrap_or_else(|| DEFAULT_CHANNEL.into());

        let mut assembler =
            AssemblerConfig::new(root_dir).with_session_ttl(Duration::from_secs(ttl_secs));
        if let Some(max_parts) = self.max_parts {
            assembler = assembler.with_max_parts(max_parts);
        }
        ReceiverConfig { assembler, channel }
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|dir| PathBuf::from(dir).join("chunkwire").join("config.toml"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(|home| {
            PathBuf::from(home)
                .join(".config")
                .join("chunkwire")
                .join("config.toml")
        })
    }
}
