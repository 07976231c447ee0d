use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default lifetime of a transfer session: 15 minutes.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(15 * 60);

/// Default upper bound on `total_parts` accepted from a start frame.
///
/// At the default chunk size this allows about 20 MB of encoded text.
pub const DEFAULT_MAX_PARTS: u32 = 10_000;

/// Assembler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    /// Trusted directory every received file is written below.
    pub root_dir: PathBuf,

    /// Sessions older than this many milliseconds are discarded.
    #[serde(default = "default_session_ttl_ms")]
    pub session_ttl_ms: u64,

    /// Start frames announcing more parts than this are rejected.
    #[serde(default = "default_max_parts")]
    pub max_parts: u32,
}

fn default_session_ttl_ms() -> u64 {
    duration_to_ms(DEFAULT_SESSION_TTL)
}

fn default_max_parts() -> u32 {
    DEFAULT_MAX_PARTS
}

fn duration_to_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl AssemblerConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            session_ttl_ms: default_session_ttl_ms(),
            max_parts: DEFAULT_MAX_PARTS,
        }
    }

    /// Sets the session lifetime. Precision is one millisecond.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl_ms = duration_to_ms(ttl);
        self
    }

    pub fn with_max_parts(mut self, max_parts: u32) -> Self {
        self.max_parts = max_parts;
        self
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_millis(self.session_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = AssemblerConfig::new("/srv/inbox");
        assert_eq!(config.session_ttl(), Duration::from_secs(900));
        assert_eq!(config.max_parts, 10_000);
    }

    #[test]
    fn with_session_ttl_overrides() {
        let config = AssemblerConfig::new("/srv/inbox").with_session_ttl(Duration::from_secs(30));
        assert_eq!(config.session_ttl_ms, 30_000);
    }

    #[test]
    fn sub_second_ttl_is_kept() {
        let config = AssemblerConfig::new("inbox").with_session_ttl(Duration::from_millis(1500));
        assert_eq!(config.session_ttl(), Duration::from_millis(1500));

        let config = AssemblerConfig::new("inbox").with_session_ttl(Duration::from_millis(500));
        assert_eq!(config.session_ttl(), Duration::from_millis(500));
    }

    #[test]
    fn huge_ttl_saturates() {
        let config = AssemblerConfig::new("inbox").with_session_ttl(Duration::MAX);
        assert_eq!(config.session_ttl_ms, u64::MAX);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: AssemblerConfig =
            serde_json::from_str(r#"{"root_dir": "/srv/inbox"}"#).unwrap();
        assert_eq!(config, AssemblerConfig::new("/srv/inbox"));
    }

    #[test]
    fn serde_roundtrip() {
        let config = AssemblerConfig::new("inbox")
            .with_session_ttl(Duration::from_millis(60_250))
            .with_max_parts(3);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AssemblerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
