use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// HTTP client settings handed to the fetcher at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for a whole request, body included.
    pub timeout_secs: u64,
    /// Maximum number of redirects followed per request.
    pub max_redirects: u32,
    /// `User-Agent` header; `None` leaves libcurl's default (no header).
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            max_redirects: 10,
            user_agent: Some(concat!("page-loader/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for one page load run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Upper bound on asset downloads in flight at once.
    pub max_concurrent_downloads: usize,
    pub fetch: FetchConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: 8,
            fetch: FetchConfig::default(),
        }
    }
}

/// Load configuration from an explicit TOML file. Missing keys take their defaults.
pub fn load_from_path(path: &Path) -> Result<LoaderConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: LoaderConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = LoaderConfig::default();
        assert_eq!(cfg.max_concurrent_downloads, 8);
        assert_eq!(cfg.fetch.connect_timeout_secs, 15);
        assert_eq!(cfg.fetch.timeout_secs, 60);
        assert_eq!(cfg.fetch.max_redirects, 10);
        assert!(cfg.fetch.user_agent.as_deref().unwrap().starts_with("page-loader/"));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = LoaderConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: LoaderConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            max_concurrent_downloads = 2

            [fetch]
            timeout_secs = 5
        "#;
        let cfg: LoaderConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.max_concurrent_downloads, 2);
        assert_eq!(cfg.fetch.timeout_secs, 5);
        assert_eq!(cfg.fetch.connect_timeout_secs, 15);
        assert_eq!(cfg.fetch.max_redirects, 10);
    }

    #[test]
    fn config_toml_empty_is_default() {
        let cfg: LoaderConfig = toml::from_str("").unwrap();
        assert_eq!(cfg, LoaderConfig::default());
    }

    #[test]
    fn load_from_path_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "[fetch]\nuser_agent = \"custom-agent\"\nmax_redirects = 3").unwrap();
        f.flush().unwrap();
        let cfg = load_from_path(f.path()).unwrap();
        assert_eq!(cfg.fetch.user_agent.as_deref(), Some("custom-agent"));
        assert_eq!(cfg.fetch.max_redirects, 3);
    }

    #[test]
    fn load_from_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = load_from_path(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("nope.toml"));
    }
}
