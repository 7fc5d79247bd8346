use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::core::time::DEFAULT_OFFSET_MINUTES;

pub const DEFAULT_CSV_PATH: &str = "data/bucket_list.csv";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing GitHub configuration in environment")]
    MissingGithub,
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Which persistence path the client uses.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Local state file only.
    #[default]
    Local,
    /// Local state file plus the remote CSV relay.
    CsvRelay,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("bucketlist")
}

fn default_user() -> String {
    env::var("USER").unwrap_or_else(|_| "me".to_string())
}

fn default_offset() -> i32 {
    DEFAULT_OFFSET_MINUTES
}

fn default_conflict_retries() -> u32 {
    2
}

/// Client settings, stored as JSON in the user's config directory.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub data_directory: PathBuf,
    pub backend: Backend,
    /// Base URL of the relay, e.g. `https://example.vercel.app`.
    pub relay_url: Option<String>,
    pub user: String,
    /// Display offset in minutes east of UTC.
    pub utc_offset_minutes: i32,
    /// How many times a save that hit a version conflict is re-submitted.
    pub conflict_retries: u32,
    pub debug_logging: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            backend: Backend::default(),
            relay_url: None,
            user: default_user(),
            utc_offset_minutes: default_offset(),
            conflict_retries: default_conflict_retries(),
            debug_logging: false,
        }
    }
}

impl ClientConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bucketlist")
            .join("config.json")
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_directory.join("state.json")
    }
}

/// GitHub repository coordinates of the CSV file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GithubTarget {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub path: String,
    pub branch: String,
}

/// Relay settings, read once from the process environment.
///
/// GitHub identity is optional here: the relay starts without it and answers
/// every request with a configuration error until it is provided.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelayConfig {
    pub port: u16,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
    pub csv_path: String,
    pub branch: String,
    pub api_url: String,
    /// Offset used to render datetimes in CSV rows.
    pub csv_offset_minutes: i32,
    pub http_timeout: Duration,
    pub debug_logging: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            owner: None,
            repo: None,
            token: None,
            csv_path: DEFAULT_CSV_PATH.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            csv_offset_minutes: 0,
            http_timeout: Duration::from_secs(30),
            debug_logging: false,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            port: parse_or("RELAY_PORT", get("RELAY_PORT"), defaults.port)?,
            owner: get("GITHUB_OWNER"),
            repo: get("GITHUB_REPO"),
            token: get("GITHUB_TOKEN"),
            csv_path: get("CSV_PATH").unwrap_or(defaults.csv_path),
            branch: get("BRANCH").unwrap_or(defaults.branch),
            api_url: get("GITHUB_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            csv_offset_minutes: parse_or(
                "CSV_UTC_OFFSET_MINUTES",
                get("CSV_UTC_OFFSET_MINUTES"),
                defaults.csv_offset_minutes,
            )?,
            http_timeout: Duration::from_secs(parse_or(
                "RELAY_HTTP_TIMEOUT_SECS",
                get("RELAY_HTTP_TIMEOUT_SECS"),
                defaults.http_timeout.as_secs(),
            )?),
            debug_logging: parse_flag("RELAY_DEBUG", get("RELAY_DEBUG"))?,
        })
    }

    /// The complete GitHub target, if owner, repo and token are all set.
    pub fn github(&self) -> Result<GithubTarget, ConfigError> {
        match (&self.owner, &self.repo, &self.token) {
            (Some(owner), Some(repo), Some(token)) => Ok(GithubTarget {
                api_url: self.api_url.clone(),
                owner: owner.clone(),
                repo: repo.clone(),
                token: token.clone(),
                path: self.csv_path.clone(),
                branch: self.branch.clone(),
            }),
            _ => Err(ConfigError::MissingGithub),
        }
    }
}

fn parse_or<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => {
            let parsed = v.trim().parse::<T>();
            parsed.map_err(|_| {
                log::warn!("Invalid {} value: {}", key, v);
                ConfigError::Invalid { key, value: v }
            })
        }
    }
}

/// `true`/`false`, `1`/`0`, `yes`/`no` or `on`/`off`, any case. Unset is false.
fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(v) = value else {
        return Ok(false);
    };
    match v.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => {
            log::warn!("Invalid {} value: {}", key, v);
            Err(ConfigError::Invalid { key, value: v })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn relay_defaults() {
        let config = RelayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.csv_path, "data/bucket_list.csv");
        assert_eq!(config.branch, "main");
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.port, 3000);
        assert!(matches!(config.github(), Err(ConfigError::MissingGithub)));
    }

    #[test]
    fn relay_complete_target() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("GITHUB_OWNER", "alice"),
            ("GITHUB_REPO", "lists"),
            ("GITHUB_TOKEN", "t0ken"),
            ("BRANCH", "data"),
            ("GITHUB_API_URL", "http://localhost:9000/"),
        ]))
        .unwrap();
        let target = config.github().unwrap();
        assert_eq!(target.owner, "alice");
        assert_eq!(target.branch, "data");
        assert_eq!(target.path, DEFAULT_CSV_PATH);
        assert_eq!(target.api_url, "http://localhost:9000");
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let config = RelayConfig::from_lookup(lookup(&[
            ("GITHUB_OWNER", "alice"),
            ("GITHUB_REPO", "lists"),
            ("GITHUB_TOKEN", "  "),
        ]))
        .unwrap();
        assert!(config.github().is_err());
    }

    #[test]
    fn invalid_port_is_an_error() {
        let err = RelayConfig::from_lookup(lookup(&[("RELAY_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RELAY_PORT", .. }));
    }

    #[test]
    fn debug_flag_spellings() {
        for (raw, expected) in [("1", true), ("TRUE", true), ("on", true), ("0", false), ("no", false)] {
            let config = RelayConfig::from_lookup(lookup(&[("RELAY_DEBUG", raw)])).unwrap();
            assert_eq!(config.debug_logging, expected, "RELAY_DEBUG={}", raw);
        }
        let err = RelayConfig::from_lookup(lookup(&[("RELAY_DEBUG", "loud")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RELAY_DEBUG", .. }));
    }

    #[test]
    fn client_config_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.backend, Backend::Local);
        assert_eq!(config.utc_offset_minutes, 330);
        assert_eq!(config.conflict_retries, 2);
    }

    #[test]
    fn client_config_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"backend":"csv-relay","relay_url":"http://localhost:3000","user":"Alice"}"#,
        )
        .unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.backend, Backend::CsvRelay);
        assert_eq!(config.relay_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.user, "Alice");
        assert_eq!(config.conflict_retries, 2);
    }

    #[test]
    fn client_config_garbage_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ClientConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
