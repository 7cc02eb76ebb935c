use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use relay_engine::{FetchSettings, PageSettings};
use relay_logging::{relay_info, LogDestination};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = ".relay_config.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub target: LogTarget,
    /// Used by `File` and `Both`.
    pub file: PathBuf,
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            target: LogTarget::Terminal,
            file: PathBuf::from("./relay.log"),
            level: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn destination(&self) -> LogDestination {
        match self.target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File(self.file.clone()),
            LogTarget::Both => LogDestination::Both(self.file.clone()),
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.level).map_err(|_| ConfigError::LogLevel(self.level.clone()))
    }
}

/// Replay settings persisted as RON. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub endpoint: String,
    pub query_param: String,
    pub platform_param: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: Option<u64>,
    pub max_bytes: u64,
    pub poll_interval_ms: u64,
    /// Pause between two snapshots of a replay.
    pub step_interval_ms: u64,
    /// How long to wait for suggestions after the last snapshot.
    pub settle_timeout_ms: u64,
    pub log: LogConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        let page = PageSettings::default();
        Self {
            endpoint: fetch.endpoint,
            query_param: fetch.query_param,
            platform_param: fetch.platform_param,
            connect_timeout_ms: millis(fetch.connect_timeout),
            request_timeout_ms: fetch.request_timeout.map(millis),
            max_bytes: fetch.max_bytes,
            poll_interval_ms: millis(page.poll_interval),
            step_interval_ms: 250,
            settle_timeout_ms: 10_000,
            log: LogConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            endpoint: self.endpoint.clone(),
            query_param: self.query_param.clone(),
            platform_param: self.platform_param.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
            max_bytes: self.max_bytes,
        }
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            ..PageSettings::default()
        }
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Load the config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(RelayConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    relay_info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, RelayConfig::default());
        assert_eq!(config.request_timeout_ms, None);
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(
                endpoint: "http://127.0.0.1:8080/suggestions/",
                request_timeout_ms: Some(2500),
                log: (target: Both, level: "debug"),
            )"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/suggestions/");
        assert_eq!(
            config.fetch_settings().request_timeout,
            Some(Duration::from_millis(2500))
        );
        assert_eq!(config.query_param, "q");
        assert_eq!(
            config.log.destination(),
            LogDestination::Both(PathBuf::from("./relay.log"))
        );
        assert_eq!(config.log.level_filter().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "(endpoint: 42").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn unknown_level_is_rejected() {
        let log = LogConfig {
            level: "chatty".into(),
            ..LogConfig::default()
        };
        assert!(matches!(log.level_filter(), Err(ConfigError::LogLevel(_))));
    }

    #[test]
    fn defaults_round_trip_through_ron() {
        let text =
            ron::ser::to_string_pretty(&RelayConfig::default(), ron::ser::PrettyConfig::new())
                .unwrap();
        let parsed: RelayConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, RelayConfig::default());
    }
}
