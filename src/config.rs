use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;
use crate::messages::default_messages;
use crate::routing::GuildRoutingTable;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_STATUS: &str = "with your emotions";
pub const DEFAULT_FETCH_TIMEOUT_SEC: u64 = 10;

/// Process settings taken from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub config_path: String,
    pub metrics_port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let discord_token =
            env::var("DISCORD_TOKEN").map_err(|_| ConfigError::MissingEnv("DISCORD_TOKEN"))?;
        Ok(Self {
            discord_token,
            config_path: env::var("DOMO_CONFIG")
                .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into()),
            metrics_port: parse_metrics_port(env::var("METRICS_PORT").ok())?,
        })
    }
}

/// An unset port disables the metrics server; a malformed one is an error.
fn parse_metrics_port(raw: Option<String>) -> Result<Option<u16>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => match value.trim().parse::<u16>() {
            Ok(port) => Ok(Some(port)),
            Err(_) => Err(ConfigError::InvalidEnv {
                name: "METRICS_PORT",
                value,
            }),
        },
    }
}

/// One monitored guild and its update channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerEntry {
    pub guild_id: String,
    #[serde(rename = "domo_update_channel_id")]
    pub update_channel_id: String,
}

/// Relay settings loaded from the JSON config file.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    pub servers: Vec<ServerEntry>,
    #[serde(default)]
    pub rate_limit_sec: u64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_sec: u64,
    #[serde(default)]
    pub messages: Option<Vec<String>>,
}

fn default_status() -> String {
    DEFAULT_STATUS.into()
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SEC
}

impl RelayConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&raw).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        info!(
            path = %path.display(),
            servers = config.servers.len(),
            rate_limit_sec = config.rate_limit_sec,
            "Loaded relay config"
        );
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        GuildRoutingTable::from_servers(&self.servers)?;
        if matches!(&self.messages, Some(m) if m.is_empty()) {
            return Err(ConfigError::EmptyMessagePool);
        }
        Ok(())
    }

    pub fn rate_limit_period(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sec)
    }

    /// `None` disables the bound on metadata fetches.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_sec > 0).then(|| Duration::from_secs(self.fetch_timeout_sec))
    }

    pub fn message_pool(&self) -> Vec<String> {
        self.messages.clone().unwrap_or_else(default_messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = RelayConfig::from_json(
            r#"{"servers":[{"guild_id":"G1","domo_update_channel_id":"C1"}],"rate_limit_sec":60}"#,
        )
        .unwrap();

        assert_eq!(cfg.servers.len(), 1);
        assert_eq!(cfg.servers[0].update_channel_id, "C1");
        assert_eq!(cfg.rate_limit_period(), Duration::from_secs(60));
        assert_eq!(cfg.status, DEFAULT_STATUS);
        assert_eq!(cfg.fetch_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(cfg.message_pool().len(), 18);
    }

    #[test]
    fn test_overrides() {
        let cfg = RelayConfig::from_json(
            r#"{
                "servers": [],
                "rate_limit_sec": 0,
                "status": "lurking",
                "fetch_timeout_sec": 0,
                "messages": ["a", "b"],
                "unknown_field": true
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.status, "lurking");
        assert_eq!(cfg.fetch_timeout(), None);
        assert_eq!(cfg.message_pool(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_duplicate_guild_rejected() {
        let err = RelayConfig::from_json(
            r#"{"servers":[
                {"guild_id":"G1","domo_update_channel_id":"C1"},
                {"guild_id":"G1","domo_update_channel_id":"C2"}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateGuild(g) if g == "G1"));
    }

    #[test]
    fn test_empty_messages_rejected() {
        let err = RelayConfig::from_json(r#"{"servers":[],"messages":[]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyMessagePool));
    }

    #[test]
    fn test_negative_rate_limit_rejected() {
        let err = RelayConfig::from_json(r#"{"servers":[],"rate_limit_sec":-5}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_metrics_port_parsing() {
        assert_eq!(parse_metrics_port(None).unwrap(), None);
        assert_eq!(parse_metrics_port(Some("8083".into())).unwrap(), Some(8083));

        let err = parse_metrics_port(Some("80x3".into())).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { name: "METRICS_PORT", ref value } if value == "80x3"
        ));
        assert!(matches!(
            parse_metrics_port(Some("70000".into())),
            Err(ConfigError::InvalidEnv { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RelayConfig::load("/nonexistent/domo/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
