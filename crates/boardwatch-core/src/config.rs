//! Configuration for BoardWatch.
//!
//! Resolved once at startup from built-in defaults, an optional TOML file and
//! environment variables (highest precedence), then validated. Everything
//! downstream receives the resolved struct; nothing else reads the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{BoardWatchError, Result};
use crate::types::Channel;

const REDACTED: &str = "***";
/// One year. Longer intervals would overflow timestamp arithmetic.
const MAX_INTERVAL_HOURS: f64 = 24.0 * 365.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub monday: MondayConfig,
    pub slack: SlackConfig,
    pub notify: NotifyConfig,
    pub gateway: GatewayConfig,
}

/// Board access and the titles of the columns the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MondayConfig {
    pub api_url: String,
    pub api_key: String,
    pub board_id: u64,
    pub status_column: String,
    pub tag_column: String,
    pub last_notified_column: String,
}

impl Default for MondayConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.monday.com/v2".into(),
            api_key: String::new(),
            board_id: 0,
            status_column: "Status".into(),
            tag_column: "UCR / DL".into(),
            last_notified_column: "Last Notified".into(),
        }
    }
}

/// Slack incoming webhook per channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_ucr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_dl: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Minimum hours between two reminders for the same item.
    pub interval_hours: f64,
    /// Seconds between the starts of two poll cycles.
    pub poll_seconds: u64,
    /// Items processed concurrently within one cycle.
    pub max_concurrency: usize,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            interval_hours: 2.0,
            poll_seconds: 300,
            max_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
        }
    }
}

impl AppConfig {
    /// BoardWatch home directory (~/.boardwatch).
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".boardwatch")
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Resolve the full configuration: file (explicit path, else the default
    /// path when it exists), then process environment, then validation.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let expanded = shellexpand::tilde(p).to_string();
                Self::load_from(Path::new(&expanded))?
            }
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::load_from(&default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file without applying the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BoardWatchError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides. `lookup` returns the raw value of a variable.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string());

        if let Some(v) = get("MONDAY_API_KEY") {
            self.monday.api_key = v;
        }
        if let Some(v) = get("MONDAY_API_URL").filter(|v| !v.is_empty()) {
            self.monday.api_url = v;
        }
        if let Some(v) = get("BOARD_ID") {
            self.monday.board_id = parse_env("BOARD_ID", &v)?;
        }
        if let Some(v) = get("COLUMN_STATUS_TITLE") {
            self.monday.status_column = v;
        }
        if let Some(v) = get("COLUMN_TAG_TITLE") {
            self.monday.tag_column = v;
        }
        if let Some(v) = get("COLUMN_LAST_NOTIFIED_TITLE") {
            self.monday.last_notified_column = v;
        }
        if let Some(v) = get("SLACK_WEBHOOK_UCR") {
            self.slack.webhook_ucr = Some(v).filter(|v| !v.is_empty());
        }
        if let Some(v) = get("SLACK_WEBHOOK_DL") {
            self.slack.webhook_dl = Some(v).filter(|v| !v.is_empty());
        }
        if let Some(v) = get("NOTIFY_INTERVAL_HOURS") {
            self.notify.interval_hours = parse_env("NOTIFY_INTERVAL_HOURS", &v)?;
        }
        if let Some(v) = get("POLL_SECONDS") {
            self.notify.poll_seconds = parse_env("POLL_SECONDS", &v)?;
        }
        if let Some(v) = get("MAX_CONCURRENCY") {
            self.notify.max_concurrency = parse_env("MAX_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("HOST").filter(|v| !v.is_empty()) {
            self.gateway.host = v;
        }
        if let Some(v) = get("PORT") {
            self.gateway.port = parse_env("PORT", &v)?;
        }
        Ok(())
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.monday.api_key.is_empty() {
            return Err(BoardWatchError::config("MONDAY_API_KEY is not set"));
        }
        if self.monday.board_id == 0 {
            return Err(BoardWatchError::config("BOARD_ID is not set"));
        }
        check_url("monday.api_url", &self.monday.api_url)?;
        for (name, title) in [
            ("status column", &self.monday.status_column),
            ("tag column", &self.monday.tag_column),
            ("last-notified column", &self.monday.last_notified_column),
        ] {
            if title.trim().is_empty() {
                return Err(BoardWatchError::config(format!("{name} title is empty")));
            }
        }
        for channel in [Channel::Ucr, Channel::Dl] {
            if let Some(hook) = self.webhook_for(channel) {
                check_url(&format!("{channel} webhook"), hook)?;
            }
        }
        let hours = self.notify.interval_hours;
        if !hours.is_finite() || hours <= 0.0 {
            return Err(BoardWatchError::config(format!(
                "notify interval must be a positive number of hours, got {hours}"
            )));
        }
        if hours > MAX_INTERVAL_HOURS {
            return Err(BoardWatchError::config(format!(
                "notify interval must be at most {MAX_INTERVAL_HOURS} hours, got {hours}"
            )));
        }
        if self.notify.poll_seconds == 0 {
            return Err(BoardWatchError::config("POLL_SECONDS must be at least 1"));
        }
        if self.notify.max_concurrency == 0 {
            return Err(BoardWatchError::config("MAX_CONCURRENCY must be at least 1"));
        }
        Ok(())
    }

    pub fn webhook_for(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Ucr => self.slack.webhook_ucr.as_deref(),
            Channel::Dl => self.slack.webhook_dl.as_deref(),
        }
    }

    /// Channels without a webhook. Items routed there stay eligible and are
    /// retried every cycle.
    pub fn missing_webhooks(&self) -> Vec<Channel> {
        [Channel::Ucr, Channel::Dl]
            .into_iter()
            .filter(|c| self.webhook_for(*c).is_none())
            .collect()
    }

    pub fn notify_interval(&self) -> chrono::Duration {
        chrono::Duration::milliseconds((self.notify.interval_hours * 3_600_000.0).round() as i64)
    }

    pub fn poll_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.notify.poll_seconds)
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.monday.api_key.is_empty() {
            copy.monday.api_key = REDACTED.into();
        }
        for hook in [&mut copy.slack.webhook_ucr, &mut copy.slack.webhook_dl] {
            if hook.is_some() {
                *hook = Some(REDACTED.into());
            }
        }
        copy
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| BoardWatchError::config(format!("{key}={value:?}: {e}")))
}

fn check_url(name: &str, raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| BoardWatchError::config(format!("{name} is not a valid URL: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(BoardWatchError::config(format!(
            "{name} must use http or https, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.monday.api_key = "secret".into();
        config.monday.board_id = 123;
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.monday.status_column, "Status");
        assert_eq!(config.monday.tag_column, "UCR / DL");
        assert_eq!(config.monday.last_notified_column, "Last Notified");
        assert_eq!(config.notify.interval_hours, 2.0);
        assert_eq!(config.notify.poll_seconds, 300);
        assert_eq!(config.gateway.port, 5000);
        assert_eq!(config.notify_interval(), chrono::Duration::hours(2));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_with(env(&[
                ("MONDAY_API_KEY", " key "),
                ("BOARD_ID", "987"),
                ("COLUMN_TAG_TITLE", "Team"),
                ("SLACK_WEBHOOK_UCR", "https://hooks.slack.com/services/A"),
                ("SLACK_WEBHOOK_DL", ""),
                ("NOTIFY_INTERVAL_HOURS", "0.5"),
                ("POLL_SECONDS", "60"),
                ("PORT", "8080"),
            ]))
            .unwrap();

        assert_eq!(config.monday.api_key, "key");
        assert_eq!(config.monday.board_id, 987);
        assert_eq!(config.monday.tag_column, "Team");
        assert_eq!(config.webhook_for(Channel::Ucr), Some("https://hooks.slack.com/services/A"));
        assert_eq!(config.webhook_for(Channel::Dl), None);
        assert_eq!(config.notify_interval(), chrono::Duration::minutes(30));
        assert_eq!(config.poll_period(), std::time::Duration::from_secs(60));
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.missing_webhooks(), vec![Channel::Dl]);
    }

    #[test]
    fn test_env_parse_error() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_with(env(&[("POLL_SECONDS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, BoardWatchError::Config(ref m) if m.contains("POLL_SECONDS")));
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[monday]
api_key = "from-file"
board_id = 42
status_column = "State"

[notify]
interval_hours = 4.0
"#
        )
        .unwrap();

        let mut config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.monday.api_key, "from-file");
        assert_eq!(config.monday.status_column, "State");
        // Unspecified fields keep defaults
        assert_eq!(config.monday.tag_column, "UCR / DL");
        assert_eq!(config.notify.poll_seconds, 300);

        config.apply_env_with(env(&[("MONDAY_API_KEY", "from-env")])).unwrap();
        assert_eq!(config.monday.api_key, "from-env");
        assert_eq!(config.notify.interval_hours, 4.0);
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_toml() {
        let err = AppConfig::from_toml_str("[notify]\ninterval_hours = \"two\"").unwrap_err();
        assert!(matches!(err, BoardWatchError::TomlParse(_)));
    }

    #[test]
    fn test_validate() {
        valid().validate().unwrap();

        let mut config = valid();
        config.monday.api_key.clear();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.monday.board_id = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.notify.interval_hours = 0.0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.notify.interval_hours = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.notify.interval_hours = 1e15;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.notify.interval_hours = MAX_INTERVAL_HOURS;
        config.validate().unwrap();

        let mut config = valid();
        config.notify.poll_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.monday.last_notified_column = "  ".into();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.slack.webhook_dl = Some("ftp://example.com/hook".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_redacted() {
        let mut config = valid();
        config.slack.webhook_ucr = Some("https://hooks.slack.com/services/SECRET".into());
        let shown = config.redacted();
        assert_eq!(shown.monday.api_key, "***");
        assert_eq!(shown.slack.webhook_ucr.as_deref(), Some("***"));
        assert_eq!(shown.slack.webhook_dl, None);
        assert_eq!(shown.monday.board_id, 123);
    }
}
