//! Application configuration for herodex.
//!
//! User config lives at `~/.herodex/herodex.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{HerodexError, Result};
use crate::types::FeedType;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "herodex.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".herodex";

// ---------------------------------------------------------------------------
// Config structs (matching herodex.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote wiki settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Crawl-policy gate behavior.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Pass tuning.
    #[serde(default)]
    pub scrape: ScrapeSection,

    /// Database location.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Unattended cadence.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// News feed sources, processed in this order.
    #[serde(default)]
    pub news: Vec<NewsSourceConfig>,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Wiki origin, e.g. `https://heroes.fandom.com`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path that character names are appended to.
    #[serde(default = "default_character_path")]
    pub character_path: String,

    /// Path of the page listing every character.
    #[serde(default = "default_roster_path")]
    pub roster_path: String,

    /// Agent token sent as User-Agent and matched against robots.txt groups.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            character_path: default_character_path(),
            roster_path: default_roster_path(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://heroes.fandom.com".into()
}
fn default_character_path() -> String {
    "/wiki/".into()
}
fn default_roster_path() -> String {
    "/wiki/Heroes".into()
}
fn default_user_agent() -> String {
    concat!("herodex/", env!("CARGO_PKG_VERSION")).into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// What the policy gate answers when robots.txt cannot be retrieved or parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyFailureMode {
    /// Treat the URL as allowed and log a warning.
    #[default]
    Open,
    /// Treat the URL as disallowed.
    Closed,
}

/// `[policy]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub on_failure: PolicyFailureMode,
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSection {
    /// Pause after each character ability fetch.
    #[serde(default = "default_ability_delay")]
    pub ability_delay_ms: u64,

    /// Tenant key stamped on news items.
    #[serde(default = "default_game_id")]
    pub game_id: String,
}

impl Default for ScrapeSection {
    fn default() -> Self {
        Self {
            ability_delay_ms: default_ability_delay(),
            game_id: default_game_id(),
        }
    }
}

fn default_ability_delay() -> u64 {
    1000
}
fn default_game_id() -> String {
    "heroes".into()
}

/// `[storage]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file. Defaults to `~/.herodex/herodex.db` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

/// `[schedule]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Daily start time, `HH:MM` in UTC.
    #[serde(default = "default_daily_at")]
    pub daily_at: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            daily_at: default_daily_at(),
        }
    }
}

fn default_daily_at() -> String {
    "04:00".into()
}

/// `[[news]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSourceConfig {
    pub url: String,
    pub feed_type: FeedType,
}

// ---------------------------------------------------------------------------
// Scrape config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for the ingestion passes.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Wiki origin.
    pub base_url: Url,
    /// Path characters are appended to.
    pub character_path: String,
    /// Roster page path.
    pub roster_path: String,
    /// Agent token.
    pub user_agent: String,
    /// HTTP request timeout.
    pub request_timeout: Duration,
    /// Gate failure mode.
    pub policy_failure: PolicyFailureMode,
    /// Pause after each ability fetch.
    pub ability_delay: Duration,
    /// Tenant key for news items.
    pub game_id: String,
    /// `(url, feed type)` news sources in processing order.
    pub news: Vec<(Url, FeedType)>,
}

impl TryFrom<&AppConfig> for ScrapeConfig {
    type Error = HerodexError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.source.base_url).map_err(|e| {
            HerodexError::config(format!(
                "invalid source.base_url '{}': {e}",
                config.source.base_url
            ))
        })?;

        let news = config
            .news
            .iter()
            .map(|n| {
                Url::parse(&n.url)
                    .map(|u| (u, n.feed_type))
                    .map_err(|e| HerodexError::config(format!("invalid news url '{}': {e}", n.url)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            base_url,
            character_path: config.source.character_path.clone(),
            roster_path: config.source.roster_path.clone(),
            user_agent: config.source.user_agent.clone(),
            request_timeout: Duration::from_secs(config.source.request_timeout_secs),
            policy_failure: config.policy.on_failure,
            ability_delay: Duration::from_millis(config.scrape.ability_delay_ms),
            game_id: config.scrape.game_id.clone(),
            news,
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.herodex/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| HerodexError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.herodex/herodex.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| HerodexError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| HerodexError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| HerodexError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| HerodexError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| HerodexError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

impl AppConfig {
    /// Resolve the database path, falling back to `~/.herodex/herodex.db`.
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Ok(config_dir()?.join("herodex.db")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("on_failure = \"open\""));
    }

    #[test]
    fn config_with_news_sources() {
        let toml_str = r#"
[source]
base_url = "https://wiki.example.com"

[policy]
on_failure = "closed"

[scrape]
ability_delay_ms = 250

[[news]]
url = "https://game.example.com/news/patch-1"
feed_type = "update"

[[news]]
url = "https://game.example.com/news/diary-3"
feed_type = "dev_diary"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.news.len(), 2);
        assert_eq!(config.news[1].feed_type, FeedType::DevDiary);
        assert_eq!(config.policy.on_failure, PolicyFailureMode::Closed);

        let scrape = ScrapeConfig::try_from(&config).expect("runtime config");
        assert_eq!(scrape.ability_delay, Duration::from_millis(250));
        assert_eq!(scrape.base_url.host_str(), Some("wiki.example.com"));
        assert_eq!(scrape.news[0].1, FeedType::Update);
    }

    #[test]
    fn scrape_config_defaults() {
        let scrape = ScrapeConfig::try_from(&AppConfig::default()).expect("defaults");
        assert_eq!(scrape.ability_delay, Duration::from_secs(1));
        assert_eq!(scrape.policy_failure, PolicyFailureMode::Open);
        assert_eq!(scrape.character_path, "/wiki/");
        assert!(scrape.news.is_empty());
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let mut config = AppConfig::default();
        config.source.base_url = "not a url".into();
        let err = ScrapeConfig::try_from(&config).unwrap_err();
        assert!(err.to_string().contains("source.base_url"));
    }

    #[test]
    fn explicit_db_path_wins() {
        let mut config = AppConfig::default();
        config.storage.db_path = Some("/tmp/herodex-test.db".into());
        assert_eq!(
            config.db_path().unwrap(),
            PathBuf::from("/tmp/herodex-test.db")
        );
    }
}
