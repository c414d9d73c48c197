//! # Configuration
//!
//! Manages the loading and parsing of the bot's configuration file (`config.yaml`).
//! Defines the structs for polling behaviour, monitored sources, logging and the
//! optional Matrix connection.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::domain::types::Category;

/// Main configuration structure.
/// Matches the layout of `config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct BanhammerConfig {
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub matrix: Option<MatrixConfig>,
}

impl BanhammerConfig {
    /// Reads and parses a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse YAML")?;
        Ok(config)
    }
}

/// Settings of the poll loop.
#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_backoff_floor")]
    pub backoff_floor_secs: u64,
    #[serde(default = "default_backoff_ceiling")]
    pub backoff_ceiling_secs: u64,
    #[serde(default = "default_dedup_capacity")]
    pub dedup_capacity: usize,
    /// Upper bound for a single fetch; unset means fetches may block indefinitely.
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
    #[serde(default)]
    pub change_presence: bool,
    #[serde(default)]
    pub limits: FetchLimits,
}

impl PollConfig {
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            backoff_floor_secs: default_backoff_floor(),
            backoff_ceiling_secs: default_backoff_ceiling(),
            dedup_capacity: default_dedup_capacity(),
            fetch_timeout_secs: None,
            change_presence: false,
            limits: FetchLimits::default(),
        }
    }
}

fn default_backoff_floor() -> u64 {
    1
}
fn default_backoff_ceiling() -> u64 {
    16
}
fn default_dedup_capacity() -> usize {
    301
}

/// Batch size requested per category.
#[derive(Debug, Deserialize, Clone)]
pub struct FetchLimits {
    #[serde(default = "default_limit")]
    pub new: usize,
    #[serde(default = "default_comment_limit")]
    pub comments: usize,
    #[serde(default = "default_limit")]
    pub reports: usize,
    #[serde(default = "default_limit")]
    pub mail: usize,
    #[serde(default = "default_limit")]
    pub queue: usize,
    #[serde(default = "default_limit")]
    pub mod_actions: usize,
}

impl FetchLimits {
    pub fn get(&self, category: Category) -> usize {
        match category {
            Category::New => self.new,
            Category::Comments => self.comments,
            Category::Reports => self.reports,
            Category::Mail => self.mail,
            Category::Queue => self.queue,
            Category::ModActions => self.mod_actions,
        }
    }
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            new: default_limit(),
            comments: default_comment_limit(),
            reports: default_limit(),
            mail: default_limit(),
            queue: default_limit(),
            mod_actions: default_limit(),
        }
    }
}

fn default_limit() -> usize {
    100
}
fn default_comment_limit() -> usize {
    250
}

/// A monitored community.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default)]
    pub streams: StreamToggles,
    /// Moderators whose actions are reported by the mod action stream. Empty means all.
    #[serde(default)]
    pub moderators: Vec<String>,
    /// Inline reaction rules in the same YAML format as the rule files.
    #[serde(default)]
    pub reactions: Option<String>,
}

/// Which streams are polled for a source.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct StreamToggles {
    #[serde(default = "enabled")]
    pub new: bool,
    #[serde(default)]
    pub comments: bool,
    #[serde(default = "enabled")]
    pub reports: bool,
    #[serde(default = "enabled")]
    pub mail: bool,
    #[serde(default = "enabled")]
    pub queue: bool,
    #[serde(default = "enabled")]
    pub mod_actions: bool,
}

impl StreamToggles {
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::New => self.new,
            Category::Comments => self.comments,
            Category::Reports => self.reports,
            Category::Mail => self.mail,
            Category::Queue => self.queue,
            Category::ModActions => self.mod_actions,
        }
    }

    pub fn all() -> Self {
        Self {
            new: true,
            comments: true,
            reports: true,
            mail: true,
            queue: true,
            mod_actions: true,
        }
    }
}

impl Default for StreamToggles {
    fn default() -> Self {
        Self {
            new: true,
            comments: false,
            reports: true,
            mail: true,
            queue: true,
            mod_actions: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Log sinks.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub directory: Option<String>,
    #[serde(default = "default_log_file")]
    pub file_name: String,
    #[serde(default = "enabled")]
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            directory: None,
            file_name: default_log_file(),
            console: true,
        }
    }
}

fn default_level() -> String {
    "info,matrix_sdk=warn,matrix_sdk_base=warn,matrix_sdk_crypto=error,ruma=warn,hyper=warn"
        .to_string()
}
fn default_log_file() -> String {
    "banhammer.log".to_string()
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    pub password: String,
    /// Room the bot posts into and shows its typing indicator in.
    pub room: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = BanhammerConfig::from_yaml("sources:\n  - name: pics\n").unwrap();
        assert_eq!(config.poll.backoff_ceiling_secs, 16);
        assert_eq!(config.poll.dedup_capacity, 301);
        assert_eq!(config.poll.limits.get(Category::Comments), 250);
        assert!(config.poll.fetch_timeout().is_none());

        let source = &config.sources[0];
        assert!(source.streams.is_enabled(Category::New));
        assert!(!source.streams.is_enabled(Category::Comments));
        assert!(source.moderators.is_empty());
        assert!(config.matrix.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
poll:
  backoff_ceiling_secs: 32
  fetch_timeout_secs: 10
  limits:
    new: 25
sources:
  - name: askscience
    streams:
      comments: true
      mail: false
    moderators: ["AutoModerator"]
matrix:
  homeserver: https://matrix.example.org
  username: bot
  password: hunter2
  room: "!abc:example.org"
"#
        )
        .unwrap();

        let config = BanhammerConfig::load(file.path()).unwrap();
        assert_eq!(config.poll.backoff_ceiling_secs, 32);
        assert_eq!(config.poll.fetch_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.poll.limits.new, 25);
        assert_eq!(config.poll.limits.mail, 100);

        let source = &config.sources[0];
        assert!(source.streams.comments);
        assert!(!source.streams.mail);
        assert!(source.streams.new);
        assert_eq!(source.moderators, vec!["AutoModerator".to_string()]);
        assert_eq!(config.matrix.unwrap().room, "!abc:example.org");
    }

    #[test]
    fn test_missing_file() {
        let err = BanhammerConfig::load("/nonexistent/banhammer.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
