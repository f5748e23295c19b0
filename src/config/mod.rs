//! Configuration management for the rotapress publishing job
//!
//! Configuration is loaded from environment variables or a TOML file and
//! passed explicitly into the selector and orchestrator at construction
//! time — no ambient globals, so multiple configurations can be tested in
//! isolation.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default ordered topic list when none is configured
pub const DEFAULT_TOPICS: [&str; 5] = [
    "Sport",
    "Healthcare",
    "Finance",
    "Technology",
    "Food Industry",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Fixed ordered topic list the rotation walks over
    pub topics: Vec<String>,

    /// Timeout in seconds for feed and article-page fetches
    #[serde(default = "default_feed_timeout")]
    pub feed_timeout_secs: u64,

    /// Run-loop configuration
    pub run: RunConfig,

    /// History state configuration
    pub history: HistoryConfig,

    /// Content generator configuration
    pub generator: GeneratorConfig,

    /// Publisher configuration
    pub publisher: PublisherConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Optional per-topic RSS feed URLs used to seed generation
    #[serde(default)]
    pub feeds: BTreeMap<String, String>,
}

fn default_feed_timeout() -> u64 {
    10
}

/// Run-loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Topics to publish per run
    pub articles_per_day: usize,

    /// Additional regeneration attempts when a title is a duplicate
    pub max_title_retries: usize,
}

/// History state configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Path of the persisted JSON state file
    pub path: PathBuf,
}

/// Content generator configuration (OpenAI-compatible chat completions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// API endpoint base URL
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// API key (optional for local backends)
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,
}

/// Publisher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Webhook URL the finished posts are delivered to
    pub webhook_url: String,

    /// Optional bearer token
    pub auth_token: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let articles_per_day = std::env::var("ARTICLES_PER_DAY")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(2);

        let max_title_retries = std::env::var("MAX_RETRIES_TITLE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(5);

        let history_path = std::env::var("HISTORY_FILE")
            .unwrap_or_else(|_| String::from("data/history.json"))
            .into();

        let topics = std::env::var("ROTAPRESS_TOPICS")
            .map(|v| {
                v.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or_else(|_| DEFAULT_TOPICS.iter().map(|s| s.to_string()).collect());

        let endpoint = std::env::var("OPENROUTER_ENDPOINT")
            .unwrap_or_else(|_| String::from("https://openrouter.ai/api/v1"));

        let model = std::env::var("OPENROUTER_MODEL")
            .unwrap_or_else(|_| String::from("deepseek/deepseek-chat"));

        let api_key = std::env::var("OPENROUTER_API_KEY").ok();

        let generator_timeout = std::env::var("OPENROUTER_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let webhook_url = std::env::var("PUBLISH_WEBHOOK_URL").unwrap_or_default();
        let auth_token = std::env::var("PUBLISH_WEBHOOK_TOKEN").ok();

        let publish_timeout = std::env::var("PUBLISH_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let feed_timeout = std::env::var("FEED_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_else(default_feed_timeout);

        let log_level =
            std::env::var("ROTAPRESS_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("ROTAPRESS_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            run: RunConfig {
                articles_per_day,
                max_title_retries,
            },
            history: HistoryConfig { path: history_path },
            generator: GeneratorConfig {
                endpoint,
                model,
                api_key,
                timeout_secs: generator_timeout,
                temperature: 0.7,
                max_tokens: 1024,
            },
            publisher: PublisherConfig {
                webhook_url,
                auth_token,
                timeout_secs: publish_timeout,
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
            topics,
            feed_timeout_secs: feed_timeout,
            feeds: BTreeMap::new(),
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.run.articles_per_day == 0 {
            anyhow::bail!("articles_per_day must be greater than 0");
        }

        if self.topics.is_empty() {
            anyhow::bail!("topic list must not be empty");
        }

        let mut seen = std::collections::HashSet::new();
        for topic in &self.topics {
            if !seen.insert(topic.as_str()) {
                anyhow::bail!("topic list contains duplicate entry: {topic}");
            }
        }

        if self.generator.timeout_secs == 0 {
            anyhow::bail!("generator timeout must be greater than 0");
        }

        Ok(())
    }

    /// Get feed fetch timeout as Duration
    #[must_use]
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
}

impl GeneratorConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PublisherConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run: RunConfig {
                articles_per_day: 2,
                max_title_retries: 5,
            },
            history: HistoryConfig {
                path: PathBuf::from("data/history.json"),
            },
            generator: GeneratorConfig {
                endpoint: String::from("https://openrouter.ai/api/v1"),
                model: String::from("deepseek/deepseek-chat"),
                api_key: None,
                timeout_secs: 60,
                temperature: 0.7,
                max_tokens: 1024,
            },
            publisher: PublisherConfig {
                webhook_url: String::new(),
                auth_token: None,
                timeout_secs: 10,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
            topics: DEFAULT_TOPICS.iter().map(|s| s.to_string()).collect(),
            feed_timeout_secs: default_feed_timeout(),
            feeds: BTreeMap::new(),
        }
    }
}
