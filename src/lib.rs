//! rotapress - Recurring content-publishing job
//!
//! A cron-style publishing bot built around a persistent topic rotation and
//! title deduplication scheduler: each run selects the next topics from a
//! fixed ordered list, generates a post per topic through an LLM backend,
//! guards against republishing a title, delivers the result to a webhook
//! sink, and persists the rotation state.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`history`] - Durable rotation/dedup state (the history record)
//! - [`scheduler`] - Rotation selection over the fixed topic list
//! - [`dedup`] - Title normalization, digests and the uniqueness guard
//! - [`generator`] - Content generator interface and OpenRouter client
//! - [`publisher`] - Delivery interface and webhook sink
//! - [`source`] - Optional trending-article seeds from RSS feeds
//! - [`run`] - The per-run orchestrator and run report
//!
//! # Example
//!
//! ```no_run
//! use rotapress::config::Config;
//! use rotapress::history::HistoryStore;
//! use rotapress::scheduler::{self, RotationSelector};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = HistoryStore::new(&config.history.path, config.topics.clone());
//!     let selector = RotationSelector::new(config.topics.clone());
//!
//!     let mut record = store.load();
//!     let date = scheduler::today_key();
//!     let selection = selector.select(&mut record, &date, config.run.articles_per_day);
//!     println!("next topics: {:?}", selection.topics);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dedup;
pub mod error;
pub mod generator;
pub mod history;
pub mod publisher;
pub mod run;
pub mod scheduler;
pub mod source;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::dedup::TitleGuard;
    pub use crate::error::{Error, Result};
    pub use crate::generator::{GeneratedPost, GenerationRequest, PostGenerator};
    pub use crate::history::{HistoryRecord, HistoryStore};
    pub use crate::publisher::Publisher;
    pub use crate::run::{RunOrchestrator, RunReport};
    pub use crate::scheduler::{RotationSelector, Selection};
    pub use crate::source::{ArticleSeed, TopicSource};
}

// Direct re-exports for convenience
pub use history::HistoryRecord;
pub use run::{RunOrchestrator, RunReport};
pub use scheduler::RotationSelector;
