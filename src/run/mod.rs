//! Run orchestration
//!
//! One run walks the state machine SELECT → GENERATE → DEDUP_CHECK →
//! PUBLISH → COMMIT per selected topic, strictly sequentially, then persists
//! the history record exactly once. A failing generator or publisher call
//! costs only its topic; a failing final save aborts the run, because silent
//! state loss means undetected duplicates next time.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::config::RunConfig;
use crate::dedup::TitleGuard;
use crate::generator::{GenerationRequest, PostGenerator};
use crate::history::{HistoryRecord, HistoryStore};
use crate::publisher::Publisher;
use crate::scheduler::{self, RotationSelector};
use crate::source::{ArticleSeed, TopicSource};
use crate::error::Result;

// ============================================================================
// Run Report
// ============================================================================

/// Why a selected topic produced no publication this run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Every generated title was already published
    DuplicateTitle { attempts: usize },

    /// The content generator failed or timed out
    GenerationFailed { detail: String },

    /// The publisher rejected or failed to deliver the post
    PublishFailed { detail: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateTitle { attempts } => {
                write!(f, "duplicate title after {attempts} attempts")
            }
            Self::GenerationFailed { detail } => write!(f, "generation failed: {detail}"),
            Self::PublishFailed { detail } => write!(f, "publish failed: {detail}"),
        }
    }
}

/// Outcome of one selected topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TopicStatus {
    /// Post published and committed to history
    Published { title: String },

    /// Topic skipped for this run, no state mutated for it
    Skipped { reason: SkipReason },
}

/// Per-topic outcome row of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicOutcome {
    /// The topic that was processed
    pub topic: String,

    /// What happened to it
    #[serde(flatten)]
    pub status: TopicStatus,
}

/// Summary of one completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// UTC date key the run executed under
    pub date: String,

    /// Topics requested from the selector
    pub requested: usize,

    /// Positions the selector scanned (cursor advance)
    pub scanned: usize,

    /// Per-topic outcomes in processing order
    pub outcomes: Vec<TopicOutcome>,
}

impl RunReport {
    /// Number of topics published
    pub fn published_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TopicStatus::Published { .. }))
            .count()
    }

    /// Number of topics skipped
    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.published_count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Run {} — {} published, {} skipped",
            self.date,
            self.published_count(),
            self.skipped_count()
        )?;
        for outcome in &self.outcomes {
            match &outcome.status {
                TopicStatus::Published { title } => {
                    writeln!(f, "  {:<16} published: {title}", outcome.topic)?
                }
                TopicStatus::Skipped { reason } => {
                    writeln!(f, "  {:<16} skipped: {reason}", outcome.topic)?
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Run Orchestrator
// ============================================================================

/// Sequences one publishing run end to end
///
/// Collaborators are trait objects so tests can substitute generators and
/// publishers; all knobs arrive through [`RunConfig`] at construction time.
pub struct RunOrchestrator {
    config: RunConfig,
    store: HistoryStore,
    selector: RotationSelector,
    guard: TitleGuard,
    generator: Arc<dyn PostGenerator>,
    publisher: Arc<dyn Publisher>,
    source: Option<Arc<dyn TopicSource>>,
}

impl RunOrchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(
        config: RunConfig,
        store: HistoryStore,
        selector: RotationSelector,
        generator: Arc<dyn PostGenerator>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        Self {
            config,
            store,
            selector,
            guard: TitleGuard::new(),
            generator,
            publisher,
            source: None,
        }
    }

    /// Attach a topic source that seeds generation with trending articles
    pub fn with_source(mut self, source: Arc<dyn TopicSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Execute one run under today's UTC date
    pub async fn run(&self) -> Result<RunReport> {
        self.run_for_date(&scheduler::today_key()).await
    }

    /// Execute one run under an explicit date key
    ///
    /// State is loaded once, mutated in memory, and saved exactly once at the
    /// end — even when every topic was skipped, so the rotation cursor always
    /// advances.
    pub async fn run_for_date(&self, date_key: &str) -> Result<RunReport> {
        let mut record = self.store.load();

        let selection = self
            .selector
            .select(&mut record, date_key, self.config.articles_per_day);

        tracing::info!(
            date = date_key,
            selected = selection.topics.len(),
            requested = self.config.articles_per_day,
            "Run selection complete"
        );

        if selection.is_short(self.config.articles_per_day) {
            tracing::warn!(
                date = date_key,
                selected = selection.topics.len(),
                requested = self.config.articles_per_day,
                scanned = selection.scanned,
                "Fewer topics than requested, scan bound reached"
            );
        }

        let mut outcomes = Vec::with_capacity(selection.topics.len());
        for topic in &selection.topics {
            let status = self.process_topic(&mut record, date_key, topic).await;

            match &status {
                TopicStatus::Published { title } => {
                    tracing::info!(topic = topic, title = title, "Topic published")
                }
                TopicStatus::Skipped { reason } => {
                    tracing::warn!(topic = topic, reason = %reason, "Topic skipped")
                }
            }

            outcomes.push(TopicOutcome {
                topic: topic.clone(),
                status,
            });
        }

        self.store.save(&record)?;

        Ok(RunReport {
            date: date_key.to_string(),
            requested: self.config.articles_per_day,
            scanned: selection.scanned,
            outcomes,
        })
    }

    /// Drive one topic through GENERATE → DEDUP_CHECK → PUBLISH → COMMIT
    ///
    /// The seed article is fetched once and reused across regeneration
    /// attempts. Only a successful publish mutates history state for the
    /// topic.
    async fn process_topic(
        &self,
        record: &mut HistoryRecord,
        date_key: &str,
        topic: &str,
    ) -> TopicStatus {
        let seed = self.fetch_seed(topic).await;

        let request = GenerationRequest {
            topic: topic.to_string(),
            loop_index: record.loop_index(topic),
            recent_titles: record.recent_titles(topic).to_vec(),
            seed,
        };

        let max_attempts = self.config.max_title_retries + 1;
        for attempt in 1..=max_attempts {
            let post = match self.generator.generate(&request).await {
                Ok(post) => post,
                Err(e) => {
                    return TopicStatus::Skipped {
                        reason: SkipReason::GenerationFailed {
                            detail: e.to_string(),
                        },
                    };
                }
            };

            if self.guard.is_duplicate(&post.title, record) {
                tracing::debug!(
                    topic = topic,
                    title = post.title,
                    attempt = attempt,
                    "Generated title is a duplicate"
                );
                continue;
            }

            if let Err(e) = self.publisher.publish(&post.title, &post.body).await {
                return TopicStatus::Skipped {
                    reason: SkipReason::PublishFailed {
                        detail: e.to_string(),
                    },
                };
            }

            self.guard.register(&post.title, record);
            record.commit_publication(date_key, topic, &post.title);

            return TopicStatus::Published { title: post.title };
        }

        TopicStatus::Skipped {
            reason: SkipReason::DuplicateTitle {
                attempts: max_attempts,
            },
        }
    }

    async fn fetch_seed(&self, topic: &str) -> Option<ArticleSeed> {
        let source = self.source.as_ref()?;
        match source.fetch_seed(topic).await {
            Ok(seed) => seed,
            Err(e) => {
                // A seed only enriches the prompt; its failure is not the topic's
                tracing::warn!(topic = topic, error = %e, "Seed fetch failed, generating without it");
                None
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::DuplicateTitle { attempts: 6 };
        assert_eq!(reason.to_string(), "duplicate title after 6 attempts");
    }

    #[test]
    fn test_report_counts() {
        let report = RunReport {
            date: "2026-08-26".to_string(),
            requested: 2,
            scanned: 2,
            outcomes: vec![
                TopicOutcome {
                    topic: "Sport".to_string(),
                    status: TopicStatus::Published {
                        title: "Cup Final".to_string(),
                    },
                },
                TopicOutcome {
                    topic: "Finance".to_string(),
                    status: TopicStatus::Skipped {
                        reason: SkipReason::DuplicateTitle { attempts: 6 },
                    },
                },
            ],
        };

        assert_eq!(report.published_count(), 1);
        assert_eq!(report.skipped_count(), 1);

        let rendered = report.to_string();
        assert!(rendered.contains("1 published, 1 skipped"));
        assert!(rendered.contains("Cup Final"));
    }
}
