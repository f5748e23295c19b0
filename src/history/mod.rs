//! Persistent publishing history
//!
//! The history record is the only durable state the scheduler owns: which
//! titles were already published (as digests), which topics ran on which day,
//! where the rotation cursor stands, and a bounded window of recent titles
//! per topic. It is loaded once at run start, mutated in memory, and written
//! back atomically exactly once at run end.
//!
//! Load failures recover to an empty record with a logged warning — an
//! operator rerunning after corruption should not be blocked. Save failures
//! are fatal: losing state silently would cause undetected duplicate
//! publications on the next run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Maximum number of recent titles kept per topic
pub const RECENT_TITLES_WINDOW: usize = 7;

// ============================================================================
// History Record
// ============================================================================

/// The single persisted aggregate for rotation and deduplication state
///
/// Every field carries a serde default so a partially corrupt document
/// degrades to empty sub-state instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Digests of all titles ever published (append-only, never shrinks)
    #[serde(default)]
    pub seen_title_hashes: BTreeSet<String>,

    /// Topics published per UTC calendar date (`YYYY-MM-DD`), in publish order
    #[serde(default)]
    pub days: BTreeMap<String, Vec<String>>,

    /// Index into the ordered topic list where the next scan resumes
    #[serde(default)]
    pub rotation_cursor: usize,

    /// Completed publish cycles per topic
    #[serde(default)]
    pub topic_loop_count: BTreeMap<String, u64>,

    /// Last published titles per topic, oldest evicted first
    #[serde(default)]
    pub recent_titles_by_topic: BTreeMap<String, Vec<String>>,
}

impl HistoryRecord {
    /// Create an empty record (cursor 0, all maps empty)
    pub fn new() -> Self {
        Self::default()
    }

    /// Topics already recorded under the given date key
    pub fn topics_posted_on(&self, date_key: &str) -> &[String] {
        self.days.get(date_key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Loop index for a topic (0 if never published)
    pub fn loop_index(&self, topic: &str) -> u64 {
        self.topic_loop_count.get(topic).copied().unwrap_or(0)
    }

    /// Recent-title window for a topic (empty if never published)
    pub fn recent_titles(&self, topic: &str) -> &[String] {
        self.recent_titles_by_topic
            .get(topic)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Record a successful publication of `title` for `topic` on `date_key`
    ///
    /// Appends the topic to the day's entry, increments the loop count and
    /// pushes the title into the bounded recent window. Title digest
    /// registration is the uniqueness guard's job, not this method's.
    pub fn commit_publication(&mut self, date_key: &str, topic: &str, title: &str) {
        self.days
            .entry(date_key.to_string())
            .or_default()
            .push(topic.to_string());

        *self.topic_loop_count.entry(topic.to_string()).or_insert(0) += 1;

        let window = self
            .recent_titles_by_topic
            .entry(topic.to_string())
            .or_default();
        window.push(title.to_string());
        if window.len() > RECENT_TITLES_WINDOW {
            let excess = window.len() - RECENT_TITLES_WINDOW;
            window.drain(..excess);
        }
    }

    /// Ensure per-topic entries exist for every configured topic
    ///
    /// Topics added to the deployment configuration after initial rollout get
    /// default entries here, so no schema migration step is ever needed.
    pub fn ensure_topics(&mut self, topics: &[String]) {
        for topic in topics {
            self.topic_loop_count.entry(topic.clone()).or_insert(0);
            self.recent_titles_by_topic.entry(topic.clone()).or_default();
        }
    }

    /// Total number of publications across all days
    pub fn total_published(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

// ============================================================================
// History Store
// ============================================================================

/// File-backed store for the history record
///
/// State is a single JSON document. Writes go to a temp file first and are
/// renamed into place so a crash mid-save never leaves a truncated record.
pub struct HistoryStore {
    path: PathBuf,
    topics: Vec<String>,
}

impl HistoryStore {
    /// Create a store for the given state file and configured topic list
    pub fn new(path: impl Into<PathBuf>, topics: Vec<String>) -> Self {
        Self {
            path: path.into(),
            topics,
        }
    }

    /// Load the persisted record, recovering to an empty one on any failure
    ///
    /// A missing file is the normal first-run case and logged at debug; a
    /// present-but-unparseable file is surfaced as a warning so the operator
    /// knows this run started cold despite prior state existing.
    pub fn load(&self) -> HistoryRecord {
        let mut record = if self.path.exists() {
            match self.read_record() {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(
                        path = %self.path.display(),
                        error = %e,
                        "History state unreadable, starting from empty state"
                    );
                    HistoryRecord::new()
                }
            }
        } else {
            tracing::debug!(
                path = %self.path.display(),
                "No history state found, starting fresh"
            );
            HistoryRecord::new()
        };

        record.ensure_topics(&self.topics);
        record
    }

    fn read_record(&self) -> Result<HistoryRecord> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Persist the record, overwriting the prior version
    ///
    /// Creates the containing directory if absent. Any failure here is fatal
    /// to the run.
    pub fn save(&self, record: &HistoryRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    Error::HistorySave(format!(
                        "cannot create state directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        let file = File::create(&temp_path).map_err(|e| {
            Error::HistorySave(format!("cannot create {}: {e}", temp_path.display()))
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record)
            .map_err(|e| Error::HistorySave(format!("serialization failed: {e}")))?;

        // Flush before the rename; errors raised in Drop are discarded
        writer.flush().map_err(|e| {
            Error::HistorySave(format!("cannot flush {}: {e}", temp_path.display()))
        })?;

        // Atomic rename
        fs::rename(&temp_path, &self.path).map_err(|e| {
            Error::HistorySave(format!("cannot rename into {}: {e}", self.path.display()))
        })?;

        tracing::debug!(path = %self.path.display(), "History state saved");
        Ok(())
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// Tests
// ============================================================================
