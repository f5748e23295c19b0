//! Circular rotation selection over the fixed topic list
//!
//! The selector scans forward from the persisted rotation cursor, includes
//! every topic not already posted today, and advances the cursor by the
//! number of positions *scanned* — including skipped same-day repeats — so
//! the next run resumes immediately past the last examined position. A scan
//! bound of `2L` positions guarantees termination even when every topic has
//! already been posted today, in which case fewer than `k` topics (possibly
//! zero) are returned.

use serde::Serialize;
use std::collections::HashSet;

use crate::history::HistoryRecord;

/// Result of one selection call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Topics chosen for this run, in scan order
    pub topics: Vec<String>,

    /// Positions scanned, including skips; the cursor advanced by this much
    pub scanned: usize,
}

impl Selection {
    /// Whether the scan bound exhausted before `k` topics were found
    pub fn is_short(&self, k: usize) -> bool {
        self.topics.len() < k
    }
}

/// Selector over a fixed, externally supplied ordered topic list
///
/// Topics are opaque string keys compared only by exact identity. The list
/// is an explicit constructor input, never ambient state, so multiple
/// configurations can be tested in isolation.
#[derive(Debug, Clone)]
pub struct RotationSelector {
    topics: Vec<String>,
}

impl RotationSelector {
    /// Create a selector for the given ordered topic list
    ///
    /// The list must be non-empty; configuration validation enforces this
    /// before a selector is ever constructed.
    pub fn new(topics: Vec<String>) -> Self {
        debug_assert!(!topics.is_empty(), "topic list must not be empty");
        Self { topics }
    }

    /// Number of topics in the rotation
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Whether the rotation is empty
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// The ordered topic list
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    /// Select up to `k` topics for `date_key` and advance the record's cursor
    ///
    /// Starting at `rotation_cursor`, scans forward circularly. A scanned
    /// topic is included if it has not been posted on `date_key` and was not
    /// already chosen in this call; the scan counter advances regardless.
    /// Stops when `k` topics are chosen or `2L` positions have been scanned.
    /// The cursor becomes `(start + scanned) mod L` — it reflects positions
    /// scanned, not selected, so a fully collided day still moves the scan
    /// origin for the next run.
    pub fn select(&self, record: &mut HistoryRecord, date_key: &str, k: usize) -> Selection {
        let len = self.topics.len();
        let start = record.rotation_cursor % len;
        let scan_limit = 2 * len;

        let posted_today: HashSet<&str> = record
            .topics_posted_on(date_key)
            .iter()
            .map(String::as_str)
            .collect();

        let mut chosen: Vec<String> = Vec::with_capacity(k.min(len));
        let mut chosen_set: HashSet<&str> = HashSet::with_capacity(k.min(len));
        let mut scanned = 0;

        while chosen.len() < k && scanned < scan_limit {
            let topic = &self.topics[(start + scanned) % len];
            scanned += 1;

            if posted_today.contains(topic.as_str()) || chosen_set.contains(topic.as_str()) {
                continue;
            }

            chosen_set.insert(topic.as_str());
            chosen.push(topic.clone());
        }

        record.rotation_cursor = (start + scanned) % len;

        tracing::debug!(
            date = date_key,
            requested = k,
            selected = chosen.len(),
            scanned = scanned,
            cursor = record.rotation_cursor,
            "Rotation selection complete"
        );

        Selection {
            topics: chosen,
            scanned,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
