//! Title deduplication
//!
//! Generated titles are checked against the append-only digest set in the
//! history record before anything is published twice. Membership is
//! content-addressed: titles are normalized (trimmed, case-folded) and
//! fingerprinted with SHA-256, so "  Markets Rally " and "markets rally"
//! collide. The threat model is accidental repetition, not adversarial
//! titles.

use sha2::{Digest, Sha256};

use crate::history::HistoryRecord;

/// Normalize a title for membership testing: trim surrounding whitespace
/// and fold case.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Fixed-length hex digest of a normalized title
pub fn title_digest(title: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_title(title).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Guard against publishing the same title twice
///
/// Stateless by itself; all durable membership lives in the history record.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleGuard;

impl TitleGuard {
    /// Create a new guard
    pub fn new() -> Self {
        Self
    }

    /// Check whether a title was already published
    pub fn is_duplicate(&self, title: &str, record: &HistoryRecord) -> bool {
        record.seen_title_hashes.contains(&title_digest(title))
    }

    /// Register a title's digest (idempotent)
    pub fn register(&self, title: &str, record: &mut HistoryRecord) {
        record.seen_title_hashes.insert(title_digest(title));
    }
}
