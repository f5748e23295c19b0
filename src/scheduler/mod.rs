//! Topic rotation scheduling
//!
//! Decides which topics a run publishes. The selector walks the fixed
//! ordered topic list circularly from a persisted cursor, skipping topics
//! already posted today, so long-run coverage of the list is exhaustive.

pub mod rotation;

pub use rotation::{RotationSelector, Selection};

use chrono::Utc;

/// UTC calendar date key (`YYYY-MM-DD`) used for the per-day topic log
pub fn today_key() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
