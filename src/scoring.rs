//! Addiction scoring
//!
//! Computes the weighted addiction score for each record and buckets it into a level.
//!
//! ```text
//! addiction_score = 0.5 * usage_minutes + 0.3 * pickups + 0.2 * notifications
//! ```

use crate::types::{AddictionLevel, ScoredRecord, ScreenTimeRecord};

/// Weight applied to usage minutes
pub const USAGE_WEIGHT: f64 = 0.5;

/// Weight applied to pickups
pub const PICKUP_WEIGHT: f64 = 0.3;

/// Weight applied to notifications
pub const NOTIFICATION_WEIGHT: f64 = 0.2;

/// Scores at or above this are Moderate
pub const MODERATE_THRESHOLD: f64 = 100.0;

/// Scores at or above this are High
pub const HIGH_THRESHOLD: f64 = 200.0;

/// Score every record, preserving order and length
pub fn score(records: &[ScreenTimeRecord]) -> Vec<ScoredRecord> {
    records.iter().cloned().map(score_record).collect()
}

/// Score a single record
pub fn score_record(record: ScreenTimeRecord) -> ScoredRecord {
    let addiction_score =
        addiction_score(record.usage_minutes, record.pickups, record.notifications);
    ScoredRecord {
        record,
        addiction_score,
        addiction_level: addiction_level(addiction_score),
    }
}

/// Weighted sum of usage, pickups and notifications
pub fn addiction_score(usage_minutes: f64, pickups: u32, notifications: u32) -> f64 {
    USAGE_WEIGHT * usage_minutes
        + PICKUP_WEIGHT * f64::from(pickups)
        + NOTIFICATION_WEIGHT * f64::from(notifications)
}

/// Map a score to its level. Boundaries belong to the higher bucket.
pub fn addiction_level(score: f64) -> AddictionLevel {
    if score < MODERATE_THRESHOLD {
        AddictionLevel::Low
    } else if score < HIGH_THRESHOLD {
        AddictionLevel::Moderate
    } else {
        AddictionLevel::High
    }
}
