//! Core data types
//!
//! Records flow through the engine in three shapes: validated input rows
//! ([`ScreenTimeRecord`]), scored rows ([`ScoredRecord`]), and grouped summaries
//! ([`AggregateView`], [`Insights`]) computed over a filtered subset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ComputeError;

/// A single screen-time observation as loaded from the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenTimeRecord {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Application identifier
    pub app_name: String,
    /// Application category
    pub category: String,
    /// Minutes of usage (non-negative)
    pub usage_minutes: f64,
    /// Number of device pickups
    pub pickups: u32,
    /// Number of notifications received
    pub notifications: u32,
    /// Hour of day, 0-23
    pub hour: u8,
}

/// Categorical addiction bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AddictionLevel {
    Low,
    Moderate,
    High,
}

impl AddictionLevel {
    /// All levels in ascending severity
    pub const ALL: [AddictionLevel; 3] = [
        AddictionLevel::Low,
        AddictionLevel::Moderate,
        AddictionLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AddictionLevel::Low => "Low",
            AddictionLevel::Moderate => "Moderate",
            AddictionLevel::High => "High",
        }
    }
}

impl fmt::Display for AddictionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record with its derived addiction score and level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// Source record
    #[serde(flatten)]
    pub record: ScreenTimeRecord,
    /// Weighted score of usage, pickups and notifications
    pub addiction_score: f64,
    /// Bucket derived from `addiction_score`
    pub addiction_level: AddictionLevel,
}

/// Total usage for one app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppUsage {
    pub app_name: String,
    pub total_minutes: f64,
    pub records: usize,
}

/// Number of records in one addiction level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCount {
    pub level: AddictionLevel,
    pub count: usize,
}

/// Mean usage for one hour of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyUsage {
    pub hour: u8,
    pub mean_minutes: f64,
    pub records: usize,
}

/// Mean addiction score for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: String,
    pub mean_score: f64,
    pub records: usize,
}

/// Grouped summaries over a set of scored records.
///
/// Ordering:
/// - `usage_by_app` and `category_mean_score` follow first appearance in the input
/// - `level_distribution` follows ascending severity
/// - `hourly_profile` follows ascending hour
///
/// Groups with no records are omitted rather than zero-filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateView {
    pub usage_by_app: Vec<AppUsage>,
    pub level_distribution: Vec<LevelCount>,
    pub hourly_profile: Vec<HourlyUsage>,
    pub category_mean_score: Vec<CategoryScore>,
}

impl AggregateView {
    /// True when every grouping is empty
    pub fn is_empty(&self) -> bool {
        self.usage_by_app.is_empty()
            && self.level_distribution.is_empty()
            && self.hourly_profile.is_empty()
            && self.category_mean_score.is_empty()
    }

    pub fn usage_for_app(&self, app_name: &str) -> Option<f64> {
        self.usage_by_app
            .iter()
            .find(|a| a.app_name == app_name)
            .map(|a| a.total_minutes)
    }

    pub fn count_for_level(&self, level: AddictionLevel) -> Option<usize> {
        self.level_distribution
            .iter()
            .find(|l| l.level == level)
            .map(|l| l.count)
    }

    pub fn mean_usage_at(&self, hour: u8) -> Option<f64> {
        self.hourly_profile
            .iter()
            .find(|h| h.hour == hour)
            .map(|h| h.mean_minutes)
    }

    pub fn mean_score_for_category(&self, category: &str) -> Option<f64> {
        self.category_mean_score
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.mean_score)
    }
}

/// An arg-max style insight that may be undefined over an empty record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum InsightValue<T> {
    Available(T),
    NoData,
}

impl<T> InsightValue<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, InsightValue::Available(_))
    }

    /// Borrow the value, or signal [`ComputeError::NoData`] naming the insight
    pub fn require(&self, insight: &str) -> Result<&T, ComputeError> {
        match self {
            InsightValue::Available(value) => Ok(value),
            InsightValue::NoData => Err(ComputeError::NoData(insight.to_string())),
        }
    }
}

impl<T> From<Option<T>> for InsightValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => InsightValue::Available(v),
            None => InsightValue::NoData,
        }
    }
}

/// Derived insights shown alongside the aggregate charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    /// App with the highest total usage in the filtered view
    pub top_app: InsightValue<String>,
    /// Category with the highest mean addiction score in the filtered view
    pub top_category: InsightValue<String>,
    /// Hour with the highest mean usage in the filtered view
    pub peak_hour: InsightValue<u8>,
    /// Total usage minutes over all records, truncated
    pub total_usage: u64,
    /// Mean addiction score over all records, rounded to 2 decimals
    pub avg_addiction_score: f64,
    /// Number of records at the High level over all records
    pub high_addiction_count: usize,
}

/// Recommendation severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationTier {
    Low,
    Moderate,
    High,
}

/// Recommendation shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub tier: RecommendationTier,
    /// Mean addiction score the tier was derived from
    pub based_on_score: f64,
    /// Advice text; `None` for the informational tier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Report Types
// ============================================================================

/// Producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Where the records came from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Records successfully loaded
    pub total_records: usize,
    /// Rows dropped under the skip policy
    pub rejected_rows: usize,
}

/// Category selection the report was computed for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFilter {
    /// `all` or `selected`
    pub mode: String,
    pub categories: Vec<String>,
    /// Records remaining after filtering
    pub matched_records: usize,
}

/// Full dashboard output consumed by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub source: ReportSource,
    pub filter: ReportFilter,
    pub preview: Vec<ScoredRecord>,
    pub aggregates: AggregateView,
    pub insights: Insights,
    pub recommendation: Recommendation,
}
