//! Screentime Insights - addiction scoring and insight engine for screen-time data
//!
//! Loads screen-time records from CSV, scores each record, and derives the grouped
//! views, metrics and recommendations shown on a dashboard:
//! CSV adaptation → scoring → category filter → aggregation → insights → report.
//!
//! Every stage after loading is a pure function over in-memory records. The
//! [`DashboardSession`] caches the scored dataset per input file so that changing
//! the category selection only recomputes the filtered views.

pub mod adapter;
pub mod aggregate;
pub mod cache;
pub mod config;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod gate;
pub mod insights;
pub mod pipeline;
pub mod render;
pub mod scoring;
pub mod types;

pub use adapter::{CsvRecordAdapter, LoadPolicy};
pub use aggregate::aggregate;
pub use config::SessionConfig;
pub use error::ComputeError;
pub use filter::{filter_by_category, CategoryFilter};
pub use insights::{derive_insights, recommendation_tier};
pub use pipeline::{analyze_csv, csv_to_report, DashboardSession};
pub use scoring::{score, score_record};
pub use types::{
    AddictionLevel, AggregateView, DashboardReport, InsightValue, Insights, RecommendationTier,
    ScoredRecord, ScreenTimeRecord,
};

/// Crate version embedded in every report
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "screentime-insights";
