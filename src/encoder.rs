//! Dashboard report encoder
//!
//! Assembles the engine outputs into a [`DashboardReport`] and serializes it.

use crate::error::ComputeError;
use crate::filter::CategoryFilter;
use crate::types::{
    AggregateView, DashboardReport, Insights, Recommendation, ReportFilter, ReportProducer,
    ReportSource, ScoredRecord,
};
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Everything computed for one filter selection
pub struct ReportInputs<'a> {
    pub source: ReportSource,
    pub filter: &'a CategoryFilter,
    /// Full, unfiltered record set
    pub all_records: &'a [ScoredRecord],
    pub filtered_records: &'a [ScoredRecord],
    pub preview_rows: usize,
    pub aggregates: AggregateView,
    pub insights: Insights,
    pub recommendation: Recommendation,
}

/// Report encoder
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build the report
    pub fn encode(&self, inputs: ReportInputs<'_>) -> DashboardReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let filter = ReportFilter {
            mode: inputs.filter.mode().to_string(),
            categories: inputs.filter.resolve(inputs.all_records),
            matched_records: inputs.filtered_records.len(),
        };

        let preview = inputs
            .all_records
            .iter()
            .take(inputs.preview_rows)
            .cloned()
            .collect();

        DashboardReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            source: inputs.source,
            filter,
            preview,
            aggregates: inputs.aggregates,
            insights: inputs.insights,
            recommendation: inputs.recommendation,
        }
    }

    /// Serialize a report to compact JSON
    pub fn to_json(report: &DashboardReport) -> Result<String, ComputeError> {
        serde_json::to_string(report).map_err(ComputeError::JsonError)
    }

    /// Serialize a report to pretty-printed JSON
    pub fn to_json_pretty(report: &DashboardReport) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(report).map_err(ComputeError::JsonError)
    }
}
