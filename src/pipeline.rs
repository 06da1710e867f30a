//! Dashboard pipeline orchestration
//!
//! This module provides the public API for producing dashboard reports.
//! Pipeline: CSV → Adapter → Scoring → Filter → Aggregate → Insights → Report

use crate::adapter::{CsvRecordAdapter, LoadPolicy};
use crate::aggregate::aggregate;
use crate::cache::{DatasetCache, ScoredDataset};
use crate::config::{SessionConfig, DEFAULT_PREVIEW_ROWS};
use crate::encoder::{ReportEncoder, ReportInputs};
use crate::error::ComputeError;
use crate::filter::CategoryFilter;
use crate::gate::AccessGate;
use crate::insights::{derive_insights, recommend};
use crate::scoring::score;
use crate::types::{DashboardReport, ReportSource, ScoredRecord};
use std::path::Path;
use tracing::debug;

/// Convert CSV text to a report JSON string (stateless, one-shot).
///
/// Malformed rows abort the conversion.
///
/// # Example
/// ```ignore
/// let json = csv_to_report(csv, &CategoryFilter::All)?;
/// ```
pub fn csv_to_report(csv: &str, filter: &CategoryFilter) -> Result<String, ComputeError> {
    let report = analyze_csv(csv, filter, LoadPolicy::Abort, DEFAULT_PREVIEW_ROWS)?;
    ReportEncoder::to_json_pretty(&report)
}

/// Build a report from CSV text
pub fn analyze_csv(
    csv: &str,
    filter: &CategoryFilter,
    policy: LoadPolicy,
    preview_rows: usize,
) -> Result<DashboardReport, ComputeError> {
    // Stage 1: Parse and validate rows
    let outcome = CsvRecordAdapter::load(csv, policy)?;

    // Stage 2: Score
    let scored = score(&outcome.records);

    let source = ReportSource {
        path: None,
        checksum: None,
        total_records: scored.len(),
        rejected_rows: outcome.rejected.len(),
    };

    Ok(build_report(
        &ReportEncoder::new(),
        source,
        &scored,
        filter,
        preview_rows,
    ))
}

/// Stages 3-6 over an already scored record set
fn build_report(
    encoder: &ReportEncoder,
    source: ReportSource,
    records: &[ScoredRecord],
    filter: &CategoryFilter,
    preview_rows: usize,
) -> DashboardReport {
    // Stage 3: Filter
    let filtered = filter.apply(records);
    debug!(
        total = records.len(),
        matched = filtered.len(),
        mode = filter.mode(),
        "applied category filter"
    );

    // Stage 4: Aggregate the filtered subset
    let aggregates = aggregate(&filtered);

    // Stage 5: Insights over the view plus the full set
    let insights = derive_insights(&aggregates, records);
    let recommendation = recommend(&filtered);

    // Stage 6: Encode
    encoder.encode(ReportInputs {
        source,
        filter,
        all_records: records,
        filtered_records: &filtered,
        preview_rows,
        aggregates,
        insights,
        recommendation,
    })
}

/// Stateful session: one gate check, one cached dataset, many filter selections.
pub struct DashboardSession {
    config: SessionConfig,
    gate: AccessGate,
    cache: DatasetCache,
    encoder: ReportEncoder,
}

impl Default for DashboardSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl DashboardSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            gate: AccessGate::new(config.access.clone()),
            config,
            cache: DatasetCache::new(),
            encoder: ReportEncoder::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run the access gate
    pub fn authenticate(&self, username: Option<&str>, password: Option<&str>) -> Result<(), ComputeError> {
        self.gate.check(username, password)
    }

    /// Load (or reuse) the scored dataset at `path`
    pub fn load(&mut self, path: &Path) -> Result<&ScoredDataset, ComputeError> {
        self.cache.load(path, self.config.load_policy)
    }

    /// Produce a report for `path` under the given category selection.
    /// Scoring is reused across calls while the file is unchanged.
    pub fn report(&mut self, path: &Path, filter: &CategoryFilter) -> Result<DashboardReport, ComputeError> {
        let preview_rows = self.config.preview_rows;
        let dataset = self.cache.load(path, self.config.load_policy)?;

        let source = ReportSource {
            path: Some(dataset.key.path.display().to_string()),
            checksum: Some(dataset.key.checksum.clone()),
            total_records: dataset.records.len(),
            rejected_rows: dataset.rejected.len(),
        };

        Ok(build_report(
            &self.encoder,
            source,
            &dataset.records,
            filter,
            preview_rows,
        ))
    }

    /// Drop the cached dataset so the next report reloads from disk
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn is_loaded(&self) -> bool {
        !self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddictionLevel, InsightValue, RecommendationTier};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_csv() -> &'static str {
        "date,app_name,category,usage_minutes,pickups,notifications,hour\n\
         2024-01-15,Instagram,Social,180,40,60,21\n\
         2024-01-15,TikTok,Social,240,55,30,23\n\
         2024-01-15,Slack,Work,60,12,45,10\n\
         2024-01-16,YouTube,Entertainment,420,20,10,22\n\
         2024-01-16,Clash Royale,Game,90,25,8,19\n\
         2024-01-16,Instagram,Social,150,35,40,21\n"
    }

    fn temp_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_csv_to_report_stateless() {
        let json = csv_to_report(sample_csv(), &CategoryFilter::All).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["report_version"], "1.0.0");
        assert_eq!(payload["producer"]["name"], "screentime-insights");
        assert_eq!(payload["source"]["total_records"], 6);
        assert_eq!(payload["preview"].as_array().unwrap().len(), 5);
        assert_eq!(payload["insights"]["total_usage"], 1140);
        assert_eq!(payload["insights"]["top_app"]["value"], "YouTube");
    }

    #[test]
    fn test_full_analysis() {
        let report = analyze_csv(sample_csv(), &CategoryFilter::All, LoadPolicy::Abort, 5).unwrap();

        // Instagram 180 + 150, TikTok 240, Slack 60, YouTube 420, Clash 90
        assert_eq!(report.aggregates.usage_for_app("Instagram"), Some(330.0));
        assert_eq!(report.aggregates.usage_by_app.len(), 5);

        // Scores: 114, 142.5, 42.6, 218, 54.1, 93.5
        assert_eq!(report.aggregates.count_for_level(AddictionLevel::High), Some(1));
        assert_eq!(report.aggregates.count_for_level(AddictionLevel::Moderate), Some(2));
        assert_eq!(report.aggregates.count_for_level(AddictionLevel::Low), Some(3));
        assert_eq!(report.insights.high_addiction_count, 1);
        assert_eq!(
            report.insights.top_category,
            InsightValue::Available("Entertainment".to_string())
        );
        assert_eq!(report.insights.peak_hour, InsightValue::Available(22));
        // 664.7 / 6 = 110.7833...
        assert!((report.insights.avg_addiction_score - 110.78).abs() < 1e-9);
        assert_eq!(report.recommendation.tier, RecommendationTier::Low);
    }

    #[test]
    fn test_filter_changes_view_not_totals() {
        let report = analyze_csv(
            sample_csv(),
            &CategoryFilter::selected(["Social"]),
            LoadPolicy::Abort,
            5,
        )
        .unwrap();

        assert_eq!(report.filter.matched_records, 3);
        assert_eq!(report.aggregates.usage_by_app.len(), 2);
        assert_eq!(
            report.insights.top_app,
            InsightValue::Available("Instagram".to_string())
        );
        assert_eq!(report.insights.total_usage, 1140);
        // Social mean: (114 + 142.5 + 93.5) / 3 = 116.67
        assert_eq!(report.recommendation.tier, RecommendationTier::Low);

        let entertainment = analyze_csv(
            sample_csv(),
            &CategoryFilter::selected(["Entertainment"]),
            LoadPolicy::Abort,
            5,
        )
        .unwrap();
        assert_eq!(entertainment.recommendation.tier, RecommendationTier::High);
    }

    #[test]
    fn test_empty_selection_is_not_all() {
        let report = analyze_csv(
            sample_csv(),
            &CategoryFilter::selected(Vec::<String>::new()),
            LoadPolicy::Abort,
            5,
        )
        .unwrap();

        assert!(report.aggregates.is_empty());
        assert_eq!(report.insights.top_app, InsightValue::NoData);
        assert_eq!(report.insights.top_category, InsightValue::NoData);
        assert_eq!(report.insights.total_usage, 1140);
        assert_eq!(report.filter.matched_records, 0);
    }

    #[test]
    fn test_empty_dataset() {
        let header = "date,app_name,category,usage_minutes,pickups,notifications,hour\n";
        let report = analyze_csv(header, &CategoryFilter::All, LoadPolicy::Abort, 5).unwrap();

        assert!(report.aggregates.is_empty());
        assert_eq!(report.insights.top_app, InsightValue::NoData);
        assert_eq!(report.insights.total_usage, 0);
        assert_eq!(report.insights.avg_addiction_score, 0.0);
        assert_eq!(report.insights.high_addiction_count, 0);
    }

    #[test]
    fn test_malformed_row_policy() {
        let csv = format!("{}2024-01-17,Reddit,News,??,1,1,8\n", sample_csv());

        let err = analyze_csv(&csv, &CategoryFilter::All, LoadPolicy::Abort, 5).unwrap_err();
        assert!(matches!(err, ComputeError::MalformedRecord { row: 7, .. }));

        let report = analyze_csv(&csv, &CategoryFilter::All, LoadPolicy::Skip, 5).unwrap();
        assert_eq!(report.source.total_records, 6);
        assert_eq!(report.source.rejected_rows, 1);
    }

    #[test]
    fn test_session_reuses_dataset_across_filters() {
        let file = temp_csv(sample_csv());
        let mut session = DashboardSession::default();
        assert!(!session.is_loaded());

        let all = session.report(file.path(), &CategoryFilter::All).unwrap();
        assert!(session.is_loaded());
        let work = session
            .report(file.path(), &CategoryFilter::selected(["Work"]))
            .unwrap();

        assert_eq!(all.source.checksum, work.source.checksum);
        assert_eq!(all.producer.instance_id, work.producer.instance_id);
        assert_eq!(work.filter.matched_records, 1);
        assert_eq!(
            work.insights.top_app,
            InsightValue::Available("Slack".to_string())
        );

        session.invalidate();
        assert!(!session.is_loaded());
        assert_eq!(session.load(file.path()).unwrap().records.len(), 6);
    }

    #[test]
    fn test_session_gate() {
        let session = DashboardSession::default();
        assert!(session.authenticate(Some("admin"), Some("1234")).is_ok());
        assert!(matches!(
            session.authenticate(Some("admin"), Some("nope")),
            Err(ComputeError::AccessDenied)
        ));
    }
}
