//! Insight derivation and recommendations
//!
//! Arg-max insights are taken from the filtered [`AggregateView`]; scalar metrics are
//! taken from the full, unfiltered record set.

use crate::types::{
    AddictionLevel, AggregateView, InsightValue, Insights, Recommendation, RecommendationTier,
    ScoredRecord,
};

/// Mean scores above this get the High recommendation tier
pub const HIGH_RECOMMENDATION_THRESHOLD: f64 = 200.0;

/// Mean scores above this (and not above the High threshold) get the Moderate tier
pub const MODERATE_RECOMMENDATION_THRESHOLD: f64 = 120.0;

const HIGH_RECOMMENDATION: &str =
    "High digital addiction detected. Consider reducing screen time, especially during night hours.";

const MODERATE_RECOMMENDATION: &str =
    "Moderate addiction level. Try scheduling regular screen breaks.";

/// Derive insights from a filtered view and the full record set
pub fn derive_insights(view: &AggregateView, all_records: &[ScoredRecord]) -> Insights {
    let top_app = first_max(
        view.usage_by_app
            .iter()
            .map(|a| (a.app_name.as_str(), a.total_minutes)),
    )
    .map(str::to_string);

    let top_category = first_max(
        view.category_mean_score
            .iter()
            .map(|c| (c.category.as_str(), c.mean_score)),
    )
    .map(str::to_string);

    let peak_hour = first_max(view.hourly_profile.iter().map(|h| (h.hour, h.mean_minutes)));

    let total_usage: f64 = all_records.iter().map(|r| r.record.usage_minutes).sum();
    let high_addiction_count = all_records
        .iter()
        .filter(|r| r.addiction_level == AddictionLevel::High)
        .count();

    Insights {
        top_app: top_app.into(),
        top_category: top_category.into(),
        peak_hour: peak_hour.into(),
        total_usage: total_usage.trunc() as u64,
        avg_addiction_score: round2(mean_score(all_records)),
        high_addiction_count,
    }
}

/// Map a mean addiction score to a recommendation tier
pub fn recommendation_tier(avg_score: f64) -> RecommendationTier {
    if avg_score > HIGH_RECOMMENDATION_THRESHOLD {
        RecommendationTier::High
    } else if avg_score > MODERATE_RECOMMENDATION_THRESHOLD {
        RecommendationTier::Moderate
    } else {
        RecommendationTier::Low
    }
}

/// Build the recommendation for a set of (typically filtered) records.
/// An empty set falls into the Low tier.
pub fn recommend(records: &[ScoredRecord]) -> Recommendation {
    let based_on_score = mean_score(records);
    let tier = recommendation_tier(based_on_score);
    let message = match tier {
        RecommendationTier::High => Some(HIGH_RECOMMENDATION.to_string()),
        RecommendationTier::Moderate => Some(MODERATE_RECOMMENDATION.to_string()),
        // Informational tier, no advice text
        RecommendationTier::Low => None,
    };

    Recommendation {
        tier,
        based_on_score: round2(based_on_score),
        message,
    }
}

/// Mean addiction score, 0 when empty
pub fn mean_score(records: &[ScoredRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(|r| r.addiction_score).sum::<f64>() / records.len() as f64
}

/// Key with the largest value. Ties resolve to the earliest entry.
fn first_max<K>(entries: impl Iterator<Item = (K, f64)>) -> Option<K> {
    entries
        .fold(None, |best: Option<(K, f64)>, (key, value)| match best {
            Some((_, best_value)) if value <= best_value => best,
            _ => Some((key, value)),
        })
        .map(|(key, _)| key)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::error::ComputeError;
    use crate::filter::CategoryFilter;
    use crate::scoring::score;
    use crate::types::ScreenTimeRecord;
    use chrono::NaiveDate;

    fn record(app: &str, category: &str, usage: f64, pickups: u32, notifications: u32, hour: u8) -> ScreenTimeRecord {
        ScreenTimeRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            app_name: app.to_string(),
            category: category.to_string(),
            usage_minutes: usage,
            pickups,
            notifications,
            hour,
        }
    }

    #[test]
    fn test_two_record_scenario() {
        let scored = score(&[
            record("A", "Social", 100.0, 10, 5, 20),
            record("B", "Game", 50.0, 2, 1, 21),
        ]);
        let insights = derive_insights(&aggregate(&scored), &scored);

        assert_eq!(insights.top_app, InsightValue::Available("A".to_string()));
        assert_eq!(insights.top_category, InsightValue::Available("Social".to_string()));
        assert_eq!(insights.peak_hour, InsightValue::Available(20));
        assert_eq!(insights.total_usage, 150);
        // (54 + 25.8) / 2 = 39.9
        assert!((insights.avg_addiction_score - 39.9).abs() < 1e-9);
        assert_eq!(insights.high_addiction_count, 0);
    }

    #[test]
    fn test_empty_records_signal_no_data() {
        let insights = derive_insights(&aggregate(&[]), &[]);

        assert_eq!(insights.top_app, InsightValue::NoData);
        assert_eq!(insights.top_category, InsightValue::NoData);
        assert_eq!(insights.peak_hour, InsightValue::NoData);
        assert_eq!(insights.total_usage, 0);
        assert_eq!(insights.avg_addiction_score, 0.0);
        assert_eq!(insights.high_addiction_count, 0);
        assert!(matches!(
            insights.top_app.require("top_app"),
            Err(ComputeError::NoData(_))
        ));
    }

    #[test]
    fn test_empty_filter_gives_no_data_but_keeps_totals() {
        let scored = score(&[
            record("A", "Social", 500.0, 0, 0, 20),
            record("B", "Game", 50.0, 0, 0, 21),
        ]);
        let filtered = CategoryFilter::selected(Vec::<String>::new()).apply(&scored);
        let insights = derive_insights(&aggregate(&filtered), &scored);

        assert_eq!(insights.top_app, InsightValue::NoData);
        assert_eq!(insights.top_category, InsightValue::NoData);
        assert_eq!(insights.total_usage, 550);
        assert_eq!(insights.high_addiction_count, 1);
    }

    #[test]
    fn test_top_app_tie_resolves_to_first_seen() {
        let scored = score(&[
            record("Zed", "Social", 60.0, 0, 0, 9),
            record("Alpha", "Social", 60.0, 0, 0, 9),
        ]);

        for _ in 0..5 {
            let insights = derive_insights(&aggregate(&scored), &scored);
            assert_eq!(insights.top_app, InsightValue::Available("Zed".to_string()));
        }
    }

    #[test]
    fn test_top_category_tie_resolves_to_first_seen() {
        let scored = score(&[
            record("B", "Zeta", 10.0, 0, 0, 9),
            record("A", "Alpha", 10.0, 0, 0, 10),
        ]);

        for _ in 0..5 {
            let insights = derive_insights(&aggregate(&scored), &scored);
            assert_eq!(insights.top_category, InsightValue::Available("Zeta".to_string()));
            assert_eq!(insights.top_app, InsightValue::Available("B".to_string()));
        }
    }

    #[test]
    fn test_top_category_uses_mean_score_not_total() {
        let scored = score(&[
            record("A", "Social", 10.0, 0, 0, 9),
            record("B", "Social", 10.0, 0, 0, 9),
            record("C", "Social", 10.0, 0, 0, 9),
            record("D", "Game", 25.0, 0, 0, 9),
        ]);
        let insights = derive_insights(&aggregate(&scored), &scored);
        assert_eq!(insights.top_category, InsightValue::Available("Game".to_string()));
    }

    #[test]
    fn test_peak_hour_tie_resolves_to_earliest_hour() {
        let scored = score(&[
            record("A", "Social", 30.0, 0, 0, 22),
            record("B", "Social", 30.0, 0, 0, 7),
        ]);
        let insights = derive_insights(&aggregate(&scored), &scored);
        assert_eq!(insights.peak_hour, InsightValue::Available(7));
    }

    #[test]
    fn test_total_usage_truncates_and_average_rounds() {
        let scored = score(&[
            record("A", "Social", 10.7, 0, 0, 1),
            record("B", "Social", 20.6, 0, 0, 1),
            record("C", "Social", 3.1, 0, 0, 1),
        ]);
        let insights = derive_insights(&aggregate(&scored), &scored);

        assert_eq!(insights.total_usage, 34);
        // (5.35 + 10.3 + 1.55) / 3 = 5.7333...
        assert!((insights.avg_addiction_score - 5.73).abs() < 1e-9);
    }

    #[test]
    fn test_recommendation_tier_boundaries() {
        assert_eq!(recommendation_tier(0.0), RecommendationTier::Low);
        assert_eq!(recommendation_tier(120.0), RecommendationTier::Low);
        assert_eq!(recommendation_tier(120.01), RecommendationTier::Moderate);
        assert_eq!(recommendation_tier(200.0), RecommendationTier::Moderate);
        assert_eq!(recommendation_tier(200.01), RecommendationTier::High);
    }

    #[test]
    fn test_recommend_messages() {
        let high = recommend(&score(&[record("A", "Social", 500.0, 0, 0, 23)]));
        assert_eq!(high.tier, RecommendationTier::High);
        assert!(high.message.as_deref().unwrap().contains("night hours"));

        let moderate = recommend(&score(&[record("A", "Social", 300.0, 0, 0, 23)]));
        assert_eq!(moderate.tier, RecommendationTier::Moderate);
        assert!(moderate.message.as_deref().unwrap().contains("screen breaks"));

        let low = recommend(&score(&[record("A", "Social", 20.0, 0, 0, 23)]));
        assert_eq!(low.tier, RecommendationTier::Low);
        assert!(low.message.is_none());
    }

    #[test]
    fn test_recommend_empty_is_low() {
        let recommendation = recommend(&[]);
        assert_eq!(recommendation.tier, RecommendationTier::Low);
        assert_eq!(recommendation.based_on_score, 0.0);
    }
}
