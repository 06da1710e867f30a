//! Grouped aggregation
//!
//! Folds scored records into the four views rendered by the dashboard. Groups are
//! accumulated as `(key, sum, count)` entries in first-seen order so that every
//! downstream arg-max has a deterministic tie-break.

use crate::types::{
    AddictionLevel, AggregateView, AppUsage, CategoryScore, HourlyUsage, LevelCount,
    ScoredRecord,
};
use std::collections::HashMap;
use std::hash::Hash;

/// Running sum and count for one group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct GroupTotal {
    pub sum: f64,
    pub count: usize,
}

impl GroupTotal {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }
}

/// Group values by key, keeping keys in order of first appearance
pub(crate) fn group_first_seen<'a, K, FK, FV>(
    records: &'a [ScoredRecord],
    key: FK,
    value: FV,
) -> Vec<(K, GroupTotal)>
where
    K: Eq + Hash + Clone,
    FK: Fn(&'a ScoredRecord) -> K,
    FV: Fn(&ScoredRecord) -> f64,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, GroupTotal)> = Vec::new();

    for record in records {
        let k = key(record);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k, GroupTotal::default()));
            groups.len() - 1
        });
        let total = &mut groups[slot].1;
        total.sum += value(record);
        total.count += 1;
    }

    groups
}

/// Compute all grouped views over `records`. An empty input gives empty views.
pub fn aggregate(records: &[ScoredRecord]) -> AggregateView {
    let usage_by_app = group_first_seen(
        records,
        |r| r.record.app_name.as_str(),
        |r| r.record.usage_minutes,
    )
    .into_iter()
    .map(|(app, total)| AppUsage {
        app_name: app.to_string(),
        total_minutes: total.sum,
        records: total.count,
    })
    .collect();

    let level_distribution = level_distribution(records);

    let mut hourly_profile: Vec<HourlyUsage> =
        group_first_seen(records, |r| r.record.hour, |r| r.record.usage_minutes)
            .into_iter()
            .map(|(hour, total)| HourlyUsage {
                hour,
                mean_minutes: total.mean(),
                records: total.count,
            })
            .collect();
    hourly_profile.sort_by_key(|h| h.hour);

    let category_mean_score = group_first_seen(
        records,
        |r| r.record.category.as_str(),
        |r| r.addiction_score,
    )
    .into_iter()
    .map(|(category, total)| CategoryScore {
        category: category.to_string(),
        mean_score: total.mean(),
        records: total.count,
    })
    .collect();

    AggregateView {
        usage_by_app,
        level_distribution,
        hourly_profile,
        category_mean_score,
    }
}

/// Count records per level, omitting levels with no records
fn level_distribution(records: &[ScoredRecord]) -> Vec<LevelCount> {
    AddictionLevel::ALL
        .iter()
        .map(|&level| LevelCount {
            level,
            count: records.iter().filter(|r| r.addiction_level == level).count(),
        })
        .filter(|l| l.count > 0)
        .collect()
}
