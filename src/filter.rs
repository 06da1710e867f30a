//! Category filtering

use crate::types::ScoredRecord;
use std::collections::{BTreeSet, HashSet};

/// Active category selection.
///
/// `All` is the session default. `Selected` with an empty set is a valid, distinct
/// state that matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Selected(BTreeSet<String>),
}

impl CategoryFilter {
    /// Build a selection from category names
    pub fn selected<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CategoryFilter::Selected(categories.into_iter().map(Into::into).collect())
    }

    /// Apply the selection, preserving record order
    pub fn apply(&self, records: &[ScoredRecord]) -> Vec<ScoredRecord> {
        match self {
            CategoryFilter::All => records.to_vec(),
            CategoryFilter::Selected(allowed) => {
                let allowed: HashSet<&str> = allowed.iter().map(String::as_str).collect();
                filter_by_category(records, &allowed)
            }
        }
    }

    /// Categories named by this selection, resolving `All` against the records
    pub fn resolve(&self, records: &[ScoredRecord]) -> Vec<String> {
        match self {
            CategoryFilter::All => observed_categories(records),
            CategoryFilter::Selected(allowed) => allowed.iter().cloned().collect(),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Selected(_) => "selected",
        }
    }
}

/// Keep records whose category is in `allowed`, preserving order.
/// An empty `allowed` set yields no records.
pub fn filter_by_category(records: &[ScoredRecord], allowed: &HashSet<&str>) -> Vec<ScoredRecord> {
    records
        .iter()
        .filter(|r| allowed.contains(r.record.category.as_str()))
        .cloned()
        .collect()
}

/// Distinct categories in order of first appearance
pub fn observed_categories(records: &[ScoredRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.record.category.as_str()))
        .map(|r| r.record.category.clone())
        .collect()
}
