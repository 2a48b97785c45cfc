// Series filter - Selects and deduplicates the series a chart should plot
use crate::domain::series::{Series, TaggedSeries};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum FilterResult {
    /// No series survived; callers render an explicit empty state.
    NoMatch,
    Matched(Vec<TaggedSeries>),
}

impl FilterResult {
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterResult::NoMatch)
    }

    pub fn into_series(self) -> Vec<TaggedSeries> {
        match self {
            FilterResult::NoMatch => Vec::new(),
            FilterResult::Matched(series) => series,
        }
    }
}

/// Filter `series` down to the set a chart plots.
///
/// - With `apply_filter` and a non-empty `filter`, keeps only labels containing
///   `filter` (case-sensitive).
/// - With `supports_discrimination`, series sharing a label are merged into one,
///   keeping the leaf variant, or the controller/overall aggregate when
///   `force_overall` is set.
/// - Survivors keep their original relative order.
pub fn filter_series(
    series: &[Series],
    supports_discrimination: bool,
    filter: &str,
    apply_filter: bool,
    force_overall: bool,
) -> FilterResult {
    let retained: Vec<&Series> = series
        .iter()
        .filter(|s| !apply_filter || filter.is_empty() || s.label.contains(filter))
        .collect();

    let survivors = if supports_discrimination {
        merge_duplicates(retained, force_overall)
    } else {
        retained
    };

    if survivors.is_empty() {
        return FilterResult::NoMatch;
    }

    FilterResult::Matched(
        survivors
            .into_iter()
            .map(|s| TaggedSeries::from(s.clone()))
            .collect(),
    )
}

fn merge_duplicates(retained: Vec<&Series>, force_overall: bool) -> Vec<&Series> {
    let is_preferred = |s: &Series| s.is_aggregate() == force_overall;

    // label -> index of the variant that wins
    let mut chosen: HashMap<&str, usize> = HashMap::new();
    for (idx, s) in retained.iter().enumerate() {
        match chosen.get(s.label.as_str()) {
            None => {
                chosen.insert(s.label.as_str(), idx);
            }
            Some(&current) => {
                if is_preferred(*s) && !is_preferred(retained[current]) {
                    chosen.insert(s.label.as_str(), idx);
                }
            }
        }
    }

    retained
        .iter()
        .enumerate()
        .filter(|(idx, s)| chosen.get(s.label.as_str()) == Some(idx))
        .map(|(_, s)| *s)
        .collect()
}
