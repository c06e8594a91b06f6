use std::{collections::BTreeMap, sync::Arc};

use futures::Stream;

use super::{
    activities::{ActivitiesProjection, CategoriesProjection},
    fold_replay, ActivityLoggedEvent, Projection, ReplayError,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimateEntry {
    pub cycle_time: i64,
    pub frequency: usize,
    pub probability: f64,
    pub cumulative_probability: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EstimateQuery {
    /// Empty means every category.
    pub categories: Vec<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EstimateQueryResult {
    /// Ascending by cycle time.
    pub cycle_times: Vec<EstimateEntry>,
    pub categories: Vec<Arc<str>>,
    pub total_count: usize,
}

/// Empirical distribution of the given cycle times.
pub fn determine_cycle_times(cycle_times: impl IntoIterator<Item = i64>) -> Vec<EstimateEntry> {
    let mut frequencies = BTreeMap::<i64, usize>::new();
    for cycle_time in cycle_times {
        *frequencies.entry(cycle_time).or_default() += 1;
    }
    let total = frequencies.values().sum::<usize>() as f64;

    let mut cumulative_probability = 0.0;
    frequencies
        .into_iter()
        .map(|(cycle_time, frequency)| {
            let probability = frequency as f64 / total;
            cumulative_probability += probability;
            EstimateEntry {
                cycle_time,
                frequency,
                probability,
                cumulative_probability,
            }
        })
        .collect()
}

pub async fn project_estimate(
    replay: impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>>,
    query: EstimateQuery,
) -> Result<EstimateQueryResult, ReplayError> {
    let (activities, categories) = fold_replay(
        replay,
        (
            ActivitiesProjection::with_categories(query.categories),
            CategoriesProjection::default(),
        ),
    )
    .await?
    .get();

    Ok(EstimateQueryResult {
        cycle_times: determine_cycle_times(activities.iter().map(|a| a.cycle_time())),
        categories,
        total_count: activities.len(),
    })
}
