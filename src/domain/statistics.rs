use std::{fmt::Display, sync::Arc};

use clap::ValueEnum;
use futures::Stream;

use super::{
    activities::{ActivitiesProjection, Activity, CategoriesProjection},
    fold_replay, ActivityLoggedEvent, Projection, ReplayError,
};

const HOURS_PER_PERSON_DAY: f64 = 8.0;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StatisticsScope {
    /// Logged hours of a task in person days.
    WorkingHours,
    /// Days from the first to the last logged event of a task.
    CycleTimes,
}

impl StatisticsScope {
    fn x_axis_label(&self) -> &'static str {
        match self {
            StatisticsScope::WorkingHours => "Duration (days)",
            StatisticsScope::CycleTimes => "Cycle time (days)",
        }
    }

    fn seed_edges(&self) -> &'static [f64] {
        match self {
            StatisticsScope::WorkingHours => &[0.0, 0.5, 1.0, 2.0],
            StatisticsScope::CycleTimes => &[0.0, 1.0, 2.0],
        }
    }

    fn sample(&self, activity: &Activity) -> f64 {
        match self {
            StatisticsScope::WorkingHours => {
                activity.hours.num_seconds() as f64 / 3600.0 / HOURS_PER_PERSON_DAY
            }
            StatisticsScope::CycleTimes => activity.cycle_time() as f64,
        }
    }
}

impl Display for StatisticsScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatisticsScope::WorkingHours => write!(f, "working-hours"),
            StatisticsScope::CycleTimes => write!(f, "cycle-times"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bin_edges: Vec<String>,
    pub frequencies: Vec<usize>,
    pub x_axis_label: String,
    pub y_axis_label: String,
}

/// Percentile markers of a sample. `edge0` is always 0, not the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Median {
    pub edge0: f64,
    pub edge25: f64,
    pub edge50: f64,
    pub edge75: f64,
    pub edge100: f64,
}

#[derive(Debug, Clone)]
pub struct StatisticsQuery {
    pub scope: StatisticsScope,
    /// Empty means every category.
    pub categories: Vec<Arc<str>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsQueryResult {
    pub histogram: Histogram,
    pub median: Median,
    pub categories: Vec<Arc<str>>,
    pub total_count: usize,
}

/// Bin edges grow like Fibonacci numbers from the seed until they reach `ceil(max)`.
fn bin_edges(scope: StatisticsScope, max: f64) -> Vec<f64> {
    let limit = max.ceil();
    if limit <= 0.0 {
        return vec![];
    }

    let mut edges = scope.seed_edges().to_vec();
    loop {
        let n = edges.len();
        let (previous, last) = (edges[n - 2], edges[n - 1]);
        if last >= limit {
            return edges;
        }
        edges.push(previous + last);
    }
}

/// Counts samples in `(edges[i], edges[i + 1]]`, so a sample of exactly 0 falls in no bin.
fn frequencies(edges: &[f64], samples: &[f64]) -> Vec<usize> {
    edges
        .windows(2)
        .map(|bin| {
            samples
                .iter()
                .filter(|&&x| bin[0] < x && x <= bin[1])
                .count()
        })
        .collect()
}

pub fn create_histogram(scope: StatisticsScope, samples: &[f64]) -> Histogram {
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let edges = if samples.is_empty() {
        vec![]
    } else {
        bin_edges(scope, max)
    };
    Histogram {
        bin_edges: edges.iter().map(|edge| edge.to_string()).collect(),
        frequencies: frequencies(&edges, samples),
        x_axis_label: scope.x_axis_label().to_string(),
        y_axis_label: "Number of Tasks".to_string(),
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Value at index `n * p - 1`. A fractional index averages both neighbours.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let index = (sorted.len() as f64 * p - 1.0).max(0.0);
    if index.fract() == 0.0 {
        sorted[index as usize]
    } else {
        (sorted[index.floor() as usize] + sorted[index.ceil() as usize]) / 2.0
    }
}

fn middle(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// `sorted` has to be in ascending order.
pub fn create_median(sorted: &[f64]) -> Median {
    let Some(&max) = sorted.last() else {
        return Median::default();
    };
    Median {
        edge0: 0.0,
        edge25: round_to_tenth(quantile(sorted, 0.25)),
        edge50: round_to_tenth(middle(sorted)),
        edge75: round_to_tenth(quantile(sorted, 0.75)),
        edge100: max,
    }
}

pub async fn project_statistics(
    replay: impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>>,
    query: StatisticsQuery,
) -> Result<StatisticsQueryResult, ReplayError> {
    let (activities, categories) = fold_replay(
        replay,
        (
            ActivitiesProjection::with_categories(query.categories),
            CategoriesProjection::default(),
        ),
    )
    .await?
    .get();

    let mut samples = activities
        .iter()
        .map(|activity| query.scope.sample(activity))
        .collect::<Vec<_>>();
    samples.sort_by(f64::total_cmp);

    Ok(StatisticsQueryResult {
        histogram: create_histogram(query.scope, &samples),
        median: create_median(&samples),
        categories,
        total_count: activities.len(),
    })
}
