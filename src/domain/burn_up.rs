use std::collections::BTreeMap;

use chrono::NaiveDate;
use futures::Stream;

use super::{
    activities::{ActivitiesProjection, Activity},
    filter_events, fold_replay, ActivityLoggedEvent, DateRange, Projection, ReplayError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnUpData {
    pub date: NaiveDate,
    pub throughput: usize,
    pub cumulative_throughput: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BurnUpQuery {
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BurnUpQueryResult {
    pub data: Vec<BurnUpData>,
    pub total_throughput: usize,
}

/// Number of activities finished per day. The period is widened to the earliest and latest
/// finish date where the range leaves it open.
fn determine_throughputs(
    activities: &[Activity],
    range: DateRange,
) -> (BTreeMap<NaiveDate, usize>, Option<NaiveDate>, Option<NaiveDate>) {
    let mut throughputs = BTreeMap::new();
    let (mut from, mut to) = (range.from, range.to);
    for activity in activities {
        let finish = activity.finish;
        from = Some(from.map_or(finish, |from| from.min(finish)));
        to = Some(to.map_or(finish, |to| to.max(finish)));
        *throughputs.entry(finish).or_default() += 1;
    }
    (throughputs, from, to)
}

/// One point per day of `[from, to]`. Nothing finished means no points at all.
fn fill_period(
    throughputs: &BTreeMap<NaiveDate, usize>,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<BurnUpData> {
    let mut cumulative_throughput = 0;
    from.iter_days()
        .take_while(|date| *date <= to)
        .map(|date| {
            let throughput = throughputs.get(&date).copied().unwrap_or(0);
            cumulative_throughput += throughput;
            BurnUpData {
                date,
                throughput,
                cumulative_throughput,
            }
        })
        .collect()
}

pub async fn project_burn_up(
    replay: impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>>,
    query: BurnUpQuery,
) -> Result<BurnUpQueryResult, ReplayError> {
    let activities = fold_replay(
        filter_events(replay, query.range),
        ActivitiesProjection::default(),
    )
    .await?
    .get();

    let (throughputs, from, to) = determine_throughputs(&activities, query.range);
    let data = match (from, to) {
        (Some(from), Some(to)) if !throughputs.is_empty() => fill_period(&throughputs, from, to),
        _ => vec![],
    };
    let total_throughput = data.last().map_or(0, |point| point.cumulative_throughput);
    Ok(BurnUpQueryResult {
        data,
        total_throughput,
    })
}
