//! Read side of the activity log. Every query folds a fresh replay of [ActivityLoggedEvent]s
//! through one or more [Projection]s and returns the derived view. Nothing is persisted between
//! queries.

pub mod activities;
pub mod burn_up;
pub mod calendar;
pub mod error;
pub mod estimate;
pub mod events;
pub mod recent_activities;
pub mod report;
pub mod statistics;
pub mod timesheet;

use std::future;

use chrono::NaiveDate;
use futures::{Stream, TryStreamExt};

pub use error::ReplayError;
pub use events::ActivityLoggedEvent;

/// A fold over the replayed events. `update` consumes the accumulator and returns the next one,
/// `get` turns the final accumulator into the query result.
pub trait Projection: Sized {
    type Output;

    fn update(self, event: &ActivityLoggedEvent) -> Self;

    fn get(self) -> Self::Output;
}

/// Runs two projections side by side over the same replay.
impl<A: Projection, B: Projection> Projection for (A, B) {
    type Output = (A::Output, B::Output);

    fn update(self, event: &ActivityLoggedEvent) -> Self {
        (self.0.update(event), self.1.update(event))
    }

    fn get(self) -> Self::Output {
        (self.0.get(), self.1.get())
    }
}

/// Feeds every replayed event into `projection`. The first replay error aborts the fold.
pub async fn fold_replay<P: Projection>(
    replay: impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>>,
    projection: P,
) -> Result<P, ReplayError> {
    replay
        .try_fold(projection, |projection, event| {
            future::ready(Ok(projection.update(&event)))
        })
        .await
}

/// Inclusive date bounds, absent bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self::new(Some(from), Some(to))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| from <= date) && self.to.map_or(true, |to| date <= to)
    }
}

/// Passes through only the events dated within `range`. Lazy, nothing is buffered.
pub fn filter_events(
    replay: impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>>,
    range: DateRange,
) -> impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>> {
    replay.try_filter(move |event| future::ready(range.contains(event.date())))
}
