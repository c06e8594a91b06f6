use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use chrono::{Duration, NaiveDate};
use futures::Stream;

use super::{filter_events, fold_replay, ActivityLoggedEvent, DateRange, Projection, ReplayError};

/// All events sharing client, project and task merged into one span of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub client: Arc<str>,
    pub project: Arc<str>,
    pub task: Arc<str>,
    pub hours: Duration,
}

impl Activity {
    /// Inclusive number of days between the first and the last logged event.
    pub fn cycle_time(&self) -> i64 {
        cycle_time(self.start, self.finish)
    }
}

pub fn cycle_time(start: NaiveDate, finish: NaiveDate) -> i64 {
    (finish - start).num_days() + 1
}

type ActivityKey = (Arc<str>, Arc<str>, Arc<str>);

/// Merges events into [Activity]s, keeping the order in which each activity was first seen.
#[derive(Debug, Default)]
pub struct ActivitiesProjection {
    categories: Vec<Arc<str>>,
    index: HashMap<ActivityKey, usize>,
    activities: Vec<Activity>,
}

impl ActivitiesProjection {
    /// Only events whose category is one of `categories` are merged. An empty list accepts
    /// everything.
    pub fn with_categories(categories: Vec<Arc<str>>) -> Self {
        Self {
            categories,
            ..Self::default()
        }
    }

    fn accepts(&self, event: &ActivityLoggedEvent) -> bool {
        self.categories.is_empty()
            || self
                .categories
                .iter()
                .any(|category| **category == *event.category_or_default())
    }
}

impl Projection for ActivitiesProjection {
    type Output = Vec<Activity>;

    fn update(mut self, event: &ActivityLoggedEvent) -> Self {
        if !self.accepts(event) {
            return self;
        }

        let date = event.date();
        let key = (
            event.client.clone(),
            event.project.clone(),
            event.task.clone(),
        );
        match self.index.get(&key) {
            Some(&position) => {
                let activity = &mut self.activities[position];
                activity.start = activity.start.min(date);
                activity.finish = activity.finish.max(date);
                activity.hours += event.duration;
            }
            None => {
                self.index.insert(key, self.activities.len());
                self.activities.push(Activity {
                    start: date,
                    finish: date,
                    client: event.client.clone(),
                    project: event.project.clone(),
                    task: event.task.clone(),
                    hours: event.duration,
                });
            }
        }
        self
    }

    fn get(self) -> Self::Output {
        self.activities
    }
}

/// Every distinct category seen, events without one count as "".
#[derive(Debug, Default)]
pub struct CategoriesProjection {
    categories: BTreeSet<Arc<str>>,
}

impl Projection for CategoriesProjection {
    type Output = Vec<Arc<str>>;

    fn update(mut self, event: &ActivityLoggedEvent) -> Self {
        let category = event.category.clone().unwrap_or_else(|| "".into());
        self.categories.insert(category);
        self
    }

    /// Categories in lexicographic order.
    fn get(self) -> Self::Output {
        self.categories.into_iter().collect()
    }
}

#[derive(Debug, Default)]
pub struct TotalHoursProjection {
    total: Duration,
}

impl Projection for TotalHoursProjection {
    type Output = Duration;

    fn update(self, event: &ActivityLoggedEvent) -> Self {
        Self {
            total: self.total + event.duration,
        }
    }

    fn get(self) -> Self::Output {
        self.total
    }
}

pub async fn project_activities(
    replay: impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>>,
    range: DateRange,
) -> Result<Vec<Activity>, ReplayError> {
    let projection = fold_replay(
        filter_events(replay, range),
        ActivitiesProjection::default(),
    )
    .await?;
    Ok(projection.get())
}
