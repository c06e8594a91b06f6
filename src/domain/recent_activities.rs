use chrono::{Datelike, Duration, NaiveDate};
use futures::Stream;
use tracing::warn;

use super::{filter_events, fold_replay, ActivityLoggedEvent, DateRange, Projection, ReplayError};
use crate::utils::time::{first_day_of_month, last_day_of_month};

/// How far back the recent activities reach.
pub const RECENT_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDay {
    pub date: NaiveDate,
    /// Latest activity first.
    pub activities: Vec<ActivityLoggedEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSummary {
    pub hours_today: Duration,
    pub hours_yesterday: Duration,
    pub hours_this_week: Duration,
    pub hours_this_month: Duration,
}

impl Default for TimeSummary {
    fn default() -> Self {
        Self {
            hours_today: Duration::zero(),
            hours_yesterday: Duration::zero(),
            hours_this_week: Duration::zero(),
            hours_this_month: Duration::zero(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RecentActivitiesQuery {
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecentActivitiesQueryResult {
    pub working_days: Vec<WorkingDay>,
    pub time_summary: TimeSummary,
}

/// Groups consecutive events of the same date into a [WorkingDay]. A new day is opened whenever
/// the date changes, so the replay has to be ordered. Out of order input yields several working
/// days for one date.
#[derive(Debug, Default)]
pub struct RecentActivitiesProjection {
    working_days: Vec<WorkingDay>,
    open: Option<WorkingDay>,
}

impl RecentActivitiesProjection {
    fn close_open_day(&mut self) {
        if let Some(mut day) = self.open.take() {
            day.activities
                .sort_by(|a, b| b.date_time.cmp(&a.date_time));
            self.working_days.push(day);
        }
    }
}

impl Projection for RecentActivitiesProjection {
    type Output = Vec<WorkingDay>;

    fn update(mut self, event: &ActivityLoggedEvent) -> Self {
        let date = event.date();
        if self.open.as_ref().map(|day| day.date) != Some(date) {
            self.close_open_day();
            if self.working_days.last().is_some_and(|day| day.date >= date) {
                warn!("Replay is not ordered, opening another working day for {date}");
            }
            self.open = Some(WorkingDay {
                date,
                activities: vec![],
            });
        }
        if let Some(day) = self.open.as_mut() {
            day.activities.push(event.clone());
        }
        self
    }

    /// Most recent working day first.
    fn get(mut self) -> Self::Output {
        self.close_open_day();
        self.working_days.reverse();
        self.working_days
    }
}

/// Sums durations into four windows around `today`: the day itself, the day before, the Monday
/// to Sunday week and the calendar month.
#[derive(Debug)]
pub struct TimeSummaryProjection {
    today: NaiveDate,
    yesterday: NaiveDate,
    week: DateRange,
    month: DateRange,
    summary: TimeSummary,
}

impl TimeSummaryProjection {
    pub fn new(today: NaiveDate) -> Self {
        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        Self {
            today,
            yesterday: today - Duration::days(1),
            week: DateRange::between(week_start, week_start + Duration::days(6)),
            month: DateRange::between(first_day_of_month(today), last_day_of_month(today)),
            summary: TimeSummary::default(),
        }
    }
}

impl Projection for TimeSummaryProjection {
    type Output = TimeSummary;

    fn update(mut self, event: &ActivityLoggedEvent) -> Self {
        let date = event.date();
        let summary = &mut self.summary;
        if date == self.today {
            summary.hours_today += event.duration;
        }
        if date == self.yesterday {
            summary.hours_yesterday += event.duration;
        }
        if self.week.contains(date) {
            summary.hours_this_week += event.duration;
        }
        if self.month.contains(date) {
            summary.hours_this_month += event.duration;
        }
        self
    }

    fn get(self) -> Self::Output {
        self.summary
    }
}

/// Working days of the last 30 days plus the time summary relative to `query.today`.
pub async fn project_recent_activities(
    replay: impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>>,
    query: RecentActivitiesQuery,
) -> Result<RecentActivitiesQueryResult, ReplayError> {
    let today = query.today;
    let range = DateRange::between(
        today - Duration::days(RECENT_DAYS),
        last_day_of_month(today),
    );
    let (working_days, time_summary) = fold_replay(
        filter_events(replay, range),
        (
            RecentActivitiesProjection::default(),
            TimeSummaryProjection::new(today),
        ),
    )
    .await?
    .get();
    Ok(RecentActivitiesQueryResult {
        working_days,
        time_summary,
    })
}

#[cfg(test)]
mod recent_activities_tests {
    use anyhow::Result;
    use chrono::Duration;

    use super::{
        project_recent_activities, RecentActivitiesProjection, RecentActivitiesQuery,
        RecentActivitiesQueryResult, TimeSummary, WorkingDay,
    };
    use crate::{
        domain::{
            events::test_events::{date, event_at},
            test_replay::replay_of,
            Projection,
        },
        utils::logging::TEST_LOGGING,
    };

    fn query() -> RecentActivitiesQuery {
        RecentActivitiesQuery {
            today: date("2025-06-05"),
        }
    }

    #[tokio::test]
    async fn empty_replay_gives_empty_result() -> Result<()> {
        let result = project_recent_activities(replay_of(vec![]), query()).await?;

        assert_eq!(result, RecentActivitiesQueryResult::default());
        Ok(())
    }

    #[tokio::test]
    async fn groups_last_30_days_by_working_day() -> Result<()> {
        let replay = replay_of(
            [
                "2025-05-05T16:00",
                "2025-05-06T16:00",
                "2025-06-04T16:00",
                "2025-06-05T10:30",
                "2025-06-05T11:00",
            ]
            .into_iter()
            .map(event_at)
            .collect(),
        );

        let result = project_recent_activities(replay, query()).await?;

        assert_eq!(
            result.working_days,
            vec![
                WorkingDay {
                    date: date("2025-06-05"),
                    activities: vec![event_at("2025-06-05T11:00"), event_at("2025-06-05T10:30")],
                },
                WorkingDay {
                    date: date("2025-06-04"),
                    activities: vec![event_at("2025-06-04T16:00")],
                },
                WorkingDay {
                    date: date("2025-05-06"),
                    activities: vec![event_at("2025-05-06T16:00")],
                },
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn summarizes_today_yesterday_week_and_month() -> Result<()> {
        let replay = replay_of(
            [
                "2025-05-31T16:00",
                "2025-06-01T12:00",
                "2025-06-01T16:00",
                "2025-06-02T12:00",
                "2025-06-03T12:00",
                "2025-06-04T12:00",
                "2025-06-04T12:30",
                "2025-06-04T13:00",
                "2025-06-05T11:00",
                "2025-06-05T11:30",
                "2025-06-06T10:30",
                "2025-06-30T10:30",
                "2025-07-01T12:30",
            ]
            .into_iter()
            .map(event_at)
            .collect(),
        );

        let result = project_recent_activities(replay, query()).await?;

        assert_eq!(
            result.time_summary,
            TimeSummary {
                hours_today: Duration::hours(1),
                hours_yesterday: Duration::minutes(90),
                hours_this_week: Duration::hours(4),
                hours_this_month: Duration::minutes(330),
            }
        );
        Ok(())
    }

    #[test]
    fn out_of_order_replay_opens_duplicate_days() {
        *TEST_LOGGING;
        let days = RecentActivitiesProjection::default()
            .update(&event_at("2025-06-04T10:00"))
            .update(&event_at("2025-06-05T10:00"))
            .update(&event_at("2025-06-04T12:00"))
            .get();

        assert_eq!(
            days.iter().map(|day| day.date).collect::<Vec<_>>(),
            vec![date("2025-06-04"), date("2025-06-05"), date("2025-06-04")]
        );
    }
}
