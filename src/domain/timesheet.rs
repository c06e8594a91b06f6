use std::{collections::HashMap, sync::Arc};

use chrono::{Duration, NaiveDate};
use futures::Stream;

use super::{
    activities::TotalHoursProjection, calendar::Calendar, filter_events, fold_replay,
    ActivityLoggedEvent, DateRange, Projection, ReplayError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimesheetEntry {
    pub date: NaiveDate,
    pub client: Arc<str>,
    pub project: Arc<str>,
    pub task: Arc<str>,
    pub hours: Duration,
}

/// Expected hours of a period and how far the logged hours are ahead (positive) or behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub hours: Duration,
    pub offset: Duration,
}

#[derive(Debug, Clone, Copy)]
pub struct TimesheetQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Days after `today` do not count against the offset.
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimesheetQueryResult {
    pub entries: Vec<TimesheetEntry>,
    pub total_hours: Duration,
    pub capacity: Capacity,
}

type TimesheetKey = (NaiveDate, Arc<str>, Arc<str>, Arc<str>);

#[derive(Debug, Default)]
pub struct TimesheetProjection {
    index: HashMap<TimesheetKey, usize>,
    entries: Vec<TimesheetEntry>,
}

impl Projection for TimesheetProjection {
    type Output = Vec<TimesheetEntry>;

    fn update(mut self, event: &ActivityLoggedEvent) -> Self {
        let key = (
            event.date(),
            event.client.clone(),
            event.project.clone(),
            event.task.clone(),
        );
        match self.index.get(&key) {
            Some(&position) => self.entries[position].hours += event.duration,
            None => {
                self.index.insert(key, self.entries.len());
                self.entries.push(TimesheetEntry {
                    date: event.date(),
                    client: event.client.clone(),
                    project: event.project.clone(),
                    task: event.task.clone(),
                    hours: event.duration,
                });
            }
        }
        self
    }

    fn get(mut self) -> Self::Output {
        self.entries.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.client.cmp(&b.client))
                .then_with(|| a.project.cmp(&b.project))
                .then_with(|| a.task.cmp(&b.task))
        });
        self.entries
    }
}

pub fn determine_capacity(
    calendar: &Calendar,
    query: &TimesheetQuery,
    total_hours: Duration,
) -> Capacity {
    let end = query.today.clamp(query.from, query.to.max(query.from));
    let day = Duration::days(1);
    let expected_so_far = calendar.count_working_hours(query.from, end + day);
    Capacity {
        hours: calendar.count_working_hours(query.from, query.to + day),
        offset: total_hours - expected_so_far,
    }
}

/// `calendar` carries the weekly capacity plus the holidays and vacations of the period.
pub async fn project_timesheet(
    replay: impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>>,
    query: TimesheetQuery,
    calendar: &Calendar,
) -> Result<TimesheetQueryResult, ReplayError> {
    let (entries, total_hours) = fold_replay(
        filter_events(replay, DateRange::between(query.from, query.to)),
        (
            TimesheetProjection::default(),
            TotalHoursProjection::default(),
        ),
    )
    .await?
    .get();

    Ok(TimesheetQueryResult {
        entries,
        total_hours,
        capacity: determine_capacity(calendar, &query, total_hours),
    })
}

#[cfg(test)]
mod timesheet_tests {
    use anyhow::Result;
    use chrono::Duration;

    use super::{project_timesheet, Capacity, TimesheetEntry, TimesheetQuery};
    use crate::domain::{
        calendar::{Calendar, Holiday, Vacation},
        events::test_events::{date, event_at},
        test_replay::replay_of,
        ActivityLoggedEvent,
    };

    fn query(from: &str, to: &str, today: &str) -> TimesheetQuery {
        TimesheetQuery {
            from: date(from),
            to: date(to),
            today: date(today),
        }
    }

    fn week_of_june_9(hours: [i64; 4]) -> Vec<ActivityLoggedEvent> {
        ["2025-06-09", "2025-06-10", "2025-06-11", "2025-06-12"]
            .iter()
            .zip(hours)
            .map(|(day, hours)| {
                event_at(&format!("{day}T17:00")).with_duration(Duration::hours(hours))
            })
            .collect()
    }

    fn entry(day: &str, client: &str, project: &str, task: &str, hours: i64) -> TimesheetEntry {
        TimesheetEntry {
            date: date(day),
            client: client.into(),
            project: project.into(),
            task: task.into(),
            hours: Duration::hours(hours),
        }
    }

    #[tokio::test]
    async fn empty_replay_is_behind_the_whole_capacity() -> Result<()> {
        let result = project_timesheet(
            replay_of(vec![]),
            query("2025-09-15", "2025-09-21", "2025-09-24"),
            &Calendar::default(),
        )
        .await?;

        assert!(result.entries.is_empty());
        assert_eq!(result.total_hours, Duration::zero());
        assert_eq!(
            result.capacity,
            Capacity {
                hours: Duration::hours(40),
                offset: Duration::hours(-40),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn sorts_entries_by_date_client_project_and_task() -> Result<()> {
        let replay = replay_of(vec![
            event_at("2025-06-02T10:00")
                .with_client("Client 2")
                .with_duration(Duration::hours(2)),
            event_at("2025-06-02T12:00")
                .with_client("Client 1")
                .with_task("Task B")
                .with_duration(Duration::hours(3)),
            event_at("2025-06-02T14:00")
                .with_client("Client 1")
                .with_task("Task A")
                .with_duration(Duration::hours(1)),
            event_at("2025-06-02T16:00")
                .with_client("Client 1")
                .with_task("Task B")
                .with_duration(Duration::hours(2)),
            event_at("2025-06-03T10:00")
                .with_client("Client 1")
                .with_project("Project A")
                .with_duration(Duration::hours(4)),
            event_at("2025-06-09T10:00").with_duration(Duration::hours(4)),
        ]);

        let result = project_timesheet(
            replay,
            query("2025-06-02", "2025-06-08", "2025-06-04"),
            &Calendar::default(),
        )
        .await?;

        assert_eq!(
            result.entries,
            vec![
                entry("2025-06-02", "Client 1", "Test project", "Task A", 1),
                entry("2025-06-02", "Client 1", "Test project", "Task B", 5),
                entry("2025-06-02", "Client 2", "Test project", "Test task", 2),
                entry("2025-06-03", "Client 1", "Project A", "Test task", 4),
            ]
        );
        assert_eq!(result.total_hours, Duration::hours(12));
        Ok(())
    }

    #[tokio::test]
    async fn capacity_offset_against_days_up_to_today() -> Result<()> {
        for (hours, offset) in [
            ([8, 8, 8, 8], 0),
            ([8, 6, 6, 6], -6),
            ([8, 10, 10, 10], 6),
        ] {
            let result = project_timesheet(
                replay_of(week_of_june_9(hours)),
                query("2025-06-09", "2025-06-15", "2025-06-12"),
                &Calendar::default(),
            )
            .await?;

            assert_eq!(
                result.capacity,
                Capacity {
                    hours: Duration::hours(40),
                    offset: Duration::hours(offset),
                },
                "hours {hours:?}"
            );
        }
        Ok(())
    }

    #[tokio::test]
    async fn today_before_period_counts_first_day() -> Result<()> {
        let result = project_timesheet(
            replay_of(week_of_june_9([8, 8, 8, 8])),
            query("2025-06-09", "2025-06-15", "2025-06-03"),
            &Calendar::default(),
        )
        .await?;

        assert_eq!(result.capacity.offset, Duration::hours(24));
        Ok(())
    }

    #[tokio::test]
    async fn holiday_reduces_capacity() -> Result<()> {
        let calendar = Calendar::default()
            .with_holidays(vec![Holiday::new(date("2025-06-09")).with_title("Pfingstmontag")]);

        let result = project_timesheet(
            replay_of(week_of_june_9([0, 8, 8, 8])),
            query("2025-06-09", "2025-06-15", "2025-06-12"),
            &calendar,
        )
        .await?;

        assert_eq!(
            result.capacity,
            Capacity {
                hours: Duration::hours(32),
                offset: Duration::zero(),
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn vacation_reduces_capacity() -> Result<()> {
        let calendar = Calendar::default().with_vacations(vec![Vacation::new(date("2025-09-10"))]);
        let replay = replay_of(vec![
            event_at("2025-09-08T17:00").with_duration(Duration::hours(8)),
            event_at("2025-09-09T17:00").with_duration(Duration::hours(8)),
            event_at("2025-09-11T17:00").with_duration(Duration::hours(8)),
        ]);

        let result = project_timesheet(
            replay,
            query("2025-09-08", "2025-09-14", "2025-09-11"),
            &calendar,
        )
        .await?;

        assert_eq!(
            result.capacity,
            Capacity {
                hours: Duration::hours(32),
                offset: Duration::zero(),
            }
        );
        Ok(())
    }
}
