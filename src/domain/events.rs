use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};

/// A single logged piece of work. The date-time is local to whoever logged it, replays deliver
/// these in ascending order of `date_time`.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct ActivityLoggedEvent {
    pub date_time: NaiveDateTime,
    pub duration: Duration,
    pub client: Arc<str>,
    pub project: Arc<str>,
    pub task: Arc<str>,
    pub notes: Option<Arc<str>>,
    pub category: Option<Arc<str>>,
}

impl ActivityLoggedEvent {
    pub fn date(&self) -> NaiveDate {
        self.date_time.date()
    }

    /// Category used for filtering and grouping. Events without a category belong to "".
    pub fn category_or_default(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    pub fn with_date_time(self, date_time: NaiveDateTime) -> Self {
        Self { date_time, ..self }
    }

    pub fn with_duration(self, duration: Duration) -> Self {
        Self { duration, ..self }
    }

    pub fn with_client(self, client: &str) -> Self {
        Self {
            client: client.into(),
            ..self
        }
    }

    pub fn with_project(self, project: &str) -> Self {
        Self {
            project: project.into(),
            ..self
        }
    }

    pub fn with_task(self, task: &str) -> Self {
        Self {
            task: task.into(),
            ..self
        }
    }

    pub fn with_category(self, category: Option<&str>) -> Self {
        Self {
            category: category.map(Arc::from),
            ..self
        }
    }
}

#[cfg(test)]
pub mod test_events {
    use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

    use super::ActivityLoggedEvent;

    pub const TEST_DATE_TIME: NaiveDateTime = NaiveDateTime::new(
        NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(),
        NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
    );

    pub fn test_event() -> ActivityLoggedEvent {
        ActivityLoggedEvent {
            date_time: TEST_DATE_TIME,
            duration: Duration::minutes(30),
            client: "Test client".into(),
            project: "Test project".into(),
            task: "Test task".into(),
            notes: None,
            category: None,
        }
    }

    /// Parses `2025-06-05T11:00` style literals, tests only.
    pub fn at(value: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").unwrap()
    }

    pub fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    pub fn event_at(value: &str) -> ActivityLoggedEvent {
        test_event().with_date_time(at(value))
    }
}
