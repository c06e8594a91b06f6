use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::error::ValidationError;
use crate::domain::{
    calendar::{Holiday, Vacation},
    ActivityLoggedEvent,
};

/// One line of the event log. The timestamp is an instant, the local date-time is only derived
/// when the event is replayed.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct ActivityLoggedEventEntity {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "duration_ser")]
    pub duration: Duration,
    pub client: Arc<str>,
    pub project: Arc<str>,
    pub task: Arc<str>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Arc<str>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Arc<str>>,
}

impl ActivityLoggedEventEntity {
    pub fn check(&self) -> Result<(), ValidationError> {
        if self.duration < Duration::zero() {
            return Err(ValidationError::NegativeDuration);
        }
        for (name, value) in [
            ("client", &self.client),
            ("project", &self.project),
            ("task", &self.task),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        Ok(())
    }

    pub fn validate<Tz: TimeZone>(self, zone: &Tz) -> Result<ActivityLoggedEvent, ValidationError> {
        self.check()?;
        Ok(ActivityLoggedEvent {
            date_time: self.timestamp.with_timezone(zone).naive_local(),
            duration: self.duration,
            client: self.client,
            project: self.project,
            task: self.task,
            notes: self.notes,
            category: self.category,
        })
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct HolidayEntity {
    pub date: NaiveDate,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "duration_opt_ser")]
    pub duration: Option<Duration>,
}

impl From<HolidayEntity> for Holiday {
    fn from(HolidayEntity { date, title, duration }: HolidayEntity) -> Self {
        Holiday {
            date,
            title,
            duration,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct VacationEntity {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "duration_opt_ser")]
    pub duration: Option<Duration>,
}

impl From<VacationEntity> for Vacation {
    fn from(VacationEntity { date, duration }: VacationEntity) -> Self {
        Vacation { date, duration }
    }
}

impl From<Vacation> for VacationEntity {
    fn from(Vacation { date, duration }: Vacation) -> Self {
        VacationEntity { date, duration }
    }
}

mod duration_ser {
    use chrono::Duration;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = i64::deserialize(deserializer)?;
        Ok(Duration::seconds(s))
    }
}

mod duration_opt_ser {
    use chrono::Duration;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => serializer.serialize_some(&duration.num_seconds()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<i64>::deserialize(deserializer)?;
        Ok(s.map(Duration::seconds))
    }
}
