use std::{io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use chrono::{Duration, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::calendar::{Calendar, DEFAULT_BUSINESS_DAYS};

pub const SETTINGS_FILE: &str = "settings.json";

/// User settings stored as `settings.json` in the application directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Working hours per week.
    pub capacity: f64,
    /// ISO weekday numbers, 1 is Monday.
    pub business_days: Vec<u8>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capacity: 40.0,
            business_days: DEFAULT_BUSINESS_DAYS
                .iter()
                .map(|day| day.number_from_monday() as u8)
                .collect(),
        }
    }
}

impl Settings {
    /// Missing settings fall back to the defaults.
    pub async fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse settings {path:?}")),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No settings at {path:?}, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read settings {path:?}")),
        }
    }

    pub fn weekly_capacity(&self) -> Duration {
        Duration::seconds((self.capacity * 3600.0).round() as i64)
    }

    pub fn business_days(&self) -> Vec<Weekday> {
        self.business_days
            .iter()
            .filter_map(|&day| {
                let weekday = match day {
                    1 => Weekday::Mon,
                    2 => Weekday::Tue,
                    3 => Weekday::Wed,
                    4 => Weekday::Thu,
                    5 => Weekday::Fri,
                    6 => Weekday::Sat,
                    7 => Weekday::Sun,
                    _ => {
                        warn!("Ignoring business day {day}, expected 1 (Monday) to 7 (Sunday)");
                        return None;
                    }
                };
                Some(weekday)
            })
            .collect()
    }

    /// Calendar without holidays or vacations.
    pub fn calendar(&self) -> Calendar {
        Calendar::new(self.weekly_capacity()).with_business_days(self.business_days())
    }
}
