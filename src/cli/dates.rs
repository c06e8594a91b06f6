use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

pub const DATE_EXAMPLES: &str =
    "Examples are \"yesterday\", \"monday\", \"15/03/2025\", \"12:00 16/03/2025\"";

/// Parses natural language dates relative to a fixed `now`.
#[derive(Debug, Clone, Copy)]
pub struct DateParser {
    style: DateStyle,
    now: DateTime<Local>,
}

impl DateParser {
    pub fn new(style: DateStyle, now: DateTime<Local>) -> Self {
        Self { style, now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn date_time(&self, value: &str, name: &str) -> Result<DateTime<Local>> {
        match parse_date_string(value, self.now, self.style.into()) {
            Ok(v) => Ok(v.with_timezone(&Local)),
            Err(e) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate {name} {value:?}: {e}"),
                )
                .into()),
        }
    }

    pub fn date(&self, value: &str, name: &str) -> Result<NaiveDate> {
        Ok(self.date_time(value, name)?.date_naive())
    }

    pub fn optional_date(&self, value: Option<&str>, name: &str) -> Result<Option<NaiveDate>> {
        value.map(|value| self.date(value, name)).transpose()
    }

    /// Monday and Sunday of the week containing `date`.
    pub fn week_of(date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
        (monday, monday + Duration::days(6))
    }
}

/// Accepts `1h30m`, `45m`, `2h` or `90s`. A bare number counts minutes.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("duration is empty".into());
    }
    if let Ok(minutes) = value.parse::<i64>() {
        return Ok(Duration::minutes(minutes));
    }

    let mut total = Duration::zero();
    let mut digits = String::new();
    for c in value.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let amount = digits
            .parse::<i64>()
            .map_err(|_| format!("expected a number before {c:?} in {value:?}"))?;
        digits.clear();
        total += match c {
            'h' => Duration::hours(amount),
            'm' => Duration::minutes(amount),
            's' => Duration::seconds(amount),
            _ => return Err(format!("unknown unit {c:?} in {value:?}, use h, m or s")),
        };
    }
    if !digits.is_empty() {
        return Err(format!("missing unit after {digits} in {value:?}"));
    }
    Ok(total)
}
