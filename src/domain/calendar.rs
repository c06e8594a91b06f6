use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub const DEFAULT_BUSINESS_DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

pub const DEFAULT_WEEKLY_CAPACITY: Duration = Duration::hours(40);

/// A public holiday. Without a duration the whole business day is off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub title: Option<String>,
    pub duration: Option<Duration>,
}

impl Holiday {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            title: None,
            duration: None,
        }
    }

    pub fn with_title(self, title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..self
        }
    }

    pub fn with_duration(self, duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..self
        }
    }
}

/// A personal day off. Without a duration the whole business day is off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vacation {
    pub date: NaiveDate,
    pub duration: Option<Duration>,
}

impl Vacation {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            duration: None,
        }
    }

    pub fn with_duration(self, duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..self
        }
    }
}

/// Working-hours arithmetic over a weekly capacity spread evenly across the business days.
#[derive(Debug, Clone)]
pub struct Calendar {
    weekly_capacity: Duration,
    business_days: Vec<Weekday>,
    holidays: Vec<Holiday>,
    vacations: Vec<Vacation>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self::new(DEFAULT_WEEKLY_CAPACITY)
    }
}

impl Calendar {
    pub fn new(weekly_capacity: Duration) -> Self {
        Self {
            weekly_capacity,
            business_days: DEFAULT_BUSINESS_DAYS.to_vec(),
            holidays: vec![],
            vacations: vec![],
        }
    }

    pub fn with_business_days(self, business_days: Vec<Weekday>) -> Self {
        Self {
            business_days,
            ..self
        }
    }

    pub fn with_holidays(self, holidays: Vec<Holiday>) -> Self {
        Self { holidays, ..self }
    }

    pub fn with_vacations(self, vacations: Vec<Vacation>) -> Self {
        Self { vacations, ..self }
    }

    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        self.business_days.contains(&date.weekday())
    }

    /// Weekly capacity divided by the number of business days, rounded to whole seconds.
    pub fn hours_per_business_day(&self) -> Duration {
        if self.business_days.is_empty() {
            return Duration::zero();
        }
        let seconds = self.weekly_capacity.num_seconds() as f64 / self.business_days.len() as f64;
        Duration::seconds(seconds.round() as i64)
    }

    fn holiday_on(&self, date: NaiveDate) -> Option<&Holiday> {
        self.holidays.iter().find(|holiday| holiday.date == date)
    }

    fn vacation_on(&self, date: NaiveDate) -> Option<&Vacation> {
        self.vacations.iter().find(|vacation| vacation.date == date)
    }

    /// Counts business days in `[from, to)` that are neither a whole-day holiday nor a whole-day
    /// vacation.
    pub fn count_business_days(&self, from: NaiveDate, to: NaiveDate) -> usize {
        days_between(from, to)
            .filter(|date| self.is_business_day(*date))
            .filter(|date| {
                !matches!(self.holiday_on(*date), Some(Holiday { duration: None, .. }))
            })
            .filter(|date| {
                !matches!(self.vacation_on(*date), Some(Vacation { duration: None, .. }))
            })
            .count()
    }

    /// Expected working hours in `[from, to)`. Holidays and vacations on the same date are both
    /// subtracted, so a single day may contribute a negative amount.
    pub fn count_working_hours(&self, from: NaiveDate, to: NaiveDate) -> Duration {
        let per_day = self.hours_per_business_day();
        days_between(from, to)
            .filter(|date| self.is_business_day(*date))
            .map(|date| {
                let mut hours = per_day;
                if let Some(holiday) = self.holiday_on(date) {
                    hours -= holiday.duration.unwrap_or(per_day);
                }
                if let Some(vacation) = self.vacation_on(date) {
                    hours -= vacation.duration.unwrap_or(per_day);
                }
                hours
            })
            .fold(Duration::zero(), |sum, hours| sum + hours)
    }
}

/// Dates from `from` (inclusive) to `to` (exclusive).
fn days_between(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    from.iter_days().take_while(move |date| *date < to)
}
