use chrono::{Datelike, Duration, Months, NaiveDate};

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    first_day_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .expect("End of time should never happen")
}

/// The standard way of printing a duration, e.g. `8h30m`, `45m` or `-6h`.
pub fn format_duration(v: Duration) -> String {
    let sign = if v < Duration::zero() { "-" } else { "" };
    let v = v.abs();
    let hours = v.num_hours();
    let minutes = v.num_minutes() % 60;
    if hours > 0 && minutes > 0 {
        format!("{sign}{hours}h{minutes}m")
    } else if hours > 0 {
        format!("{sign}{hours}h")
    } else {
        format!("{sign}{minutes}m")
    }
}
