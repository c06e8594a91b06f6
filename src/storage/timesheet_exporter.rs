use std::path::Path;

use chrono::Duration;
use serde::Serialize;
use tracing::debug;

use super::error::StorageError;
use crate::domain::timesheet::TimesheetEntry;

const HEADER: [&str; 8] = [
    "Date",
    "Client",
    "Project",
    "Task",
    "Notes",
    "Hours",
    "First name",
    "Last name",
];

/// One CSV row. Columns follow [HEADER].
#[derive(Debug, Serialize)]
struct TimesheetRow<'a> {
    date: String,
    client: &'a str,
    project: &'a str,
    task: &'a str,
    notes: Option<&'a str>,
    hours: String,
    first_name: &'a str,
    last_name: &'a str,
}

/// Decimal hours without trailing zeros, `2` or `1.5`.
fn decimal_hours(hours: Duration) -> String {
    (hours.num_minutes() as f64 / 60.0).to_string()
}

impl<'a> From<&'a TimesheetEntry> for TimesheetRow<'a> {
    fn from(entry: &'a TimesheetEntry) -> Self {
        Self {
            date: entry.date.to_string(),
            client: &entry.client,
            project: &entry.project,
            task: &entry.task,
            notes: None,
            hours: decimal_hours(entry.hours),
            first_name: "",
            last_name: "",
        }
    }
}

fn encode(entries: &[TimesheetEntry]) -> Result<Vec<u8>, StorageError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(vec![]);
    writer.write_record(HEADER)?;
    for entry in entries {
        writer.serialize(TimesheetRow::from(entry))?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Writes `entries` as CSV with CRLF line endings into `path`, replacing an existing file. Missing
/// parent directories are created.
pub async fn export_timesheet(path: &Path, entries: &[TimesheetEntry]) -> Result<(), StorageError> {
    let content = encode(entries)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    debug!("Exported {} timesheet entries into {path:?}", entries.len());
    Ok(())
}
