use anyhow::Result;
use chrono::{Duration, Utc};
use clap::Parser;

use crate::{
    application::{ActivitiesService, LogActivityCommand},
    storage::event_log::EventLog,
    utils::time::format_duration,
};

use super::dates::{parse_duration, DateParser};

#[derive(Debug, Parser)]
pub struct LogCommand {
    #[arg(long, short)]
    client: String,
    #[arg(long, short)]
    project: String,
    #[arg(long, short)]
    task: String,
    #[arg(
        long,
        short,
        value_parser = parse_duration,
        default_value = "30m",
        help = "Duration of the activity, e.g. \"30m\" or \"1h30m\""
    )]
    duration: Duration,
    #[arg(long, short)]
    notes: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(
        long = "at",
        help = "When the activity ended. Defaults to now. Examples are \"1 hour ago\", \"12:00 16/03/2025\""
    )]
    timestamp: Option<String>,
}

pub async fn process_log_command(
    service: &ActivitiesService<impl EventLog>,
    dates: DateParser,
    LogCommand {
        client,
        project,
        task,
        duration,
        notes,
        category,
        timestamp,
    }: LogCommand,
) -> Result<()> {
    let timestamp = match timestamp {
        Some(value) => dates.date_time(&value, "timestamp")?.with_timezone(&Utc),
        None => Utc::now(),
    };
    service
        .log_activity(LogActivityCommand {
            timestamp,
            duration,
            client,
            project,
            task,
            notes,
            category,
        })
        .await?;
    println!("Logged {}", format_duration(duration));
    Ok(())
}
