use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;

use crate::{
    application::ActivitiesService,
    domain::{
        burn_up::BurnUpQuery,
        estimate::EstimateQuery,
        report::{ReportQuery, ReportScope},
        statistics::{StatisticsQuery, StatisticsScope},
        DateRange,
    },
    storage::event_log::EventLog,
};

use super::{
    dates::{DateParser, DATE_EXAMPLES},
    output,
};

#[derive(Debug, Parser)]
pub struct RangeArgs {
    #[arg(long, short, help = format!("First day, inclusive. {DATE_EXAMPLES}"))]
    from: Option<String>,
    #[arg(long, short, help = format!("Last day, inclusive. {DATE_EXAMPLES}"))]
    to: Option<String>,
}

impl RangeArgs {
    fn parse(&self, dates: &DateParser) -> Result<DateRange> {
        Ok(DateRange::new(
            dates.optional_date(self.from.as_deref(), "from")?,
            dates.optional_date(self.to.as_deref(), "to")?,
        ))
    }
}

#[derive(Debug, Parser)]
pub struct RecentCommand {
    #[arg(long, help = format!("Reference day, defaults to today. {DATE_EXAMPLES}"))]
    today: Option<String>,
}

#[derive(Debug, Parser)]
pub struct ReportCommand {
    #[arg(long, short, default_value_t = ReportScope::Projects)]
    scope: ReportScope,
    #[command(flatten)]
    range: RangeArgs,
}

#[derive(Debug, Parser)]
pub struct StatisticsCommand {
    #[arg(long, short, default_value_t = StatisticsScope::WorkingHours)]
    scope: StatisticsScope,
    #[arg(long = "category", help = "Only include tasks of this category, repeatable")]
    categories: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct EstimateCommand {
    #[arg(long = "category", help = "Only include tasks of this category, repeatable")]
    categories: Vec<String>,
}

#[derive(Debug, Parser)]
pub struct BurnUpCommand {
    #[command(flatten)]
    range: RangeArgs,
}

#[derive(Debug, Parser)]
pub struct TimesheetCommand {
    #[arg(long, short, help = format!("First day, defaults to this week's Monday. {DATE_EXAMPLES}"))]
    from: Option<String>,
    #[arg(long, short, help = format!("Last day, defaults to this week's Sunday. {DATE_EXAMPLES}"))]
    to: Option<String>,
    #[arg(long, help = "Reference day for the offset, defaults to today")]
    today: Option<String>,
    #[arg(
        long,
        help = "Also write the entries as CSV into this file. Missing directories are created"
    )]
    export: Option<PathBuf>,
}

fn categories(values: Vec<String>) -> Vec<Arc<str>> {
    values.into_iter().map(Arc::from).collect()
}

pub async fn process_recent_command(
    service: &ActivitiesService<impl EventLog>,
    dates: DateParser,
    command: RecentCommand,
) -> Result<()> {
    let today = dates.optional_date(command.today.as_deref(), "today")?;
    let result = service.recent_activities(today).await?;
    output::print_recent_activities(&result);
    Ok(())
}

pub async fn process_report_command(
    service: &ActivitiesService<impl EventLog>,
    dates: DateParser,
    command: ReportCommand,
) -> Result<()> {
    let query = ReportQuery {
        scope: command.scope,
        range: command.range.parse(&dates)?,
    };
    let result = service.report(query).await?;
    output::print_report(command.scope, &result);
    Ok(())
}

pub async fn process_statistics_command(
    service: &ActivitiesService<impl EventLog>,
    command: StatisticsCommand,
) -> Result<()> {
    let result = service
        .statistics(StatisticsQuery {
            scope: command.scope,
            categories: categories(command.categories),
        })
        .await?;
    output::print_statistics(&result);
    Ok(())
}

pub async fn process_estimate_command(
    service: &ActivitiesService<impl EventLog>,
    command: EstimateCommand,
) -> Result<()> {
    let result = service
        .estimate(EstimateQuery {
            categories: categories(command.categories),
        })
        .await?;
    output::print_estimate(&result);
    Ok(())
}

pub async fn process_burn_up_command(
    service: &ActivitiesService<impl EventLog>,
    dates: DateParser,
    command: BurnUpCommand,
) -> Result<()> {
    let query = BurnUpQuery {
        range: command.range.parse(&dates)?,
    };
    let result = service.burn_up(query).await?;
    output::print_burn_up(&result);
    Ok(())
}

pub async fn process_timesheet_command(
    service: &ActivitiesService<impl EventLog>,
    dates: DateParser,
    command: TimesheetCommand,
) -> Result<()> {
    let (monday, sunday) = DateParser::week_of(dates.today());
    let from = dates
        .optional_date(command.from.as_deref(), "from")?
        .unwrap_or(monday);
    let to = dates
        .optional_date(command.to.as_deref(), "to")?
        .unwrap_or(sunday);
    let today = dates.optional_date(command.today.as_deref(), "today")?;
    let result = service.timesheet(from, to, today).await?;
    output::print_timesheet(&result);
    if let Some(path) = command.export {
        service.export_timesheet(&result.entries, &path).await?;
        println!("Exported timesheet to {}", path.display());
    }
    Ok(())
}
