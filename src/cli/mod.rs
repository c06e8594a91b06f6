pub mod dates;
pub mod log_activity;
pub mod output;
pub mod query;
pub mod vacation;

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use dates::{DateParser, DateStyle};
use log_activity::{process_log_command, LogCommand};
use query::{
    process_burn_up_command, process_estimate_command, process_recent_command,
    process_report_command, process_statistics_command, process_timesheet_command, BurnUpCommand,
    EstimateCommand, RecentCommand, ReportCommand, StatisticsCommand, TimesheetCommand,
};
use tracing::level_filters::LevelFilter;
use vacation::{process_vacation_command, VacationCommand};

use crate::{
    application::ActivitiesService,
    settings::Settings,
    storage::{
        calendar_repository::{JsonLinesHolidayRepository, JsonLinesVacationRepository},
        event_log::JsonLinesEventLog,
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, create_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "activity-sampling", version, long_about = None)]
#[command(about = "Log work activities and see where the time went", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Log a finished activity")]
    Log {
        #[command(flatten)]
        command: LogCommand,
    },
    #[command(about = "Activities of the last 30 days and a summary of hours worked")]
    Recent {
        #[command(flatten)]
        command: RecentCommand,
    },
    #[command(about = "Hours and cycle times grouped by clients, projects, tasks or categories")]
    Report {
        #[command(flatten)]
        command: ReportCommand,
    },
    #[command(about = "Histogram and median of working hours or cycle times per task")]
    Statistics {
        #[command(flatten)]
        command: StatisticsCommand,
    },
    #[command(about = "Probability of finishing a task within a number of days")]
    Estimate {
        #[command(flatten)]
        command: EstimateCommand,
    },
    #[command(about = "Finished tasks per day and in total")]
    BurnUp {
        #[command(flatten)]
        command: BurnUpCommand,
    },
    #[command(about = "Hours per day and task compared to the capacity")]
    Timesheet {
        #[command(flatten)]
        command: TimesheetCommand,
    },
    #[command(about = "Manage vacations")]
    Vacation {
        #[command(subcommand)]
        command: VacationCommand,
    },
}

async fn create_service(dir: &Path) -> Result<ActivitiesService<JsonLinesEventLog>> {
    let settings = Settings::load(dir).await?;
    Ok(ActivitiesService::new(
        JsonLinesEventLog::new(dir),
        Box::new(JsonLinesHolidayRepository::new(dir)),
        Box::new(JsonLinesVacationRepository::new(dir)),
        Box::new(DefaultClock),
        settings,
    ))
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = match args.dir {
        Some(dir) => create_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;

    let service = create_service(&dir).await?;
    let dates = DateParser::new(args.date_style, Local::now());

    match args.commands {
        Commands::Log { command } => process_log_command(&service, dates, command).await,
        Commands::Recent { command } => process_recent_command(&service, dates, command).await,
        Commands::Report { command } => process_report_command(&service, dates, command).await,
        Commands::Statistics { command } => process_statistics_command(&service, command).await,
        Commands::Estimate { command } => process_estimate_command(&service, command).await,
        Commands::BurnUp { command } => process_burn_up_command(&service, dates, command).await,
        Commands::Timesheet { command } => {
            process_timesheet_command(&service, dates, command).await
        }
        Commands::Vacation { command } => process_vacation_command(&service, dates, command).await,
    }
}
