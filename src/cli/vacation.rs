use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};
use clap::Subcommand;

use crate::{
    application::ActivitiesService, domain::calendar::Vacation, storage::event_log::EventLog,
    utils::time::format_duration,
};

use super::dates::{parse_duration, DateParser, DATE_EXAMPLES};

#[derive(Subcommand, Debug)]
pub enum VacationCommand {
    #[command(about = "Take a day off. Replaces a vacation already stored for that day")]
    Add {
        #[arg(help = format!("Day of the vacation. {DATE_EXAMPLES}"))]
        date: String,
        #[arg(
            long,
            short,
            value_parser = parse_duration,
            help = "Hours off for a partial day. Without it the whole day is off"
        )]
        duration: Option<Duration>,
    },
    #[command(about = "Remove the vacation of a day")]
    Remove {
        #[arg(help = format!("Day of the vacation. {DATE_EXAMPLES}"))]
        date: String,
    },
    #[command(about = "List vacations, by default of the current year")]
    List {
        #[arg(long, short)]
        from: Option<String>,
        #[arg(long, short)]
        to: Option<String>,
    },
}

fn year_of(date: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let year = date.year();
    NaiveDate::from_ymd_opt(year, 1, 1)
        .zip(NaiveDate::from_ymd_opt(year, 12, 31))
        .ok_or_else(|| anyhow!("Year {year} is out of range"))
}

pub async fn process_vacation_command(
    service: &ActivitiesService<impl EventLog>,
    dates: DateParser,
    command: VacationCommand,
) -> Result<()> {
    match command {
        VacationCommand::Add { date, duration } => {
            let date = dates.date(&date, "date")?;
            let vacation = match duration {
                Some(duration) => Vacation::new(date).with_duration(duration),
                None => Vacation::new(date),
            };
            service.save_vacations(vec![vacation]).await?;
            println!("Added vacation on {date}");
        }
        VacationCommand::Remove { date } => {
            let date = dates.date(&date, "date")?;
            if service.remove_vacation(date).await? {
                println!("Removed vacation on {date}");
            } else {
                println!("No vacation on {date}");
            }
        }
        VacationCommand::List { from, to } => {
            let (first, last) = year_of(dates.today())?;
            let from = dates.optional_date(from.as_deref(), "from")?.unwrap_or(first);
            let to = dates.optional_date(to.as_deref(), "to")?.unwrap_or(last);
            for vacation in service.vacations(from, to).await? {
                match vacation.duration {
                    Some(duration) => println!("{}\t{}", vacation.date, format_duration(duration)),
                    None => println!("{}\tall day", vacation.date),
                }
            }
        }
    }
    Ok(())
}
