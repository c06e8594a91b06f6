//! Entry points used by the cli. Wires the event log, the calendar repositories, the clock and the
//! settings into the domain queries.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{info, instrument};

use crate::{
    domain::{
        burn_up::{project_burn_up, BurnUpQuery, BurnUpQueryResult},
        calendar::Vacation,
        estimate::{project_estimate, EstimateQuery, EstimateQueryResult},
        recent_activities::{
            project_recent_activities, RecentActivitiesQuery, RecentActivitiesQueryResult,
        },
        report::{project_report, ReportQuery, ReportQueryResult},
        statistics::{project_statistics, StatisticsQuery, StatisticsQueryResult},
        timesheet::{project_timesheet, TimesheetEntry, TimesheetQuery, TimesheetQueryResult},
    },
    settings::Settings,
    storage::{
        calendar_repository::{HolidayRepository, VacationRepository},
        entities::ActivityLoggedEventEntity,
        event_log::EventLog,
        timesheet_exporter,
    },
    utils::clock::Clock,
};

#[derive(Debug, Clone)]
pub struct LogActivityCommand {
    pub timestamp: DateTime<Utc>,
    pub duration: Duration,
    pub client: String,
    pub project: String,
    pub task: String,
    pub notes: Option<String>,
    pub category: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<std::sync::Arc<str>> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(Into::into)
}

impl From<LogActivityCommand> for ActivityLoggedEventEntity {
    fn from(command: LogActivityCommand) -> Self {
        ActivityLoggedEventEntity {
            timestamp: command.timestamp,
            duration: command.duration,
            client: command.client.into(),
            project: command.project.into(),
            task: command.task.into(),
            notes: non_empty(command.notes),
            category: non_empty(command.category),
        }
    }
}

pub struct ActivitiesService<L> {
    event_log: L,
    holidays: Box<dyn HolidayRepository>,
    vacations: Box<dyn VacationRepository>,
    clock: Box<dyn Clock>,
    settings: Settings,
}

impl<L: EventLog> ActivitiesService<L> {
    pub fn new(
        event_log: L,
        holidays: Box<dyn HolidayRepository>,
        vacations: Box<dyn VacationRepository>,
        clock: Box<dyn Clock>,
        settings: Settings,
    ) -> Self {
        Self {
            event_log,
            holidays,
            vacations,
            clock,
            settings,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    #[instrument(skip(self))]
    pub async fn log_activity(&self, command: LogActivityCommand) -> Result<()> {
        let entity = ActivityLoggedEventEntity::from(command);
        entity.check()?;
        self.event_log.record(entity).await?;
        info!("Activity logged");
        Ok(())
    }

    /// `today` defaults to the current local date.
    #[instrument(skip(self))]
    pub async fn recent_activities(
        &self,
        today: Option<NaiveDate>,
    ) -> Result<RecentActivitiesQueryResult> {
        let query = RecentActivitiesQuery {
            today: today.unwrap_or_else(|| self.today()),
        };
        let result = project_recent_activities(self.event_log.replay(), query).await?;
        info!("Found {} working days", result.working_days.len());
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn report(&self, query: ReportQuery) -> Result<ReportQueryResult> {
        let result = project_report(self.event_log.replay(), query).await?;
        info!("Reported {} entries", result.entries.len());
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn statistics(&self, query: StatisticsQuery) -> Result<StatisticsQueryResult> {
        let result = project_statistics(self.event_log.replay(), query).await?;
        info!("Computed statistics over {} activities", result.total_count);
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn estimate(&self, query: EstimateQuery) -> Result<EstimateQueryResult> {
        let result = project_estimate(self.event_log.replay(), query).await?;
        info!("Estimated over {} activities", result.total_count);
        Ok(result)
    }

    #[instrument(skip(self))]
    pub async fn burn_up(&self, query: BurnUpQuery) -> Result<BurnUpQueryResult> {
        let result = project_burn_up(self.event_log.replay(), query).await?;
        info!("Throughput {}", result.total_throughput);
        Ok(result)
    }

    /// Capacity uses the configured calendar plus the holidays and vacations within
    /// `[from, to]`.
    #[instrument(skip(self))]
    pub async fn timesheet(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        today: Option<NaiveDate>,
    ) -> Result<TimesheetQueryResult> {
        let holidays = self.holidays.find_all_by_date(from, to).await?;
        let vacations = self.vacations.find_all_by_date(from, to).await?;
        let calendar = self
            .settings
            .calendar()
            .with_holidays(holidays)
            .with_vacations(vacations);
        let query = TimesheetQuery {
            from,
            to,
            today: today.unwrap_or_else(|| self.today()),
        };
        let result = project_timesheet(self.event_log.replay(), query, &calendar).await?;
        info!("Timesheet with {} entries", result.entries.len());
        Ok(result)
    }

    #[instrument(skip(self, entries))]
    pub async fn export_timesheet(&self, entries: &[TimesheetEntry], path: &Path) -> Result<()> {
        timesheet_exporter::export_timesheet(path, entries).await?;
        info!("Exported {} timesheet entries", entries.len());
        Ok(())
    }

    pub async fn vacations(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Vacation>> {
        Ok(self.vacations.find_all_by_date(from, to).await?)
    }

    #[instrument(skip(self))]
    pub async fn save_vacations(&self, vacations: Vec<Vacation>) -> Result<()> {
        self.vacations.save_all(vacations).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_vacation(&self, date: NaiveDate) -> Result<bool> {
        Ok(self.vacations.remove(date).await?)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, Local, TimeZone, Utc};
    use tempfile::tempdir;

    use super::{ActivitiesService, LogActivityCommand};
    use crate::{
        domain::{calendar::Holiday, events::test_events::date},
        settings::Settings,
        storage::{
            calendar_repository::{MockHolidayRepository, MockVacationRepository},
            event_log::memory::MemoryEventLog,
        },
        utils::{clock::MockClock, logging::TEST_LOGGING},
    };

    fn command(day: u32, hours: i64) -> LogActivityCommand {
        LogActivityCommand {
            timestamp: Utc.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap(),
            duration: Duration::hours(hours),
            client: "Test client".into(),
            project: "Test project".into(),
            task: "Test task".into(),
            notes: Some("".into()),
            category: None,
        }
    }

    fn clock_at(day: u32) -> MockClock {
        let mut clock = MockClock::new();
        clock
            .expect_now()
            .returning(move || Local.with_ymd_and_hms(2025, 6, day, 12, 0, 0).unwrap());
        clock
    }

    fn service(
        event_log: MemoryEventLog,
        holidays: MockHolidayRepository,
        vacations: MockVacationRepository,
        today: u32,
    ) -> ActivitiesService<MemoryEventLog> {
        ActivitiesService::new(
            event_log,
            Box::new(holidays),
            Box::new(vacations),
            Box::new(clock_at(today)),
            Settings::default(),
        )
    }

    #[tokio::test]
    async fn logged_activity_shows_up_in_recent_activities() -> Result<()> {
        *TEST_LOGGING;
        let event_log = MemoryEventLog::default();
        let service = service(
            event_log.clone(),
            MockHolidayRepository::new(),
            MockVacationRepository::new(),
            5,
        );

        service.log_activity(command(5, 2)).await?;
        let result = service.recent_activities(None).await?;

        assert_eq!(result.working_days.len(), 1);
        assert_eq!(result.working_days[0].date, date("2025-06-05"));
        assert_eq!(result.working_days[0].activities[0].notes, None);
        assert_eq!(result.time_summary.hours_today, Duration::hours(2));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_activity_is_not_recorded() -> Result<()> {
        let event_log = MemoryEventLog::default();
        let service = service(
            event_log.clone(),
            MockHolidayRepository::new(),
            MockVacationRepository::new(),
            5,
        );

        let result = service
            .log_activity(LogActivityCommand {
                client: "".into(),
                ..command(5, 1)
            })
            .await;

        assert!(result.is_err());
        assert!(event_log.events.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn timesheet_applies_holidays_of_the_period() -> Result<()> {
        let event_log = MemoryEventLog::default();
        let mut holidays = MockHolidayRepository::new();
        holidays
            .expect_find_all_by_date()
            .withf(|from, to| *from == date("2025-06-09") && *to == date("2025-06-15"))
            .times(1)
            .returning(|_, _| Ok(vec![Holiday::new(date("2025-06-09"))]));
        let mut vacations = MockVacationRepository::new();
        vacations
            .expect_find_all_by_date()
            .times(1)
            .returning(|_, _| Ok(vec![]));
        let service = service(event_log, holidays, vacations, 12);
        for day in [10, 11, 12] {
            service.log_activity(command(day, 8)).await?;
        }

        let result = service
            .timesheet(date("2025-06-09"), date("2025-06-15"), None)
            .await?;

        assert_eq!(result.total_hours, Duration::hours(24));
        assert_eq!(result.capacity.hours, Duration::hours(32));
        assert_eq!(result.capacity.offset, Duration::zero());
        Ok(())
    }

    #[tokio::test]
    async fn exported_timesheet_matches_the_query() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("timesheet.csv");
        let mut holidays = MockHolidayRepository::new();
        holidays.expect_find_all_by_date().returning(|_, _| Ok(vec![]));
        let mut vacations = MockVacationRepository::new();
        vacations.expect_find_all_by_date().returning(|_, _| Ok(vec![]));
        let service = service(MemoryEventLog::default(), holidays, vacations, 12);
        service.log_activity(command(10, 8)).await?;
        service.log_activity(command(11, 1)).await?;

        let result = service
            .timesheet(date("2025-06-09"), date("2025-06-15"), None)
            .await?;
        service.export_timesheet(&result.entries, &path).await?;

        let content = tokio::fs::read_to_string(&path).await?;
        let lines = content.split("\r\n").collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "Date,Client,Project,Task,Notes,Hours,First name,Last name",
                "2025-06-10,Test client,Test project,Test task,,8,,",
                "2025-06-11,Test client,Test project,Test task,,1,,",
                "",
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn removing_vacation_delegates_to_repository() -> Result<()> {
        let mut vacations = MockVacationRepository::new();
        vacations
            .expect_remove()
            .withf(|day| *day == date("2025-09-10"))
            .returning(|_| Ok(true));
        let service = service(
            MemoryEventLog::default(),
            MockHolidayRepository::new(),
            vacations,
            5,
        );

        assert!(service.remove_vacation(date("2025-09-10")).await?);
        Ok(())
    }
}
