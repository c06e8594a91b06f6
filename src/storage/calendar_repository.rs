use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::debug;

use super::{
    entities::{HolidayEntity, VacationEntity},
    error::StorageError,
};
use crate::domain::calendar::{Holiday, Vacation};

pub const HOLIDAYS_FILE: &str = "holidays.jsonl";
pub const VACATIONS_FILE: &str = "vacations.jsonl";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HolidayRepository: Send + Sync {
    /// Holidays with `from <= date <= to`.
    async fn find_all_by_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Holiday>, StorageError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VacationRepository: Send + Sync {
    /// Vacations with `from <= date <= to`.
    async fn find_all_by_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Vacation>, StorageError>;

    /// Stores `vacations`, replacing any vacation already stored for the same date.
    async fn save_all(&self, vacations: Vec<Vacation>) -> Result<(), StorageError>;

    async fn remove(&self, date: NaiveDate) -> Result<bool, StorageError>;
}

/// Reads every line of a JSON lines file under a shared lock. A missing file has no entries.
async fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    debug!("Reading {path:?}");
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };
    file.lock_shared()?;

    let mut lines = BufReader::new(file).lines();
    let mut entries = vec![];
    let mut line = 0;
    let result = loop {
        let value = match lines.next_line().await {
            Ok(Some(value)) => value,
            Ok(None) => break Ok(()),
            Err(e) => break Err(StorageError::Io(e)),
        };
        line += 1;
        if value.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&value) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                break Err(StorageError::Malformed {
                    path: path.to_owned(),
                    line,
                    reason: e.to_string(),
                })
            }
        }
    };

    lines.into_inner().into_inner().unlock_async().await?;
    result.map(|_| entries)
}

/// Replaces the whole file under an exclusive lock.
async fn write_all<T: Serialize>(path: &Path, entries: &[T]) -> Result<(), StorageError> {
    let mut buffer = Vec::<u8>::new();
    for entry in entries {
        serde_json::to_writer(&mut buffer, entry)?;
        buffer.push(b'\n');
    }

    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .await?;
    file.lock_exclusive()?;
    let result = async {
        file.set_len(0).await?;
        file.write_all(&buffer).await?;
        file.flush().await
    }
    .await;
    file.unlock_async().await?;
    Ok(result?)
}

pub struct JsonLinesHolidayRepository {
    path: PathBuf,
}

impl JsonLinesHolidayRepository {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(HOLIDAYS_FILE),
        }
    }
}

#[async_trait]
impl HolidayRepository for JsonLinesHolidayRepository {
    async fn find_all_by_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Holiday>, StorageError> {
        let holidays = read_all::<HolidayEntity>(&self.path)
            .await?
            .into_iter()
            .filter(|holiday| from <= holiday.date && holiday.date <= to)
            .map(Holiday::from)
            .collect();
        Ok(holidays)
    }
}

pub struct JsonLinesVacationRepository {
    path: PathBuf,
}

impl JsonLinesVacationRepository {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(VACATIONS_FILE),
        }
    }
}

#[async_trait]
impl VacationRepository for JsonLinesVacationRepository {
    async fn find_all_by_date(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Vacation>, StorageError> {
        let vacations = read_all::<VacationEntity>(&self.path)
            .await?
            .into_iter()
            .filter(|vacation| from <= vacation.date && vacation.date <= to)
            .map(Vacation::from)
            .collect();
        Ok(vacations)
    }

    async fn save_all(&self, vacations: Vec<Vacation>) -> Result<(), StorageError> {
        let mut stored = read_all::<VacationEntity>(&self.path).await?;
        for vacation in vacations {
            stored.retain(|entry| entry.date != vacation.date);
            stored.push(vacation.into());
        }
        stored.sort_by_key(|entry| entry.date);
        write_all(&self.path, &stored).await
    }

    async fn remove(&self, date: NaiveDate) -> Result<bool, StorageError> {
        let mut stored = read_all::<VacationEntity>(&self.path).await?;
        let count = stored.len();
        stored.retain(|entry| entry.date != date);
        if stored.len() == count {
            return Ok(false);
        }
        write_all(&self.path, &stored).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use anyhow::Result;
    use chrono::Duration;
    use tempfile::tempdir;

    use super::{
        HolidayRepository, JsonLinesHolidayRepository, JsonLinesVacationRepository,
        VacationRepository, HOLIDAYS_FILE,
    };
    use crate::{
        domain::{
            calendar::{Holiday, Vacation},
            events::test_events::date,
        },
        storage::error::StorageError,
    };

    #[tokio::test]
    async fn finds_holidays_within_inclusive_range() -> Result<()> {
        let dir = tempdir()?;
        let mut file = std::fs::File::create(dir.path().join(HOLIDAYS_FILE))?;
        writeln!(file, r#"{{"date":"2025-05-29","title":"Christi Himmelfahrt"}}"#)?;
        writeln!(file, r#"{{"date":"2025-06-09","title":"Pfingstmontag"}}"#)?;
        writeln!(file, r#"{{"date":"2025-06-19","title":"Fronleichnam"}}"#)?;
        writeln!(
            file,
            r#"{{"date":"2025-06-30","title":"Half day","duration":14400}}"#
        )?;
        drop(file);
        let repository = JsonLinesHolidayRepository::new(dir.path());

        let holidays = repository
            .find_all_by_date(date("2025-06-09"), date("2025-06-30"))
            .await?;

        assert_eq!(
            holidays,
            vec![
                Holiday::new(date("2025-06-09")).with_title("Pfingstmontag"),
                Holiday::new(date("2025-06-19")).with_title("Fronleichnam"),
                Holiday::new(date("2025-06-30"))
                    .with_title("Half day")
                    .with_duration(Duration::hours(4)),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_has_no_holidays() -> Result<()> {
        let dir = tempdir()?;
        let repository = JsonLinesHolidayRepository::new(dir.path());

        let holidays = repository
            .find_all_by_date(date("2025-01-01"), date("2025-12-31"))
            .await?;

        assert!(holidays.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_holiday_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join(HOLIDAYS_FILE), "{\"date\":\"tomorrow\"}\n")?;
        let repository = JsonLinesHolidayRepository::new(dir.path());

        let result = repository
            .find_all_by_date(date("2025-01-01"), date("2025-12-31"))
            .await;

        assert!(matches!(result, Err(StorageError::Malformed { line: 1, .. })));
        Ok(())
    }

    #[tokio::test]
    async fn saved_vacations_replace_same_date_and_stay_sorted() -> Result<()> {
        let dir = tempdir()?;
        let repository = JsonLinesVacationRepository::new(dir.path());

        repository
            .save_all(vec![
                Vacation::new(date("2025-09-12")),
                Vacation::new(date("2025-09-10")),
            ])
            .await?;
        repository
            .save_all(vec![
                Vacation::new(date("2025-09-12")).with_duration(Duration::hours(4))
            ])
            .await?;

        let vacations = repository
            .find_all_by_date(date("2025-09-01"), date("2025-09-30"))
            .await?;
        assert_eq!(
            vacations,
            vec![
                Vacation::new(date("2025-09-10")),
                Vacation::new(date("2025-09-12")).with_duration(Duration::hours(4)),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn removes_vacation() -> Result<()> {
        let dir = tempdir()?;
        let repository = JsonLinesVacationRepository::new(dir.path());
        repository
            .save_all(vec![
                Vacation::new(date("2025-09-10")),
                Vacation::new(date("2025-09-11")),
            ])
            .await?;

        assert!(repository.remove(date("2025-09-10")).await?);
        assert!(!repository.remove(date("2025-09-10")).await?);

        let vacations = repository
            .find_all_by_date(date("2025-09-01"), date("2025-09-30"))
            .await?;
        assert_eq!(vacations, vec![Vacation::new(date("2025-09-11"))]);
        Ok(())
    }
}
