use std::{
    future::{self, Future},
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{Local, TimeZone};
use fs4::tokio::AsyncFileExt;
use futures::{stream, Stream, StreamExt};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tokio_stream::wrappers::LinesStream;
use tracing::debug;

use super::{entities::ActivityLoggedEventEntity, error::StorageError};
use crate::domain::{ActivityLoggedEvent, ReplayError};

pub const EVENT_LOG_FILE: &str = "events.jsonl";

/// Append-only log of every activity ever logged.
pub trait EventLog {
    /// Every event in the order it was recorded. Lazy, each call starts a fresh cursor.
    fn replay(&self) -> impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>> + Send + 'static;

    fn record(
        &self,
        event: ActivityLoggedEventEntity,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// [EventLog] stored as one JSON entity per line. Timestamps are replayed as local date-times of
/// `zone`.
pub struct JsonLinesEventLog<Tz = Local> {
    path: PathBuf,
    zone: Tz,
}

impl JsonLinesEventLog<Local> {
    pub fn new(dir: &Path) -> Self {
        Self::with_zone(dir, Local)
    }
}

impl<Tz> JsonLinesEventLog<Tz> {
    pub fn with_zone(dir: &Path, zone: Tz) -> Self {
        Self {
            path: dir.join(EVENT_LOG_FILE),
            zone,
        }
    }
}

/// Opens the log under a shared lock. The lock is released when the file is closed. A missing
/// log means nothing was recorded yet.
async fn open_shared(path: PathBuf) -> Result<Option<File>, std::io::Error> {
    debug!("Replaying {path:?}");
    match File::open(&path).await {
        Ok(file) => {
            file.lock_shared()?;
            Ok(Some(file))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn parse_line<Tz: TimeZone>(
    line: usize,
    value: &str,
    zone: &Tz,
) -> Result<ActivityLoggedEvent, ReplayError> {
    let entity = serde_json::from_str::<ActivityLoggedEventEntity>(value)
        .map_err(|e| ReplayError::malformed(line, e.to_string()))?;
    entity
        .validate(zone)
        .map_err(|e| ReplayError::malformed(line, e.to_string()))
}

fn parse_file<Tz>(
    file: File,
    zone: Tz,
) -> impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>> + Send
where
    Tz: TimeZone + Send + 'static,
    Tz::Offset: Send,
{
    LinesStream::new(BufReader::new(file).lines())
        .enumerate()
        .filter_map(move |(index, line)| {
            let line_number = index + 1;
            future::ready(match line {
                Ok(value) if value.trim().is_empty() => None,
                Ok(value) => Some(parse_line(line_number, &value, &zone)),
                Err(e) => Some(Err(ReplayError::Io(e))),
            })
        })
}

impl<Tz> EventLog for JsonLinesEventLog<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send,
{
    fn replay(&self) -> impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>> + Send + 'static {
        let zone = self.zone.clone();
        stream::once(open_shared(self.path.clone())).flat_map(move |opened| match opened {
            Ok(Some(file)) => parse_file(file, zone.clone()).boxed(),
            Ok(None) => stream::empty().boxed(),
            Err(e) => stream::once(future::ready(Err(ReplayError::Io(e)))).boxed(),
        })
    }

    async fn record(&self, event: ActivityLoggedEventEntity) -> Result<(), StorageError> {
        let mut buffer = serde_json::to_vec(&event)?;
        buffer.push(b'\n');

        let mut file = File::options()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.lock_exclusive()?;
        let result = file.write_all(&buffer).await;
        let flushed = file.flush().await;
        file.unlock_async().await?;
        result?;
        flushed?;
        debug!("Recorded {event:?}");
        Ok(())
    }
}
