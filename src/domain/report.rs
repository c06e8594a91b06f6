use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
    fmt::Display,
    sync::Arc,
};

use chrono::{Duration, NaiveDate};
use clap::ValueEnum;
use futures::Stream;

use super::{
    activities::{cycle_time, TotalHoursProjection},
    filter_events, fold_replay, ActivityLoggedEvent, DateRange, Projection, ReplayError,
};

/// Label used in the categories report for events without a category.
pub const UNCATEGORIZED: &str = "N/A";

const LABEL_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ReportScope {
    Clients,
    Projects,
    Tasks,
    Categories,
}

impl Display for ReportScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportScope::Clients => write!(f, "clients"),
            ReportScope::Projects => write!(f, "projects"),
            ReportScope::Tasks => write!(f, "tasks"),
            ReportScope::Categories => write!(f, "categories"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ReportKey {
    Client(Arc<str>),
    Project(Arc<str>),
    Task {
        task: Arc<str>,
        project: Arc<str>,
        client: Arc<str>,
    },
    Category(Arc<str>),
}

/// One row of a report. Fields that are not part of the scope stay empty. `client` of a projects
/// report and `category` of a tasks report hold every value seen, sorted and joined by ", ".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub start: NaiveDate,
    pub finish: NaiveDate,
    pub client: String,
    pub project: String,
    pub task: String,
    pub category: String,
    pub hours: Duration,
    pub cycle_time: i64,
}

impl ReportScope {
    fn key(&self, event: &ActivityLoggedEvent) -> ReportKey {
        match self {
            ReportScope::Clients => ReportKey::Client(event.client.clone()),
            ReportScope::Projects => ReportKey::Project(event.project.clone()),
            ReportScope::Tasks => ReportKey::Task {
                task: event.task.clone(),
                project: event.project.clone(),
                client: event.client.clone(),
            },
            ReportScope::Categories => ReportKey::Category(category_label(event).into()),
        }
    }

    fn new_entry(&self, event: &ActivityLoggedEvent) -> ReportEntry {
        let date = event.date();
        let mut entry = ReportEntry {
            start: date,
            finish: date,
            client: String::new(),
            project: String::new(),
            task: String::new(),
            category: String::new(),
            hours: event.duration,
            cycle_time: 1,
        };
        match self {
            ReportScope::Clients => {
                entry.client = event.client.to_string();
            }
            ReportScope::Projects => {
                entry.project = event.project.to_string();
                entry.client = event.client.to_string();
            }
            ReportScope::Tasks => {
                entry.task = event.task.to_string();
                entry.project = event.project.to_string();
                entry.client = event.client.to_string();
                entry.category = event.category_or_default().to_string();
            }
            ReportScope::Categories => {
                entry.category = category_label(event).to_string();
            }
        }
        entry
    }

    /// The auxiliary label of the scope, merged across every event of an entry.
    fn label(&self, event: &ActivityLoggedEvent) -> Option<Arc<str>> {
        let label = match self {
            ReportScope::Projects => event.client.clone(),
            ReportScope::Tasks => event.category.clone()?,
            ReportScope::Clients | ReportScope::Categories => return None,
        };
        (!label.is_empty()).then_some(label)
    }

    fn set_label(&self, entry: &mut ReportEntry, labels: &BTreeSet<Arc<str>>) {
        let joined = labels
            .iter()
            .map(|label| &**label)
            .collect::<Vec<_>>()
            .join(LABEL_SEPARATOR);
        match self {
            ReportScope::Projects => entry.client = joined,
            ReportScope::Tasks => entry.category = joined,
            ReportScope::Clients | ReportScope::Categories => {}
        }
    }

    fn compare(&self, a: &ReportEntry, b: &ReportEntry) -> Ordering {
        match self {
            ReportScope::Clients => a.client.cmp(&b.client),
            ReportScope::Projects => a.project.cmp(&b.project).then_with(|| a.client.cmp(&b.client)),
            ReportScope::Tasks => a
                .task
                .cmp(&b.task)
                .then_with(|| a.project.cmp(&b.project))
                .then_with(|| a.client.cmp(&b.client)),
            ReportScope::Categories => a.category.cmp(&b.category),
        }
    }
}

fn category_label(event: &ActivityLoggedEvent) -> &str {
    match event.category_or_default() {
        "" => UNCATEGORIZED,
        category => category,
    }
}

/// Groups events by the key of its [ReportScope].
#[derive(Debug)]
pub struct ReportProjection {
    scope: ReportScope,
    index: HashMap<ReportKey, usize>,
    entries: Vec<(ReportEntry, BTreeSet<Arc<str>>)>,
}

impl ReportProjection {
    pub fn new(scope: ReportScope) -> Self {
        Self {
            scope,
            index: HashMap::new(),
            entries: vec![],
        }
    }
}

impl Projection for ReportProjection {
    type Output = Vec<ReportEntry>;

    fn update(mut self, event: &ActivityLoggedEvent) -> Self {
        let key = self.scope.key(event);
        match self.index.get(&key) {
            Some(&position) => {
                let date = event.date();
                let (entry, labels) = &mut self.entries[position];
                entry.start = entry.start.min(date);
                entry.finish = entry.finish.max(date);
                entry.hours += event.duration;
                entry.cycle_time = cycle_time(entry.start, entry.finish);
                labels.extend(self.scope.label(event));
            }
            None => {
                self.index.insert(key, self.entries.len());
                let labels = self.scope.label(event).into_iter().collect();
                self.entries.push((self.scope.new_entry(event), labels));
            }
        }
        self
    }

    fn get(self) -> Self::Output {
        let scope = self.scope;
        let mut entries = self
            .entries
            .into_iter()
            .map(|(mut entry, labels)| {
                scope.set_label(&mut entry, &labels);
                entry
            })
            .collect::<Vec<_>>();
        entries.sort_by(|a, b| scope.compare(a, b));
        entries
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReportQuery {
    pub scope: ReportScope,
    pub range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQueryResult {
    pub entries: Vec<ReportEntry>,
    pub total_hours: Duration,
}

pub async fn project_report(
    replay: impl Stream<Item = Result<ActivityLoggedEvent, ReplayError>>,
    query: ReportQuery,
) -> Result<ReportQueryResult, ReplayError> {
    let (entries, total_hours) = fold_replay(
        filter_events(replay, query.range),
        (
            ReportProjection::new(query.scope),
            TotalHoursProjection::default(),
        ),
    )
    .await?
    .get();
    Ok(ReportQueryResult {
        entries,
        total_hours,
    })
}
