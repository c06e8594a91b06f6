use chrono::{DateTime, Local};

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Sync + Send + 'static {
    fn now(&self) -> DateTime<Local>;
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
