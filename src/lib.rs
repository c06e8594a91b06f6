//! Log timed work activities from the terminal and derive reports, statistics, burn-up charts,
//! cycle time estimates and timesheets from the activity log.
//!
//! Every view is recomputed from a replay of the log, see [domain].

pub mod application;
pub mod cli;
pub mod domain;
pub mod settings;
pub mod storage;
pub mod utils;
