//! Cron-style scheduling for the daily pipeline and periodic maintenance
//! jobs, independent of how any individual job is implemented.

pub mod cron;
pub mod scheduler;

pub use cron::{CronParseError, CronSchedule};
pub use scheduler::{Job, JobError, JobOutcome, JobRunRecord, Scheduler, SchedulerError};
