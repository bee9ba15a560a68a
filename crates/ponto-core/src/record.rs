//! Finished records and the sink they are appended to.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime};

use crate::duration::{DATE_FORMAT, TIME_FORMAT, format_duration};
use crate::session::Session;

/// Error returned by a [`RecordSink`].
pub type SinkError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The immutable summary of one finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedRecord {
    pub display_name: String,
    pub record_date: NaiveDate,
    pub shift_start: NaiveTime,
    pub shift_end: NaiveTime,
    pub total_worked: Duration,
}

impl FinishedRecord {
    /// Builds the record for `session` finishing at `now` with `total_worked`.
    pub fn new(
        session: &Session,
        display_name: String,
        total_worked: Duration,
        now: &DateTime<Local>,
    ) -> Self {
        Self {
            display_name,
            record_date: now.date_naive(),
            shift_start: session.started_at.time(),
            shift_end: now.time(),
            total_worked,
        }
    }

    /// `DD/MM/YYYY`
    pub fn record_date_text(&self) -> String {
        self.record_date.format(DATE_FORMAT).to_string()
    }

    pub fn shift_start_text(&self) -> String {
        self.shift_start.format(TIME_FORMAT).to_string()
    }

    pub fn shift_end_text(&self) -> String {
        self.shift_end.format(TIME_FORMAT).to_string()
    }

    pub fn total_worked_text(&self) -> String {
        format_duration(self.total_worked)
    }
}

/// Durable destination of finished records.
pub trait RecordSink {
    /// Appends one record. Only an `Ok` return means the record is durable.
    fn append(&mut self, record: &FinishedRecord) -> Result<(), SinkError>;
}

impl RecordSink for Vec<FinishedRecord> {
    fn append(&mut self, record: &FinishedRecord) -> Result<(), SinkError> {
        self.push(record.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn append(&mut self, record: &FinishedRecord) -> Result<(), SinkError> {
        (**self).append(record)
    }
}
