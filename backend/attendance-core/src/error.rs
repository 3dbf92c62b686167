// src/error.rs
use chrono::NaiveDate;
use thiserror::Error;

// --- Error Types ---

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed record at row {index} (employee {employee_id}): missing or invalid {field}")]
    MalformedRecord {
        index: usize,
        employee_id: String,
        field: String,
    },

    #[error("Invalid filter configuration: {0}")]
    InvalidFilterConfig(#[from] FilterConfigError),

    #[error("Invalid registry entry: {0}")]
    InvalidRegistryEntry(String),

    #[error("CSV processing error: {context}")]
    Csv {
        #[source]
        source: csv::Error,
        context: String,
    },

    #[error("File I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
}

// Reasons a date range / filter cannot be built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterConfigError {
    #[error("date range needs both a start and an end (start={start:?}, end={end:?})")]
    MissingBound {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    #[error("date range start {start} is after end {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("unknown department '{0}'")]
    UnknownDepartment(String),
    #[error("a default window of {days} days before {today} is out of the supported date range")]
    WindowOutOfRange { today: NaiveDate, days: i64 },
    #[error("record count {requested} exceeds the maximum of {max}")]
    CountTooLarge { requested: usize, max: usize },
}

pub type PipelineResult<T> = Result<T, PipelineError>;

// Helpers to attach context the same way for every fallible I/O call
pub(crate) fn io_context<S: Into<String>>(source: std::io::Error, context: S) -> PipelineError {
    PipelineError::Io {
        source,
        context: context.into(),
    }
}

pub(crate) fn csv_context<S: Into<String>>(source: csv::Error, context: S) -> PipelineError {
    PipelineError::Csv {
        source,
        context: context.into(),
    }
}
