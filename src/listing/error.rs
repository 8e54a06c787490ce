use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ListError {
    #[error("Select both a start date and an end date")]
    IncompleteDateRange,

    #[error("Start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Page numbers start at 1")]
    InvalidPage,

    #[error("Page size must be at least 1")]
    InvalidPageSize,
}
