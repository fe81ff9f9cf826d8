use thiserror::Error;

/// Shape and content problems in an incoming dataset.
///
/// These are fatal for the load cycle that produced them; the analytics are
/// never reached with a dataset that failed validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("no year data found")]
    NoYears,

    #[error("years must be strictly ascending (found {previous} before {next})")]
    YearsNotAscending { previous: i32, next: i32 },

    #[error("channel '{channel}' has {actual} readings but there are {expected} years")]
    MisalignedChannel {
        channel: String,
        expected: usize,
        actual: usize,
    },

    #[error("channel '{channel}', index {index}: reading is not a finite number")]
    NonFiniteReading { channel: String, index: usize },

    #[error("channel '{channel}', index {index}: expected a number or null")]
    InvalidReading { channel: String, index: usize },

    #[error("years[{index}]: expected an integer year")]
    InvalidYear { index: usize },

    #[error("channel '{0}' is not an array")]
    ChannelNotArray(String),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("data source reported an error: {0}")]
    Remote(String),
}

/// A user-entered year range that cannot be applied.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    #[error("Start year must be less than end year (got {start}-{end})")]
    StartNotBeforeEnd { start: i32, end: i32 },

    #[error("No dataset loaded")]
    NoData,
}

/// A request the local analysis cannot answer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No datasets specified")]
    NoDatasets,

    #[error("No data in the selected time range")]
    EmptyRange,
}
