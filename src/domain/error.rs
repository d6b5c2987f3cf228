// Errors raised while fetching and reducing meter data
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeterError {
    #[error("fetching meter data failed: {0}")]
    FetchFailed(String),

    #[error("insufficient data: {usable} usable readings, at least 2 required")]
    InsufficientData { usable: usize },

    #[error("timestamps are not strictly increasing at {at}")]
    NonMonotonicTime { at: DateTime<Utc> },

    #[error("history spans zero days, annual projection unavailable")]
    DivisionByZero,

    #[error("unauthorized chat id {chat_id}")]
    Unauthorized { chat_id: i64 },
}

impl MeterError {
    /// Wrap an adapter failure, keeping its context chain in the message
    pub fn fetch_failed(err: anyhow::Error) -> Self {
        MeterError::FetchFailed(format!("{err:#}"))
    }
}

pub type Result<T> = std::result::Result<T, MeterError>;
