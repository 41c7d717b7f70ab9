//! Error handling for Rendimento
//!
//! The calculation core reports typed, recoverable failures through
//! [`CalcError`]. The application edge (config, storage, CLI) uses
//! [`RendimentoError`] plus anyhow for context chaining.

use chrono::NaiveDate;
use thiserror::Error;

/// Failures of a single calculation. None of these are fatal to the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalcError {
    #[error("invalid investment terms: {0}")]
    InvalidTerms(String),

    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("evaluation date {evaluated_on} is before the investment start {start}")]
    InvalidEvaluationDate {
        start: NaiveDate,
        evaluated_on: NaiveDate,
    },

    #[error("arithmetic overflow while computing {0}")]
    Overflow(&'static str),
}

/// Application-level error types
#[derive(Error, Debug)]
pub enum RendimentoError {
    #[error("config error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("snapshot not found: {0}")]
    SnapshotNotFound(String),

    #[error("missing market indicator: {0}")]
    MissingIndicator(&'static str),
}

/// Result type alias for application operations
pub type Result<T> = anyhow::Result<T>;
