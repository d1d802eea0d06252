use thiserror::Error;

/// Errors raised while loading, scoring or persisting a security's trading score.
///
/// Missing metrics inside a snapshot are never errors; they only lower the
/// affected sub-score.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Security not found: {symbol}")]
    NotFound { symbol: String },

    #[error("Snapshot source error: {0}")]
    DataSource(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Errors raised while validating or running a screener query.
///
/// Unknown preset and sector keys fail fast because silently dropping them
/// would widen the result set. Unknown market-cap, price and performance
/// bracket keys are not errors: they degrade to "no filter".
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScreenerError {
    #[error("Unknown preset '{key}' for category '{category}'")]
    InvalidPreset { category: String, key: String },

    #[error("Unknown preset category: {0}")]
    UnknownCategory(String),

    #[error("Invalid value '{value}' for filter '{dimension}'")]
    InvalidFilterValue { dimension: String, value: String },

    #[error("Screener data source error: {0}")]
    DataSource(String),
}
