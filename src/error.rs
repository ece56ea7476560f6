//! Error type shared by every component.
//!
//! Only setup-time problems are errors. Failed evaluations, budget
//! exhaustion and rejected reactions are regular outcomes of the search
//! and are reported through return values instead.

use thiserror::Error;

/// Errors raised by the search engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SearchError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        SearchError::InvalidConfig(msg.into())
    }
}
