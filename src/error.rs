//! Error kinds surfaced by the scoring library.
//!
//! Only two things can go wrong before a table is scored: the overrides are
//! malformed, or the input table cannot be read. Everything that happens once
//! scoring starts (missing cells, flat columns, zero weights) is policy.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RaterError {
    /// A range or weight override (from the CLI or a config file) is malformed
    /// or names something that does not exist.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// The input table does not exist or could not be read.
    #[error("missing required input: {0}")]
    MissingRequiredInput(String),
}

impl RaterError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        RaterError::InvalidConfiguration(msg.into())
    }

    pub(crate) fn input(msg: impl Into<String>) -> Self {
        RaterError::MissingRequiredInput(msg.into())
    }
}
