//! Core error types for the reporting engine.
//!
//! Every computation in this crate is pure, so the only failures are bad
//! configuration, bad input values, and references in the input data that
//! cannot be resolved. The latter are modelled as [`DataIntegrityError`]
//! values: they are collected into the result of a computation and logged,
//! rather than aborting it.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the reporting engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Data integrity fault: {0}")]
    DataIntegrity(#[from] DataIntegrityError),

    #[error("Failed to load configuration: {0}")]
    ConfigIO(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

/// A reference in the input data that the engine could not resolve.
///
/// These never abort a computation. The record carrying the bad reference is
/// skipped and the fault is reported alongside the result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataIntegrityError {
    #[error("Account '{0}' is not present in the account list")]
    UnknownAccount(String),

    #[error("Asset class '{0}' is not present in the asset class list")]
    UnknownAssetClass(String),

    #[error("Asset class '{asset_class_id}' has no ancestor at level {level}")]
    UnresolvableAssetClassLevel { asset_class_id: String, level: u32 },

    #[error("Asset class '{0}' has a cyclic parent chain")]
    CyclicAssetClass(String),

    #[error("Unknown cashflow category '{category}' on transaction for account {account_id} ({year}-{month:02})")]
    UnknownCashflowCategory {
        category: String,
        account_id: String,
        month: u32,
        year: i32,
    },

    #[error("Invalid month {month} on record for account {account_id} in {year}")]
    InvalidMonth {
        account_id: String,
        month: u32,
        year: i32,
    },
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigIO(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
