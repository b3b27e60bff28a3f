//! Accounts module - reference data looked up during grouping and filtering.

mod accounts_model;


// Re-export the public interface
pub use accounts_model::{Account, AccountDirectory};
