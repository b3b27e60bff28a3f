//! Reports Core - aggregation and cash ledger engine.
//!
//! Turns flat lists of holdings, accounts, cash transactions, period
//! balances, asset classes, and target allocations into the aggregated
//! trees and totals a reporting dashboard displays. Every computation is
//! pure and synchronous; records that reference unknown data are skipped
//! and reported alongside the result.

pub mod accounts;
pub mod assets;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod portfolio;
pub mod settings;

// Re-export common types from asset and portfolio modules
pub use assets::*;
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
