//! Drawdown cashflow ledger: per-account, per-month cash activity with reserves.

mod cashflow_model;
mod drawdown_ledger_service;
mod reserves;


pub use cashflow_model::*;
pub use drawdown_ledger_service::*;
pub use reserves::*;
