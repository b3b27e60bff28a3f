//! Portfolio aggregation: value accumulators, rollup trees, holdings views,
//! target/actual allocation, cash ledger, and return figures.

pub mod allocation;
pub mod cashflow;
pub mod holdings;
pub mod performance;
pub mod rollup;
pub mod value;

pub use allocation::*;
pub use cashflow::*;
pub use holdings::*;
pub use performance::*;
pub use rollup::*;
pub use value::*;
