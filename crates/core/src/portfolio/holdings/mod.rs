mod holdings_grouping;
mod holdings_model;

#[cfg(test)]
mod holdings_model_tests;

pub use holdings_grouping::*;
pub use holdings_model::*;
