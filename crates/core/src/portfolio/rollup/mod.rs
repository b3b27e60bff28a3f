//! Generic N-level grouping of flat records into accumulator trees.

mod rollup_model;

#[cfg(test)]
mod rollup_model_tests;

pub use rollup_model::*;
