//! Running start/end value sums attached to tree nodes.

mod value_accumulator;

pub use value_accumulator::*;
