//! Filter bar selection and how it narrows the input records.

mod filter_model;


pub use filter_model::*;
