mod returns_model;

pub use returns_model::*;
