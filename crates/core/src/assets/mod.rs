//! Assets module - asset class hierarchy and re-leveling.

mod asset_class_model;


// Re-export the public interface
pub use asset_class_model::{AssetClass, AssetClassTree};
