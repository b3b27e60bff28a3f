//! Report settings supplied by the host application.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CHART_COLORS, DISPLAY_DECIMAL_PRECISION};
use crate::{Error, Result};

/// Largest rounding precision the engine accepts for currency fields.
const MAX_DISPLAY_PRECISION: u32 = 8;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportSettings {
    /// Chart palette. Its length is the number of distinct chart slices
    /// before the remainder is consolidated into "Other".
    pub chart_colors: Vec<String>,
    /// Decimal places currency fields are rounded to in the final ledger pass
    pub display_precision: u32,
    /// Drop groups whose leaves all have zero quantity
    pub hide_zero_groups: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            chart_colors: DEFAULT_CHART_COLORS.iter().map(|c| c.to_string()).collect(),
            display_precision: DISPLAY_DECIMAL_PRECISION,
            hide_zero_groups: true,
        }
    }
}

impl ReportSettings {
    /// Parses settings from a JSON document. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: ReportSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chart_colors.is_empty() {
            return Err(Error::InvalidConfigValue(
                "chartColors must contain at least one color".to_string(),
            ));
        }
        if let Some(blank) = self.chart_colors.iter().position(|c| c.trim().is_empty()) {
            return Err(Error::InvalidConfigValue(format!(
                "chartColors[{}] is empty",
                blank
            )));
        }
        if self.display_precision > MAX_DISPLAY_PRECISION {
            return Err(Error::InvalidConfigValue(format!(
                "displayPrecision must be at most {}, got {}",
                MAX_DISPLAY_PRECISION, self.display_precision
            )));
        }
        Ok(())
    }

    /// Number of chart slices available before consolidation.
    pub fn chart_slot_count(&self) -> usize {
        self.chart_colors.len()
    }
}
