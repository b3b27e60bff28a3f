//! Allocation models for comparing target and actual asset class weights.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::assets::AssetClass;
use crate::errors::{DataIntegrityError, ValidationError};
use crate::{Error, Result};

/// Target share of the total portfolio for one asset class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetAllocation {
    pub asset_class_id: String,
    /// Fraction of the total portfolio (0-1)
    pub target_percentage: Decimal,
}

impl TargetAllocation {
    pub fn validate(&self) -> Result<()> {
        if self.asset_class_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "assetClassId".to_string(),
            )));
        }
        if self.target_percentage < Decimal::ZERO || self.target_percentage > Decimal::ONE {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Target percentage for {} must be between 0 and 1, got {}",
                self.asset_class_id, self.target_percentage
            ))));
        }
        Ok(())
    }
}

/// One node of the reconciliation tree: an asset class with its target and actual values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetActualClass {
    #[serde(flatten)]
    pub asset_class: AssetClass,
    /// `None` for classes held without a target
    pub target_percentage: Option<Decimal>,
    pub target_value: Decimal,
    pub actual_value: Decimal,
    pub actual_percentage: Decimal,
    /// ID used for charting; shared by every entry folded into "Other"
    pub consolidated_id: String,
    pub color: Option<String>,
}

impl TargetActualClass {
    pub(crate) fn new(asset_class: AssetClass, target_percentage: Option<Decimal>) -> Self {
        let consolidated_id = asset_class.id.clone();
        Self {
            asset_class,
            target_percentage,
            target_value: Decimal::ZERO,
            actual_value: Decimal::ZERO,
            actual_percentage: Decimal::ZERO,
            consolidated_id,
            color: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.asset_class.id
    }

    pub fn has_target(&self) -> bool {
        self.target_percentage.is_some()
    }

    /// Dollars above (positive) or below (negative) target.
    pub fn value_delta(&self) -> Decimal {
        self.actual_value - self.target_value
    }

    /// Actual share minus target share; a class without a target is entirely delta.
    pub fn percentage_delta(&self) -> Decimal {
        self.actual_percentage - self.target_percentage.unwrap_or(Decimal::ZERO)
    }
}

/// A reconciliation tree built for one display level.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationTree {
    /// Requested display level, `None` for the native depth
    pub level: Option<u32>,
    /// Target nodes in target order, followed by target-less nodes in holding order
    pub classes: Vec<TargetActualClass>,
    pub grand_total: Decimal,
    #[serde(skip)]
    pub issues: Vec<DataIntegrityError>,
}

impl AllocationTree {
    pub fn get(&self, asset_class_id: &str) -> Option<&TargetActualClass> {
        self.classes.iter().find(|c| c.id() == asset_class_id)
    }

    pub fn total_target_percentage(&self) -> Decimal {
        self.classes.iter().filter_map(|c| c.target_percentage).sum()
    }
}

/// A chart entry after overflow entries are consolidated into "Other".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartSlice {
    pub id: String,
    pub name: String,
    pub color: String,
    pub actual_value: Decimal,
    pub target_value: Decimal,
    pub actual_percentage: Decimal,
    pub target_percentage: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AllocationSortColumn {
    Name,
    TargetPercentage,
    #[default]
    ActualPercentage,
    ActualValue,
    Delta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}
