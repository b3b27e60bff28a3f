use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountDirectory;
use crate::assets::AssetClassTree;
use crate::errors::ValidationError;
use crate::portfolio::holdings::Holding;
use crate::{Error, Result};

/// The hierarchical filter bar state: a date range, account type -> account,
/// asset class -> asset, tags, and a ledger year.
///
/// Empty lists mean "no filter" at that level. Within a hierarchy a
/// selection at the more specific level overrides the more general one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSelection {
    pub start_date: Option<NaiveDate>,
    pub as_of_date: Option<NaiveDate>,
    pub account_type_ids: Vec<String>,
    pub account_ids: Vec<String>,
    pub asset_class_ids: Vec<String>,
    pub asset_ids: Vec<String>,
    pub tags: Vec<String>,
    pub year: Option<i32>,
}

/// Why targets cannot be shown for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetsUnavailableReason {
    AccountFilter,
    AccountTypeFilter,
    AssetFilter,
    TagFilter,
}

impl fmt::Display for TargetsUnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filter = match self {
            TargetsUnavailableReason::AccountFilter => "account",
            TargetsUnavailableReason::AccountTypeFilter => "account type",
            TargetsUnavailableReason::AssetFilter => "asset",
            TargetsUnavailableReason::TagFilter => "tag",
        };
        write!(f, "Targets are not available when filtering by {}", filter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum TargetsAvailability {
    Available,
    Unavailable(TargetsUnavailableReason),
}

impl FilterSelection {
    pub fn validate(&self) -> Result<()> {
        if let (Some(start), Some(as_of)) = (self.start_date, self.as_of_date) {
            if start > as_of {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Start date {} is after as-of date {}",
                    start, as_of
                ))));
            }
        }
        Ok(())
    }

    /// Accounts the selection admits, or `None` when every account is admitted.
    pub fn effective_account_ids(&self, accounts: &AccountDirectory) -> Option<HashSet<String>> {
        if !self.account_ids.is_empty() {
            Some(self.account_ids.iter().cloned().collect())
        } else if !self.account_type_ids.is_empty() {
            Some(
                accounts
                    .ids_for_account_types(&self.account_type_ids)
                    .into_iter()
                    .collect(),
            )
        } else {
            None
        }
    }

    /// Asset classes the selection admits, each expanded to its descendants,
    /// or `None` when every class is admitted.
    pub fn effective_asset_class_ids(&self, tree: &AssetClassTree) -> Option<HashSet<String>> {
        if self.asset_class_ids.is_empty() {
            return None;
        }
        Some(
            self.asset_class_ids
                .iter()
                .flat_map(|id| tree.self_and_descendant_ids(id))
                .collect(),
        )
    }

    /// Whether a holding passes every level of the selection. Selected
    /// assets override selected asset classes.
    pub fn matches_holding(
        &self,
        holding: &Holding,
        accounts: &AccountDirectory,
        tree: &AssetClassTree,
    ) -> bool {
        self.admits(
            holding,
            self.effective_account_ids(accounts).as_ref(),
            self.effective_asset_class_ids(tree).as_ref(),
        )
    }

    /// Holdings that pass the selection, in input order.
    pub fn apply(
        &self,
        holdings: &[Holding],
        accounts: &AccountDirectory,
        tree: &AssetClassTree,
    ) -> Vec<Holding> {
        let account_ids = self.effective_account_ids(accounts);
        let class_ids = self.effective_asset_class_ids(tree);
        holdings
            .iter()
            .filter(|h| self.admits(h, account_ids.as_ref(), class_ids.as_ref()))
            .cloned()
            .collect()
    }

    fn admits(
        &self,
        holding: &Holding,
        account_ids: Option<&HashSet<String>>,
        class_ids: Option<&HashSet<String>>,
    ) -> bool {
        if account_ids.is_some_and(|ids| !ids.contains(&holding.account_id)) {
            return false;
        }
        let asset_ok = if self.asset_ids.is_empty() {
            class_ids.map_or(true, |ids| ids.contains(&holding.asset_class_id))
        } else {
            self.asset_ids.contains(&holding.security_id)
        };
        asset_ok && (self.tags.is_empty() || holding.tags.iter().any(|t| self.tags.contains(t)))
    }

    /// Targets are unavailable whenever the selection narrows the portfolio
    /// to a subset of accounts or holdings. Asset class filters keep them.
    pub fn targets_availability(&self) -> TargetsAvailability {
        let reason = if !self.account_ids.is_empty() {
            Some(TargetsUnavailableReason::AccountFilter)
        } else if !self.account_type_ids.is_empty() {
            Some(TargetsUnavailableReason::AccountTypeFilter)
        } else if !self.asset_ids.is_empty() {
            Some(TargetsUnavailableReason::AssetFilter)
        } else if !self.tags.is_empty() {
            Some(TargetsUnavailableReason::TagFilter)
        } else {
            None
        };
        match reason {
            Some(reason) => TargetsAvailability::Unavailable(reason),
            None => TargetsAvailability::Available,
        }
    }
}
