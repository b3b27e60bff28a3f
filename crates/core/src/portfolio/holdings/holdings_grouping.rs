//! Key extractors and the service that groups holdings for the holdings views.

use log::debug;

use crate::accounts::AccountDirectory;
use crate::assets::AssetClassTree;
use crate::portfolio::rollup::{GroupKey, KeyExtractor, KeyResult, Rollup};
use crate::settings::ReportSettings;

use super::{merge_holdings, GroupedHolding, Holding, PositionRecord};

/// Groups by the account's type category (e.g. Retirement, Taxable).
pub fn by_account_type_category<'a, T: PositionRecord + 'a>(
    accounts: &'a AccountDirectory,
) -> KeyExtractor<'a, T> {
    Box::new(move |record: &T| -> KeyResult {
        accounts.resolve(record.account_id()).map(|a| {
            GroupKey::new(
                a.account_type_category_id.clone(),
                a.account_type_category_name.clone(),
            )
        })
    })
}

/// Groups by the account's type (e.g. Roth IRA, Brokerage).
pub fn by_account_type<'a, T: PositionRecord + 'a>(
    accounts: &'a AccountDirectory,
) -> KeyExtractor<'a, T> {
    Box::new(move |record: &T| -> KeyResult {
        accounts
            .resolve(record.account_id())
            .map(|a| GroupKey::new(a.account_type_id.clone(), a.account_type_name.clone()))
    })
}

pub fn by_account<'a, T: PositionRecord + 'a>(
    accounts: &'a AccountDirectory,
) -> KeyExtractor<'a, T> {
    Box::new(move |record: &T| -> KeyResult {
        accounts
            .resolve(record.account_id())
            .map(|a| GroupKey::new(a.id.clone(), a.name.clone()))
    })
}

pub fn by_security<'a, T: PositionRecord + 'a>() -> KeyExtractor<'a, T> {
    Box::new(|record: &T| -> KeyResult {
        Ok(GroupKey::new(
            record.security_id().to_string(),
            record.security_name().to_string(),
        ))
    })
}

/// Groups by the record's asset class, re-levelled to `level` when given.
pub fn by_asset_class<'a, T: PositionRecord + 'a>(
    tree: &'a AssetClassTree,
    level: Option<u32>,
) -> KeyExtractor<'a, T> {
    Box::new(move |record: &T| -> KeyResult {
        let class = match level {
            Some(level) => tree.ancestor_at_level(record.asset_class_id(), level)?,
            None => tree.resolve(record.asset_class_id())?,
        };
        Ok(GroupKey::new(class.id.clone(), class.full_name.clone()))
    })
}

/// Service for grouping holdings into rollup trees.
pub trait HoldingsRollupServiceTrait: Send + Sync {
    /// Merges duplicate rows, then groups by account type category, account
    /// type, account, and security.
    fn group_by_account(&self, holdings: &[Holding], accounts: &AccountDirectory) -> Rollup;

    /// Merges duplicate rows, then groups by every asset class level from the
    /// roots down to `level` (the deepest level when `None`), then security.
    fn group_by_asset_class(
        &self,
        holdings: &[Holding],
        tree: &AssetClassTree,
        level: Option<u32>,
    ) -> Rollup;
}

pub struct HoldingsRollupService {
    settings: ReportSettings,
}

impl HoldingsRollupService {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    fn finish(&self, mut rollup: Rollup, view: &str) -> Rollup {
        if self.settings.hide_zero_groups {
            rollup.prune_zero_groups();
        }
        debug!(
            "Grouped holdings by {}: {} top-level groups, {} issues",
            view,
            rollup.groups().len(),
            rollup.issues.len()
        );
        rollup
    }
}

impl HoldingsRollupServiceTrait for HoldingsRollupService {
    fn group_by_account(&self, holdings: &[Holding], accounts: &AccountDirectory) -> Rollup {
        let merged = merge_holdings(holdings);
        let levels: Vec<KeyExtractor<'_, GroupedHolding>> = vec![
            by_account_type_category(accounts),
            by_account_type(accounts),
            by_account(accounts),
            by_security(),
        ];
        self.finish(Rollup::build(&merged, &levels), "account")
    }

    fn group_by_asset_class(
        &self,
        holdings: &[Holding],
        tree: &AssetClassTree,
        level: Option<u32>,
    ) -> Rollup {
        let merged = merge_holdings(holdings);
        let deepest = level.unwrap_or_else(|| tree.max_level());
        let mut levels: Vec<KeyExtractor<'_, GroupedHolding>> = (0..=deepest)
            .map(|l| by_asset_class(tree, Some(l)))
            .collect();
        levels.push(by_security());
        self.finish(Rollup::build(&merged, &levels), "asset class")
    }
}
