//! Cashflow ledger models.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::errors::DataIntegrityError;

/// Category attached to a cash transaction by the external data source.
///
/// Strings outside the known set deserialize to [`CashflowCategory::Unknown`]
/// so a single bad record can be reported instead of failing the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CashflowCategory {
    Deposits,
    PurchasesAndFees,
    Sales,
    Withdrawals,
    Interest,
    Dividends,
    CapitalGains,
    Distributions,
    Transfers,
    /// Transactions the source left uncategorized ("None")
    Uncategorized,
    Unknown(String),
}

impl CashflowCategory {
    pub fn as_str(&self) -> &str {
        match self {
            CashflowCategory::Deposits => "Deposits",
            CashflowCategory::PurchasesAndFees => "Purchases and Fees",
            CashflowCategory::Sales => "Sales",
            CashflowCategory::Withdrawals => "Withdrawals",
            CashflowCategory::Interest => "Interest",
            CashflowCategory::Dividends => "Dividends",
            CashflowCategory::CapitalGains => "Capital Gains",
            CashflowCategory::Distributions => "Distributions",
            CashflowCategory::Transfers => "Transfers",
            CashflowCategory::Uncategorized => "None",
            CashflowCategory::Unknown(raw) => raw,
        }
    }

    /// Position in [`CategoryTotals`], `None` for unknown categories.
    fn slot(&self) -> Option<usize> {
        match self {
            CashflowCategory::Deposits => Some(0),
            CashflowCategory::PurchasesAndFees => Some(1),
            CashflowCategory::Sales => Some(2),
            CashflowCategory::Withdrawals => Some(3),
            CashflowCategory::Interest => Some(4),
            CashflowCategory::Dividends => Some(5),
            CashflowCategory::CapitalGains => Some(6),
            CashflowCategory::Distributions => Some(7),
            CashflowCategory::Transfers => Some(8),
            CashflowCategory::Uncategorized => Some(9),
            CashflowCategory::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.slot().is_some()
    }
}

const CATEGORY_COUNT: usize = 10;

/// Rounds half away from zero, so 0.125 becomes 0.13.
fn round_money(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Every category a ledger keeps a total for, in display order.
pub static KNOWN_CATEGORIES: [CashflowCategory; CATEGORY_COUNT] = [
    CashflowCategory::Deposits,
    CashflowCategory::PurchasesAndFees,
    CashflowCategory::Sales,
    CashflowCategory::Withdrawals,
    CashflowCategory::Interest,
    CashflowCategory::Dividends,
    CashflowCategory::CapitalGains,
    CashflowCategory::Distributions,
    CashflowCategory::Transfers,
    CashflowCategory::Uncategorized,
];

impl fmt::Display for CashflowCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for CashflowCategory {
    fn from(value: String) -> Self {
        match value.trim() {
            "Deposits" => CashflowCategory::Deposits,
            "Purchases and Fees" => CashflowCategory::PurchasesAndFees,
            "Sales" => CashflowCategory::Sales,
            "Withdrawals" => CashflowCategory::Withdrawals,
            "Interest" => CashflowCategory::Interest,
            "Dividends" => CashflowCategory::Dividends,
            "Capital Gains" => CashflowCategory::CapitalGains,
            "Distributions" => CashflowCategory::Distributions,
            "Transfers" => CashflowCategory::Transfers,
            "None" => CashflowCategory::Uncategorized,
            _ => CashflowCategory::Unknown(value),
        }
    }
}

impl From<CashflowCategory> for String {
    fn from(value: CashflowCategory) -> Self {
        match value {
            CashflowCategory::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// Signed activity per known category. Serializes as a map keyed by the
/// category's display name, skipping categories with no activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryTotals {
    amounts: [Decimal; CATEGORY_COUNT],
    touched: [bool; CATEGORY_COUNT],
}

impl CategoryTotals {
    /// Adds `amount` to the category's total. Returns `false` for unknown
    /// categories, which have no slot.
    pub fn add(&mut self, category: &CashflowCategory, amount: Decimal) -> bool {
        match category.slot() {
            Some(i) => {
                self.amounts[i] += amount;
                self.touched[i] = true;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, category: &CashflowCategory) -> Decimal {
        category
            .slot()
            .map(|i| self.amounts[i])
            .unwrap_or(Decimal::ZERO)
    }

    /// Categories that received at least one transaction, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static CashflowCategory, Decimal)> + '_ {
        KNOWN_CATEGORIES
            .iter()
            .zip(self.amounts.iter().zip(self.touched.iter()))
            .filter(|(_, (_, touched))| **touched)
            .map(|(category, (amount, _))| (category, *amount))
    }

    pub fn total(&self) -> Decimal {
        self.amounts.iter().copied().sum()
    }

    pub fn is_empty(&self) -> bool {
        !self.touched.iter().any(|t| *t)
    }

    pub fn merge(&mut self, other: &CategoryTotals) {
        for i in 0..CATEGORY_COUNT {
            self.amounts[i] += other.amounts[i];
            self.touched[i] |= other.touched[i];
        }
    }

    pub fn round_dp(&mut self, dp: u32) {
        for amount in self.amounts.iter_mut() {
            *amount = round_money(*amount, dp);
        }
    }
}

impl Serialize for CategoryTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let entries: Vec<_> = self.iter().collect();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (category, amount) in entries {
            map.serialize_entry(category.as_str(), &amount)?;
        }
        map.end()
    }
}

/// A categorized cash transaction as returned for one ledger year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CashflowTransaction {
    pub month: u32,
    pub year: i32,
    pub account_id: String,
    pub account_name: String,
    pub category: CashflowCategory,
    /// Signed: inflows positive, outflows negative
    pub amount: Decimal,
    /// Only meaningful for withdrawals
    #[serde(default)]
    pub is_not_drawdown: Option<bool>,
}

impl CashflowTransaction {
    /// Withdrawals count toward the drawdown subtotal unless flagged otherwise.
    pub fn counts_as_drawdown(&self) -> bool {
        self.category == CashflowCategory::Withdrawals && !self.is_not_drawdown.unwrap_or(false)
    }
}

/// A per-account figure for one month: a starting balance or a reserve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBalance {
    pub account_id: String,
    pub month: u32,
    pub year: i32,
    pub value: Decimal,
    /// `true` when explicitly recorded for this period, `false` when inherited
    pub is_actual_value: bool,
}

/// Ledger figures for one node: an account-month, a month, or the whole year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowMetrics {
    pub starting_cash_balance: Decimal,
    pub activity: CategoryTotals,
    pub ending_cash_balance: Decimal,
    pub reserve: Decimal,
    pub is_reserve_actual: bool,
    /// Positive magnitude of withdrawals that count as drawdown
    pub drawndown: Decimal,
    pub available_to_drawdown: Decimal,
}

impl CashflowMetrics {
    pub(crate) fn seeded(
        starting_cash_balance: Decimal,
        reserve: Decimal,
        is_reserve_actual: bool,
    ) -> Self {
        Self {
            starting_cash_balance,
            reserve,
            is_reserve_actual,
            ..Self::default()
        }
    }

    /// Withdrawals total as displayed in the category column.
    pub fn withdrawals(&self) -> Decimal {
        self.activity.get(&CashflowCategory::Withdrawals)
    }

    /// Whether the drawdown subtotal differs from the withdrawals total, in
    /// which case both are shown.
    pub fn drawdown_differs_from_withdrawals(&self) -> bool {
        self.drawndown != -self.withdrawals()
    }

    /// Rounds the accumulated figures, then derives the ending and available
    /// balances from the rounded values so each node adds up as displayed.
    pub(crate) fn settle(&mut self, dp: u32) {
        self.starting_cash_balance = round_money(self.starting_cash_balance, dp);
        self.activity.round_dp(dp);
        self.reserve = round_money(self.reserve, dp);
        self.drawndown = round_money(self.drawndown, dp);
        self.ending_cash_balance = self.starting_cash_balance + self.activity.total();
        self.available_to_drawdown = self.ending_cash_balance - self.reserve;
    }

    /// Adds a settled child node into this subtotal.
    pub(crate) fn absorb(&mut self, child: &CashflowMetrics) {
        self.starting_cash_balance += child.starting_cash_balance;
        self.activity.merge(&child.activity);
        self.ending_cash_balance += child.ending_cash_balance;
        self.reserve += child.reserve;
        self.is_reserve_actual &= child.is_reserve_actual;
        self.drawndown += child.drawndown;
        self.available_to_drawdown = self.ending_cash_balance - self.reserve;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountLedger {
    pub account_id: String,
    pub account_name: String,
    #[serde(flatten)]
    pub metrics: CashflowMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthLedger {
    pub month: u32,
    /// Account nodes keyed by account ID
    pub accounts: BTreeMap<String, AccountLedger>,
    pub total: CashflowMetrics,
}

impl MonthLedger {
    pub fn account(&self, account_id: &str) -> Option<&AccountLedger> {
        self.accounts.get(account_id)
    }
}

/// A full year of ledger nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownLedger {
    pub year: i32,
    /// Active months only, ascending
    pub months: BTreeMap<u32, MonthLedger>,
    pub total: CashflowMetrics,
    #[serde(skip)]
    pub issues: Vec<DataIntegrityError>,
}

impl DrawdownLedger {
    pub fn month(&self, month: u32) -> Option<&MonthLedger> {
        self.months.get(&month)
    }

    pub fn account(&self, month: u32, account_id: &str) -> Option<&AccountLedger> {
        self.month(month).and_then(|m| m.account(account_id))
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}
