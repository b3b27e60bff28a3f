use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::constants::MONTHS_PER_YEAR;
use crate::errors::DataIntegrityError;
use crate::settings::ReportSettings;
use crate::Result;

use super::{
    apply_reserve_change, forward_fill_reserves, AccountLedger, CashflowMetrics,
    CashflowTransaction, DrawdownLedger, MonthLedger, PeriodBalance, ReserveChange,
};

pub trait DrawdownLedgerServiceTrait: Send + Sync {
    /// Builds the per-account, per-month cash ledger for `year`.
    ///
    /// Starting balances and reserves are looked up per (account, month) and
    /// trusted as given, including their `is_actual_value` flag.
    fn build_ledger(
        &self,
        year: i32,
        transactions: &[CashflowTransaction],
        start_balances: &[PeriodBalance],
        reserves: &[PeriodBalance],
    ) -> DrawdownLedger;

    /// Builds the ledger as it will look once `pending` reserve edits have
    /// been stored and the source has re-inherited later months.
    fn build_ledger_with_pending_reserves(
        &self,
        year: i32,
        transactions: &[CashflowTransaction],
        start_balances: &[PeriodBalance],
        reserves: &[PeriodBalance],
        pending: &[ReserveChange],
    ) -> Result<DrawdownLedger>;
}

pub struct DrawdownLedgerService {
    settings: ReportSettings,
}

type PeriodIndex<'a> = HashMap<(&'a str, u32), &'a PeriodBalance>;

impl DrawdownLedgerService {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    /// Indexes one year's records by (account, month). The first record for a
    /// period wins.
    fn index_period(records: &[PeriodBalance], year: i32) -> PeriodIndex<'_> {
        let mut index = HashMap::new();
        for record in records.iter().filter(|r| r.year == year) {
            index
                .entry((record.account_id.as_str(), record.month))
                .or_insert(record);
        }
        index
    }

    fn lookup(index: &PeriodIndex<'_>, account_id: &str, month: u32) -> (Decimal, bool) {
        index
            .get(&(account_id, month))
            .map(|r| (r.value, r.is_actual_value))
            .unwrap_or((Decimal::ZERO, false))
    }

    /// Settles every account node, then rolls the rounded figures up into
    /// their month and the months into the year.
    fn roll_up(months: &mut BTreeMap<u32, MonthLedger>, dp: u32) -> CashflowMetrics {
        let mut total = CashflowMetrics::default();

        for month in months.values_mut() {
            let mut month_total = CashflowMetrics {
                is_reserve_actual: !month.accounts.is_empty(),
                ..CashflowMetrics::default()
            };
            for account in month.accounts.values_mut() {
                account.metrics.settle(dp);
                month_total.absorb(&account.metrics);
            }
            month.total = month_total;

            total.activity.merge(&month.total.activity);
            total.drawndown += month.total.drawndown;
        }

        // Beginning of year from the first active month, end of year from the last.
        if let Some(first) = months.values().next() {
            total.starting_cash_balance = first.total.starting_cash_balance;
        }
        if let Some(last) = months.values().next_back() {
            total.ending_cash_balance = last.total.ending_cash_balance;
            total.reserve = last.total.reserve;
            total.is_reserve_actual = last.total.is_reserve_actual;
        }
        total.available_to_drawdown = total.ending_cash_balance - total.reserve;

        total
    }
}

impl DrawdownLedgerServiceTrait for DrawdownLedgerService {
    fn build_ledger(
        &self,
        year: i32,
        transactions: &[CashflowTransaction],
        start_balances: &[PeriodBalance],
        reserves: &[PeriodBalance],
    ) -> DrawdownLedger {
        debug!(
            "Building drawdown ledger for {} from {} transactions",
            year,
            transactions.len()
        );

        let start_index = Self::index_period(start_balances, year);
        let reserve_index = Self::index_period(reserves, year);
        let mut months: BTreeMap<u32, MonthLedger> = BTreeMap::new();
        let mut issues = Vec::new();

        for tx in transactions.iter().filter(|t| t.year == year) {
            if tx.month == 0 || tx.month > MONTHS_PER_YEAR {
                let e = DataIntegrityError::InvalidMonth {
                    account_id: tx.account_id.clone(),
                    month: tx.month,
                    year: tx.year,
                };
                warn!("Skipping cashflow transaction: {}", e);
                issues.push(e);
                continue;
            }
            if !tx.category.is_known() {
                let e = DataIntegrityError::UnknownCashflowCategory {
                    category: tx.category.to_string(),
                    account_id: tx.account_id.clone(),
                    month: tx.month,
                    year: tx.year,
                };
                warn!("Skipping cashflow transaction: {}", e);
                issues.push(e);
                continue;
            }

            let month = months.entry(tx.month).or_insert_with(|| MonthLedger {
                month: tx.month,
                accounts: BTreeMap::new(),
                total: CashflowMetrics::default(),
            });
            let account = month
                .accounts
                .entry(tx.account_id.clone())
                .or_insert_with(|| {
                    let (start, _) = Self::lookup(&start_index, &tx.account_id, tx.month);
                    let (reserve, is_actual) =
                        Self::lookup(&reserve_index, &tx.account_id, tx.month);
                    AccountLedger {
                        account_id: tx.account_id.clone(),
                        account_name: tx.account_name.clone(),
                        metrics: CashflowMetrics::seeded(start, reserve, is_actual),
                    }
                });

            account.metrics.activity.add(&tx.category, tx.amount);
            if tx.counts_as_drawdown() {
                account.metrics.drawndown -= tx.amount;
            }
        }

        // Accumulation above stays unrounded; rounding happens once, at the leaves.
        let total = Self::roll_up(&mut months, self.settings.display_precision);

        debug!(
            "Drawdown ledger for {} has {} active months, {} issues",
            year,
            months.len(),
            issues.len()
        );

        DrawdownLedger {
            year,
            months,
            total,
            issues,
        }
    }

    fn build_ledger_with_pending_reserves(
        &self,
        year: i32,
        transactions: &[CashflowTransaction],
        start_balances: &[PeriodBalance],
        reserves: &[PeriodBalance],
        pending: &[ReserveChange],
    ) -> Result<DrawdownLedger> {
        let mut records = reserves.to_vec();
        for change in pending {
            apply_reserve_change(&mut records, change)?;
        }
        let filled = forward_fill_reserves(&records, year);
        Ok(self.build_ledger(year, transactions, start_balances, &filled))
    }
}
