//! Reserve edits and month-to-month reserve inheritance.

use std::collections::{BTreeSet, HashMap};

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MONTHS_PER_YEAR;
use crate::errors::ValidationError;
use crate::{Error, Result};

use super::PeriodBalance;

/// A pending reserve edit, mirroring the set/delete commands sent to the
/// external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ReserveChange {
    #[serde(rename_all = "camelCase")]
    Set {
        account_id: String,
        month: u32,
        year: i32,
        value: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    Delete {
        account_id: String,
        month: u32,
        year: i32,
    },
}

impl ReserveChange {
    fn period(&self) -> (&str, u32, i32) {
        match self {
            ReserveChange::Set {
                account_id,
                month,
                year,
                ..
            }
            | ReserveChange::Delete {
                account_id,
                month,
                year,
            } => (account_id.as_str(), *month, *year),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let (account_id, month, _) = self.period();
        if account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "accountId".to_string(),
            )));
        }
        if month == 0 || month > MONTHS_PER_YEAR {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Reserve month must be between 1 and {}, got {}",
                MONTHS_PER_YEAR, month
            ))));
        }
        if let ReserveChange::Set { value, .. } = self {
            if *value < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Reserve for account {} cannot be negative, got {}",
                    account_id, value
                ))));
            }
        }
        Ok(())
    }
}

/// Applies one edit to a reserve list. A set replaces whatever is stored for
/// that period with an actual record; a delete removes the actual record so
/// the period falls back to inheritance.
pub fn apply_reserve_change(
    records: &mut Vec<PeriodBalance>,
    change: &ReserveChange,
) -> Result<()> {
    change.validate()?;
    let (account_id, month, year) = change.period();
    let same_period =
        |r: &PeriodBalance| r.account_id == account_id && r.month == month && r.year == year;

    match change {
        ReserveChange::Set { value, .. } => {
            records.retain(|r| !same_period(r));
            records.push(PeriodBalance {
                account_id: account_id.to_string(),
                month,
                year,
                value: *value,
                is_actual_value: true,
            });
        }
        ReserveChange::Delete { .. } => {
            records.retain(|r| !(same_period(r) && r.is_actual_value));
        }
    }
    Ok(())
}

/// Recomputes inherited reserves for `year`.
///
/// Per account, walks months 1 to 12: an actual record resets the carried
/// value, any other month receives an inherited copy of it. The carry starts
/// from the account's latest actual record before `year`; months before the
/// first known value get no record. Output is ordered by account, then month.
pub fn forward_fill_reserves(records: &[PeriodBalance], year: i32) -> Vec<PeriodBalance> {
    let accounts: BTreeSet<&str> = records.iter().map(|r| r.account_id.as_str()).collect();

    let mut actual: HashMap<(&str, u32), Decimal> = HashMap::new();
    let mut carried: HashMap<&str, (i32, u32, Decimal)> = HashMap::new();
    for record in records.iter().filter(|r| r.is_actual_value) {
        if record.year == year {
            actual.insert((record.account_id.as_str(), record.month), record.value);
        } else if record.year < year {
            let key = (record.year, record.month);
            carried
                .entry(record.account_id.as_str())
                .and_modify(|c| {
                    if key > (c.0, c.1) {
                        *c = (record.year, record.month, record.value);
                    }
                })
                .or_insert((record.year, record.month, record.value));
        }
    }

    let mut filled = Vec::new();
    for account_id in accounts {
        let mut carry = carried.get(account_id).map(|c| c.2);
        for month in 1..=MONTHS_PER_YEAR {
            let is_actual_value = match actual.get(&(account_id, month)) {
                Some(value) => {
                    carry = Some(*value);
                    true
                }
                None => false,
            };
            if let Some(value) = carry {
                filled.push(PeriodBalance {
                    account_id: account_id.to_string(),
                    month,
                    year,
                    value,
                    is_actual_value,
                });
            }
        }
    }

    debug!(
        "Forward-filled {} reserve records for {} from {} inputs",
        filled.len(),
        year,
        records.len()
    );
    filled
}
