use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::MULTI_DATE_LABEL;
use crate::portfolio::rollup::RollupRecord;
use crate::portfolio::value::ValueAccumulator;

/// One security position in one account on the as-of date.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub security_id: String,
    pub security_name: String,
    pub account_id: String,
    pub asset_class_id: String,

    /// Value at the end of the period
    pub balance: Decimal,
    pub quantity: Decimal,
    pub price: Option<Decimal>,

    /// Value at the start of the range, when the position existed then
    pub start_date_value: Option<Decimal>,
    /// Precomputed change in value (fraction), only on unmerged rows
    pub change_in_value: Option<Decimal>,
    pub cost_basis: Option<Decimal>,

    pub last_price_update_date: Option<NaiveDate>,
    pub last_quantity_update_date: Option<NaiveDate>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Accessors shared by raw and merged positions, used by key extractors and filters.
pub trait PositionRecord {
    fn security_id(&self) -> &str;
    fn security_name(&self) -> &str;
    fn account_id(&self) -> &str;
    fn asset_class_id(&self) -> &str;
    fn tags(&self) -> &[String];
}

impl PositionRecord for Holding {
    fn security_id(&self) -> &str {
        &self.security_id
    }

    fn security_name(&self) -> &str {
        &self.security_name
    }

    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn asset_class_id(&self) -> &str {
        &self.asset_class_id
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl RollupRecord for Holding {
    fn start_value(&self) -> Decimal {
        self.start_date_value.unwrap_or(Decimal::ZERO)
    }

    fn end_value(&self) -> Decimal {
        self.balance
    }

    fn cost_basis(&self) -> Option<Decimal> {
        self.cost_basis
    }

    fn is_non_zero(&self) -> bool {
        !self.quantity.is_zero()
    }
}

/// An update date after merging rows that may disagree on it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "kind", content = "date")]
pub enum MergedDate {
    Unknown,
    Single(NaiveDate),
    /// The merged rows carried different dates
    Multi,
}

impl MergedDate {
    fn from_option(date: Option<NaiveDate>) -> Self {
        match date {
            Some(d) => MergedDate::Single(d),
            None => MergedDate::Unknown,
        }
    }

    fn merge(self, other: Option<NaiveDate>) -> Self {
        match (self, MergedDate::from_option(other)) {
            (MergedDate::Multi, _) => MergedDate::Multi,
            (a, b) if a == b => a,
            _ => MergedDate::Multi,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            MergedDate::Single(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for MergedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergedDate::Unknown => Ok(()),
            MergedDate::Single(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            MergedDate::Multi => f.write_str(MULTI_DATE_LABEL),
        }
    }
}

/// All rows of one security in one account, merged for display.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupedHolding {
    pub security_id: String,
    pub security_name: String,
    pub account_id: String,
    pub asset_class_id: String,
    pub balance: Decimal,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub start_date_value: Option<Decimal>,
    /// Carried over only when a single row was merged
    pub change_in_value: Option<Decimal>,
    pub cost_basis: Option<Decimal>,
    pub last_price_update: MergedDate,
    pub last_quantity_update: MergedDate,
    pub tags: Vec<String>,
    /// Number of source rows merged into this holding
    pub source_count: usize,
}

impl GroupedHolding {
    fn from_holding(holding: &Holding) -> Self {
        Self {
            security_id: holding.security_id.clone(),
            security_name: holding.security_name.clone(),
            account_id: holding.account_id.clone(),
            asset_class_id: holding.asset_class_id.clone(),
            balance: holding.balance,
            quantity: holding.quantity,
            price: holding.price,
            start_date_value: holding.start_date_value,
            change_in_value: holding.change_in_value,
            cost_basis: holding.cost_basis,
            last_price_update: MergedDate::from_option(holding.last_price_update_date),
            last_quantity_update: MergedDate::from_option(holding.last_quantity_update_date),
            tags: holding.tags.clone(),
            source_count: 1,
        }
    }

    fn absorb(&mut self, holding: &Holding) {
        self.balance += holding.balance;
        self.quantity += holding.quantity;
        self.start_date_value = sum_optional(self.start_date_value, holding.start_date_value);
        self.cost_basis = sum_optional(self.cost_basis, holding.cost_basis);
        if self.price != holding.price {
            self.price = None;
        }
        self.change_in_value = None;
        self.last_price_update = self
            .last_price_update
            .merge(holding.last_price_update_date);
        self.last_quantity_update = self
            .last_quantity_update
            .merge(holding.last_quantity_update_date);
        for tag in &holding.tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }
        self.source_count += 1;
    }

    pub fn is_merged(&self) -> bool {
        self.source_count > 1
    }

    /// The precomputed change for a single row, otherwise derived from the
    /// merged start and end values.
    pub fn change_in_value_percentage(&self) -> Option<Decimal> {
        if !self.is_merged() && self.change_in_value.is_some() {
            return self.change_in_value;
        }
        let mut acc = ValueAccumulator::new();
        acc.add_values(self.start_value(), self.balance);
        acc.calc_change_in_value_percentage()
    }
}

fn sum_optional(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(Decimal::ZERO) + b.unwrap_or(Decimal::ZERO)),
    }
}

impl PositionRecord for GroupedHolding {
    fn security_id(&self) -> &str {
        &self.security_id
    }

    fn security_name(&self) -> &str {
        &self.security_name
    }

    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn asset_class_id(&self) -> &str {
        &self.asset_class_id
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl RollupRecord for GroupedHolding {
    fn start_value(&self) -> Decimal {
        self.start_date_value.unwrap_or(Decimal::ZERO)
    }

    fn end_value(&self) -> Decimal {
        self.balance
    }

    fn cost_basis(&self) -> Option<Decimal> {
        self.cost_basis
    }

    fn is_non_zero(&self) -> bool {
        !self.quantity.is_zero()
    }
}

/// Merges rows of the same security in the same account, in first-encounter order.
pub fn merge_holdings(holdings: &[Holding]) -> Vec<GroupedHolding> {
    let mut merged: Vec<GroupedHolding> = Vec::new();
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();

    for holding in holdings {
        let key = (holding.account_id.as_str(), holding.security_id.as_str());
        match index.get(&key) {
            Some(&i) => merged[i].absorb(holding),
            None => {
                index.insert(key, merged.len());
                merged.push(GroupedHolding::from_holding(holding));
            }
        }
    }

    merged
}
