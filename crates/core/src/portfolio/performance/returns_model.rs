//! Precomputed return figures and their lookup index.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::portfolio::value::ValueAccumulator;

/// What a return figure was computed over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "id", rename_all = "camelCase")]
pub enum ReturnScope {
    Account(String),
    Asset(String),
    /// Every account in the current filter selection
    Aggregate,
}

/// Period return and money-weighted (XIRR) return for one scope, as
/// computed by the external source for the filter's date range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReturnFigure {
    pub scope: ReturnScope,
    pub period_return: Option<Decimal>,
    pub xirr: Option<Decimal>,
    #[serde(default)]
    pub period_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub period_end_date: Option<NaiveDate>,
}

impl ReturnFigure {
    /// Simple period return derived from aggregated start and end values.
    /// XIRR needs dated cash flows and is left empty.
    pub fn from_values(scope: ReturnScope, values: &ValueAccumulator) -> Self {
        Self {
            scope,
            period_return: values.calc_change_in_value_percentage(),
            xirr: None,
            period_start_date: None,
            period_end_date: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReturnsIndex {
    figures: HashMap<ReturnScope, ReturnFigure>,
}

impl ReturnsIndex {
    /// Indexes figures by scope. A repeated scope keeps its first figure.
    pub fn new(figures: Vec<ReturnFigure>) -> Self {
        let mut index = HashMap::with_capacity(figures.len());
        for figure in figures {
            if index.contains_key(&figure.scope) {
                warn!("Duplicate return figure for {:?} ignored", figure.scope);
                continue;
            }
            index.insert(figure.scope.clone(), figure);
        }
        Self { figures: index }
    }

    pub fn get(&self, scope: &ReturnScope) -> Option<&ReturnFigure> {
        self.figures.get(scope)
    }

    pub fn for_account(&self, account_id: &str) -> Option<&ReturnFigure> {
        self.get(&ReturnScope::Account(account_id.to_string()))
    }

    pub fn for_asset(&self, asset_id: &str) -> Option<&ReturnFigure> {
        self.get(&ReturnScope::Asset(asset_id.to_string()))
    }

    pub fn aggregate(&self) -> Option<&ReturnFigure> {
        self.get(&ReturnScope::Aggregate)
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }
}
