//! Category -> subcategory -> leaf trees, each node holding its own accumulator.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::PORTFOLIO_TOTAL_ACCOUNT_ID;
use crate::errors::DataIntegrityError;
use crate::portfolio::value::ValueAccumulator;

/// A record that can be folded into a rollup tree.
pub trait RollupRecord {
    /// Value at the start of the range. Zero when unknown.
    fn start_value(&self) -> Decimal;

    /// Value at the end of the range.
    fn end_value(&self) -> Decimal;

    fn cost_basis(&self) -> Option<Decimal> {
        None
    }

    /// Whether the record still carries quantity or activity.
    ///
    /// Dollar values are not a substitute: a fully written-down position is
    /// still held, and a closed position may carry a stale balance.
    fn is_non_zero(&self) -> bool;
}

/// Identity of a group at one level of the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupKey {
    pub id: String,
    pub name: String,
}

impl GroupKey {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

pub type KeyResult = std::result::Result<GroupKey, DataIntegrityError>;

/// Extracts the group key of a record for one level of the tree.
pub type KeyExtractor<'a, T> = Box<dyn Fn(&T) -> KeyResult + 'a>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollupNode {
    pub key: GroupKey,
    pub values: ValueAccumulator,
    pub has_non_zero: bool,
    pub record_count: usize,
    pub children: Vec<RollupNode>,
    #[serde(skip)]
    child_index: HashMap<String, usize>,
}

impl RollupNode {
    fn new(key: GroupKey) -> Self {
        Self {
            key,
            values: ValueAccumulator::new(),
            has_non_zero: false,
            record_count: 0,
            children: Vec::new(),
            child_index: HashMap::new(),
        }
    }

    fn add_record<T: RollupRecord>(&mut self, record: &T) {
        self.values
            .add_values(record.start_value(), record.end_value());
        if let Some(cost_basis) = record.cost_basis() {
            self.values.add_cost_basis(cost_basis);
        }
        self.has_non_zero |= record.is_non_zero();
        self.record_count += 1;
    }

    fn child_or_insert(&mut self, key: &GroupKey) -> &mut RollupNode {
        let idx = match self.child_index.get(&key.id) {
            Some(&idx) => idx,
            None => {
                self.child_index.insert(key.id.clone(), self.children.len());
                self.children.push(RollupNode::new(key.clone()));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    fn reindex(&mut self) {
        self.child_index = self
            .children
            .iter()
            .enumerate()
            .map(|(i, c)| (c.key.id.clone(), i))
            .collect();
    }

    pub fn child(&self, id: &str) -> Option<&RollupNode> {
        self.child_index.get(id).map(|&i| &self.children[i])
    }

    /// Children that still hold something.
    pub fn visible_children(&self) -> impl Iterator<Item = &RollupNode> {
        self.children.iter().filter(|c| c.has_non_zero)
    }

    /// Removes every all-zero subtree below this node.
    pub fn prune_zero_groups(&mut self) {
        self.children.retain(|c| c.has_non_zero);
        for child in &mut self.children {
            child.prune_zero_groups();
        }
        self.reindex();
    }

    /// Sorts children at every depth with `compare`, breaking ties by ID so
    /// the resulting order is total and identical across renders.
    pub fn sort_by<F>(&mut self, compare: &F)
    where
        F: Fn(&RollupNode, &RollupNode) -> Ordering,
    {
        self.children
            .sort_by(|a, b| compare(a, b).then_with(|| a.key.id.cmp(&b.key.id)));
        for child in &mut self.children {
            child.sort_by(compare);
        }
        self.reindex();
    }

    /// This node's share of `grand_total`.
    pub fn percentage_of_total(&self, grand_total: Decimal) -> Option<Decimal> {
        self.values.percentage_of_total(grand_total)
    }
}

/// Orders nodes alphabetically by display name.
pub fn compare_by_name(a: &RollupNode, b: &RollupNode) -> Ordering {
    a.key.name.cmp(&b.key.name)
}

/// Orders nodes by end value, largest first.
pub fn compare_by_end_value_desc(a: &RollupNode, b: &RollupNode) -> Ordering {
    b.values
        .aggregate_end_value()
        .cmp(&a.values.aggregate_end_value())
}

/// Orders nodes by change in value, largest first, with "N/A" last.
pub fn compare_by_change_desc(a: &RollupNode, b: &RollupNode) -> Ordering {
    match (
        a.values.calc_change_in_value_percentage(),
        b.values.calc_change_in_value_percentage(),
    ) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// A grouped tree plus the records that could not be placed in it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollup {
    /// Portfolio-wide node; its children are the first grouping level.
    pub root: RollupNode,
    #[serde(skip)]
    pub issues: Vec<DataIntegrityError>,
}

impl Rollup {
    /// Groups `records` by one key extractor per level.
    ///
    /// Groups are created on first encounter; accumulated sums are
    /// independent of input order. A record whose key cannot be extracted at
    /// any level is skipped entirely and reported.
    pub fn build<T: RollupRecord>(records: &[T], levels: &[KeyExtractor<'_, T>]) -> Self {
        let mut root = RollupNode::new(GroupKey::new(PORTFOLIO_TOTAL_ACCOUNT_ID, "Total"));
        let mut issues = Vec::new();

        'records: for record in records {
            let mut keys = Vec::with_capacity(levels.len());
            for extract in levels {
                match extract(record) {
                    Ok(key) => keys.push(key),
                    Err(e) => {
                        warn!("Skipping record in rollup: {}", e);
                        issues.push(e);
                        continue 'records;
                    }
                }
            }

            root.add_record(record);
            let mut node = &mut root;
            for key in &keys {
                node = node.child_or_insert(key);
                node.add_record(record);
            }
        }

        Self { root, issues }
    }

    pub fn groups(&self) -> &[RollupNode] {
        &self.root.children
    }

    pub fn group(&self, id: &str) -> Option<&RollupNode> {
        self.root.child(id)
    }

    /// Denominator for every node's percentage of total.
    pub fn grand_total(&self) -> Decimal {
        self.root.values.aggregate_end_value()
    }

    pub fn sort_by<F>(&mut self, compare: &F)
    where
        F: Fn(&RollupNode, &RollupNode) -> Ordering,
    {
        self.root.sort_by(compare);
    }

    pub fn prune_zero_groups(&mut self) {
        self.root.prune_zero_groups();
    }
}
