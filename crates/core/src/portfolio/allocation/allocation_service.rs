//! Service for reconciling target allocations with actual holdings.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::assets::AssetClassTree;
use crate::constants::{OTHER_CONSOLIDATED_COLOR, OTHER_CONSOLIDATED_ID, OTHER_CONSOLIDATED_NAME};
use crate::errors::DataIntegrityError;
use crate::portfolio::holdings::Holding;
use crate::settings::ReportSettings;

use super::{
    AllocationSortColumn, AllocationTree, ChartSlice, SortDirection, TargetActualClass,
    TargetAllocation,
};

/// Trait for allocation service.
pub trait AllocationServiceTrait: Send + Sync {
    /// Builds a fresh target/actual tree at `level`, or at the data's native
    /// depth when `level` is `None`.
    fn build_target_actual_tree(
        &self,
        asset_classes: &AssetClassTree,
        targets: &[TargetAllocation],
        holdings: &[Holding],
        level: Option<u32>,
    ) -> AllocationTree;

    /// Assigns chart colors to already-sorted classes and folds every entry
    /// beyond the palette size into a single "Other" slice.
    fn consolidate_for_chart(&self, classes: &mut [TargetActualClass]) -> Vec<ChartSlice>;
}

/// Service for computing target vs. actual allocations.
pub struct AllocationService {
    settings: ReportSettings,
}

impl AllocationService {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    /// Maps an asset class to the ID it is keyed by at `level`.
    fn keyed_id(
        asset_classes: &AssetClassTree,
        asset_class_id: &str,
        level: Option<u32>,
    ) -> std::result::Result<String, DataIntegrityError> {
        match level {
            Some(level) => asset_classes.relevel_id(asset_class_id, level),
            None => asset_classes
                .resolve(asset_class_id)
                .map(|c| c.id.clone()),
        }
    }

    /// Re-levels targets, summing targets that land on the same ancestor.
    fn regroup_targets(
        asset_classes: &AssetClassTree,
        targets: &[TargetAllocation],
        level: Option<u32>,
        issues: &mut Vec<DataIntegrityError>,
    ) -> Vec<(String, Decimal)> {
        let mut grouped: Vec<(String, Decimal)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for target in targets {
            let id = match Self::keyed_id(asset_classes, &target.asset_class_id, level) {
                Ok(id) => id,
                Err(e) => {
                    warn!("Omitting target for {}: {}", target.asset_class_id, e);
                    issues.push(e);
                    continue;
                }
            };
            match index.get(&id) {
                Some(&i) => grouped[i].1 += target.target_percentage,
                None => {
                    index.insert(id.clone(), grouped.len());
                    grouped.push((id, target.target_percentage));
                }
            }
        }

        grouped
    }
}

impl AllocationServiceTrait for AllocationService {
    fn build_target_actual_tree(
        &self,
        asset_classes: &AssetClassTree,
        targets: &[TargetAllocation],
        holdings: &[Holding],
        level: Option<u32>,
    ) -> AllocationTree {
        debug!(
            "Building target/actual tree from {} targets and {} holdings at level {:?}",
            targets.len(),
            holdings.len(),
            level
        );

        let mut issues = Vec::new();
        let targets = Self::regroup_targets(asset_classes, targets, level, &mut issues);

        // Every target's own class and descendants point back to it; first target wins.
        let mut child_to_target: HashMap<String, String> = HashMap::new();
        for (target_id, _) in &targets {
            for id in asset_classes.self_and_descendant_ids(target_id) {
                child_to_target
                    .entry(id)
                    .or_insert_with(|| target_id.clone());
            }
        }

        let mut classes: Vec<TargetActualClass> = Vec::with_capacity(targets.len());
        let mut index: HashMap<String, usize> = HashMap::new();
        for (target_id, percentage) in &targets {
            // Re-levelled IDs always resolve, keyed_id checked them.
            if let Some(asset_class) = asset_classes.get(target_id) {
                index.insert(target_id.clone(), classes.len());
                classes.push(TargetActualClass::new(
                    asset_class.clone(),
                    Some(*percentage),
                ));
            }
        }

        let mut grand_total = Decimal::ZERO;
        for holding in holdings {
            let node_id = match child_to_target.get(&holding.asset_class_id) {
                Some(target_id) if level.is_none() => target_id.clone(),
                _ => match Self::keyed_id(asset_classes, &holding.asset_class_id, level) {
                    Ok(id) => child_to_target.get(&id).cloned().unwrap_or(id),
                    Err(e) => {
                        warn!(
                            "Skipping holding {} in account {}: {}",
                            holding.security_id, holding.account_id, e
                        );
                        issues.push(e);
                        continue;
                    }
                },
            };

            let idx = match index.get(&node_id) {
                Some(&idx) => idx,
                None => match asset_classes.get(&node_id) {
                    Some(asset_class) => {
                        index.insert(node_id.clone(), classes.len());
                        classes.push(TargetActualClass::new(asset_class.clone(), None));
                        classes.len() - 1
                    }
                    None => {
                        let e = DataIntegrityError::UnknownAssetClass(node_id);
                        warn!("Skipping holding {}: {}", holding.security_id, e);
                        issues.push(e);
                        continue;
                    }
                },
            };

            classes[idx].actual_value += holding.balance;
            grand_total += holding.balance;
        }

        for class in &mut classes {
            if grand_total.is_zero() {
                class.target_value = Decimal::ZERO;
                class.actual_percentage = Decimal::ZERO;
            } else {
                class.target_value =
                    grand_total * class.target_percentage.unwrap_or(Decimal::ZERO);
                class.actual_percentage = class.actual_value / grand_total;
            }
        }

        debug!(
            "Target/actual tree has {} classes, total {}, {} issues",
            classes.len(),
            grand_total,
            issues.len()
        );

        AllocationTree {
            level,
            classes,
            grand_total,
            issues,
        }
    }

    fn consolidate_for_chart(&self, classes: &mut [TargetActualClass]) -> Vec<ChartSlice> {
        let palette = &self.settings.chart_colors;
        let mut slices = Vec::with_capacity(classes.len().min(palette.len() + 1));
        let mut other: Option<ChartSlice> = None;

        for (i, class) in classes.iter_mut().enumerate() {
            let target_percentage = class.target_percentage.unwrap_or(Decimal::ZERO);
            match palette.get(i) {
                Some(color) => {
                    class.consolidated_id = class.asset_class.id.clone();
                    class.color = Some(color.clone());
                    slices.push(ChartSlice {
                        id: class.asset_class.id.clone(),
                        name: class.asset_class.name.clone(),
                        color: color.clone(),
                        actual_value: class.actual_value,
                        target_value: class.target_value,
                        actual_percentage: class.actual_percentage,
                        target_percentage,
                    });
                }
                None => {
                    class.consolidated_id = OTHER_CONSOLIDATED_ID.to_string();
                    class.color = Some(OTHER_CONSOLIDATED_COLOR.to_string());
                    let slice = other.get_or_insert_with(|| ChartSlice {
                        id: OTHER_CONSOLIDATED_ID.to_string(),
                        name: OTHER_CONSOLIDATED_NAME.to_string(),
                        color: OTHER_CONSOLIDATED_COLOR.to_string(),
                        actual_value: Decimal::ZERO,
                        target_value: Decimal::ZERO,
                        actual_percentage: Decimal::ZERO,
                        target_percentage: Decimal::ZERO,
                    });
                    slice.actual_value += class.actual_value;
                    slice.target_value += class.target_value;
                    slice.actual_percentage += class.actual_percentage;
                    slice.target_percentage += target_percentage;
                }
            }
        }

        slices.extend(other);
        slices
    }
}

/// Sorts classes by `column`, breaking ties by asset class ID so the order is total.
pub fn sort_target_actual(
    classes: &mut [TargetActualClass],
    column: AllocationSortColumn,
    direction: SortDirection,
) {
    classes.sort_by(|a, b| {
        let ordering = match column {
            AllocationSortColumn::Name => a.asset_class.full_name.cmp(&b.asset_class.full_name),
            AllocationSortColumn::TargetPercentage => a
                .target_percentage
                .unwrap_or(Decimal::ZERO)
                .cmp(&b.target_percentage.unwrap_or(Decimal::ZERO)),
            AllocationSortColumn::ActualPercentage => {
                a.actual_percentage.cmp(&b.actual_percentage)
            }
            AllocationSortColumn::ActualValue => a.actual_value.cmp(&b.actual_value),
            AllocationSortColumn::Delta => a.percentage_delta().cmp(&b.percentage_delta()),
        };
        let ordering = match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering == Ordering::Equal {
            a.id().cmp(b.id())
        } else {
            ordering
        }
    });
}
