//! Asset class reference data and the arena used to walk it.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::errors::DataIntegrityError;

/// A node of the asset class hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetClass {
    pub id: String,
    pub name: String,
    /// Dotted path from the root, e.g. "Equity.US.Large Cap"
    pub full_name: String,
    /// Depth in the hierarchy, 0 for roots
    pub level: u32,
    pub parent_asset_class_id: Option<String>,
    /// Every class below this one, at any depth
    #[serde(default)]
    pub descendant_ids: Vec<String>,
}

/// Immutable arena of asset classes keyed by ID with parent back-references.
///
/// Re-leveling and descendant queries are pure functions over the arena; it is
/// never modified after construction.
#[derive(Debug, Clone, Default)]
pub struct AssetClassTree {
    classes: Vec<AssetClass>,
    index: HashMap<String, usize>,
}

impl AssetClassTree {
    /// Builds the arena. Descendant lists supplied by the caller are kept and
    /// completed with any descendants implied by the parent links.
    pub fn new(classes: Vec<AssetClass>) -> Self {
        let mut kept: Vec<AssetClass> = Vec::with_capacity(classes.len());
        let mut index = HashMap::with_capacity(classes.len());
        for class in classes {
            if index.contains_key(&class.id) {
                log::warn!("Duplicate asset class id {} ignored", class.id);
                continue;
            }
            index.insert(class.id.clone(), kept.len());
            kept.push(class);
        }

        let mut tree = Self {
            classes: kept,
            index,
        };
        tree.complete_descendants();
        tree
    }

    fn complete_descendants(&mut self) {
        let mut implied: Vec<Vec<String>> = vec![Vec::new(); self.classes.len()];
        for class in &self.classes {
            let mut parent = class.parent_asset_class_id.as_deref();
            let mut steps = 0;
            while let Some(parent_id) = parent {
                let Some(&parent_idx) = self.index.get(parent_id) else {
                    break;
                };
                steps += 1;
                if steps > self.classes.len() || parent_id == class.id {
                    log::warn!("Asset class {} has a cyclic parent chain", class.id);
                    break;
                }
                implied[parent_idx].push(class.id.clone());
                parent = self.classes[parent_idx].parent_asset_class_id.as_deref();
            }
        }

        for (class, extra) in self.classes.iter_mut().zip(implied) {
            let mut seen: HashSet<String> = class.descendant_ids.iter().cloned().collect();
            for id in extra {
                if seen.insert(id.clone()) {
                    class.descendant_ids.push(id);
                }
            }
        }
    }

    pub fn get(&self, asset_class_id: &str) -> Option<&AssetClass> {
        self.index.get(asset_class_id).map(|&i| &self.classes[i])
    }

    /// Looks up a class, reporting a missing one as a data-integrity fault.
    pub fn resolve(
        &self,
        asset_class_id: &str,
    ) -> std::result::Result<&AssetClass, DataIntegrityError> {
        self.get(asset_class_id)
            .ok_or_else(|| DataIntegrityError::UnknownAssetClass(asset_class_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetClass> {
        self.classes.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Deepest level present in the arena.
    pub fn max_level(&self) -> u32 {
        self.classes.iter().map(|c| c.level).max().unwrap_or(0)
    }

    /// The class itself followed by all of its descendants.
    pub fn self_and_descendant_ids(&self, asset_class_id: &str) -> Vec<String> {
        let mut ids = vec![asset_class_id.to_string()];
        if let Some(class) = self.get(asset_class_id) {
            ids.extend(class.descendant_ids.iter().cloned());
        }
        ids
    }

    pub fn is_descendant_of(&self, asset_class_id: &str, ancestor_id: &str) -> bool {
        self.get(ancestor_id)
            .map(|a| a.descendant_ids.iter().any(|d| d == asset_class_id))
            .unwrap_or(false)
    }

    /// Walks parent pointers from `asset_class_id` until reaching `level`.
    ///
    /// A class already at or above `level` is returned unchanged.
    pub fn ancestor_at_level(
        &self,
        asset_class_id: &str,
        level: u32,
    ) -> std::result::Result<&AssetClass, DataIntegrityError> {
        let original = self.resolve(asset_class_id)?;
        if original.level <= level {
            return Ok(original);
        }

        let unresolvable = || DataIntegrityError::UnresolvableAssetClassLevel {
            asset_class_id: asset_class_id.to_string(),
            level,
        };

        let mut current = original;
        let mut steps = 0;
        while current.level > level {
            steps += 1;
            if steps > self.classes.len() {
                return Err(DataIntegrityError::CyclicAssetClass(
                    asset_class_id.to_string(),
                ));
            }
            let parent_id = current
                .parent_asset_class_id
                .as_deref()
                .ok_or_else(unresolvable)?;
            current = self.get(parent_id).ok_or_else(unresolvable)?;
        }

        if current.level == level {
            Ok(current)
        } else {
            Err(unresolvable())
        }
    }

    /// ID of the ancestor of `asset_class_id` at `level`.
    pub fn relevel_id(
        &self,
        asset_class_id: &str,
        level: u32,
    ) -> std::result::Result<String, DataIntegrityError> {
        self.ancestor_at_level(asset_class_id, level)
            .map(|c| c.id.clone())
    }
}
