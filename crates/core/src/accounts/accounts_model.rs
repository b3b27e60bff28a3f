//! Account domain models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::DataIntegrityError;

/// Domain model representing an account for the filter period.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub custodian: Option<String>,
    pub account_type_id: String,
    pub account_type_name: String,
    pub account_type_category_id: String,
    pub account_type_category_name: String,
}

/// Accounts indexed by ID, preserving the order they were supplied in.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: Vec<Account>,
    index: HashMap<String, usize>,
}

impl AccountDirectory {
    /// Builds the directory. A duplicated ID keeps its first record.
    pub fn new(accounts: Vec<Account>) -> Self {
        let mut kept = Vec::with_capacity(accounts.len());
        let mut index = HashMap::with_capacity(accounts.len());
        for account in accounts {
            if index.contains_key(&account.id) {
                log::warn!("Duplicate account id {} ignored", account.id);
                continue;
            }
            index.insert(account.id.clone(), kept.len());
            kept.push(account);
        }
        Self {
            accounts: kept,
            index,
        }
    }

    pub fn get(&self, account_id: &str) -> Option<&Account> {
        self.index.get(account_id).map(|&i| &self.accounts[i])
    }

    /// Looks up an account, reporting a missing one as a data-integrity fault.
    pub fn resolve(&self, account_id: &str) -> std::result::Result<&Account, DataIntegrityError> {
        self.get(account_id)
            .ok_or_else(|| DataIntegrityError::UnknownAccount(account_id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// IDs of every account whose type is one of `account_type_ids`, in directory order.
    pub fn ids_for_account_types(&self, account_type_ids: &[String]) -> Vec<String> {
        self.accounts
            .iter()
            .filter(|a| account_type_ids.contains(&a.account_type_id))
            .map(|a| a.id.clone())
            .collect()
    }
}
