//! Tests for holding merges and holdings grouping.

#[cfg(test)]
mod tests {
    use crate::accounts::{Account, AccountDirectory};
    use crate::assets::{AssetClass, AssetClassTree};
    use crate::errors::DataIntegrityError;
    use crate::portfolio::holdings::{
        merge_holdings, Holding, HoldingsRollupService, HoldingsRollupServiceTrait, MergedDate,
    };
    use crate::settings::ReportSettings;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn holding(security: &str, account: &str, class: &str, balance: Decimal, qty: Decimal) -> Holding {
        Holding {
            security_id: security.to_string(),
            security_name: format!("{} Inc", security),
            account_id: account.to_string(),
            asset_class_id: class.to_string(),
            balance,
            quantity: qty,
            price: Some(dec!(10)),
            start_date_value: None,
            change_in_value: None,
            cost_basis: None,
            last_price_update_date: Some(date(2024, 6, 28)),
            last_quantity_update_date: Some(date(2024, 6, 1)),
            tags: Vec::new(),
        }
    }

    fn account(id: &str, type_id: &str, category_id: &str) -> Account {
        Account {
            id: id.to_string(),
            name: format!("Account {}", id),
            custodian: None,
            account_type_id: type_id.to_string(),
            account_type_name: type_id.to_string(),
            account_type_category_id: category_id.to_string(),
            account_type_category_name: category_id.to_string(),
        }
    }

    fn class(id: &str, level: u32, parent: Option<&str>) -> AssetClass {
        AssetClass {
            id: id.to_string(),
            name: id.to_string(),
            full_name: id.to_string(),
            level,
            parent_asset_class_id: parent.map(|p| p.to_string()),
            descendant_ids: Vec::new(),
        }
    }

    #[test]
    fn test_merge_sums_quantity_and_balance() {
        let mut second = holding("VTI", "a1", "EQ.US", dec!(250), dec!(25));
        second.start_date_value = Some(dec!(200));
        second.cost_basis = Some(dec!(180));
        let mut first = holding("VTI", "a1", "EQ.US", dec!(100), dec!(10));
        first.change_in_value = Some(dec!(0.1));

        let merged = merge_holdings(&[first, second]);
        assert_eq!(merged.len(), 1);
        let m = &merged[0];
        assert_eq!(m.quantity, dec!(35));
        assert_eq!(m.balance, dec!(350));
        assert_eq!(m.start_date_value, Some(dec!(200)));
        assert_eq!(m.cost_basis, Some(dec!(180)));
        assert_eq!(m.change_in_value, None);
        assert_eq!(m.source_count, 2);
        assert_eq!(m.price, Some(dec!(10)));
    }

    #[test]
    fn test_merge_keeps_matching_dates() {
        let merged = merge_holdings(&[
            holding("VTI", "a1", "EQ.US", dec!(100), dec!(10)),
            holding("VTI", "a1", "EQ.US", dec!(100), dec!(10)),
        ]);
        assert_eq!(merged[0].last_price_update, MergedDate::Single(date(2024, 6, 28)));
        assert_eq!(merged[0].last_price_update.to_string(), "2024-06-28");
    }

    #[test]
    fn test_merge_marks_differing_dates_as_multi() {
        let mut second = holding("VTI", "a1", "EQ.US", dec!(100), dec!(10));
        second.last_price_update_date = Some(date(2024, 6, 27));
        second.last_quantity_update_date = None;
        let merged = merge_holdings(&[holding("VTI", "a1", "EQ.US", dec!(100), dec!(10)), second]);
        assert_eq!(merged[0].last_price_update, MergedDate::Multi);
        assert_eq!(merged[0].last_quantity_update, MergedDate::Multi);
        assert_eq!(merged[0].last_price_update.to_string(), "Multi");
        assert_eq!(merged[0].last_price_update.date(), None);
    }

    #[test]
    fn test_merge_keeps_accounts_and_securities_apart() {
        let merged = merge_holdings(&[
            holding("VTI", "a1", "EQ.US", dec!(100), dec!(10)),
            holding("VTI", "a2", "EQ.US", dec!(100), dec!(10)),
            holding("BND", "a1", "FI", dec!(100), dec!(10)),
        ]);
        assert_eq!(merged.len(), 3);
        assert!(merged.iter().all(|m| !m.is_merged()));
    }

    #[test]
    fn test_merge_drops_price_when_rows_disagree() {
        let mut second = holding("VTI", "a1", "EQ.US", dec!(100), dec!(10));
        second.price = Some(dec!(11));
        let merged = merge_holdings(&[holding("VTI", "a1", "EQ.US", dec!(100), dec!(10)), second]);
        assert_eq!(merged[0].price, None);
    }

    #[test]
    fn test_change_in_value_single_row_uses_precomputed_value() {
        let mut single = holding("VTI", "a1", "EQ.US", dec!(100), dec!(10));
        single.change_in_value = Some(dec!(0.05));
        single.start_date_value = Some(dec!(50));
        let merged = merge_holdings(&[single]);
        assert_eq!(merged[0].change_in_value_percentage(), Some(dec!(0.05)));
    }

    #[test]
    fn test_change_in_value_merged_rows_is_recomputed() {
        let mut a = holding("VTI", "a1", "EQ.US", dec!(150), dec!(10));
        a.start_date_value = Some(dec!(100));
        a.change_in_value = Some(dec!(0.5));
        let b = holding("VTI", "a1", "EQ.US", dec!(50), dec!(5));
        let merged = merge_holdings(&[a, b]);
        assert_eq!(merged[0].change_in_value_percentage(), Some(dec!(1)));

        let no_start = merge_holdings(&[holding("X", "a1", "EQ", dec!(5), dec!(1))]);
        assert_eq!(no_start[0].change_in_value_percentage(), None);
    }

    #[test]
    fn test_group_by_account_builds_four_levels() {
        let accounts = AccountDirectory::new(vec![
            account("a1", "ROTH", "RETIREMENT"),
            account("a2", "IRA", "RETIREMENT"),
            account("a3", "BROKERAGE", "TAXABLE"),
        ]);
        let holdings = vec![
            holding("VTI", "a1", "EQ.US", dec!(100), dec!(10)),
            holding("VTI", "a1", "EQ.US", dec!(50), dec!(5)),
            holding("BND", "a2", "FI", dec!(200), dec!(20)),
            holding("VXUS", "a3", "EQ.INTL", dec!(300), dec!(30)),
        ];
        let service = HoldingsRollupService::new(ReportSettings::default());
        let rollup = service.group_by_account(&holdings, &accounts);

        assert!(rollup.issues.is_empty());
        assert_eq!(rollup.grand_total(), dec!(650));
        let retirement = rollup.group("RETIREMENT").unwrap();
        assert_eq!(retirement.values.aggregate_end_value(), dec!(350));
        let vti = retirement
            .child("ROTH")
            .and_then(|t| t.child("a1"))
            .and_then(|a| a.child("VTI"))
            .unwrap();
        assert_eq!(vti.values.aggregate_end_value(), dec!(150));
        assert_eq!(vti.record_count, 1);
    }

    #[test]
    fn test_group_by_account_reports_unknown_account() {
        let accounts = AccountDirectory::new(vec![account("a1", "ROTH", "RETIREMENT")]);
        let holdings = vec![
            holding("VTI", "a1", "EQ.US", dec!(100), dec!(10)),
            holding("VTI", "ghost", "EQ.US", dec!(100), dec!(10)),
        ];
        let service = HoldingsRollupService::new(ReportSettings::default());
        let rollup = service.group_by_account(&holdings, &accounts);
        assert_eq!(
            rollup.issues,
            vec![DataIntegrityError::UnknownAccount("ghost".to_string())]
        );
        assert_eq!(rollup.grand_total(), dec!(100));
    }

    #[test]
    fn test_group_by_account_hides_closed_positions() {
        let accounts = AccountDirectory::new(vec![
            account("a1", "ROTH", "RETIREMENT"),
            account("a2", "BROKERAGE", "TAXABLE"),
        ]);
        let holdings = vec![
            holding("VTI", "a1", "EQ.US", dec!(100), dec!(10)),
            holding("OLD", "a2", "EQ.US", dec!(3), Decimal::ZERO),
        ];

        let hiding = HoldingsRollupService::new(ReportSettings::default());
        assert!(hiding.group_by_account(&holdings, &accounts).group("TAXABLE").is_none());

        let showing = HoldingsRollupService::new(ReportSettings {
            hide_zero_groups: false,
            ..ReportSettings::default()
        });
        assert!(showing.group_by_account(&holdings, &accounts).group("TAXABLE").is_some());
    }

    #[test]
    fn test_group_by_asset_class_at_requested_level() {
        let tree = AssetClassTree::new(vec![
            class("EQ", 0, None),
            class("EQ.US", 1, Some("EQ")),
            class("EQ.INTL", 1, Some("EQ")),
            class("FI", 0, None),
        ]);
        let holdings = vec![
            holding("VTI", "a1", "EQ.US", dec!(100), dec!(10)),
            holding("VXUS", "a1", "EQ.INTL", dec!(60), dec!(6)),
            holding("BND", "a2", "FI", dec!(40), dec!(4)),
        ];
        let service = HoldingsRollupService::new(ReportSettings::default());

        let top = service.group_by_asset_class(&holdings, &tree, Some(0));
        assert_eq!(top.groups().len(), 2);
        assert_eq!(top.group("EQ").unwrap().values.aggregate_end_value(), dec!(160));
        assert!(top.group("EQ").unwrap().child("VTI").is_some());

        let deep = service.group_by_asset_class(&holdings, &tree, None);
        let us = deep.group("EQ").and_then(|eq| eq.child("EQ.US")).unwrap();
        assert_eq!(us.values.aggregate_end_value(), dec!(100));
    }

    #[test]
    fn test_group_by_asset_class_reports_unknown_class() {
        let tree = AssetClassTree::new(vec![class("EQ", 0, None)]);
        let holdings = vec![
            holding("VTI", "a1", "EQ", dec!(100), dec!(10)),
            holding("GLD", "a1", "CMDTY", dec!(10), dec!(1)),
        ];
        let service = HoldingsRollupService::new(ReportSettings::default());
        let rollup = service.group_by_asset_class(&holdings, &tree, Some(0));
        assert_eq!(
            rollup.issues,
            vec![DataIntegrityError::UnknownAssetClass("CMDTY".to_string())]
        );
        assert_eq!(rollup.grand_total(), dec!(100));
    }
}
