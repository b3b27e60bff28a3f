//! Tests for the generic rollup tree.

#[cfg(test)]
mod tests {
    use crate::errors::DataIntegrityError;
    use crate::portfolio::rollup::{
        compare_by_change_desc, compare_by_end_value_desc, compare_by_name, GroupKey,
        KeyExtractor, KeyResult, Rollup, RollupRecord,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone)]
    struct Row {
        category: &'static str,
        account: &'static str,
        start: Decimal,
        end: Decimal,
        quantity: Decimal,
    }

    impl RollupRecord for Row {
        fn start_value(&self) -> Decimal {
            self.start
        }

        fn end_value(&self) -> Decimal {
            self.end
        }

        fn cost_basis(&self) -> Option<Decimal> {
            Some(self.start)
        }

        fn is_non_zero(&self) -> bool {
            !self.quantity.is_zero()
        }
    }

    fn row(category: &'static str, account: &'static str, start: i64, end: i64, qty: i64) -> Row {
        Row {
            category,
            account,
            start: Decimal::from(start),
            end: Decimal::from(end),
            quantity: Decimal::from(qty),
        }
    }

    fn levels<'a>() -> Vec<KeyExtractor<'a, Row>> {
        vec![
            Box::new(|r: &Row| -> KeyResult {
                Ok(GroupKey::new(r.category, r.category.to_uppercase()))
            }),
            Box::new(|r: &Row| -> KeyResult {
                if r.account.is_empty() {
                    Err(DataIntegrityError::UnknownAccount(String::new()))
                } else {
                    Ok(GroupKey::new(r.account, r.account))
                }
            }),
        ]
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row("ira", "a1", 100, 120, 10),
            row("taxable", "a2", 50, 40, 5),
            row("ira", "a3", 0, 30, 1),
            row("ira", "a1", 200, 210, 2),
            row("closed", "a4", 80, 0, 0),
        ]
    }

    #[test]
    fn test_groups_are_created_in_first_encounter_order() {
        let rollup = Rollup::build(&sample_rows(), &levels());
        let ids: Vec<&str> = rollup.groups().iter().map(|g| g.key.id.as_str()).collect();
        assert_eq!(ids, vec!["ira", "taxable", "closed"]);
        let ira = rollup.group("ira").unwrap();
        let accounts: Vec<&str> = ira.children.iter().map(|c| c.key.id.as_str()).collect();
        assert_eq!(accounts, vec!["a1", "a3"]);
    }

    #[test]
    fn test_each_level_accumulates_its_records() {
        let rollup = Rollup::build(&sample_rows(), &levels());
        let ira = rollup.group("ira").unwrap();
        assert_eq!(ira.values.aggregate_start_value(), dec!(300));
        assert_eq!(ira.values.aggregate_end_value(), dec!(360));
        assert_eq!(ira.record_count, 3);

        let a1 = ira.child("a1").unwrap();
        assert_eq!(a1.values.aggregate_end_value(), dec!(330));
        assert_eq!(a1.values.aggregate_end_cost_basis(), dec!(300));
        assert_eq!(a1.record_count, 2);

        assert_eq!(rollup.grand_total(), dec!(400));
    }

    #[test]
    fn test_has_non_zero_follows_quantity_not_dollars() {
        let rows = vec![
            row("written_down", "a1", 100, 0, 3),
            row("stale", "a2", 0, 75, 0),
        ];
        let rollup = Rollup::build(&rows, &levels());
        assert!(rollup.group("written_down").unwrap().has_non_zero);
        assert!(!rollup.group("stale").unwrap().has_non_zero);
        assert!(rollup.root.has_non_zero);
    }

    #[test]
    fn test_unresolved_keys_skip_the_record_and_are_reported() {
        let mut rows = sample_rows();
        rows.push(row("ira", "", 1000, 1000, 1));
        let rollup = Rollup::build(&rows, &levels());
        assert_eq!(rollup.issues.len(), 1);
        assert_eq!(rollup.group("ira").unwrap().record_count, 3);
        assert_eq!(rollup.grand_total(), dec!(400));
    }

    #[test]
    fn test_regrouping_reversed_input_yields_same_sums() {
        let rows = sample_rows();
        let mut reversed = rows.clone();
        reversed.reverse();
        let forward = Rollup::build(&rows, &levels());
        let backward = Rollup::build(&reversed, &levels());
        for group in forward.groups() {
            let other = backward.group(&group.key.id).unwrap();
            assert_eq!(group.values, other.values);
            assert_eq!(group.has_non_zero, other.has_non_zero);
        }
    }

    #[test]
    fn test_prune_zero_groups_drops_closed_positions() {
        let mut rollup = Rollup::build(&sample_rows(), &levels());
        rollup.prune_zero_groups();
        assert!(rollup.group("closed").is_none());
        assert_eq!(rollup.groups().len(), 2);
        assert!(rollup.group("taxable").is_some());
    }

    #[test]
    fn test_visible_children_filters_without_mutating() {
        let rollup = Rollup::build(&sample_rows(), &levels());
        assert_eq!(rollup.root.visible_children().count(), 2);
        assert_eq!(rollup.groups().len(), 3);
    }

    #[test]
    fn test_sort_breaks_ties_by_id() {
        let rows = vec![
            row("b", "x", 0, 10, 1),
            row("c", "x", 0, 10, 1),
            row("a", "x", 0, 10, 1),
        ];
        let mut rollup = Rollup::build(&rows, &levels());
        rollup.sort_by(&compare_by_end_value_desc);
        let ids: Vec<&str> = rollup.groups().iter().map(|g| g.key.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(rollup.group("c").is_some());
    }

    #[test]
    fn test_sort_by_name_and_change() {
        let mut rollup = Rollup::build(&sample_rows(), &levels());
        rollup.sort_by(&compare_by_name);
        let names: Vec<&str> = rollup.groups().iter().map(|g| g.key.name.as_str()).collect();
        assert_eq!(names, vec!["CLOSED", "IRA", "TAXABLE"]);

        rollup.sort_by(&compare_by_change_desc);
        let ids: Vec<&str> = rollup.groups().iter().map(|g| g.key.id.as_str()).collect();
        // ira: +20%, taxable: -20%, closed: -100%
        assert_eq!(ids, vec!["ira", "taxable", "closed"]);
    }

    #[test]
    fn test_percentage_of_total_uses_injected_total() {
        let rollup = Rollup::build(&sample_rows(), &levels());
        let taxable = rollup.group("taxable").unwrap();
        assert_eq!(taxable.percentage_of_total(rollup.grand_total()), Some(dec!(0.1)));
        assert_eq!(taxable.percentage_of_total(Decimal::ZERO), None);
    }
}
