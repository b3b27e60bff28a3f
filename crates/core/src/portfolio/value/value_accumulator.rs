use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Start/end dollar sums for a group of records over a date range.
///
/// A fresh accumulator is created per tree node, fed once per contributing
/// record, and only read afterwards. Every ratio it derives returns `None`
/// when its denominator is zero so callers can render "N/A" instead of a
/// misleading 0%.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAccumulator {
    sum_start: Decimal,
    sum_end: Decimal,
    sum_cost_basis: Decimal,
}

impl ValueAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record's range-start and range-end values.
    ///
    /// Records without a start value must pass `Decimal::ZERO`.
    pub fn add_values(&mut self, start_value: Decimal, end_value: Decimal) {
        self.sum_start += start_value;
        self.sum_end += end_value;
    }

    pub fn add_cost_basis(&mut self, cost_basis: Decimal) {
        self.sum_cost_basis += cost_basis;
    }

    /// `(sumEnd - sumStart) / sumStart`, or `None` when nothing was held at the start.
    pub fn calc_change_in_value_percentage(&self) -> Option<Decimal> {
        if self.sum_start.is_zero() {
            None
        } else {
            Some((self.sum_end - self.sum_start) / self.sum_start)
        }
    }

    pub fn aggregate_start_value(&self) -> Decimal {
        self.sum_start
    }

    pub fn aggregate_end_value(&self) -> Decimal {
        self.sum_end
    }

    pub fn aggregate_end_cost_basis(&self) -> Decimal {
        self.sum_cost_basis
    }

    pub fn calc_unrealized_gain_loss(&self) -> Decimal {
        self.sum_end - self.sum_cost_basis
    }

    /// Share of `grand_total` held by this node, or `None` for an empty portfolio.
    pub fn percentage_of_total(&self, grand_total: Decimal) -> Option<Decimal> {
        if grand_total.is_zero() {
            None
        } else {
            Some(self.sum_end / grand_total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_accumulator_is_zero() {
        let acc = ValueAccumulator::new();
        assert_eq!(acc.aggregate_start_value(), Decimal::ZERO);
        assert_eq!(acc.aggregate_end_value(), Decimal::ZERO);
        assert_eq!(acc.aggregate_end_cost_basis(), Decimal::ZERO);
    }

    #[test]
    fn test_add_values_sums_start_and_end() {
        let mut acc = ValueAccumulator::new();
        acc.add_values(dec!(100), dec!(110));
        acc.add_values(dec!(50), dec!(40));
        assert_eq!(acc.aggregate_start_value(), dec!(150));
        assert_eq!(acc.aggregate_end_value(), dec!(150));
        assert_eq!(acc.calc_change_in_value_percentage(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_change_in_value_percentage() {
        let mut acc = ValueAccumulator::new();
        acc.add_values(dec!(200), dec!(250));
        assert_eq!(acc.calc_change_in_value_percentage(), Some(dec!(0.25)));
    }

    #[test]
    fn test_change_in_value_is_none_without_start_value() {
        let mut acc = ValueAccumulator::new();
        acc.add_values(Decimal::ZERO, dec!(500));
        assert_eq!(acc.calc_change_in_value_percentage(), None);
    }

    #[test]
    fn test_offsetting_start_values_yield_none() {
        let mut acc = ValueAccumulator::new();
        acc.add_values(dec!(100), dec!(90));
        acc.add_values(dec!(-100), dec!(-80));
        assert_eq!(acc.calc_change_in_value_percentage(), None);
    }

    #[test]
    fn test_unrealized_gain_loss_uses_cost_basis() {
        let mut acc = ValueAccumulator::new();
        acc.add_values(dec!(0), dec!(1200));
        acc.add_cost_basis(dec!(1000));
        acc.add_values(dec!(0), dec!(300));
        acc.add_cost_basis(dec!(400));
        assert_eq!(acc.aggregate_end_cost_basis(), dec!(1400));
        assert_eq!(acc.calc_unrealized_gain_loss(), dec!(100));
    }

    #[test]
    fn test_percentage_of_total() {
        let mut acc = ValueAccumulator::new();
        acc.add_values(dec!(0), dec!(250));
        assert_eq!(acc.percentage_of_total(dec!(1000)), Some(dec!(0.25)));
        assert_eq!(acc.percentage_of_total(Decimal::ZERO), None);
    }
}
