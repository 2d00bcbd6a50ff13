//! Currency arithmetic and INR formatting.
//!
//! Amounts are `Decimal` rupees. Every stored/displayed amount is rounded to
//! two decimal places, midpoint away from zero.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// How the currency marker is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyStyle {
    /// `₹1,23,456.00`
    Symbol,
    /// `Rs. 1,23,456.00` (for outputs whose fonts lack the rupee glyph).
    Ascii,
    /// `1,23,456.00`
    Plain,
}

/// Round to currency precision (paise).
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount × percent / 100`, unrounded.
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / Decimal::ONE_HUNDRED
}

/// Nearest whole rupee; negative amounts clamp to zero.
pub fn whole_units(amount: Decimal) -> u64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(0)
}

/// Checkout totals for a subtotal, discount and tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub grand_total: Decimal,
}

impl Totals {
    /// `grand = (subtotal − subtotal×discount/100) × (1 + tax/100)`, each
    /// reported amount rounded to currency precision.
    pub fn compute(
        subtotal: Decimal,
        discount_percent: Decimal,
        tax_rate_percent: Decimal,
    ) -> Self {
        let discount = percent_of(subtotal, discount_percent);
        let taxable = subtotal - discount;
        let tax = percent_of(taxable, tax_rate_percent);
        Self {
            subtotal: round_currency(subtotal),
            discount_amount: round_currency(discount),
            tax_amount: round_currency(tax),
            grand_total: round_currency(taxable + tax),
        }
    }
}

/// Format with Indian digit grouping (last three digits, then pairs).
pub fn format_inr(amount: Decimal, style: CurrencyStyle) -> String {
    let mut rounded = round_currency(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded = rounded.abs();
    rounded.rescale(2);

    let text = rounded.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let grouped = group_indian(int_part);

    let sign = if negative { "-" } else { "" };
    match style {
        CurrencyStyle::Symbol => format!("{sign}₹{grouped}.{frac_part}"),
        CurrencyStyle::Ascii => format!("{sign}Rs. {grouped}.{frac_part}"),
        CurrencyStyle::Plain => format!("{sign}{grouped}.{frac_part}"),
    }
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_lakhs_and_crores() {
        assert_eq!(format_inr(dec!(1234567.5), CurrencyStyle::Symbol), "₹12,34,567.50");
        assert_eq!(format_inr(dec!(12345678), CurrencyStyle::Plain), "1,23,45,678.00");
        assert_eq!(format_inr(dec!(999), CurrencyStyle::Plain), "999.00");
        assert_eq!(format_inr(dec!(1000), CurrencyStyle::Ascii), "Rs. 1,000.00");
    }

    #[test]
    fn negative_amounts_keep_sign_outside_marker() {
        assert_eq!(format_inr(dec!(-1500.255), CurrencyStyle::Symbol), "-₹1,500.26");
        assert_eq!(format_inr(dec!(-0.001), CurrencyStyle::Plain), "0.00");
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_currency(dec!(2.345)), dec!(2.35));
        assert_eq!(round_currency(dec!(-2.345)), dec!(-2.35));
        assert_eq!(whole_units(dec!(10.5)), 11);
        assert_eq!(whole_units(dec!(10.49)), 10);
        assert_eq!(whole_units(dec!(-3)), 0);
    }

    #[test]
    fn totals_apply_discount_before_tax() {
        let totals = Totals::compute(dec!(1000), dec!(10), dec!(18));
        assert_eq!(totals.discount_amount, dec!(100));
        assert_eq!(totals.tax_amount, dec!(162));
        assert_eq!(totals.grand_total, dec!(1062));
    }

    proptest! {
        #[test]
        fn no_discount_no_tax_keeps_subtotal(units in 0i64..10_000_000i64) {
            let subtotal = Decimal::from(units);
            let totals = Totals::compute(subtotal, Decimal::ZERO, Decimal::ZERO);
            prop_assert_eq!(totals.grand_total, subtotal);
        }

        #[test]
        fn grouping_preserves_digits(value in 0u64..10_000_000_000u64) {
            let formatted = format_inr(Decimal::from(value), CurrencyStyle::Plain);
            let digits: String = formatted
                .trim_end_matches(".00")
                .chars()
                .filter(|c| *c != ',')
                .collect();
            prop_assert_eq!(digits, value.to_string());
        }
    }
}
