use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopkeep_core::{DomainError, DomainResult, Totals, round_currency};

/// Who the bill is made out to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTo {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gst_id: Option<String>,
}

impl BillTo {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: String::new(),
            email: None,
            address: None,
            gst_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    #[serde(default)]
    pub tax_code: Option<String>,
}

impl LineItem {
    /// Line with `line_total = quantity × unit_price` at currency precision.
    pub fn new(name: impl Into<String>, quantity: i64, unit_price: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
            line_total: round_currency(Decimal::from(quantity) * unit_price),
            tax_code: None,
        }
    }

    pub fn with_tax_code(mut self, code: impl Into<String>) -> Self {
        self.tax_code = Some(code.into());
        self
    }
}

/// A finished sale ready to print. Never persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: String,
    pub date: NaiveDateTime,
    pub customer: BillTo,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub tax_rate_percent: Decimal,
    pub tax_amount: Decimal,
    pub grand_total: Decimal,
    pub payment_method: String,
    #[serde(default)]
    pub amount_tendered: Option<Decimal>,
    #[serde(default)]
    pub change_due: Option<Decimal>,
}

/// Input for [`Invoice::from_draft`]; totals are derived, not supplied.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    pub number: String,
    pub date: NaiveDateTime,
    pub customer: BillTo,
    pub items: Vec<LineItem>,
    pub discount_percent: Decimal,
    pub tax_rate_percent: Decimal,
    pub payment_method: String,
    pub amount_tendered: Option<Decimal>,
}

impl Invoice {
    pub fn from_draft(draft: InvoiceDraft) -> DomainResult<Self> {
        if draft.discount_percent < Decimal::ZERO || draft.discount_percent > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation("discount must be between 0 and 100 percent"));
        }
        if draft.tax_rate_percent < Decimal::ZERO {
            return Err(DomainError::validation("tax rate cannot be negative"));
        }

        let subtotal: Decimal = draft.items.iter().map(|i| i.line_total).sum();
        let totals = Totals::compute(subtotal, draft.discount_percent, draft.tax_rate_percent);
        let change_due = draft
            .amount_tendered
            .filter(|tendered| *tendered >= totals.grand_total)
            .map(|tendered| round_currency(tendered - totals.grand_total));

        let invoice = Self {
            number: draft.number,
            date: draft.date,
            customer: draft.customer,
            items: draft.items,
            subtotal: totals.subtotal,
            discount_percent: draft.discount_percent,
            discount_amount: totals.discount_amount,
            tax_rate_percent: draft.tax_rate_percent,
            tax_amount: totals.tax_amount,
            grand_total: totals.grand_total,
            payment_method: draft.payment_method,
            amount_tendered: draft.amount_tendered,
            change_due,
        };
        invoice.validate()?;
        Ok(invoice)
    }

    /// Preconditions for laying out a bill.
    pub fn validate(&self) -> DomainResult<()> {
        if self.items.is_empty() {
            return Err(DomainError::validation("invoice has no line items"));
        }
        if self.customer.name.trim().is_empty() {
            return Err(DomainError::validation("customer name is required"));
        }
        Ok(())
    }

    /// Grand total recomputed from subtotal and percentages.
    pub fn expected_grand_total(&self) -> Decimal {
        Totals::compute(self.subtotal, self.discount_percent, self.tax_rate_percent).grand_total
    }

    /// Whether the stored grand total agrees with the recomputed one to
    /// within one currency unit.
    pub fn totals_consistent(&self) -> bool {
        (self.grand_total - self.expected_grand_total()).abs() <= Decimal::ONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14)
            .and_then(|d| d.and_hms_opt(15, 30, 0))
            .unwrap()
    }

    fn draft(items: Vec<LineItem>) -> InvoiceDraft {
        InvoiceDraft {
            number: "INV-0001".to_string(),
            date: at(),
            customer: BillTo::named("Asha"),
            items,
            discount_percent: dec!(10),
            tax_rate_percent: dec!(18),
            payment_method: "Cash".to_string(),
            amount_tendered: Some(dec!(1500)),
        }
    }

    #[test]
    fn draft_derives_totals_and_change() {
        let invoice = Invoice::from_draft(draft(vec![
            LineItem::new("Rice 5kg", 2, dec!(450)),
            LineItem::new("Oil 1L", 1, dec!(180.50)),
        ]))
        .unwrap();

        assert_eq!(invoice.subtotal, dec!(1080.50));
        assert_eq!(invoice.discount_amount, dec!(108.05));
        assert_eq!(invoice.tax_amount, dec!(175.04));
        assert_eq!(invoice.grand_total, dec!(1147.49));
        assert_eq!(invoice.change_due, Some(dec!(352.51)));
        assert!(invoice.totals_consistent());
    }

    #[test]
    fn short_tender_has_no_change() {
        let mut d = draft(vec![LineItem::new("Tea", 1, dec!(2000))]);
        d.amount_tendered = Some(dec!(100));
        let invoice = Invoice::from_draft(d).unwrap();
        assert_eq!(invoice.change_due, None);
    }

    #[test]
    fn empty_items_are_rejected() {
        let err = Invoice::from_draft(draft(Vec::new())).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn blank_customer_name_is_rejected() {
        let mut d = draft(vec![LineItem::new("Tea", 1, dec!(20))]);
        d.customer = BillTo::named("   ");
        assert!(Invoice::from_draft(d).unwrap_err().is_validation());
    }

    #[test]
    fn out_of_range_discount_is_rejected() {
        let mut d = draft(vec![LineItem::new("Tea", 1, dec!(20))]);
        d.discount_percent = dec!(120);
        assert!(Invoice::from_draft(d).is_err());
    }

    proptest! {
        #[test]
        fn derived_totals_are_always_consistent(
            prices in proptest::collection::vec(1u32..100_000u32, 1..20),
            qty in 1i64..50,
            discount in 0u32..=100,
            tax in 0u32..30,
        ) {
            let items = prices
                .iter()
                .map(|p| LineItem::new("item", qty, Decimal::new(*p as i64, 2)))
                .collect();
            let mut d = draft(items);
            d.discount_percent = Decimal::from(discount);
            d.tax_rate_percent = Decimal::from(tax);
            let invoice = Invoice::from_draft(d).unwrap();
            prop_assert!(invoice.totals_consistent());
            prop_assert!(invoice.grand_total >= Decimal::ZERO);
        }

        #[test]
        fn no_discount_no_tax_means_grand_total_is_subtotal(
            prices in proptest::collection::vec(1u32..1_000_000u32, 1..20),
        ) {
            let items = prices
                .iter()
                .map(|p| LineItem::new("item", 1, Decimal::from(*p)))
                .collect();
            let mut d = draft(items);
            d.discount_percent = Decimal::ZERO;
            d.tax_rate_percent = Decimal::ZERO;
            let invoice = Invoice::from_draft(d).unwrap();
            prop_assert_eq!(invoice.grand_total, invoice.subtotal);
        }
    }
}
