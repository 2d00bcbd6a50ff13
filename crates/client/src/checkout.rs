use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::warn;

use shopkeep_billing::{BillTo, Invoice, LineItem};
use shopkeep_catalog::{Customer, Order, WALK_IN_CUSTOMER};
use shopkeep_core::{DomainResult, percent_of, round_currency};

fn invoice_number(order: &Order) -> String {
    let simple = order.id.as_uuid().simple().to_string();
    let tail = simple.get(simple.len().saturating_sub(8)..).unwrap_or(&simple);
    format!("INV-{}", tail.to_uppercase())
}

fn bill_to(order: &Order, customer: Option<&Customer>) -> BillTo {
    match customer {
        Some(c) => BillTo {
            name: c.name.clone(),
            phone: c.phone.clone(),
            email: c.email.clone(),
            address: c.address.clone(),
            gst_id: c.gst_id.clone(),
        },
        None if order.customer_name.trim().is_empty() => BillTo::named(WALK_IN_CUSTOMER),
        None => BillTo::named(order.customer_name.clone()),
    }
}

/// Invoice for a recorded order, using the totals stored with it.
///
/// `fallback_date` is used for orders without a creation time.
pub fn invoice_for_order(
    order: &Order,
    customer: Option<&Customer>,
    amount_tendered: Option<Decimal>,
    fallback_date: NaiveDateTime,
) -> DomainResult<Invoice> {
    let items = order
        .items
        .iter()
        .map(|item| LineItem {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total,
            tax_code: None,
        })
        .collect();

    let change_due = amount_tendered
        .filter(|tendered| *tendered >= order.total)
        .map(|tendered| round_currency(tendered - order.total));

    let invoice = Invoice {
        number: invoice_number(order),
        date: order
            .created_at
            .map(|at| at.with_timezone(&Local).naive_local())
            .unwrap_or(fallback_date),
        customer: bill_to(order, customer),
        items,
        subtotal: order.subtotal,
        discount_percent: order.discount_percent,
        discount_amount: round_currency(percent_of(order.subtotal, order.discount_percent)),
        tax_rate_percent: order.tax_rate_percent,
        tax_amount: order.tax_amount,
        grand_total: order.total,
        payment_method: order.payment_method.label().to_string(),
        amount_tendered,
        change_due,
    };
    invoice.validate()?;

    if !invoice.totals_consistent() {
        warn!(
            order = %order.id,
            stored = %invoice.grand_total,
            expected = %invoice.expected_grand_total(),
            "order total does not match its subtotal and rates"
        );
    }
    Ok(invoice)
}
