//! Column sets for the standard list exports.

use rust_decimal::Decimal;
use serde_json::Value;

use shopkeep_catalog::{Customer, Order, Product, StockState};
use shopkeep_core::{CurrencyStyle, format_inr};
use shopkeep_export::{ExportColumn, ExportRequest, cell_text};

fn amount(value: &Value) -> String {
    let parsed = match value {
        Value::String(s) => s.parse::<Decimal>().ok(),
        Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
        _ => None,
    };
    parsed
        .map(|d| format_inr(d, CurrencyStyle::Plain))
        .unwrap_or_else(|| cell_text(value))
}

fn date(value: &Value) -> String {
    value
        .as_str()
        .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        .map(|at| at.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

fn stock_label(state: StockState) -> &'static str {
    match state {
        StockState::InStock => "In stock",
        StockState::Low => "Low stock",
        StockState::Out => "Out of stock",
    }
}

fn with_field(mut value: Value, key: &str, extra: Value) -> Value {
    if let Value::Object(map) = &mut value {
        map.insert(key.to_string(), extra);
    }
    value
}

pub fn products(products: &[Product]) -> Result<ExportRequest, serde_json::Error> {
    let records = products
        .iter()
        .map(|p| {
            let value = serde_json::to_value(p)?;
            Ok(with_field(value, "status", stock_label(p.stock_state()).into()))
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;
    let columns = vec![
        ExportColumn::new("name", "Product").width(30.0),
        ExportColumn::new("sku", "SKU"),
        ExportColumn::new("price", "Price").format_with(amount),
        ExportColumn::new("stock", "Stock").width(10.0),
        ExportColumn::new("status", "Status"),
    ];
    Ok(ExportRequest::new("products", columns, records)
        .title("Product Inventory")
        .sheet_name("Products"))
}

pub fn customers(customers: &[Customer]) -> Result<ExportRequest, serde_json::Error> {
    let records = customers
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    let columns = vec![
        ExportColumn::new("name", "Name").width(25.0),
        ExportColumn::new("phone", "Phone"),
        ExportColumn::new("email", "Email").width(25.0),
        ExportColumn::new("address", "Address").width(35.0),
        ExportColumn::new("gst_id", "GSTIN"),
    ];
    Ok(ExportRequest::new("customers", columns, records)
        .title("Customers")
        .sheet_name("Customers"))
}

pub fn orders(orders: &[Order]) -> Result<ExportRequest, serde_json::Error> {
    let records = orders
        .iter()
        .map(|o| {
            let value = serde_json::to_value(o)?;
            Ok(with_field(
                with_field(value, "item_count", o.items.len().into()),
                "payment",
                o.payment_method.label().into(),
            ))
        })
        .collect::<Result<Vec<_>, serde_json::Error>>()?;
    let columns = vec![
        ExportColumn::new("created_at", "Date").format_with(date),
        ExportColumn::new("customer_name", "Customer").width(25.0),
        ExportColumn::new("item_count", "Items").width(8.0),
        ExportColumn::new("subtotal", "Subtotal").format_with(amount),
        ExportColumn::new("tax_amount", "Tax").format_with(amount),
        ExportColumn::new("total", "Total").format_with(amount),
        ExportColumn::new("payment", "Payment"),
    ];
    Ok(ExportRequest::new("orders", columns, records)
        .title("Sales Orders")
        .sheet_name("Orders"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use shopkeep_core::ProductId;
    use shopkeep_export::project_rows;

    #[test]
    fn product_rows_format_price_and_status() {
        let product = Product {
            id: ProductId::new(),
            name: "Basmati Rice".to_string(),
            sku: None,
            category_id: None,
            price: dec!(123456.5),
            stock: 3,
            low_stock_threshold: 5,
            created_at: None,
        };

        let request = products(&[product]).unwrap();
        let rows = project_rows(&request);

        assert_eq!(request.headers(), vec!["Product", "SKU", "Price", "Stock", "Status"]);
        assert_eq!(rows[0], vec!["Basmati Rice", "", "1,23,456.50", "3", "Low stock"]);
    }

    #[test]
    fn amount_falls_back_to_text() {
        assert_eq!(amount(&Value::from(1500)), "1,500.00");
        assert_eq!(amount(&Value::from("n/a")), "n/a");
        assert_eq!(amount(&Value::Null), "");
    }

    #[test]
    fn dates_render_day_first() {
        assert_eq!(date(&Value::from("2026-10-14T08:15:00Z")), "14/10/2026");
        assert_eq!(date(&Value::Null), "");
    }
}
