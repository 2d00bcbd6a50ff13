use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;

use shopkeep_catalog::{NewOrder, OrderItem, PaymentMethod, order};
use shopkeep_client::{AppContext, data, invoice_for_order, presets};
use shopkeep_core::{Clock, FixedClock, MemorySink};
use shopkeep_store::{InMemoryLocalStore, InMemoryRemoteStore};

fn context(remote: Arc<InMemoryRemoteStore>, sink: Arc<MemorySink>) -> AppContext {
    let now = NaiveDate::from_ymd_opt(2026, 10, 14)
        .and_then(|d| d.and_hms_opt(17, 0, 0))
        .unwrap();
    AppContext::new(remote, Arc::new(InMemoryLocalStore::new()), sink).with_clock(Arc::new(FixedClock(now)))
}

#[tokio::test]
async fn checkout_bill_and_order_export() {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let sink = Arc::new(MemorySink::new());
    let ctx = context(remote, sink.clone());

    let new = NewOrder::from_cart(
        None,
        "Ravi Kumar",
        vec![
            OrderItem::new(None, "Toor Dal 1kg", 2, dec!(160)),
            OrderItem::new(None, "Jaggery 500g", 1, dec!(55)),
        ],
        dec!(0),
        dec!(5),
        PaymentMethod::Cash,
        Utc::now(),
    );
    let recorded = order::create(ctx.remote(), &new).await.unwrap();

    let invoice = invoice_for_order(&recorded, None, Some(dec!(400)), ctx.clock().now()).unwrap();
    let saved = ctx.bills().save_to_file(&invoice, ctx.sink()).unwrap();
    assert!(saved.file_name.starts_with("Invoice_INV-"));
    assert!(sink.get(&saved.file_name).unwrap().starts_with(b"%PDF"));

    let orders = data::load_orders(ctx.remote()).await;
    assert!(orders.notice.is_none());
    let request = presets::orders(&orders.items).unwrap();
    let exported = ctx.exporter().export_delimited(&request).unwrap();
    assert_eq!(exported.file_name, "orders_2026-10-14.csv");

    let csv = String::from_utf8(sink.get(&exported.file_name).unwrap()).unwrap();
    assert!(csv.contains("\"Ravi Kumar\""));
    assert!(csv.contains("\"393.75\""));
}

#[tokio::test]
async fn migration_through_the_context_reports_nothing_to_do() {
    let ctx = context(Arc::new(InMemoryRemoteStore::new()), Arc::new(MemorySink::new()));
    let outcome = ctx.migration().run().await;
    assert!(outcome.succeeded);
    assert_eq!(outcome.counts.total(), 0);
}
