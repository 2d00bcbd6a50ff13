use std::sync::Arc;

use serde_json::json;

use shopkeep_core::{DirectorySink, FileSink};
use shopkeep_migration::{Confirmation, MigrationJob, MigrationStrategy};
use shopkeep_store::{InMemoryRemoteStore, JsonFileLocalStore, LocalStore, RemoteStore, Rule};

fn seed(dir: &std::path::Path) {
    let write = |name: &str, value: serde_json::Value| {
        std::fs::write(dir.join(format!("{name}.json")), value.to_string()).unwrap();
    };
    write(
        "products",
        json!([
            {"id": 1, "name": "Basmati Rice 5kg", "price": 450, "stock": 12, "categoryId": 7},
            {"id": 2, "name": "Mustard Oil 1L", "price": "180.50", "stock": 3},
            {"id": 3, "price": 99}
        ]),
    );
    write(
        "customers",
        json!([{"id": 10, "name": "Ravi Kumar", "phone": "+91 98765 43210"}]),
    );
    write(
        "orders",
        json!([{
            "id": 100,
            "customerId": 10,
            "customerName": "Ravi Kumar",
            "items": [{"productId": 1, "name": "Basmati Rice 5kg", "quantity": 1, "unitPrice": 450}],
            "total": 450
        }]),
    );
}

/// Remote schema with the links a real database enforces.
fn remote() -> Arc<InMemoryRemoteStore> {
    Arc::new(InMemoryRemoteStore::with_rules(vec![
        Rule::foreign_key("products", "category_id", "categories"),
        Rule::foreign_key("orders", "customer_id", "customers"),
        Rule::not_null("products", "name"),
    ]))
}

#[tokio::test]
async fn dangling_category_triggers_a_single_simple_retry() {
    let data = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();
    seed(data.path());

    let local: Arc<dyn LocalStore> = Arc::new(JsonFileLocalStore::new(data.path()));
    let remote = remote();
    let sink: Arc<dyn FileSink> = Arc::new(DirectorySink::new(backups.path()));
    let job = MigrationJob::new(local, remote.clone(), sink);

    let outcome = job.run().await;

    assert!(outcome.succeeded, "{}", outcome.message);
    assert_eq!(outcome.strategy, MigrationStrategy::Simple);
    assert_eq!(outcome.counts.products, 2);
    assert_eq!(outcome.counts.customers, 1);
    assert_eq!(outcome.counts.orders, 1);

    // The primary attempt was rejected before anything landed, so the only
    // inserts are the three from the simple pass.
    let log = remote.insert_log();
    assert_eq!(
        log,
        vec![
            ("products".to_string(), 2),
            ("customers".to_string(), 1),
            ("orders".to_string(), 1),
        ]
    );

    let orders = remote.select("orders", &Default::default()).await.unwrap();
    assert!(orders[0].get("customer_id").is_none());

    let backup = outcome.backup_file.unwrap();
    assert!(backups.path().join(&backup).exists());
    assert_eq!(job.local_data_summary().unwrap().products, 3);
}

#[tokio::test]
async fn clean_data_migrates_with_links_and_can_then_be_cleared() {
    let data = tempfile::tempdir().unwrap();
    let backups = tempfile::tempdir().unwrap();
    seed(data.path());
    // Drop the dangling category so the primary strategy succeeds.
    std::fs::write(
        data.path().join("products.json"),
        json!([{"id": 1, "name": "Basmati Rice 5kg", "price": 450}]).to_string(),
    )
    .unwrap();

    let remote = remote();
    let job = MigrationJob::new(
        Arc::new(JsonFileLocalStore::new(data.path())),
        remote.clone(),
        Arc::new(DirectorySink::new(backups.path())),
    );

    let outcome = job.run().await;

    assert!(outcome.succeeded, "{}", outcome.message);
    assert_eq!(outcome.strategy, MigrationStrategy::Primary);
    let customers = remote.rows("customers");
    let orders = remote.rows("orders");
    assert_eq!(orders[0]["customer_id"], customers[0]["id"]);

    job.clear_local_data(Confirmation::Confirmed).unwrap();
    assert!(job.local_data_summary().unwrap().is_empty());
}
