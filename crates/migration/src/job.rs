use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use shopkeep_core::{Clock, FileSink, SystemClock};
use shopkeep_store::{LocalStore, Record, RemoteStore};

use crate::error::MigrationError;
use crate::prepare::{
    id_map, primary_customer, primary_order, primary_product, simple_customer, simple_order,
    simple_product,
};
use crate::snapshot::{CUSTOMERS, NAMESPACES, ORDERS, PRODUCTS, Snapshot, records};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MigrationCounts {
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
}

impl MigrationCounts {
    pub fn total(&self) -> usize {
        self.products + self.customers + self.orders
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStrategy {
    Primary,
    Simple,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationOutcome {
    pub succeeded: bool,
    pub message: String,
    pub counts: MigrationCounts,
    pub strategy: MigrationStrategy,
    pub backup_file: Option<String>,
}

impl MigrationOutcome {
    fn completed(
        counts: MigrationCounts,
        strategy: MigrationStrategy,
        backup_file: String,
    ) -> Self {
        let mut message = format!(
            "Migrated {} products, {} customers and {} orders.",
            counts.products, counts.customers, counts.orders
        );
        if strategy == MigrationStrategy::Simple {
            message.push_str(" Some links between records could not be kept.");
        }
        Self {
            succeeded: true,
            message,
            counts,
            strategy,
            backup_file: Some(backup_file),
        }
    }

    fn nothing_to_migrate() -> Self {
        Self {
            succeeded: true,
            message: "No local data to migrate.".to_string(),
            counts: MigrationCounts::default(),
            strategy: MigrationStrategy::None,
            backup_file: None,
        }
    }

    fn failed(err: &MigrationError, backup_file: Option<String>) -> Self {
        let mut message = format!("Migration failed: {err}.");
        if let Some(file) = &backup_file {
            message.push_str(&format!(" Your data is backed up in {file}."));
        }
        Self {
            succeeded: false,
            message,
            counts: MigrationCounts::default(),
            strategy: MigrationStrategy::None,
            backup_file,
        }
    }
}

/// Record counts currently held locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocalDataSummary {
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
}

impl LocalDataSummary {
    pub fn is_empty(&self) -> bool {
        self.products + self.customers + self.orders == 0
    }
}

/// Caller's answer to "delete local data?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

/// The migration batch job. Each call to [`MigrationJob::run`] is one
/// attempt; nothing is resumed between attempts.
pub struct MigrationJob {
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    sink: Arc<dyn FileSink>,
    clock: Arc<dyn Clock>,
}

impl MigrationJob {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        sink: Arc<dyn FileSink>,
    ) -> Self {
        Self {
            local,
            remote,
            sink,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn local_data_summary(&self) -> Result<LocalDataSummary, MigrationError> {
        Ok(LocalDataSummary {
            products: self.local.read_all(PRODUCTS)?.len(),
            customers: self.local.read_all(CUSTOMERS)?.len(),
            orders: self.local.read_all(ORDERS)?.len(),
        })
    }

    /// Delete the migrated namespaces from local storage.
    pub fn clear_local_data(&self, confirmation: Confirmation) -> Result<(), MigrationError> {
        if confirmation != Confirmation::Confirmed {
            return Err(MigrationError::NotConfirmed);
        }
        for namespace in NAMESPACES {
            self.local.remove(namespace)?;
        }
        info!("local data cleared");
        Ok(())
    }

    pub async fn run(&self) -> MigrationOutcome {
        let snapshot = match Snapshot::load(self.local.as_ref(), self.clock.now()) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "migration aborted");
                return MigrationOutcome::failed(&err, None);
            }
        };
        if snapshot.is_empty() {
            info!("no local data to migrate");
            return MigrationOutcome::nothing_to_migrate();
        }

        let backup = match self.backup(&snapshot) {
            Ok(file) => file,
            Err(err) => {
                warn!(error = %err, "migration aborted, backup failed");
                return MigrationOutcome::failed(&err, None);
            }
        };

        let result = match self.insert_primary(&snapshot).await {
            Ok(counts) => Ok((counts, MigrationStrategy::Primary)),
            Err(err) if err.is_constraint() => {
                warn!(error = %err, "primary migration rejected, retrying with simple strategy");
                self.insert_simple(&snapshot)
                    .await
                    .map(|counts| (counts, MigrationStrategy::Simple))
            }
            Err(err) => Err(err),
        };

        match result {
            Ok((counts, strategy)) => {
                info!(
                    products = counts.products,
                    customers = counts.customers,
                    orders = counts.orders,
                    ?strategy,
                    "migration complete"
                );
                MigrationOutcome::completed(counts, strategy, backup)
            }
            Err(err) => {
                warn!(error = %err, "migration failed");
                MigrationOutcome::failed(&err, Some(backup))
            }
        }
    }

    fn backup(&self, snapshot: &Snapshot) -> Result<String, MigrationError> {
        let name = format!("shopkeep_backup_{}.json", self.clock.now().format("%Y-%m-%d_%H%M%S"));
        let saved = self.sink.save(&name, &snapshot.to_backup_json()?)?;
        info!(file = %saved.file_name, size = saved.size, "local data backed up");
        Ok(saved.file_name)
    }

    async fn insert(&self, table: &str, rows: Vec<Record>) -> Result<Vec<Record>, MigrationError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let inserted = self.remote.insert(table, rows).await?;
        info!(table, count = inserted.len(), "inserted");
        Ok(inserted)
    }

    async fn insert_primary(&self, snapshot: &Snapshot) -> Result<MigrationCounts, MigrationError> {
        let products = records(PRODUCTS, &snapshot.products);
        let inserted = self
            .insert(PRODUCTS, products.iter().cloned().map(primary_product).collect())
            .await?;
        let product_ids = id_map(&products, &inserted);
        let mut counts = MigrationCounts {
            products: inserted.len(),
            ..MigrationCounts::default()
        };

        let customers = records(CUSTOMERS, &snapshot.customers);
        let inserted = self
            .insert(CUSTOMERS, customers.iter().cloned().map(primary_customer).collect())
            .await?;
        let customer_ids = id_map(&customers, &inserted);
        counts.customers = inserted.len();

        let orders = records(ORDERS, &snapshot.orders)
            .into_iter()
            .map(|order| primary_order(order, &customer_ids, &product_ids))
            .collect();
        counts.orders = self.insert(ORDERS, orders).await?.len();

        Ok(counts)
    }

    async fn insert_simple(&self, snapshot: &Snapshot) -> Result<MigrationCounts, MigrationError> {
        let products = records(PRODUCTS, &snapshot.products)
            .into_iter()
            .filter_map(simple_product)
            .collect();
        let customers = records(CUSTOMERS, &snapshot.customers)
            .into_iter()
            .filter_map(simple_customer)
            .collect();
        let orders = records(ORDERS, &snapshot.orders)
            .into_iter()
            .filter_map(simple_order)
            .collect();

        Ok(MigrationCounts {
            products: self.insert(PRODUCTS, products).await?.len(),
            customers: self.insert(CUSTOMERS, customers).await?.len(),
            orders: self.insert(ORDERS, orders).await?.len(),
        })
    }
}
