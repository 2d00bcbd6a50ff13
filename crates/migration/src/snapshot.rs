use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use shopkeep_store::{LocalStore, Record};

use crate::error::MigrationError;

pub const PRODUCTS: &str = "products";
pub const CUSTOMERS: &str = "customers";
pub const ORDERS: &str = "orders";

/// Local namespaces copied by the migration, in insert order. Each one maps
/// to the remote table of the same name.
pub const NAMESPACES: [&str; 3] = [PRODUCTS, CUSTOMERS, ORDERS];

/// Local data exactly as read, in the shape written to the backup file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub taken_at: Option<NaiveDateTime>,
    pub products: Vec<Value>,
    pub customers: Vec<Value>,
    pub orders: Vec<Value>,
}

impl Snapshot {
    pub fn load(local: &dyn LocalStore, taken_at: NaiveDateTime) -> Result<Self, MigrationError> {
        let snapshot = Self {
            taken_at: Some(taken_at),
            products: local.read_all(PRODUCTS)?,
            customers: local.read_all(CUSTOMERS)?,
            orders: local.read_all(ORDERS)?,
        };
        debug!(
            products = snapshot.products.len(),
            customers = snapshot.customers.len(),
            orders = snapshot.orders.len(),
            "local snapshot taken"
        );
        Ok(snapshot)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.customers.is_empty() && self.orders.is_empty()
    }

    pub fn to_backup_json(&self) -> Result<Vec<u8>, MigrationError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Object entries of a namespace with keys normalized to snake_case.
/// Anything that is not a JSON object is skipped.
pub fn records(namespace: &str, values: &[Value]) -> Vec<Record> {
    values
        .iter()
        .filter_map(|value| match value {
            Value::Object(map) => Some(normalize_keys(map.clone())),
            other => {
                warn!(namespace, found = %other, "skipping non-object local record");
                None
            }
        })
        .collect()
}

fn normalize_keys(record: Record) -> Record {
    record
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Array(items) => Value::Array(
                    items
                        .into_iter()
                        .map(|item| match item {
                            Value::Object(map) => Value::Object(normalize_keys(map)),
                            other => other,
                        })
                        .collect(),
                ),
                other => other,
            };
            (snake_case(&key), value)
        })
        .collect()
}

/// `categoryId` -> `category_id`; snake_case keys pass through.
fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
