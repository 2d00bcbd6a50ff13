//! Per-strategy record preparation.
//!
//! Local ids are never sent; the remote store assigns its own. The primary
//! strategy rewrites links to the ids the remote store returned, the simple
//! strategy drops links and skips records missing required fields.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use shopkeep_store::Record;

/// Local id -> remote id.
pub type IdMap = HashMap<String, String>;

const CATEGORY_LINK: &str = "category_id";
const CUSTOMER_LINK: &str = "customer_id";
const PRODUCT_LINK: &str = "product_id";

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Pair local records with the rows the store returned for them, in order.
pub fn id_map(local: &[Record], inserted: &[Record]) -> IdMap {
    local
        .iter()
        .zip(inserted)
        .filter_map(|(before, after)| {
            let from = before.get("id").and_then(id_text)?;
            let to = after.get("id").and_then(id_text)?;
            Some((from, to))
        })
        .collect()
}

fn remap(record: &mut Record, field: &str, ids: &IdMap) {
    let mapped = record
        .get(field)
        .and_then(id_text)
        .and_then(|local| ids.get(&local).cloned());
    if let Some(remote) = mapped {
        record.insert(field.to_string(), Value::String(remote));
    }
}

fn items_mut(record: &mut Record) -> impl Iterator<Item = &mut Record> {
    record
        .get_mut("items")
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object_mut)
}

fn without_id(mut record: Record) -> Record {
    record.remove("id");
    record
}

pub fn primary_product(record: Record) -> Record {
    without_id(record)
}

pub fn primary_customer(record: Record) -> Record {
    without_id(record)
}

pub fn primary_order(record: Record, customers: &IdMap, products: &IdMap) -> Record {
    let mut record = without_id(record);
    remap(&mut record, CUSTOMER_LINK, customers);
    for item in items_mut(&mut record) {
        remap(item, PRODUCT_LINK, products);
    }
    record
}

fn has_text(record: &Record, field: &str) -> bool {
    record
        .get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

fn has_number(record: &Record, field: &str) -> bool {
    match record.get(field) {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

pub fn simple_product(record: Record) -> Option<Record> {
    if !has_text(&record, "name") || !has_number(&record, "price") {
        debug!(?record, "skipping product without name or price");
        return None;
    }
    let mut record = without_id(record);
    record.remove(CATEGORY_LINK);
    Some(record)
}

pub fn simple_customer(record: Record) -> Option<Record> {
    if !has_text(&record, "name") {
        debug!(?record, "skipping customer without name");
        return None;
    }
    Some(without_id(record))
}

pub fn simple_order(record: Record) -> Option<Record> {
    let has_items = record
        .get("items")
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty());
    if !has_items || !has_number(&record, "total") {
        debug!(?record, "skipping order without items or total");
        return None;
    }
    let mut record = without_id(record);
    record.remove(CUSTOMER_LINK);
    for item in items_mut(&mut record) {
        item.remove(PRODUCT_LINK);
    }
    Some(record)
}
