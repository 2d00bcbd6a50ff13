use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use serde_json::Value;
use uuid::Uuid;

use crate::remote::{
    ConstraintKind, Direction, Query, Record, RemoteStore, RemoteStoreError, compare_values,
};

/// Integrity rule enforced on insert/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Non-null `table.column` must equal the `id` of a row in `references`.
    ForeignKey {
        table: String,
        column: String,
        references: String,
    },
    Unique {
        table: String,
        column: String,
    },
    NotNull {
        table: String,
        column: String,
    },
}

impl Rule {
    pub fn foreign_key(
        table: impl Into<String>,
        column: impl Into<String>,
        references: impl Into<String>,
    ) -> Self {
        Self::ForeignKey {
            table: table.into(),
            column: column.into(),
            references: references.into(),
        }
    }

    pub fn unique(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Unique {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn not_null(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::NotNull {
            table: table.into(),
            column: column.into(),
        }
    }

    fn table(&self) -> &str {
        match self {
            Rule::ForeignKey { table, .. }
            | Rule::Unique { table, .. }
            | Rule::NotNull { table, .. } => table,
        }
    }
}

/// In-memory remote store.
///
/// Intended for tests/dev: assigns UUID ids, enforces the configured
/// [`Rule`]s and applies each insert batch all-or-nothing.
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    rules: Vec<Rule>,
    unavailable: RwLock<HashSet<String>>,
    inserts: RwLock<Vec<(String, usize)>>,
}

fn poisoned() -> RemoteStoreError {
    RemoteStoreError::Network("lock poisoned".to_string())
}

fn row_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    /// Make every call touching `table` fail with a network error.
    pub fn set_unavailable(&self, table: impl Into<String>) {
        if let Ok(mut set) = self.unavailable.write() {
            set.insert(table.into());
        }
    }

    /// Successful insert calls so far: `(table, row count)` in call order.
    pub fn insert_log(&self) -> Vec<(String, usize)> {
        self.inserts.read().map(|log| log.clone()).unwrap_or_default()
    }

    /// Snapshot of a table's rows.
    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables
            .read()
            .ok()
            .and_then(|t| t.get(table).cloned())
            .unwrap_or_default()
    }

    fn ensure_available(&self, table: &str) -> Result<(), RemoteStoreError> {
        let set = self.unavailable.read().map_err(|_| poisoned())?;
        if set.contains(table) {
            return Err(RemoteStoreError::Network(format!("{table} is unreachable")));
        }
        Ok(())
    }

    /// Check `candidate` against the rules for `table`, given the rows that
    /// would exist alongside it (`existing` excludes the candidate itself).
    fn check_rules(
        &self,
        tables: &HashMap<String, Vec<Record>>,
        table: &str,
        existing: &[&Record],
        candidate: &Record,
    ) -> Result<(), RemoteStoreError> {
        for rule in self.rules.iter().filter(|r| r.table() == table) {
            match rule {
                Rule::NotNull { column, .. } => {
                    if candidate.get(column).is_none_or(Value::is_null) {
                        return Err(RemoteStoreError::constraint(
                            ConstraintKind::NotNull,
                            format!("null value in column \"{column}\" of relation \"{table}\""),
                        ));
                    }
                }
                Rule::Unique { column, .. } => {
                    let Some(value) = candidate.get(column).filter(|v| !v.is_null()) else {
                        continue;
                    };
                    let same = |v: &Value| compare_values(v, value) == Some(core::cmp::Ordering::Equal);
                    let duplicate = existing.iter().any(|row| row.get(column).is_some_and(same));
                    if duplicate {
                        return Err(RemoteStoreError::constraint(
                            ConstraintKind::Unique,
                            format!("duplicate key value violates unique constraint {table}.{column}"),
                        ));
                    }
                }
                Rule::ForeignKey {
                    column, references, ..
                } => {
                    let Some(value) = candidate.get(column).filter(|v| !v.is_null()) else {
                        continue;
                    };
                    let target = value.as_str().unwrap_or_default();
                    let found = tables
                        .get(references)
                        .is_some_and(|rows| rows.iter().any(|r| row_id(r) == Some(target)));
                    if !found {
                        return Err(RemoteStoreError::constraint(
                            ConstraintKind::ForeignKey,
                            format!(
                                "insert or update on table \"{table}\" violates foreign key on {column}: key {value} is not present in \"{references}\""
                            ),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Record>, RemoteStoreError> {
        self.ensure_available(table)?;
        let tables = self.tables.read().map_err(|_| poisoned())?;

        let mut rows: Vec<Record> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some((column, direction)) = &query.order {
            rows.sort_by(|a, b| {
                let left = a.get(column).unwrap_or(&Value::Null);
                let right = b.get(column).unwrap_or(&Value::Null);
                let ord = compare_values(left, right).unwrap_or(core::cmp::Ordering::Equal);
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, RemoteStoreError> {
        self.ensure_available(table)?;
        let mut tables = self.tables.write().map_err(|_| poisoned())?;

        let mut staged: Vec<Record> = Vec::with_capacity(records.len());
        for mut record in records {
            if row_id(&record).is_none() {
                record.insert("id".to_string(), Value::String(Uuid::now_v7().to_string()));
            }
            let existing: Vec<&Record> = tables
                .get(table)
                .into_iter()
                .flatten()
                .chain(staged.iter())
                .collect();
            self.check_rules(&tables, table, &existing, &record)?;
            staged.push(record);
        }

        tables
            .entry(table.to_string())
            .or_default()
            .extend(staged.iter().cloned());

        if let Ok(mut log) = self.inserts.write() {
            log.push((table.to_string(), staged.len()));
        }
        Ok(staged)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Record,
    ) -> Result<Record, RemoteStoreError> {
        self.ensure_available(table)?;
        let mut tables = self.tables.write().map_err(|_| poisoned())?;

        let rows = tables.get(table).cloned().unwrap_or_default();
        let Some(index) = rows.iter().position(|r| row_id(r) == Some(id)) else {
            return Err(RemoteStoreError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        };

        let mut updated = rows[index].clone();
        for (key, value) in patch {
            if key != "id" {
                updated.insert(key, value);
            }
        }

        let others: Vec<&Record> = rows
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, r)| r)
            .collect();
        self.check_rules(&tables, table, &others, &updated)?;

        if let Some(rows) = tables.get_mut(table) {
            rows[index] = updated.clone();
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteStoreError> {
        self.ensure_available(table)?;
        let mut tables = self.tables.write().map_err(|_| poisoned())?;

        let rows = tables.entry(table.to_string()).or_default();
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id));
        if rows.len() == before {
            return Err(RemoteStoreError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
