//! Remote store boundary: generic CRUD over named tables.

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// A row as exchanged with the remote store (JSON object).
pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring match on string columns.
    IContains,
    /// Column is null or absent; `value` is ignored.
    IsNull,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Filters (AND-ed), optional ordering and limit for `select`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    /// Every row, store order.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filter(
        mut self,
        column: impl Into<String>,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether `record` passes every filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.filters.iter().all(|f| filter_matches(f, record))
    }
}

fn filter_matches(filter: &Filter, record: &Record) -> bool {
    let actual = record.get(&filter.column).unwrap_or(&Value::Null);
    match filter.op {
        FilterOp::IsNull => actual.is_null(),
        FilterOp::Eq => compare_values(actual, &filter.value) == Some(Ordering::Equal),
        FilterOp::Neq => compare_values(actual, &filter.value) != Some(Ordering::Equal),
        FilterOp::Gt => compare_values(actual, &filter.value) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(
            compare_values(actual, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lt => compare_values(actual, &filter.value) == Some(Ordering::Less),
        FilterOp::Lte => matches!(
            compare_values(actual, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOp::IContains => match (actual.as_str(), filter.value.as_str()) {
            (Some(haystack), Some(needle)) => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            _ => false,
        },
    }
}

/// Ordering between two JSON scalars of the same kind. Numbers may be stored
/// as strings (decimal columns), so numeric strings compare numerically.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    fn as_number(v: &Value) -> Option<f64> {
        match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse::<f64>().ok(),
            _ => None,
        }
    }

    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => match (x.parse::<f64>(), y.parse::<f64>()) {
            (Ok(nx), Ok(ny)) => nx.partial_cmp(&ny),
            _ => Some(x.cmp(y)),
        },
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

/// Which relational rule rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    ForeignKey,
    Unique,
    NotNull,
    Check,
    Other,
}

impl ConstraintKind {
    /// Map a PostgreSQL SQLSTATE code. Only class 23 (integrity constraint
    /// violation) maps to a constraint kind.
    pub fn from_sqlstate(code: &str) -> Option<Self> {
        match code {
            "23503" => Some(Self::ForeignKey),
            "23505" => Some(Self::Unique),
            "23502" => Some(Self::NotNull),
            "23514" => Some(Self::Check),
            c if c.starts_with("23") => Some(Self::Other),
            _ => None,
        }
    }
}

impl core::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::ForeignKey => "foreign key",
            Self::Unique => "unique",
            Self::NotNull => "not null",
            Self::Check => "check",
            Self::Other => "integrity",
        };
        f.write_str(s)
    }
}

/// Stable classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Constraint(ConstraintKind),
    NotFound,
    Network,
    Other,
}

#[derive(Debug, Error)]
pub enum RemoteStoreError {
    #[error("{kind} constraint violated: {message}")]
    Constraint {
        kind: ConstraintKind,
        message: String,
    },

    #[error("{table} row {id} not found")]
    NotFound { table: String, id: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("remote store error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("could not decode remote response: {0}")]
    Decode(String),
}

impl RemoteStoreError {
    pub fn constraint(kind: ConstraintKind, message: impl Into<String>) -> Self {
        Self::Constraint {
            kind,
            message: message.into(),
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Constraint { kind, .. } => ErrorClass::Constraint(*kind),
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Network(_) => ErrorClass::Network,
            Self::Api { .. } | Self::Decode(_) => ErrorClass::Other,
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self.class(), ErrorClass::Constraint(_))
    }
}

/// Minimal CRUD contract of the hosted database.
///
/// `insert` is all-or-nothing per call and returns the stored rows (with
/// server-assigned ids) in input order.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Record>, RemoteStoreError>;

    async fn insert(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, RemoteStoreError>;

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Record,
    ) -> Result<Record, RemoteStoreError>;

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteStoreError>;
}

#[async_trait::async_trait]
impl<S> RemoteStore for Arc<S>
where
    S: RemoteStore + ?Sized,
{
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Record>, RemoteStoreError> {
        (**self).select(table, query).await
    }

    async fn insert(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, RemoteStoreError> {
        (**self).insert(table, records).await
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Record,
    ) -> Result<Record, RemoteStoreError> {
        (**self).update(table, id, patch).await
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteStoreError> {
        (**self).delete(table, id).await
    }
}
