//! Generic CRUD plumbing between typed records and the remote store.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use shopkeep_core::{DomainError, DomainResult, Entity};
use shopkeep_store::{Direction, Query, Record, RemoteStore, RemoteStoreError};

/// A record type stored in a remote table.
pub trait RemoteEntity: Entity + DeserializeOwned + Send {
    const TABLE: &'static str;

    /// Ordering applied when a query does not name one.
    const DEFAULT_ORDER: Option<(&'static str, Direction)> = None;
}

/// Client-built payload for creating a row of `Self::Entity`.
pub trait NewRecord: Serialize + Sync {
    type Entity: RemoteEntity;

    fn validate(&self) -> DomainResult<()>;
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] RemoteStoreError),

    #[error("{table}: could not decode row: {reason}")]
    Decode { table: &'static str, reason: String },
}

pub(crate) fn to_record<T: Serialize>(
    table: &'static str,
    value: &T,
) -> Result<Record, CatalogError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CatalogError::Decode {
            table,
            reason: format!("payload is not an object: {other}"),
        }),
        Err(e) => Err(CatalogError::Decode {
            table,
            reason: e.to_string(),
        }),
    }
}

pub(crate) fn from_record<T: RemoteEntity>(record: Record) -> Result<T, CatalogError> {
    serde_json::from_value(Value::Object(record)).map_err(|e| CatalogError::Decode {
        table: T::TABLE,
        reason: e.to_string(),
    })
}

pub async fn list<T, S>(store: &S, mut query: Query) -> Result<Vec<T>, CatalogError>
where
    T: RemoteEntity,
    S: RemoteStore + ?Sized,
{
    if query.order.is_none() {
        query.order = T::DEFAULT_ORDER.map(|(column, dir)| (column.to_string(), dir));
    }
    let rows = store.select(T::TABLE, &query).await?;
    tracing::debug!("fetched {} row(s) from {}", rows.len(), T::TABLE);
    rows.into_iter().map(from_record::<T>).collect()
}

pub async fn get<T, S>(store: &S, id: &T::Id) -> Result<Option<T>, CatalogError>
where
    T: RemoteEntity,
    S: RemoteStore + ?Sized,
{
    let query = Query::all().eq("id", id.to_string()).limit(1);
    let row = store.select(T::TABLE, &query).await?.into_iter().next();
    row.map(from_record::<T>).transpose()
}

pub async fn create<N, S>(store: &S, new: &N) -> Result<N::Entity, CatalogError>
where
    N: NewRecord,
    S: RemoteStore + ?Sized,
{
    new.validate()?;
    let table = <N::Entity as RemoteEntity>::TABLE;
    let record = to_record(table, new)?;
    let row = store
        .insert(table, vec![record])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CatalogError::Decode {
            table,
            reason: "insert returned no row".to_string(),
        })?;
    from_record(row)
}

pub async fn update<T, P, S>(store: &S, id: &T::Id, patch: &P) -> Result<T, CatalogError>
where
    T: RemoteEntity,
    P: Serialize + Sync,
    S: RemoteStore + ?Sized,
{
    let patch = to_record(T::TABLE, patch)?;
    if patch.is_empty() {
        return get::<T, S>(store, id).await?.ok_or(CatalogError::Domain(DomainError::not_found()));
    }
    let row = store.update(T::TABLE, &id.to_string(), patch).await?;
    from_record(row)
}

pub async fn delete<T, S>(store: &S, id: &T::Id) -> Result<(), CatalogError>
where
    T: RemoteEntity,
    S: RemoteStore + ?Sized,
{
    store.delete(T::TABLE, &id.to_string()).await?;
    Ok(())
}
