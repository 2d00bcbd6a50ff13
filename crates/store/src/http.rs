//! HTTP adapter for a hosted PostgREST-style database.

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::remote::{
    ConstraintKind, Direction, FilterOp, Query, Record, RemoteStore, RemoteStoreError,
};

#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Project URL, e.g. `https://xyz.example.co`.
    pub base_url: String,
    /// Public (anon) API key, sent as `apikey`.
    pub api_key: String,
    /// Signed-in user's token; falls back to the API key when absent.
    pub access_token: Option<String>,
}

/// Error body returned by the REST layer.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

pub struct HttpRemoteStore {
    config: HttpStoreConfig,
    client: Client,
}

impl HttpRemoteStore {
    pub fn new(config: HttpStoreConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn with_client(config: HttpStoreConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url.trim_end_matches('/'), table)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        let token = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.api_key);
        req.header("apikey", &self.config.api_key).bearer_auth(token)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Vec<Record>, RemoteStoreError> {
        let resp = self
            .authorized(req)
            .send()
            .await
            .map_err(|e| RemoteStoreError::Network(e.to_string()))?;
        decode_rows(resp).await
    }
}

async fn decode_rows(resp: Response) -> Result<Vec<Record>, RemoteStoreError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| RemoteStoreError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(classify_error(status.as_u16(), &body));
    }
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value =
        serde_json::from_str(&body).map_err(|e| RemoteStoreError::Decode(e.to_string()))?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(RemoteStoreError::Decode(format!("expected object row, got {other}"))),
            })
            .collect(),
        Value::Object(map) => Ok(vec![map]),
        other => Err(RemoteStoreError::Decode(format!("unexpected response body {other}"))),
    }
}

/// Turn a non-2xx response into a typed error, using the SQLSTATE code
/// rather than the message text.
pub(crate) fn classify_error(status: u16, body: &str) -> RemoteStoreError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = match (parsed.message, parsed.details) {
        (Some(m), Some(d)) => format!("{m} ({d})"),
        (Some(m), None) => m,
        (None, _) if !body.is_empty() => body.to_string(),
        (None, _) => format!("HTTP {status}"),
    };

    if let Some(kind) = parsed.code.as_deref().and_then(ConstraintKind::from_sqlstate) {
        return RemoteStoreError::Constraint { kind, message };
    }
    RemoteStoreError::Api {
        status,
        code: parsed.code,
        message,
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// PostgREST query-string parameters for a [`Query`].
pub(crate) fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for filter in &query.filters {
        let value = scalar(&filter.value);
        let expr = match filter.op {
            FilterOp::Eq => format!("eq.{value}"),
            FilterOp::Neq => format!("neq.{value}"),
            FilterOp::Gt => format!("gt.{value}"),
            FilterOp::Gte => format!("gte.{value}"),
            FilterOp::Lt => format!("lt.{value}"),
            FilterOp::Lte => format!("lte.{value}"),
            FilterOp::IContains => format!("ilike.*{value}*"),
            FilterOp::IsNull => "is.null".to_string(),
        };
        params.push((filter.column.clone(), expr));
    }

    if let Some((column, direction)) = &query.order {
        let dir = match direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        params.push(("order".to_string(), format!("{column}.{dir}")));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn id_param(id: &str) -> [(String, String); 1] {
    [("id".to_string(), format!("eq.{id}"))]
}

fn not_found(table: &str, id: &str) -> RemoteStoreError {
    RemoteStoreError::NotFound {
        table: table.to_string(),
        id: id.to_string(),
    }
}

#[async_trait::async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Record>, RemoteStoreError> {
        let req = self.client.get(self.table_url(table)).query(&query_params(query));
        self.send(req).await
    }

    async fn insert(
        &self,
        table: &str,
        records: Vec<Record>,
    ) -> Result<Vec<Record>, RemoteStoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!("inserting {} row(s) into {}", records.len(), table);
        let req = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&records);
        self.send(req).await
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Record,
    ) -> Result<Record, RemoteStoreError> {
        let req = self
            .client
            .patch(self.table_url(table))
            .query(&id_param(id))
            .header("Prefer", "return=representation")
            .json(&patch);
        self.send(req)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| not_found(table, id))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), RemoteStoreError> {
        let req = self
            .client
            .delete(self.table_url(table))
            .query(&id_param(id))
            .header("Prefer", "return=representation");
        let deleted = self.send(req).await?;
        if deleted.is_empty() {
            return Err(not_found(table, id));
        }
        Ok(())
    }
}
