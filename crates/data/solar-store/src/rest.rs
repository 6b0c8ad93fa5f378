//! Hosted store over the PostgREST wire protocol.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::{DataStore, Order, Result, StoreError, Table};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    bearer: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("solar-store/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, base_url, api_key))
    }

    pub fn with_client(client: Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            bearer: api_key.to_string(),
        }
    }

    pub fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.name())
    }

    fn scoped(&self, token: &str) -> Self {
        Self {
            bearer: token.to_string(),
            ..self.clone()
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.bearer)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            status: status.as_u16(),
            body,
        })
    }

    /// Runs a mutation that returns the affected rows; none affected means no such id.
    async fn affecting_one(&self, table: Table, id: &str, request: RequestBuilder) -> Result<()> {
        let response = self
            .authorized(request)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<Value> = Self::check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(StoreError::NotFound {
                table,
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DataStore for RestStore {
    async fn select(&self, table: Table, order: Order) -> Result<Vec<Value>> {
        debug!(table = %table, order = %order.query_value(), "select");
        let response = self
            .authorized(self.client.get(self.table_url(table)))
            .query(&[("select", "*".to_string()), ("order", order.query_value())])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        debug!(table = %table, "insert");
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        let mut rows: Vec<Value> = Self::check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(StoreError::InvalidRow);
        }
        Ok(rows.swap_remove(0))
    }

    async fn append(&self, table: Table, row: Value) -> Result<()> {
        debug!(table = %table, "append");
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<()> {
        debug!(table = %table, id, "update");
        let request = self.client.patch(self.table_url(table)).json(&patch);
        self.affecting_one(table, id, request).await
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        debug!(table = %table, id, "delete");
        let request = self.client.delete(self.table_url(table));
        self.affecting_one(table, id, request).await
    }

    fn with_access_token(&self, token: &str) -> Arc<dyn DataStore> {
        Arc::new(self.scoped(token))
    }

    fn backend(&self) -> &'static str {
        "postgrest"
    }
}
