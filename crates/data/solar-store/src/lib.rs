//! Solar Store
//!
//! Generic row access to the `installers` and `quote_requests` tables.
//!
//! - [`RestStore`]: a hosted PostgREST endpoint over reqwest
//! - [`MemoryStore`]: in-process tables for local runs and tests
//! - [`InstallerRepo`] / [`QuoteRequestRepo`]: typed views over either

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub mod memory;
pub mod repo;
pub mod rest;

pub use memory::MemoryStore;
pub use repo::{InstallerRepo, QuoteRequestRepo};
pub use rest::RestStore;

/// A JSON object row.
pub type Row = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode row: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("no {table} row with id {id}")]
    NotFound { table: Table, id: String },

    #[error("row must be a JSON object")]
    InvalidRow,

    #[error("failed to read seed file: {0}")]
    Seed(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Installers,
    QuoteRequests,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Installers => "installers",
            Table::QuoteRequests => "quote_requests",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort key for a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

impl Order {
    pub fn desc(column: &'static str) -> Self {
        Self {
            column,
            descending: true,
        }
    }

    pub fn asc(column: &'static str) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    /// PostgREST `order=` value.
    pub fn query_value(&self) -> String {
        let direction = if self.descending { "desc" } else { "asc" };
        format!("{}.{}", self.column, direction)
    }
}

/// Query/insert/update/delete over the two tables.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Every row of `table`, sorted.
    async fn select(&self, table: Table, order: Order) -> Result<Vec<Value>>;

    /// Insert one row; returns it as stored, with `id` and timestamps assigned.
    async fn insert(&self, table: Table, row: Value) -> Result<Value>;

    /// Insert one row without reading it back, for tables the caller may write but not read.
    async fn append(&self, table: Table, row: Value) -> Result<()> {
        self.insert(table, row).await.map(|_| ())
    }

    /// Patch the row with the given id.
    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<()>;

    /// Remove the row with the given id.
    async fn delete(&self, table: Table, id: &str) -> Result<()>;

    /// The same store acting with an admin's access token instead of the public key.
    fn with_access_token(&self, token: &str) -> Arc<dyn DataStore>;

    fn backend(&self) -> &'static str;
}

pub(crate) fn into_row(value: Value) -> Result<Row> {
    match value {
        Value::Object(row) => Ok(row),
        _ => Err(StoreError::InvalidRow),
    }
}
