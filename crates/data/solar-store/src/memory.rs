//! In-process tables.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;

use crate::{into_row, DataStore, Order, Result, Row, StoreError, Table};

#[derive(Default)]
struct Tables {
    rows: HashMap<Table, Vec<Row>>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing so that creation order survives a sort on the timestamp.
    fn stamp(&mut self) -> String {
        let mut now = Utc::now();
        if let Some(last) = self.last_stamp {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_stamp = Some(now);
        now.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// Cloning shares the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of installer rows. Ids and timestamps are assigned on insert.
    pub async fn seed_from(&self, path: &Path) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path).await?;
        let rows: Vec<Value> = serde_json::from_str(&raw)?;
        let count = rows.len();
        for row in rows {
            self.insert(Table::Installers, row).await?;
        }
        info!(count, path = %path.display(), "seeded installers");
        Ok(count)
    }

    pub async fn len(&self, table: Table) -> usize {
        self.tables
            .read()
            .await
            .rows
            .get(&table)
            .map_or(0, Vec::len)
    }
}

/// Sort rank for values of different JSON types, so mixed columns still order totally.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Null) | None, Some(Value::Null) | None) => Ordering::Equal,
        // nulls sort after values in either direction, as PostgREST does for desc
        (Some(Value::Null) | None, _) => Ordering::Greater,
        (_, Some(Value::Null) | None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => type_rank(x).cmp(&type_rank(y)),
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, table: Table, order: Order) -> Result<Vec<Value>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Row> = tables.rows.get(&table).cloned().unwrap_or_default();
        rows.sort_by(|a, b| {
            let ordering = compare(a.get(order.column), b.get(order.column));
            let is_null = |row: &Row| matches!(row.get(order.column), None | Some(Value::Null));
            if order.descending && !is_null(a) && !is_null(b) {
                ordering.reverse()
            } else {
                ordering
            }
        });
        Ok(rows.into_iter().map(Value::Object).collect())
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        let mut row = into_row(row)?;
        let mut tables = self.tables.write().await;
        let stamp = tables.stamp();

        row.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
        row.insert("created_at".into(), Value::String(stamp.clone()));
        match table {
            Table::Installers => {
                row.insert("updated_at".into(), Value::String(stamp));
            }
            Table::QuoteRequests => {
                row.entry("email_sent").or_insert(Value::Bool(false));
            }
        }

        tables.rows.entry(table).or_default().push(row.clone());
        Ok(Value::Object(row))
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<()> {
        let patch = into_row(patch)?;
        let mut tables = self.tables.write().await;
        let stamp = tables.stamp();
        let row = tables
            .rows
            .get_mut(&table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
            })
            .ok_or_else(|| StoreError::NotFound {
                table,
                id: id.to_string(),
            })?;

        for (key, value) in patch {
            if key != "id" && key != "created_at" {
                row.insert(key, value);
            }
        }
        if table == Table::Installers {
            row.insert("updated_at".into(), Value::String(stamp));
        }
        Ok(())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let rows = tables.rows.entry(table).or_default();
        let before = rows.len();
        rows.retain(|row| row.get("id").and_then(Value::as_str) != Some(id));
        if rows.len() == before {
            return Err(StoreError::NotFound {
                table,
                id: id.to_string(),
            });
        }
        Ok(())
    }

    fn with_access_token(&self, _token: &str) -> Arc<dyn DataStore> {
        Arc::new(self.clone())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let store = MemoryStore::new();
        let row = store
            .insert(Table::QuoteRequests, json!({"name": "Ada", "address": "1 Main", "phone": "555"}))
            .await
            .unwrap();
        assert!(row["id"].as_str().is_some());
        assert!(row["created_at"].as_str().is_some());
        assert_eq!(row["email_sent"], json!(false));
        assert!(row.get("updated_at").is_none());
    }

    #[tokio::test]
    async fn select_orders_numbers_and_timestamps() {
        let store = MemoryStore::new();
        for (name, rating) in [("B", 4.2), ("A", 4.9), ("C", 3.1)] {
            store
                .insert(Table::Installers, json!({"name": name, "rating": rating}))
                .await
                .unwrap();
        }

        let by_rating = store.select(Table::Installers, Order::desc("rating")).await.unwrap();
        let names: Vec<_> = by_rating.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);

        let newest = store
            .select(Table::Installers, Order::desc("created_at"))
            .await
            .unwrap();
        let names: Vec<_> = newest.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn equal_keys_keep_insertion_order() {
        let store = MemoryStore::new();
        for name in ["first", "second", "third"] {
            store
                .insert(Table::Installers, json!({"name": name, "rating": 4.5}))
                .await
                .unwrap();
        }
        let rows = store.select(Table::Installers, Order::desc("rating")).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn update_patches_and_refreshes_updated_at() {
        let store = MemoryStore::new();
        let row = store
            .insert(Table::Installers, json!({"name": "Old", "rating": 4.0}))
            .await
            .unwrap();
        let id = row["id"].as_str().unwrap();

        store
            .update(Table::Installers, id, json!({"name": "New", "id": "hijack"}))
            .await
            .unwrap();

        let rows = store.select(Table::Installers, Order::desc("rating")).await.unwrap();
        assert_eq!(rows[0]["name"], json!("New"));
        assert_eq!(rows[0]["id"], json!(id));
        assert_ne!(rows[0]["updated_at"], row["updated_at"]);
        assert_eq!(rows[0]["created_at"], row["created_at"]);
    }

    #[tokio::test]
    async fn mixed_column_types_still_sort() {
        let store = MemoryStore::new();
        for row in [
            json!({"name": "Low", "rating": 3.0}),
            json!({"name": "Unrated", "rating": null}),
            json!({"name": "Text", "rating": "4.5"}),
            json!({"name": "High", "rating": 4.9}),
            json!({"name": "Flag", "rating": true}),
        ] {
            store.insert(Table::Installers, row).await.unwrap();
        }

        let rows = store.select(Table::Installers, Order::desc("rating")).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Text", "High", "Low", "Flag", "Unrated"]);
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryStore::new();
        let err = tokio_test::assert_err!(store.delete(Table::Installers, "nope").await);
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(matches!(
            store.update(Table::QuoteRequests, "nope", json!({})).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let store = MemoryStore::new();
        let row = store
            .insert(Table::QuoteRequests, json!({"name": "Ada"}))
            .await
            .unwrap();
        store
            .delete(Table::QuoteRequests, row["id"].as_str().unwrap())
            .await
            .unwrap();
        assert_eq!(store.len(Table::QuoteRequests).await, 0);
    }

    #[tokio::test]
    async fn rejects_non_object_rows() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.insert(Table::Installers, json!([1, 2])).await,
            Err(StoreError::InvalidRow)
        ));
    }

    #[tokio::test]
    async fn seeds_from_json_file() {
        let path = std::env::temp_dir().join(format!("solar-seed-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, r#"[{"name": "Seeded", "rating": 4.1}]"#)
            .await
            .unwrap();
        let store = MemoryStore::new();
        assert_eq!(store.seed_from(&path).await.unwrap(), 1);
        assert_eq!(store.len(Table::Installers).await, 1);
        let _ = tokio::fs::remove_file(&path).await;
    }
}
