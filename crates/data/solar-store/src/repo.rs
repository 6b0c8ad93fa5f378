//! Typed access to the two tables.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use solar_core::{Installer, InstallerFields, QuoteRequest, QuoteRequestPayload};
use tracing::warn;

use crate::{DataStore, Order, Result, Table};

/// Rows that fail to decode are skipped with a warning rather than failing the whole list.
fn decode_rows<T: DeserializeOwned>(table: Table, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(table = %table, error = %e, "skipping undecodable row");
                None
            }
        })
        .collect()
}

#[derive(Clone)]
pub struct InstallerRepo {
    store: Arc<dyn DataStore>,
}

impl InstallerRepo {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Visitor listing order.
    pub async fn by_rating(&self) -> Result<Vec<Installer>> {
        let rows = self
            .store
            .select(Table::Installers, Order::desc("rating"))
            .await?;
        Ok(decode_rows(Table::Installers, rows))
    }

    /// Admin console order.
    pub async fn newest_first(&self) -> Result<Vec<Installer>> {
        let rows = self
            .store
            .select(Table::Installers, Order::desc("created_at"))
            .await?;
        Ok(decode_rows(Table::Installers, rows))
    }

    pub async fn create(&self, fields: &InstallerFields) -> Result<Installer> {
        let row = self
            .store
            .insert(Table::Installers, serde_json::to_value(fields)?)
            .await?;
        Ok(serde_json::from_value(row)?)
    }

    pub async fn update(&self, id: &str, fields: &InstallerFields) -> Result<()> {
        self.store
            .update(Table::Installers, id, serde_json::to_value(fields)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(Table::Installers, id).await
    }
}

#[derive(Clone)]
pub struct QuoteRequestRepo {
    store: Arc<dyn DataStore>,
}

impl QuoteRequestRepo {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn newest_first(&self) -> Result<Vec<QuoteRequest>> {
        let rows = self
            .store
            .select(Table::QuoteRequests, Order::desc("created_at"))
            .await?;
        Ok(decode_rows(Table::QuoteRequests, rows))
    }

    /// Stores a visitor's lead. The row is not read back: visitors may insert
    /// into `quote_requests` without being allowed to select from it.
    pub async fn create(&self, payload: &QuoteRequestPayload) -> Result<()> {
        self.store
            .append(Table::QuoteRequests, serde_json::to_value(payload)?)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(Table::QuoteRequests, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use solar_core::PriceTier;

    fn fields(name: &str, rating: f64) -> InstallerFields {
        InstallerFields {
            name: name.to_string(),
            description: "Panels".to_string(),
            phone: "555-0100".to_string(),
            website: None,
            rating,
            years_in_business: 3,
            certifications: vec!["NABCEP Certified".to_string()],
            services: vec!["Residential Solar".to_string()],
            price_range: PriceTier::Budget,
            image_url: None,
        }
    }

    #[tokio::test]
    async fn installers_round_trip_through_store() {
        let repo = InstallerRepo::new(Arc::new(MemoryStore::new()));
        let low = repo.create(&fields("Low", 3.9)).await.unwrap();
        repo.create(&fields("High", 4.9)).await.unwrap();

        let ranked = repo.by_rating().await.unwrap();
        assert_eq!(ranked[0].name, "High");
        assert_eq!(ranked[1].fields(), fields("Low", 3.9));

        let newest = repo.newest_first().await.unwrap();
        assert_eq!(newest[0].name, "High");

        repo.update(&low.id, &fields("Lower", 3.0)).await.unwrap();
        repo.delete(&low.id).await.unwrap();
        assert_eq!(repo.by_rating().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_rows_are_skipped() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(Table::Installers, serde_json::json!({"name": "Broken"}))
            .await
            .unwrap();
        let repo = InstallerRepo::new(store);
        repo.create(&fields("Whole", 4.0)).await.unwrap();
        let listed = repo.by_rating().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Whole");
    }

    #[tokio::test]
    async fn quote_requests_default_email_sent_false() {
        let repo = QuoteRequestRepo::new(Arc::new(MemoryStore::new()));
        repo.create(&QuoteRequestPayload {
            name: "Ada".into(),
            address: "1 Main St".into(),
            phone: "555".into(),
            email: None,
        })
        .await
        .unwrap();

        let stored = repo.newest_first().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Ada");
        assert!(!stored[0].email_sent);
        assert_eq!(stored[0].email, None);
    }
}
