//! Visitor listing state.
//!
//! The list is fetched once per activation and then filtered in memory on every
//! keystroke. The lock is never held across the fetch.

use std::sync::Arc;

use solar_core::{Installer, ListingLayout};
use solar_store::InstallerRepo;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Default)]
pub struct ListingSnapshot {
    pub installers: Arc<Vec<Installer>>,
    pub loading: bool,
}

impl ListingSnapshot {
    pub fn layout(&self, query: &str) -> ListingLayout<'_> {
        ListingLayout::build(&self.installers, query)
    }
}

/// Held list plus refresh bookkeeping. `issued` counts refreshes started and
/// `applied` is the newest of them whose result is on display.
#[derive(Debug, Default)]
struct Held {
    snapshot: ListingSnapshot,
    issued: u64,
    applied: u64,
}

pub struct ListingView {
    repo: InstallerRepo,
    state: RwLock<Held>,
}

impl ListingView {
    pub fn new(repo: InstallerRepo) -> Self {
        Self {
            repo,
            state: RwLock::new(Held::default()),
        }
    }

    /// Re-fetch by rating. A failed fetch is logged and leaves the list empty.
    ///
    /// Refreshes may overlap; a fetch that finishes after a newer one has been
    /// applied is dropped. Returns the number of installers now held.
    pub async fn refresh(&self) -> usize {
        let ticket = {
            let mut held = self.state.write().await;
            held.issued += 1;
            held.snapshot.loading = true;
            held.issued
        };

        let installers = match self.repo.by_rating().await {
            Ok(installers) => installers,
            Err(e) => {
                error!(error = %e, "error fetching installers");
                Vec::new()
            }
        };

        let mut held = self.state.write().await;
        if ticket > held.applied {
            held.applied = ticket;
            held.snapshot.installers = Arc::new(installers);
            info!(count = held.snapshot.installers.len(), "listing refreshed");
        } else {
            debug!(ticket, applied = held.applied, "dropping stale listing fetch");
        }
        held.snapshot.loading = held.applied < held.issued;
        held.snapshot.installers.len()
    }

    pub async fn snapshot(&self) -> ListingSnapshot {
        self.state.read().await.snapshot.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use solar_store::{DataStore, MemoryStore, Order, StoreError, Table};
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
    use std::time::Duration;

    struct FailingStore;

    #[async_trait]
    impl DataStore for FailingStore {
        async fn select(&self, _: Table, _: Order) -> solar_store::Result<Vec<Value>> {
            Err(StoreError::Status {
                status: 503,
                body: "unavailable".into(),
            })
        }
        async fn insert(&self, _: Table, _: Value) -> solar_store::Result<Value> {
            Err(StoreError::InvalidRow)
        }
        async fn update(&self, _: Table, _: &str, _: Value) -> solar_store::Result<()> {
            Err(StoreError::InvalidRow)
        }
        async fn delete(&self, _: Table, _: &str) -> solar_store::Result<()> {
            Err(StoreError::InvalidRow)
        }
        fn with_access_token(&self, _: &str) -> Arc<dyn DataStore> {
            Arc::new(FailingStore)
        }
        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    fn row(name: &str, rating: f64) -> Value {
        json!({
            "name": name,
            "description": "Solar",
            "phone": "555",
            "rating": rating,
            "years_in_business": 2,
            "services": ["Battery Storage"],
            "certifications": [],
            "price_range": "$$"
        })
    }

    #[tokio::test]
    async fn refresh_holds_rating_order() {
        let store = Arc::new(MemoryStore::new());
        store.insert(Table::Installers, row("Second", 4.1)).await.unwrap();
        store.insert(Table::Installers, row("First", 4.9)).await.unwrap();

        let view = ListingView::new(InstallerRepo::new(store));
        assert_eq!(view.refresh().await, 2);

        let snapshot = view.snapshot().await;
        assert!(!snapshot.loading);
        let names: Vec<_> = snapshot.installers.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(snapshot.layout("battery").match_count(), 2);
    }

    /// Reads rows straight away but holds the first answer back.
    struct SlowFirstStore {
        inner: MemoryStore,
        selects: AtomicUsize,
    }

    #[async_trait]
    impl DataStore for SlowFirstStore {
        async fn select(&self, table: Table, order: Order) -> solar_store::Result<Vec<Value>> {
            let rows = self.inner.select(table, order).await?;
            if self.selects.fetch_add(1, AtomicOrdering::SeqCst) == 0 {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Ok(rows)
        }
        async fn insert(&self, table: Table, row: Value) -> solar_store::Result<Value> {
            self.inner.insert(table, row).await
        }
        async fn update(&self, table: Table, id: &str, patch: Value) -> solar_store::Result<()> {
            self.inner.update(table, id, patch).await
        }
        async fn delete(&self, table: Table, id: &str) -> solar_store::Result<()> {
            self.inner.delete(table, id).await
        }
        fn with_access_token(&self, _: &str) -> Arc<dyn DataStore> {
            Arc::new(self.inner.clone())
        }
        fn backend(&self) -> &'static str {
            "slow-first"
        }
    }

    #[tokio::test]
    async fn late_fetch_does_not_overwrite_newer_list() {
        let store = Arc::new(SlowFirstStore {
            inner: MemoryStore::new(),
            selects: AtomicUsize::new(0),
        });
        store.insert(Table::Installers, row("Old", 4.0)).await.unwrap();
        let view = Arc::new(ListingView::new(InstallerRepo::new(store.clone())));

        let slow = tokio::spawn({
            let view = view.clone();
            async move { view.refresh().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        store.insert(Table::Installers, row("New", 4.8)).await.unwrap();
        assert_eq!(view.refresh().await, 2);

        assert_eq!(slow.await.unwrap(), 2);
        let snapshot = view.snapshot().await;
        assert!(!snapshot.loading);
        let names: Vec<_> = snapshot.installers.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_list_empty() {
        let view = ListingView::new(InstallerRepo::new(Arc::new(FailingStore)));
        assert_eq!(view.refresh().await, 0);
        let snapshot = view.snapshot().await;
        assert!(snapshot.installers.is_empty());
        assert!(!snapshot.loading);
    }
}
