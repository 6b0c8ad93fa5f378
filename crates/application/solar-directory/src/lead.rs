use std::sync::Arc;

use solar_core::LeadDraft;
use solar_mail::LeadNotifier;
use solar_store::QuoteRequestRepo;
use tracing::{error, info, warn};

use crate::Result;

/// Visitor-facing text when a submission cannot be stored.
pub const SUBMIT_FAILED: &str = "There was an error submitting your request. Please try again.";

pub struct LeadCapture {
    quotes: QuoteRequestRepo,
    notifier: Arc<dyn LeadNotifier>,
}

impl LeadCapture {
    pub fn new(quotes: QuoteRequestRepo, notifier: Arc<dyn LeadNotifier>) -> Self {
        Self { quotes, notifier }
    }

    /// Persist the lead, then notify once. Nothing is sent unless the insert succeeds,
    /// and a failed notification does not undo the insert.
    pub async fn submit(&self, draft: &LeadDraft) -> Result<()> {
        let payload = draft.validate()?;

        self.quotes.create(&payload).await.map_err(|e| {
            error!(error = %e, "error submitting quote request");
            e
        })?;
        info!(name = %payload.name, "quote request stored");

        if let Err(e) = self.notifier.notify(&payload).await {
            warn!(name = %payload.name, error = %e, "quote notification failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;
    use serde_json::Value;
    use solar_core::{QuoteRequestPayload, ValidationError};
    use solar_mail::MailError;
    use solar_store::{DataStore, MemoryStore, Order, StoreError, Table};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        calls: Mutex<Vec<QuoteRequestPayload>>,
        fail: bool,
    }

    #[async_trait]
    impl LeadNotifier for RecordingNotifier {
        async fn notify(&self, lead: &QuoteRequestPayload) -> solar_mail::Result<()> {
            self.calls.lock().await.push(lead.clone());
            if self.fail {
                return Err(MailError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(())
        }
    }

    struct RejectingStore;

    #[async_trait]
    impl DataStore for RejectingStore {
        async fn select(&self, _: Table, _: Order) -> solar_store::Result<Vec<Value>> {
            Ok(Vec::new())
        }
        async fn insert(&self, _: Table, _: Value) -> solar_store::Result<Value> {
            Err(StoreError::Status {
                status: 401,
                body: "permission denied".into(),
            })
        }
        async fn update(&self, _: Table, _: &str, _: Value) -> solar_store::Result<()> {
            Ok(())
        }
        async fn delete(&self, _: Table, _: &str) -> solar_store::Result<()> {
            Ok(())
        }
        fn with_access_token(&self, _: &str) -> Arc<dyn DataStore> {
            Arc::new(RejectingStore)
        }
        fn backend(&self) -> &'static str {
            "rejecting"
        }
    }

    /// Accepts inserts but refuses to hand rows back, like a table whose access
    /// rules let visitors insert without selecting.
    #[derive(Default)]
    struct WriteOnlyStore {
        appended: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl DataStore for WriteOnlyStore {
        async fn select(&self, _: Table, _: Order) -> solar_store::Result<Vec<Value>> {
            Err(StoreError::Status {
                status: 401,
                body: "permission denied".into(),
            })
        }
        async fn insert(&self, _: Table, _: Value) -> solar_store::Result<Value> {
            Err(StoreError::Status {
                status: 401,
                body: "permission denied".into(),
            })
        }
        async fn append(&self, _: Table, row: Value) -> solar_store::Result<()> {
            self.appended.lock().await.push(row);
            Ok(())
        }
        async fn update(&self, _: Table, _: &str, _: Value) -> solar_store::Result<()> {
            Ok(())
        }
        async fn delete(&self, _: Table, _: &str) -> solar_store::Result<()> {
            Ok(())
        }
        fn with_access_token(&self, _: &str) -> Arc<dyn DataStore> {
            Arc::new(WriteOnlyStore::default())
        }
        fn backend(&self) -> &'static str {
            "write-only"
        }
    }

    fn draft() -> LeadDraft {
        LeadDraft {
            name: "Grace Hopper".into(),
            address: "12 Liberty St, Ann Arbor".into(),
            phone: "(734) 555-0110".into(),
            email: "grace@example.com".into(),
        }
    }

    #[tokio::test]
    async fn stores_once_then_notifies_once() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let leads = LeadCapture::new(QuoteRequestRepo::new(store.clone()), notifier.clone());

        leads.submit(&draft()).await.unwrap();

        assert_eq!(store.len(Table::QuoteRequests).await, 1);
        let calls = notifier.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], draft().validate().unwrap());
    }

    #[tokio::test]
    async fn lead_is_captured_without_reading_it_back() {
        let store = Arc::new(WriteOnlyStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let leads = LeadCapture::new(QuoteRequestRepo::new(store.clone()), notifier.clone());

        tokio_test::assert_ok!(leads.submit(&draft()).await);

        let appended = store.appended.lock().await;
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0]["name"], "Grace Hopper");
        assert_eq!(notifier.calls.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn failed_insert_never_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let leads = LeadCapture::new(QuoteRequestRepo::new(Arc::new(RejectingStore)), notifier.clone());

        assert!(matches!(leads.submit(&draft()).await, Err(Error::Store(_))));
        assert!(notifier.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn invalid_draft_touches_nothing() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let leads = LeadCapture::new(QuoteRequestRepo::new(store.clone()), notifier.clone());

        let mut missing_phone = draft();
        missing_phone.phone = "  ".into();
        assert!(matches!(
            leads.submit(&missing_phone).await,
            Err(Error::Invalid(ValidationError::Required("phone")))
        ));
        assert_eq!(store.len(Table::QuoteRequests).await, 0);
        assert!(notifier.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn notification_failure_keeps_the_record() {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let leads = LeadCapture::new(QuoteRequestRepo::new(store.clone()), notifier.clone());

        tokio_test::assert_ok!(leads.submit(&draft()).await);
        assert_eq!(store.len(Table::QuoteRequests).await, 1);
        assert_eq!(notifier.calls.lock().await.len(), 1);
    }
}
