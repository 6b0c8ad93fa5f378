//! Admin console operations.
//!
//! Every call takes the admin's [`Session`] and acts with its access token.
//! Mutations re-check the session first; installer mutations also refresh the
//! visitor listing.

use std::sync::Arc;

use solar_core::{Banner, Installer, InstallerForm, QuoteRequest, Session};
use solar_store::{DataStore, InstallerRepo, QuoteRequestRepo};
use tracing::{error, info};

use crate::listing::ListingView;
use crate::{Error, Result};

/// Console tabs. Installers is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleTab {
    #[default]
    Installers,
    Quotes,
}

impl ConsoleTab {
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("quotes") => ConsoleTab::Quotes,
            _ => ConsoleTab::Installers,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConsoleTab::Installers => "installers",
            ConsoleTab::Quotes => "quotes",
        }
    }
}

/// Mutating console actions, for banner text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddInstaller,
    UpdateInstaller,
    DeleteInstaller,
    DeleteQuoteRequest,
}

impl Action {
    pub fn success_text(self) -> &'static str {
        match self {
            Action::AddInstaller => "Installer added successfully!",
            Action::UpdateInstaller => "Installer updated successfully!",
            Action::DeleteInstaller => "Installer deleted successfully!",
            Action::DeleteQuoteRequest => "Quote request deleted successfully!",
        }
    }

    pub fn failure_text(self) -> &'static str {
        match self {
            Action::AddInstaller | Action::UpdateInstaller => {
                "Failed to save installer. Please try again."
            }
            Action::DeleteInstaller => "Failed to delete installer. Please try again.",
            Action::DeleteQuoteRequest => "Failed to delete quote request. Please try again.",
        }
    }

    /// Question asked before a delete executes.
    pub fn confirmation_prompt(self) -> Option<&'static str> {
        match self {
            Action::DeleteInstaller => Some("Are you sure you want to delete this installer?"),
            Action::DeleteQuoteRequest => {
                Some("Are you sure you want to delete this quote request?")
            }
            _ => None,
        }
    }
}

/// The admin's answer to a delete prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    /// Only an explicit `yes` confirms.
    pub fn from_answer(answer: Option<&str>) -> Self {
        match answer {
            Some("yes") => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        }
    }
}

pub struct AdminConsole {
    store: Arc<dyn DataStore>,
    listing: Arc<ListingView>,
}

impl AdminConsole {
    pub fn new(store: Arc<dyn DataStore>, listing: Arc<ListingView>) -> Self {
        Self { store, listing }
    }

    fn scoped(&self, session: &Session) -> Result<Arc<dyn DataStore>> {
        if !session.is_valid() {
            return Err(Error::NotSignedIn);
        }
        Ok(self.store.with_access_token(&session.access_token))
    }

    fn installer_repo(&self, session: &Session) -> Result<InstallerRepo> {
        Ok(InstallerRepo::new(self.scoped(session)?))
    }

    fn quote_repo(&self, session: &Session) -> Result<QuoteRequestRepo> {
        Ok(QuoteRequestRepo::new(self.scoped(session)?))
    }

    /// Installers, newest first. Fetch failures are logged and yield an empty list.
    pub async fn installers(&self, session: &Session) -> Vec<Installer> {
        let fetched = match self.installer_repo(session) {
            Ok(repo) => repo.newest_first().await.map_err(Error::from),
            Err(e) => Err(e),
        };
        fetched.unwrap_or_else(|e| {
            error!(error = %e, "error fetching installers");
            Vec::new()
        })
    }

    /// Quote requests, newest first. Fetch failures are logged and yield an empty list.
    pub async fn quote_requests(&self, session: &Session) -> Vec<QuoteRequest> {
        let fetched = match self.quote_repo(session) {
            Ok(repo) => repo.newest_first().await.map_err(Error::from),
            Err(e) => Err(e),
        };
        fetched.unwrap_or_else(|e| {
            error!(error = %e, "error fetching quote requests");
            Vec::new()
        })
    }

    /// Pre-populated edit form for `id`, if the installer still exists.
    pub async fn edit_form(&self, session: &Session, id: &str) -> Option<InstallerForm> {
        self.installers(session)
            .await
            .iter()
            .find(|installer| installer.id == id)
            .map(InstallerForm::from_installer)
    }

    /// Insert (no id) or update (id) an installer from the raw form.
    pub async fn save_installer(
        &self,
        session: &Session,
        id: Option<&str>,
        form: &InstallerForm,
    ) -> Result<Banner> {
        let repo = self.installer_repo(session)?;
        let fields = form.to_fields()?;

        let action = match id {
            Some(id) => {
                repo.update(id, &fields).await.map_err(|e| {
                    error!(id, error = %e, "error saving installer");
                    e
                })?;
                info!(id, name = %fields.name, "installer updated");
                Action::UpdateInstaller
            }
            None => {
                let created = repo.create(&fields).await.map_err(|e| {
                    error!(error = %e, "error saving installer");
                    e
                })?;
                info!(id = %created.id, name = %created.name, "installer added");
                Action::AddInstaller
            }
        };

        self.listing.refresh().await;
        Ok(Banner::success(action.success_text()))
    }

    pub async fn delete_installer(
        &self,
        session: &Session,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<Banner> {
        let repo = self.installer_repo(session)?;
        if confirmation != Confirmation::Confirmed {
            return Err(Error::NotConfirmed);
        }
        repo.delete(id).await.map_err(|e| {
            error!(id, error = %e, "error deleting installer");
            e
        })?;
        info!(id, "installer deleted");

        self.listing.refresh().await;
        Ok(Banner::success(Action::DeleteInstaller.success_text()))
    }

    pub async fn delete_quote_request(
        &self,
        session: &Session,
        id: &str,
        confirmation: Confirmation,
    ) -> Result<Banner> {
        let repo = self.quote_repo(session)?;
        if confirmation != Confirmation::Confirmed {
            return Err(Error::NotConfirmed);
        }
        repo.delete(id).await.map_err(|e| {
            error!(id, error = %e, "error deleting quote request");
            e
        })?;
        info!(id, "quote request deleted");
        Ok(Banner::success(Action::DeleteQuoteRequest.success_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use solar_core::{BannerKind, QuoteRequestPayload, ValidationError};
    use solar_store::{MemoryStore, Table};

    fn session() -> Session {
        Session {
            access_token: "token".into(),
            user_id: "admin".into(),
            email: "admin@example.com".into(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    fn expired() -> Session {
        Session {
            expires_at: Utc::now() - Duration::seconds(1),
            ..session()
        }
    }

    fn form(name: &str) -> InstallerForm {
        InstallerForm {
            name: name.into(),
            description: "Rooftop arrays".into(),
            phone: "555-0100".into(),
            services: "Residential Solar, Battery Storage".into(),
            certifications: "NABCEP Certified".into(),
            ..InstallerForm::blank()
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        listing: Arc<ListingView>,
        console: AdminConsole,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let listing = Arc::new(ListingView::new(InstallerRepo::new(store.clone())));
        let console = AdminConsole::new(store.clone(), listing.clone());
        Fixture {
            store,
            listing,
            console,
        }
    }

    #[tokio::test]
    async fn add_stores_split_lists_and_refreshes_listing() {
        let fx = fixture();
        let banner = fx
            .console
            .save_installer(&session(), None, &form("Sunrise Energy"))
            .await
            .unwrap();
        assert_eq!(banner, Banner::success("Installer added successfully!"));

        let installers = fx.console.installers(&session()).await;
        assert_eq!(installers.len(), 1);
        assert_eq!(installers[0].services, vec!["Residential Solar", "Battery Storage"]);
        assert_eq!(fx.listing.snapshot().await.installers.len(), 1);
    }

    #[tokio::test]
    async fn edit_round_trip_changes_nothing() {
        let fx = fixture();
        fx.console
            .save_installer(&session(), None, &form("Sunrise Energy"))
            .await
            .unwrap();
        let original = fx.console.installers(&session()).await.remove(0);

        let edit = fx.console.edit_form(&session(), &original.id).await.unwrap();
        let banner = fx
            .console
            .save_installer(&session(), Some(&original.id), &edit)
            .await
            .unwrap();
        assert_eq!(banner.text, "Installer updated successfully!");

        let after = fx.console.installers(&session()).await.remove(0);
        assert_eq!(after.fields(), original.fields());
        assert_eq!(after.created_at, original.created_at);
    }

    #[tokio::test]
    async fn invalid_form_is_not_saved() {
        let fx = fixture();
        let mut bad = form("Sunrise Energy");
        bad.rating = "lots".into();
        let err = fx
            .console
            .save_installer(&session(), None, &bad)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Invalid(ValidationError::NotANumber { .. })));
        assert_eq!(err.banner_for(Action::AddInstaller).kind, BannerKind::Error);
        assert_eq!(fx.store.len(Table::Installers).await, 0);
    }

    #[tokio::test]
    async fn updating_a_vanished_installer_fails() {
        let fx = fixture();
        let err = fx
            .console
            .save_installer(&session(), Some("gone"), &form("Ghost"))
            .await
            .unwrap_err();
        assert_eq!(
            err.banner_for(Action::UpdateInstaller).text,
            "Failed to save installer. Please try again."
        );
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let fx = fixture();
        fx.console
            .save_installer(&session(), None, &form("Sunrise Energy"))
            .await
            .unwrap();
        let id = fx.console.installers(&session()).await[0].id.clone();

        let declined = fx
            .console
            .delete_installer(&session(), &id, Confirmation::from_answer(Some("no")))
            .await;
        assert!(matches!(declined, Err(Error::NotConfirmed)));
        assert_eq!(fx.store.len(Table::Installers).await, 1);

        let banner = fx
            .console
            .delete_installer(&session(), &id, Confirmation::from_answer(Some("yes")))
            .await
            .unwrap();
        assert_eq!(banner.text, "Installer deleted successfully!");
        assert!(fx.listing.snapshot().await.installers.is_empty());
    }

    #[tokio::test]
    async fn expired_session_cannot_mutate() {
        let fx = fixture();
        let err = fx
            .console
            .save_installer(&expired(), None, &form("Sunrise Energy"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotSignedIn));
        assert_eq!(fx.store.len(Table::Installers).await, 0);
        assert!(fx.console.installers(&expired()).await.is_empty());
    }

    #[tokio::test]
    async fn quote_requests_are_listed_and_deleted() {
        let fx = fixture();
        let quotes = QuoteRequestRepo::new(fx.store.clone());
        for name in ["Older", "Newer"] {
            quotes
                .create(&QuoteRequestPayload {
                    name: name.into(),
                    address: "1 Main St".into(),
                    phone: "555".into(),
                    email: None,
                })
                .await
                .unwrap();
        }

        let listed = fx.console.quote_requests(&session()).await;
        assert_eq!(listed[0].name, "Newer");

        let banner = fx
            .console
            .delete_quote_request(&session(), &listed[0].id, Confirmation::Confirmed)
            .await
            .unwrap();
        assert_eq!(banner.text, "Quote request deleted successfully!");
        assert_eq!(fx.console.quote_requests(&session()).await.len(), 1);
    }

    #[test]
    fn tabs_default_to_installers() {
        assert_eq!(ConsoleTab::from_query(None), ConsoleTab::Installers);
        assert_eq!(ConsoleTab::from_query(Some("quotes")), ConsoleTab::Quotes);
        assert_eq!(ConsoleTab::from_query(Some("other")), ConsoleTab::Installers);
    }
}
