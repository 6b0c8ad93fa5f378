//! Solar Directory services
//!
//! The three user-facing components, independent of HTTP:
//!
//! - [`ListingView`]: holds the rating-ordered installer list for visitors
//! - [`LeadCapture`]: persists a quote request, then notifies
//! - [`AdminConsole`]: installer CRUD and quote-request review for a signed-in admin

use solar_core::{Banner, ValidationError};
use solar_store::StoreError;
use thiserror::Error;

pub mod console;
pub mod lead;
pub mod listing;

pub use console::{Action, AdminConsole, Confirmation, ConsoleTab};
pub use lead::LeadCapture;
pub use listing::{ListingSnapshot, ListingView};

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("deletion was not confirmed")]
    NotConfirmed,

    #[error("admin session is missing or expired")]
    NotSignedIn,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Banner shown after `action` failed with this error.
    pub fn banner_for(&self, action: Action) -> Banner {
        match self {
            Error::Invalid(e) => Banner::error(format!("Please check the form: {e}.")),
            _ => Banner::error(action.failure_text()),
        }
    }
}
