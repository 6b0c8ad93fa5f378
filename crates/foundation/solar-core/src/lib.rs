//! Solar Directory core
//!
//! Shared vocabulary for every tier above it:
//!
//! - **model**: installer and quote-request records as the store holds them
//! - **fields**: the comma-separated label codec and the admin/lead form drafts
//! - **listing**: the visitor filter and the featured/remaining ranking split
//! - **gate**: the admin console's LoggedOut/LoggedIn state machine
//! - **status**: transient banners and their display windows

pub mod error;
pub mod fields;
pub mod gate;
pub mod listing;
pub mod model;
pub mod status;
pub mod text;

pub use error::{Result, ValidationError};
pub use fields::{join_labels, split_labels, InstallerForm, LeadDraft};
pub use gate::{AdminGate, Session, SessionEvent};
pub use listing::{filter_installers, ListingLayout, Medal, RankedInstaller, FEATURED_COUNT};
pub use model::{Installer, InstallerFields, PriceTier, QuoteRequest, QuoteRequestPayload};
pub use status::{Banner, BannerKind, LEAD_CONFIRMATION_WINDOW, STATUS_BANNER_WINDOW};
