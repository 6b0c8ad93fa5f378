pub mod admin_session;

pub use admin_session::{require_admin, signed_out};
