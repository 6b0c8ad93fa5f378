//! Solar Mail
//!
//! Both hops of a lead notification:
//!
//! ```text
//! lead form ──DispatchClient──► /functions/send-quote-email ──Relay──► Resend
//! ```

use thiserror::Error;

pub mod dispatch;
pub mod relay;
pub mod resend;

pub use dispatch::{DispatchClient, LeadNotifier};
pub use relay::{Relay, RelayError};
pub use resend::{compose_quote_email, Mailer, OutgoingEmail, ResendMailer, QUOTE_SUBJECT};

#[derive(Error, Debug)]
pub enum MailError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream answered {status}: {body}")]
    Status { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, MailError>;

pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MailError::Status {
        status: status.as_u16(),
        body,
    })
}
