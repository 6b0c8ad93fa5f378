//! Server side of the dispatch endpoint: lead in, email out.

use std::sync::Arc;

use chrono::Utc;
use solar_core::QuoteRequestPayload;
use thiserror::Error;
use tracing::{error, info};

use crate::resend::{compose_quote_email, Mailer, OutgoingEmail, QUOTE_SUBJECT};
use crate::MailError;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("no upstream email credential configured")]
    NotConfigured,

    #[error("failed to send email: {0}")]
    Delivery(#[from] MailError),
}

#[derive(Clone)]
pub struct Relay {
    mailer: Option<Arc<dyn Mailer>>,
    from: String,
    to: Vec<String>,
}

impl Relay {
    pub fn new(mailer: Option<Arc<dyn Mailer>>, from: &str, to: Vec<String>) -> Self {
        Self {
            mailer,
            from: from.to_string(),
            to,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.mailer.is_some()
    }

    pub fn email_for(&self, lead: &QuoteRequestPayload) -> OutgoingEmail {
        OutgoingEmail {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: QUOTE_SUBJECT.to_string(),
            html: compose_quote_email(lead, &Utc::now()),
        }
    }

    pub async fn relay(&self, lead: &QuoteRequestPayload) -> Result<(), RelayError> {
        let Some(mailer) = &self.mailer else {
            error!("upstream email credential not configured");
            return Err(RelayError::NotConfigured);
        };
        let email = self.email_for(lead);
        mailer.send(&email).await.map_err(|e| {
            error!(error = %e, "email upstream failed");
            RelayError::Delivery(e)
        })?;
        info!(recipients = email.to.len(), "quote request email sent");
        Ok(())
    }
}
