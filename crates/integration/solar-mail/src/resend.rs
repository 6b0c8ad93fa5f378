//! Resend transactional email API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use solar_core::text::{format_timestamp, html_escape};
use solar_core::QuoteRequestPayload;

use crate::{check, Result};

pub const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
pub const QUOTE_SUBJECT: &str = "New Solar Quote Request";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

pub struct ResendMailer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl ResendMailer {
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_endpoint(api_key, RESEND_ENDPOINT)
    }

    pub fn with_endpoint(api_key: &str, endpoint: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Notification body. The email line is left out when the visitor gave none.
pub fn compose_quote_email(lead: &QuoteRequestPayload, submitted_at: &DateTime<Utc>) -> String {
    let email_line = lead
        .email
        .as_deref()
        .filter(|email| !email.trim().is_empty())
        .map(|email| format!("<p><strong>Email:</strong> {}</p>\n", html_escape(email)))
        .unwrap_or_default();

    format!(
        r#"<h2>{subject}</h2>
<p><strong>Name:</strong> {name}</p>
<p><strong>Address:</strong> {address}</p>
{email_line}<p><strong>Phone:</strong> {phone}</p>
<p><em>Submitted at: {at} UTC</em></p>
"#,
        subject = QUOTE_SUBJECT,
        name = html_escape(&lead.name),
        address = html_escape(&lead.address),
        phone = html_escape(&lead.phone),
        at = format_timestamp(submitted_at),
    )
}
