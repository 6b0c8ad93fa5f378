use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use solar_core::QuoteRequestPayload;
use tracing::debug;

use crate::{check, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fire-and-report notification that a lead was captured.
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify(&self, lead: &QuoteRequestPayload) -> Result<()>;
}

/// Posts the lead to the email dispatch endpoint with the public key as bearer.
pub struct DispatchClient {
    client: Client,
    url: String,
    public_key: String,
}

impl DispatchClient {
    pub fn new(url: &str, public_key: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            public_key: public_key.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LeadNotifier for DispatchClient {
    async fn notify(&self, lead: &QuoteRequestPayload) -> Result<()> {
        debug!(url = %self.url, "dispatching lead notification");
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.public_key)
            .json(lead)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
