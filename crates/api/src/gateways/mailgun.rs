//! Mailgun messages API client.

use secrecy::ExposeSecret;
use serde::Deserialize;

use async_trait::async_trait;

use crate::config::MailgunConfig;

use super::{
    DeliveryReceipt, EmailMessage, GATEWAY_TIMEOUT, NotificationError, NotificationGateway,
    validate_email_message,
};

const API_BASE_URL: &str = "https://api.mailgun.net/v3";

/// Confirmation text Mailgun returns when a message is queued.
const QUEUED_CONFIRMATION: &str = "Queued. Thank you.";

/// Notification gateway backed by the Mailgun messages API.
pub struct MailgunGateway {
    client: reqwest::Client,
    config: MailgunConfig,
}

impl MailgunGateway {
    /// Create a new Mailgun gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Http` if the HTTP client fails to build.
    pub fn new(config: MailgunConfig) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder().timeout(GATEWAY_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!("{API_BASE_URL}/{}/messages", self.config.domain)
    }
}

/// The subset of a Mailgun send response the workflow cares about.
#[derive(Debug, Deserialize)]
struct MailgunResponse {
    id: Option<String>,
    message: Option<String>,
}

#[async_trait]
impl NotificationGateway for MailgunGateway {
    async fn send(&self, message: EmailMessage) -> Result<DeliveryReceipt, NotificationError> {
        validate_email_message(&message)?;

        let form = [
            ("from", self.config.from.clone()),
            ("to", message.to),
            ("subject", message.subject),
            ("text", message.body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth("api", Some(self.config.api_key.expose_secret()))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, "mailgun refused the message");
            return Err(NotificationError::Rejected { body });
        }

        let parsed: MailgunResponse = serde_json::from_str(&body)
            .map_err(|_| NotificationError::Rejected { body: body.clone() })?;

        match (parsed.id, parsed.message) {
            (Some(id), Some(confirmation)) if confirmation == QUEUED_CONFIRMATION => {
                Ok(DeliveryReceipt {
                    id,
                    message: confirmation,
                })
            }
            _ => {
                tracing::warn!("mailgun answered without a queued confirmation");
                Err(NotificationError::Rejected { body })
            }
        }
    }
}
