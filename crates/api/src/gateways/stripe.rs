//! Stripe charges API client.

use secrecy::ExposeSecret;
use serde::Deserialize;

use async_trait::async_trait;

use crate::config::StripeConfig;

use super::{
    ChargeReceipt, ChargeRequest, GATEWAY_TIMEOUT, PaymentError, PaymentGateway,
    validate_charge_request,
};

const CHARGES_URL: &str = "https://api.stripe.com/v1/charges";

/// Payment gateway backed by the Stripe charges API.
///
/// Charges are posted as form data with the secret key as HTTP basic auth
/// username, the way Stripe's legacy charges endpoint expects.
pub struct StripeGateway {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripeGateway {
    /// Create a new Stripe gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Http` if the HTTP client fails to build.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder().timeout(GATEWAY_TIMEOUT).build()?;
        Ok(Self { client, config })
    }
}

/// The subset of a Stripe charge response the workflow cares about.
#[derive(Debug, Deserialize)]
struct StripeCharge {
    status: Option<String>,
    paid: Option<bool>,
    source: Option<StripeSource>,
    balance_transaction: Option<String>,
    amount: Option<i64>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeSource {
    id: String,
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        validate_charge_request(&request)?;

        let form = [
            ("amount", request.amount.to_string()),
            ("currency", request.currency.clone()),
            ("description", request.description.clone()),
            ("source", request.source.clone()),
        ];

        let response = self
            .client
            .post(CHARGES_URL)
            .basic_auth(self.config.secret_key.expose_secret(), None::<&str>)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, "stripe refused the charge");
            return Err(PaymentError::Declined { body });
        }

        let charge: StripeCharge = serde_json::from_str(&body)
            .map_err(|_| PaymentError::Declined { body: body.clone() })?;

        // A 2xx answer still only counts once Stripe confirms both flags.
        if charge.status.as_deref() == Some("succeeded") && charge.paid == Some(true) {
            Ok(ChargeReceipt {
                status: "succeeded".to_owned(),
                paid: true,
                source_id: charge.source.map(|s| s.id).unwrap_or_default(),
                balance_transaction: charge.balance_transaction.unwrap_or_default(),
                amount: charge.amount.unwrap_or(request.amount),
                description: charge.description.unwrap_or(request.description),
            })
        } else {
            tracing::warn!("stripe answered without confirming the charge");
            Err(PaymentError::Declined { body })
        }
    }
}
