//! External service boundaries: payment and notification.
//!
//! The core treats both providers as fallible black boxes with a simple
//! success/failure contract. Each gateway is a trait so workflows can be
//! exercised against in-process doubles; the production implementations
//! ([`StripeGateway`], [`MailgunGateway`]) make one-shot HTTPS calls bounded
//! by a client-level timeout.

pub mod mailgun;
pub mod stripe;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use mailgun::MailgunGateway;
pub use stripe::StripeGateway;

/// Request timeout applied to every gateway HTTP client.
pub const GATEWAY_TIMEOUT: Duration = Duration::from_secs(20);

/// Maximum length of a charge description accepted by the payment provider.
pub const MAX_CHARGE_DESCRIPTION: usize = 100;

// =============================================================================
// Payment
// =============================================================================

/// A request to charge a payment source.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    /// Amount in the currency's minor unit. Must be positive.
    pub amount: i64,
    /// ISO 4217 currency code, lowercase (e.g. "nzd").
    pub currency: String,
    /// Human-readable description of the ordered items, at most
    /// [`MAX_CHARGE_DESCRIPTION`] characters.
    pub description: String,
    /// Payment source reference understood by the provider.
    pub source: String,
}

/// Simplified successful charge result, persisted inside the order record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeReceipt {
    pub status: String,
    pub paid: bool,
    pub source_id: String,
    pub balance_transaction: String,
    pub amount: i64,
    pub description: String,
}

/// Errors from the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The request was malformed before it left the process.
    #[error("invalid charge request: {0}")]
    InvalidRequest(String),

    /// The HTTP call itself failed (connect, timeout, TLS, ...).
    #[error("payment transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but did not confirm the charge.
    #[error("charge was declined or errored: {body}")]
    Declined { body: String },
}

/// One-shot charge against a payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charge the request's source for the request's amount.
    ///
    /// # Errors
    ///
    /// Returns a [`PaymentError`] if the request is invalid, the call fails,
    /// or the provider does not confirm the charge.
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError>;
}

/// Validate a charge request against the provider contract.
///
/// # Errors
///
/// Returns `PaymentError::InvalidRequest` naming the offending field.
pub(crate) fn validate_charge_request(request: &ChargeRequest) -> Result<(), PaymentError> {
    if request.amount <= 0 {
        return Err(PaymentError::InvalidRequest(
            "amount must be positive".to_owned(),
        ));
    }
    if request.currency.trim().is_empty() {
        return Err(PaymentError::InvalidRequest(
            "currency must not be empty".to_owned(),
        ));
    }
    if request.description.trim().is_empty() || request.description.len() > MAX_CHARGE_DESCRIPTION {
        return Err(PaymentError::InvalidRequest(format!(
            "description must be 1..={MAX_CHARGE_DESCRIPTION} characters"
        )));
    }
    if request.source.trim().is_empty() {
        return Err(PaymentError::InvalidRequest(
            "source must not be empty".to_owned(),
        ));
    }
    Ok(())
}

// =============================================================================
// Notification
// =============================================================================

/// An email to send.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Simplified successful delivery result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Provider-assigned message id.
    pub id: String,
    /// Queued-confirmation text from the provider.
    pub message: String,
}

/// Errors from the notification gateway.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The message was malformed before it left the process.
    #[error("invalid email message: {0}")]
    InvalidRequest(String),

    /// The HTTP call itself failed.
    #[error("notification transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered but did not queue the message.
    #[error("email was rejected: {body}")]
    Rejected { body: String },
}

/// One-shot email delivery through a notification provider.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Send the message.
    ///
    /// # Errors
    ///
    /// Returns a [`NotificationError`] if the message is invalid, the call
    /// fails, or the provider does not confirm queuing.
    async fn send(&self, message: EmailMessage) -> Result<DeliveryReceipt, NotificationError>;
}

/// Validate an email message before sending.
///
/// # Errors
///
/// Returns `NotificationError::InvalidRequest` naming the offending field.
pub(crate) fn validate_email_message(message: &EmailMessage) -> Result<(), NotificationError> {
    if message.to.trim().is_empty() {
        return Err(NotificationError::InvalidRequest(
            "recipient must not be empty".to_owned(),
        ));
    }
    if message.subject.trim().is_empty() {
        return Err(NotificationError::InvalidRequest(
            "subject must not be empty".to_owned(),
        ));
    }
    if message.body.trim().is_empty() {
        return Err(NotificationError::InvalidRequest(
            "body must not be empty".to_owned(),
        ));
    }
    Ok(())
}
