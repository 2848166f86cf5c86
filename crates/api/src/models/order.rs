//! Order record and receipt.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pronto_core::{Email, OrderId};

use crate::gateways::{ChargeReceipt, DeliveryReceipt};

/// The computed amount and item set produced when an order is placed.
///
/// The amount is the sum of `unit price x quantity` over the ordered items,
/// computed from the menu as it stood at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub amount: Decimal,
    pub items_ordered: BTreeMap<String, u32>,
}

/// Outcome of the receipt email, recorded inside the order.
///
/// A failed notification does not abort the workflow: by the time the email
/// is sent the charge has already succeeded, and losing the order record
/// would be worse than a missing email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NotificationRecord {
    Delivered { id: String, message: String },
    Failed { error: String },
}

impl From<DeliveryReceipt> for NotificationRecord {
    fn from(receipt: DeliveryReceipt) -> Self {
        Self::Delivered {
            id: receipt.id,
            message: receipt.message,
        }
    }
}

/// A placed order. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub owner: Email,
    pub order_id: OrderId,
    pub receipt: Receipt,
    pub transaction: ChargeReceipt,
    pub email_notification: NotificationRecord,
}
