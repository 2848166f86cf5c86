//! User account record.

use serde::{Deserialize, Serialize};

use pronto_core::{CartId, Email, OrderId};

/// A customer account, keyed by email address.
///
/// The `cart` reference is assigned the first time the user's cart is
/// touched and is stable for the user's lifetime afterwards. Orders only
/// ever accumulate; an order record is never removed from a live account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: Email,
    /// Keyed hash of the password. Never serialized into API responses;
    /// see [`UserProfile`].
    pub password_hash: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart: Option<CartId>,
    #[serde(default)]
    pub orders: Vec<OrderId>,
}

/// The client-facing view of a [`User`], with the password hash masked.
///
/// Masking happens here, at the model boundary, instead of ad hoc in each
/// handler.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: Email,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart: Option<CartId>,
    pub orders: Vec<OrderId>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            email: user.email,
            address: user.address,
            cart: user.cart,
            orders: user.orders,
        }
    }
}
