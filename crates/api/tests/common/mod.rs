//! Shared fixtures for integration tests: a scratch entity store and
//! counting in-process gateway doubles.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::SecretString;

use pronto_api::auth::PasswordHasher;
use pronto_api::config::StripeConfig;
use pronto_api::gateways::{
    ChargeReceipt, ChargeRequest, DeliveryReceipt, EmailMessage, NotificationError,
    NotificationGateway, PaymentError, PaymentGateway,
};
use pronto_api::models::{CartContents, MENU_ID, Menu, User};
use pronto_api::store::{Collection, EntityStore};
use pronto_core::{CartId, Email};

/// A payment double that counts charges and succeeds or declines on demand.
pub struct MockPaymentGateway {
    charges: AtomicUsize,
    fail: bool,
}

impl MockPaymentGateway {
    pub const fn succeeding() -> Self {
        Self {
            charges: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub const fn declining() -> Self {
        Self {
            charges: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// How many times `charge` was invoked.
    pub fn charge_count(&self) -> usize {
        self.charges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        self.charges.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PaymentError::Declined {
                body: "card declined".to_owned(),
            });
        }
        Ok(ChargeReceipt {
            status: "succeeded".to_owned(),
            paid: true,
            source_id: "src_test".to_owned(),
            balance_transaction: "txn_test".to_owned(),
            amount: request.amount,
            description: request.description,
        })
    }
}

/// A notification double that counts sends and succeeds or fails on demand.
pub struct MockNotificationGateway {
    sends: AtomicUsize,
    fail: bool,
}

impl MockNotificationGateway {
    pub const fn delivering() -> Self {
        Self {
            sends: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub const fn failing() -> Self {
        Self {
            sends: AtomicUsize::new(0),
            fail: true,
        }
    }

    /// How many times `send` was invoked.
    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationGateway for MockNotificationGateway {
    async fn send(&self, _message: EmailMessage) -> Result<DeliveryReceipt, NotificationError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(NotificationError::Rejected {
                body: "mailbox on fire".to_owned(),
            });
        }
        Ok(DeliveryReceipt {
            id: "<test-message-id@example>".to_owned(),
            message: "Queued. Thank you.".to_owned(),
        })
    }
}

/// Charge defaults matching the mock gateways.
pub fn stripe_config() -> StripeConfig {
    StripeConfig {
        secret_key: SecretString::from("sk_test_not_used_by_mocks"),
        source_token: "tok_visa".to_owned(),
        currency: "nzd".to_owned(),
    }
}

pub fn hasher() -> PasswordHasher {
    PasswordHasher::new(SecretString::from("k3rQ9vX2mN8pL5wZ1cT7bJ4hF6dS0aG3"))
}

pub fn email() -> Email {
    Email::parse("ada@example.com").unwrap()
}

pub fn items(pairs: &[(&str, u32)]) -> CartContents {
    pairs
        .iter()
        .map(|(name, quantity)| ((*name).to_owned(), *quantity))
        .collect()
}

/// Fresh store with the test menu seeded: pizza at 1000, soda at 250.
pub async fn store_with_menu() -> (tempfile::TempDir, EntityStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = EntityStore::new(dir.path());
    store.init().await.unwrap();

    let menu: Menu = [
        ("pizza".to_owned(), Decimal::from(1000)),
        ("soda".to_owned(), Decimal::from(250)),
    ]
    .into_iter()
    .collect();
    store.create(Collection::Menus, MENU_ID, &menu).await.unwrap();

    (dir, store)
}

/// Seed a user, optionally with a linked cart holding `cart` contents.
pub async fn seed_user(store: &EntityStore, cart: Option<CartContents>) -> Option<CartId> {
    let cart_id = if let Some(contents) = cart {
        let cart_id = CartId::generate();
        store
            .create(Collection::Carts, cart_id.as_str(), &contents)
            .await
            .unwrap();
        Some(cart_id)
    } else {
        None
    };

    let user = User {
        username: "ada".to_owned(),
        email: email(),
        password_hash: hasher().hash("hunter2"),
        address: "1 Example St".to_owned(),
        cart: cart_id.clone(),
        orders: Vec::new(),
    };
    store
        .create(Collection::Users, user.email.as_str(), &user)
        .await
        .unwrap();

    cart_id
}
