//! Application state shared across handlers.
//!
//! There are no ambient globals: the configuration, the store handle, the
//! password hasher, and both gateways are built once at startup and
//! injected here.

use std::sync::Arc;

use crate::auth::PasswordHasher;
use crate::config::Config;
use crate::gateways::{NotificationGateway, PaymentGateway};
use crate::store::EntityStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    store: EntityStore,
    hasher: PasswordHasher,
    payments: Arc<dyn PaymentGateway>,
    notifications: Arc<dyn NotificationGateway>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The store handle is derived from the configured data directory; the
    /// gateways are passed in so tests can substitute doubles.
    #[must_use]
    pub fn new(
        config: Config,
        payments: Arc<dyn PaymentGateway>,
        notifications: Arc<dyn NotificationGateway>,
    ) -> Self {
        let store = EntityStore::new(&config.data_dir);
        let hasher = PasswordHasher::new(config.hashing_secret.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                hasher,
                payments,
                notifications,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the entity store.
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.inner.store
    }

    /// Get a reference to the password hasher.
    #[must_use]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.inner.hasher
    }

    /// Get a reference to the payment gateway.
    #[must_use]
    pub fn payments(&self) -> &dyn PaymentGateway {
        self.inner.payments.as_ref()
    }

    /// Get a reference to the notification gateway.
    #[must_use]
    pub fn notifications(&self) -> &dyn NotificationGateway {
        self.inner.notifications.as_ref()
    }
}
