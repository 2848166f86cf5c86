//! User account workflows.
//!
//! Registration confirms absence by reading first - a `NotFound` on that
//! read is the expected non-error path for creation. Deletion cascades to
//! the user's cart and orders best-effort: the user record goes first, and
//! a cleanup failure afterwards is reported without rolling anything back.

use thiserror::Error;
use tracing::instrument;

use pronto_core::Email;

use crate::auth::PasswordHasher;
use crate::models::{User, UserProfile};
use crate::store::{Collection, EntityStore, StoreError};

/// Errors that can occur during user account operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// A user with that email address already exists.
    #[error("a user with that email address already exists")]
    AlreadyExists,

    /// The user does not exist.
    #[error("user not found")]
    NotFound,

    /// An update carried no fields to change.
    #[error("no fields to update were supplied")]
    NothingToUpdate,

    /// The user record was deleted, but cleanup of the cart or orders
    /// failed partway. Earlier deletes stay committed.
    #[error("user deleted, but cleanup of owned entities failed: {0}")]
    Cascade(StoreError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Requested changes to a user profile. At least one field must be set.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
}

impl ProfileChanges {
    /// Whether no change was requested at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none() && self.address.is_none()
    }
}

/// Service for user account operations.
pub struct UserService<'a> {
    store: &'a EntityStore,
    hasher: &'a PasswordHasher,
}

impl<'a> UserService<'a> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(store: &'a EntityStore, hasher: &'a PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Register a new account. The password is stored only as a keyed hash.
    ///
    /// # Errors
    ///
    /// Returns `UserError::AlreadyExists` if the email is taken.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: Email,
        password: &str,
        address: &str,
    ) -> Result<UserProfile, UserError> {
        // Confirm absence first; NotFound is the happy path here.
        match self.store.read::<User>(Collection::Users, email.as_str()).await {
            Ok(_) => return Err(UserError::AlreadyExists),
            Err(StoreError::NotFound) => {}
            Err(other) => return Err(other.into()),
        }

        let user = User {
            username: username.to_owned(),
            email,
            password_hash: self.hasher.hash(password),
            address: address.to_owned(),
            cart: None,
            orders: Vec::new(),
        };
        self.store
            .create(Collection::Users, user.email.as_str(), &user)
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists => UserError::AlreadyExists,
                other => UserError::Store(other),
            })?;

        tracing::info!(email = %user.email, "user registered");
        Ok(user.into())
    }

    /// Fetch a user's profile, password hash masked.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user does not exist.
    pub async fn profile(&self, email: &Email) -> Result<UserProfile, UserError> {
        Ok(self.load(email).await?.into())
    }

    /// Apply profile changes; a new password is re-hashed before storing.
    /// The whole record is read, modified, and written back.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NothingToUpdate` if no field is set, or
    /// `UserError::NotFound` if the user does not exist.
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        email: &Email,
        changes: ProfileChanges,
    ) -> Result<UserProfile, UserError> {
        if changes.is_empty() {
            return Err(UserError::NothingToUpdate);
        }

        let mut user = self.load(email).await?;
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(password) = changes.password {
            user.password_hash = self.hasher.hash(&password);
        }
        if let Some(address) = changes.address {
            user.address = address;
        }

        self.store
            .update(Collection::Users, email.as_str(), &user)
            .await?;
        Ok(user.into())
    }

    /// Delete the account and cascade to the cart and orders it owns.
    /// Returns the deleted profile.
    ///
    /// # Errors
    ///
    /// Returns `UserError::NotFound` if the user does not exist, or
    /// `UserError::Cascade` if the user was deleted but cleanup failed
    /// partway (the store has no cross-entity transaction).
    #[instrument(skip(self))]
    pub async fn remove(&self, email: &Email) -> Result<UserProfile, UserError> {
        let user = self.load(email).await?;
        self.store
            .delete(Collection::Users, email.as_str())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => UserError::NotFound,
                other => UserError::Store(other),
            })?;

        if let Some(cart_id) = &user.cart {
            match self.store.delete(Collection::Carts, cart_id.as_str()).await {
                // A cart already gone is already clean.
                Ok(()) | Err(StoreError::NotFound) => {}
                Err(other) => return Err(UserError::Cascade(other)),
            }
        }
        for order_id in &user.orders {
            match self
                .store
                .delete(Collection::Orders, order_id.as_str())
                .await
            {
                Ok(()) | Err(StoreError::NotFound) => {}
                Err(other) => return Err(UserError::Cascade(other)),
            }
        }

        tracing::info!(email = %email, "user deleted");
        Ok(user.into())
    }

    async fn load(&self, email: &Email) -> Result<User, UserError> {
        self.store
            .read(Collection::Users, email.as_str())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => UserError::NotFound,
                other => UserError::Store(other),
            })
    }
}
