//! Bearer token service.
//!
//! Issues, verifies, extends, and revokes the tokens that gate every
//! authenticated operation. [`TokenService::verify`] is the sole
//! authorization gate: it fails closed, answering *not valid* for any
//! problem at all rather than surfacing an error.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use pronto_core::{Email, TokenId};

use crate::auth::PasswordHasher;
use crate::models::{Token, User};
use crate::store::{Collection, EntityStore, StoreError};

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// No token with the given id exists.
    #[error("token not found")]
    NotFound,

    /// The token has already expired and cannot be extended.
    #[error("token has already expired and cannot be extended")]
    AlreadyExpired,

    /// Login failed: unknown user or wrong password. Deliberately does not
    /// say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service for token lifecycle operations.
pub struct TokenService<'a> {
    store: &'a EntityStore,
}

impl<'a> TokenService<'a> {
    /// Create a new token service.
    #[must_use]
    pub const fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Issue a fresh token for `email`, expiring one hour from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Store` if persistence fails.
    pub async fn issue(&self, email: Email) -> Result<Token, TokenError> {
        let token = Token::issue(email, Utc::now());
        self.store
            .create(Collection::Tokens, token.id.as_str(), &token)
            .await?;
        Ok(token)
    }

    /// Login: check the password against the stored hash and issue a token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidCredentials` for an unknown user or a
    /// wrong password, `TokenError::Store` on persistence failure.
    #[instrument(skip(self, password, hasher))]
    pub async fn login(
        &self,
        email: &Email,
        password: &str,
        hasher: &PasswordHasher,
    ) -> Result<Token, TokenError> {
        let user: User = self
            .store
            .read(Collection::Users, email.as_str())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => TokenError::InvalidCredentials,
                other => TokenError::Store(other),
            })?;

        if !hasher.verify(password, &user.password_hash) {
            return Err(TokenError::InvalidCredentials);
        }

        self.issue(user.email).await
    }

    /// Whether `raw_id` names a live token bound to `email`.
    ///
    /// Fails closed: an absent, unreadable, foreign, or expired token all
    /// answer `false`. This never returns an error.
    pub async fn verify(&self, raw_id: &str, email: &Email) -> bool {
        let Ok(id) = TokenId::parse(raw_id) else {
            return false;
        };
        match self
            .store
            .read::<Token>(Collection::Tokens, id.as_str())
            .await
        {
            Ok(token) => token.is_valid_for(email, Utc::now()),
            Err(_) => false,
        }
    }

    /// Read a token record.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::NotFound` if absent.
    pub async fn get(&self, id: &TokenId) -> Result<Token, TokenError> {
        self.store
            .read(Collection::Tokens, id.as_str())
            .await
            .map_err(missing_token)
    }

    /// Reset a live token's expiry to one hour from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::AlreadyExpired` if the expiry has already
    /// passed at the time of the call; expired tokens cannot be renewed.
    #[instrument(skip(self))]
    pub async fn extend(&self, id: &TokenId) -> Result<Token, TokenError> {
        let mut token: Token = self
            .store
            .read(Collection::Tokens, id.as_str())
            .await
            .map_err(missing_token)?;

        let now = Utc::now();
        if token.is_expired(now) {
            return Err(TokenError::AlreadyExpired);
        }

        token.extend(now);
        self.store
            .update(Collection::Tokens, id.as_str(), &token)
            .await?;
        Ok(token)
    }

    /// Delete a token, ending its session. Returns the revoked record.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::NotFound` if already absent.
    #[instrument(skip(self))]
    pub async fn revoke(&self, id: &TokenId) -> Result<Token, TokenError> {
        let token: Token = self
            .store
            .read(Collection::Tokens, id.as_str())
            .await
            .map_err(missing_token)?;
        self.store
            .delete(Collection::Tokens, id.as_str())
            .await
            .map_err(missing_token)?;
        Ok(token)
    }
}

fn missing_token(e: StoreError) -> TokenError {
    match e {
        StoreError::NotFound => TokenError::NotFound,
        other => TokenError::Store(other),
    }
}
