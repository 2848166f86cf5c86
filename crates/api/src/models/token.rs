//! Bearer token record.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use pronto_core::{Email, TokenId};

/// A short-lived credential binding a random id to one user identity and an
/// absolute expiry.
///
/// Lifecycle: created at login, mutated only by extension, deleted at
/// logout or left to expire. Stale tokens are not proactively swept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub email: Email,
    pub expires: DateTime<Utc>,
}

impl Token {
    /// How long a freshly issued or extended token lives.
    #[must_use]
    pub fn lifetime() -> TimeDelta {
        TimeDelta::hours(1)
    }

    /// Issue a new token for `email`, expiring one lifetime after `now`.
    #[must_use]
    pub fn issue(email: Email, now: DateTime<Utc>) -> Self {
        Self {
            id: TokenId::generate(),
            email,
            expires: now + Self::lifetime(),
        }
    }

    /// Whether the token authorizes `email` at instant `now`.
    ///
    /// Valid iff the bound email matches and `expires` is strictly in the
    /// future.
    #[must_use]
    pub fn is_valid_for(&self, email: &Email, now: DateTime<Utc>) -> bool {
        self.email == *email && self.expires > now
    }

    /// Whether the token is expired at instant `now`. A token whose expiry
    /// equals `now` exactly is already expired.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }

    /// Reset the expiry to one lifetime after `now`.
    pub fn extend(&mut self, now: DateTime<Utc>) {
        self.expires = now + Self::lifetime();
    }
}
