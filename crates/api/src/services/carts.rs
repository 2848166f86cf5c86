//! Cart mutation workflows.
//!
//! Carts are mutated in place: `add` increases or inserts quantities,
//! `remove` decreases them and drops any entry that would fall below 1, and
//! `overwrite` replaces the contents wholesale. Every mutation validates the
//! requested items against the menu before anything is written.
//!
//! The cart entity is created lazily: the first mutation on a user with no
//! cart creates an empty cart and links it to the user record. Once
//! assigned, the cart id is stable for the user's lifetime.

use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use pronto_core::{CartId, Email};

use crate::models::{CartContents, MENU_ID, Menu, User};
use crate::store::{Collection, EntityStore, StoreError};

/// How a cart mutation combines the requested items with the current cart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartAction {
    Add,
    Remove,
    #[default]
    Overwrite,
}

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The owning user record does not exist.
    #[error("user not found")]
    UserNotFound,

    /// The requested items failed validation against the menu.
    #[error("invalid items: {0}")]
    InvalidItems(String),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service for cart operations.
pub struct CartService<'a> {
    store: &'a EntityStore,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Current contents of the user's cart.
    ///
    /// A user who has never touched a cart gets the empty cart back; no
    /// cart entity is created by reading.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user does not exist.
    pub async fn contents(&self, email: &Email) -> Result<CartContents, CartError> {
        let user = self.load_user(email).await?;
        match user.cart {
            Some(cart_id) => Ok(self
                .store
                .read(Collection::Carts, cart_id.as_str())
                .await?),
            None => Ok(CartContents::new()),
        }
    }

    /// Apply a mutation to the user's cart and return the new contents.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidItems` if the request is empty, names an
    /// item not on the menu, or carries a zero quantity. Nothing is written
    /// when validation fails.
    #[instrument(skip(self, items))]
    pub async fn apply(
        &self,
        email: &Email,
        action: CartAction,
        items: &CartContents,
    ) -> Result<CartContents, CartError> {
        let menu: Menu = self.store.read(Collection::Menus, MENU_ID).await?;
        validate_items(items, &menu)?;

        let mut user = self.load_user(email).await?;
        let cart_id = self.ensure_cart(&mut user).await?;

        let mut cart: CartContents = self.store.read(Collection::Carts, cart_id.as_str()).await?;
        match action {
            CartAction::Add => add_items(&mut cart, items),
            CartAction::Remove => remove_items(&mut cart, items),
            CartAction::Overwrite => cart = items.clone(),
        }

        self.store
            .update(Collection::Carts, cart_id.as_str(), &cart)
            .await?;
        Ok(cart)
    }

    /// Empty the user's cart, returning the items that were removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UserNotFound` if the user does not exist.
    #[instrument(skip(self))]
    pub async fn clear(&self, email: &Email) -> Result<CartContents, CartError> {
        let user = self.load_user(email).await?;
        let Some(cart_id) = user.cart else {
            // Nothing was ever carted; nothing to clear.
            return Ok(CartContents::new());
        };

        let removed: CartContents = self.store.read(Collection::Carts, cart_id.as_str()).await?;
        self.store
            .update(Collection::Carts, cart_id.as_str(), &CartContents::new())
            .await?;
        Ok(removed)
    }

    async fn load_user(&self, email: &Email) -> Result<User, CartError> {
        self.store
            .read(Collection::Users, email.as_str())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => CartError::UserNotFound,
                other => CartError::Store(other),
            })
    }

    /// Return the user's cart id, creating and linking an empty cart first
    /// if the user has none yet.
    async fn ensure_cart(&self, user: &mut User) -> Result<CartId, CartError> {
        if let Some(cart_id) = &user.cart {
            return Ok(cart_id.clone());
        }

        let cart_id = CartId::generate();
        self.store
            .create(Collection::Carts, cart_id.as_str(), &CartContents::new())
            .await?;
        user.cart = Some(cart_id.clone());
        self.store
            .update(Collection::Users, user.email.as_str(), user)
            .await?;
        Ok(cart_id)
    }
}

/// Validate a requested item map against the menu.
fn validate_items(items: &CartContents, menu: &Menu) -> Result<(), CartError> {
    if items.is_empty() {
        return Err(CartError::InvalidItems("no items supplied".to_owned()));
    }
    for (name, &quantity) in items {
        if !menu.contains_key(name) {
            return Err(CartError::InvalidItems(format!(
                "{name:?} is not on the menu"
            )));
        }
        if quantity == 0 {
            return Err(CartError::InvalidItems(format!(
                "quantity for {name:?} must be at least 1"
            )));
        }
    }
    Ok(())
}

/// Increase or insert quantities.
fn add_items(cart: &mut CartContents, items: &CartContents) {
    for (name, &quantity) in items {
        *cart.entry(name.clone()).or_insert(0) += quantity;
    }
}

/// Decrease quantities, dropping any entry that falls below 1. Items not in
/// the cart are ignored.
fn remove_items(cart: &mut CartContents, items: &CartContents) {
    for (name, &quantity) in items {
        if let Some(remaining) = cart.get_mut(name) {
            *remaining = remaining.saturating_sub(quantity);
            if *remaining == 0 {
                cart.remove(name);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn email() -> Email {
        Email::parse("ada@example.com").unwrap()
    }

    fn items(pairs: &[(&str, u32)]) -> CartContents {
        pairs
            .iter()
            .map(|(name, quantity)| ((*name).to_owned(), *quantity))
            .collect()
    }

    async fn store_with_fixtures() -> (tempfile::TempDir, EntityStore) {
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

        let user = User {
            username: "ada".to_owned(),
            email: email(),
            password_hash: "digest".to_owned(),
            address: "1 Example St".to_owned(),
            cart: None,
            orders: Vec::new(),
        };
        store
            .create(Collection::Users, user.email.as_str(), &user)
            .await
            .unwrap();

        (dir, store)
    }

    #[tokio::test]
    async fn test_first_mutation_creates_and_links_cart() {
        let (_dir, store) = store_with_fixtures().await;
        let service = CartService::new(&store);

        service
            .apply(&email(), CartAction::Add, &items(&[("pizza", 2)]))
            .await
            .unwrap();

        let user: User = store
            .read(Collection::Users, email().as_str())
            .await
            .unwrap();
        let cart_id = user.cart.expect("cart id assigned");

        // A second mutation reuses the same cart id.
        service
            .apply(&email(), CartAction::Add, &items(&[("soda", 1)]))
            .await
            .unwrap();
        let user: User = store
            .read(Collection::Users, email().as_str())
            .await
            .unwrap();
        assert_eq!(user.cart, Some(cart_id));
    }

    #[tokio::test]
    async fn test_add_then_remove_is_idempotent() {
        let (_dir, store) = store_with_fixtures().await;
        let service = CartService::new(&store);

        service
            .apply(&email(), CartAction::Add, &items(&[("pizza", 2)]))
            .await
            .unwrap();
        let cart = service
            .apply(&email(), CartAction::Remove, &items(&[("pizza", 2)]))
            .await
            .unwrap();

        // No entry at all, not an entry with value 0.
        assert!(!cart.contains_key("pizza"));
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_remove_drops_below_one() {
        let (_dir, store) = store_with_fixtures().await;
        let service = CartService::new(&store);

        service
            .apply(&email(), CartAction::Add, &items(&[("pizza", 2)]))
            .await
            .unwrap();
        let cart = service
            .apply(&email(), CartAction::Remove, &items(&[("pizza", 5)]))
            .await
            .unwrap();
        assert!(!cart.contains_key("pizza"));
    }

    #[tokio::test]
    async fn test_overwrite_replaces_contents() {
        let (_dir, store) = store_with_fixtures().await;
        let service = CartService::new(&store);

        service
            .apply(&email(), CartAction::Add, &items(&[("pizza", 2)]))
            .await
            .unwrap();
        let cart = service
            .apply(&email(), CartAction::Overwrite, &items(&[("soda", 3)]))
            .await
            .unwrap();

        assert_eq!(cart, items(&[("soda", 3)]));
    }

    #[tokio::test]
    async fn test_validation_rejects_off_menu_items() {
        let (_dir, store) = store_with_fixtures().await;
        let service = CartService::new(&store);

        let err = service
            .apply(&email(), CartAction::Add, &items(&[("sushi", 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidItems(_)));

        // Validation failure writes nothing: the user still has no cart.
        let user: User = store
            .read(Collection::Users, email().as_str())
            .await
            .unwrap();
        assert!(user.cart.is_none());
    }

    #[tokio::test]
    async fn test_validation_rejects_zero_quantity_and_empty_request() {
        let (_dir, store) = store_with_fixtures().await;
        let service = CartService::new(&store);

        let err = service
            .apply(&email(), CartAction::Add, &items(&[("pizza", 0)]))
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidItems(_)));

        let err = service
            .apply(&email(), CartAction::Add, &CartContents::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidItems(_)));
    }

    #[tokio::test]
    async fn test_contents_for_fresh_user_is_empty() {
        let (_dir, store) = store_with_fixtures().await;
        let service = CartService::new(&store);

        let cart = service.contents(&email()).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_clear_reports_removed_items() {
        let (_dir, store) = store_with_fixtures().await;
        let service = CartService::new(&store);

        service
            .apply(&email(), CartAction::Add, &items(&[("pizza", 2), ("soda", 1)]))
            .await
            .unwrap();
        let removed = service.clear(&email()).await.unwrap();
        assert_eq!(removed, items(&[("pizza", 2), ("soda", 1)]));

        let cart = service.contents(&email()).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_is_reported() {
        let (_dir, store) = store_with_fixtures().await;
        let service = CartService::new(&store);

        let ghost = Email::parse("ghost@example.com").unwrap();
        let err = service.contents(&ghost).await.unwrap_err();
        assert!(matches!(err, CartError::UserNotFound));
    }
}
