//! Order placement workflow.
//!
//! The only place in the system where money moves. The sequence is strict:
//! load, validate, compute, charge, notify, persist. Validation happens
//! before any external call or write, so a request that cannot be fulfilled
//! from the cart is never charged. After a successful charge the workflow
//! never aborts: a failed receipt email is recorded inside the order, and
//! the three closing writes (order, user, cart) are best-effort.
//!
//! There is no cross-entity transaction. If a write fails partway, the
//! earlier writes stay committed and the system is left in an
//! inconsistent-but-detectable state (e.g. payment captured, no order
//! record). This window is a documented property of the per-entity-file
//! store, not an accident; see DESIGN.md.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use pronto_core::{Email, OrderId, to_minor_units};

use crate::config::StripeConfig;
use crate::gateways::{
    ChargeRequest, EmailMessage, MAX_CHARGE_DESCRIPTION, NotificationGateway, PaymentError,
    PaymentGateway,
};
use crate::models::{CartContents, MENU_ID, Menu, NotificationRecord, Order, Receipt, User};
use crate::store::{Collection, EntityStore, StoreError};

/// Errors that can occur when placing or fetching an order.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The ordering user does not exist.
    #[error("user not found")]
    UserNotFound,

    /// The user has never built a cart, so there is nothing to order from.
    #[error("user has no cart to order from")]
    NoCart,

    /// The requested items failed validation against the cart or menu.
    /// Reported before any charge or write.
    #[error("invalid items: {0}")]
    InvalidItems(String),

    /// The order does not exist or does not belong to the user.
    #[error("order not found")]
    NotFound,

    /// The receipt total cannot be expressed in minor units.
    #[error("order total is out of range")]
    TotalOutOfRange,

    /// The payment provider declined or errored. Nothing was written.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service orchestrating the order placement sequence.
pub struct OrderService<'a> {
    store: &'a EntityStore,
    payments: &'a dyn PaymentGateway,
    notifications: &'a dyn NotificationGateway,
    charge_config: &'a StripeConfig,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(
        store: &'a EntityStore,
        payments: &'a dyn PaymentGateway,
        notifications: &'a dyn NotificationGateway,
        charge_config: &'a StripeConfig,
    ) -> Self {
        Self {
            store,
            payments,
            notifications,
            charge_config,
        }
    }

    /// Place an order for the given items out of the user's cart.
    ///
    /// On success the order record is returned; the cart has been
    /// decremented and the order id appended to the user's order list.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidItems` (before any charge or write) if a
    /// requested item is not in the cart, exceeds the carted quantity, or
    /// is no longer priced on the menu; `OrderError::Payment` if the charge
    /// fails (the cart is not decremented on disk); `OrderError::Store` if
    /// one of the closing writes fails.
    #[instrument(skip(self, items))]
    pub async fn place(
        &self,
        email: &Email,
        items: &BTreeMap<String, u32>,
    ) -> Result<Order, OrderError> {
        // Step 1: load user, cart, menu.
        let mut user = self.load_user(email).await?;
        let cart_id = user.cart.clone().ok_or(OrderError::NoCart)?;
        let mut cart: CartContents = self.store.read(Collection::Carts, cart_id.as_str()).await?;
        let menu: Menu = self.store.read(Collection::Menus, MENU_ID).await?;

        // Step 2: validate every requested item. Any violation aborts here,
        // before money moves or anything is written.
        validate_order_items(items, &cart, &menu)?;

        // Step 3: decrement the in-memory cart copy and total the receipt.
        let receipt = compute_receipt(&mut cart, items, &menu);

        // Step 4: charge. Failure aborts the workflow with the cart still
        // intact on disk.
        let amount = to_minor_units(receipt.amount).ok_or(OrderError::TotalOutOfRange)?;
        let order_id = OrderId::generate();
        let transaction = self
            .payments
            .charge(ChargeRequest {
                amount,
                currency: self.charge_config.currency.clone(),
                description: charge_description(&receipt.items_ordered),
                source: self.charge_config.source_token.clone(),
            })
            .await?;

        // Step 5: notify. Money has already moved, so a failure here is
        // recorded in the order instead of aborting.
        let email_notification = match self
            .notifications
            .send(receipt_email(&user, &order_id, &receipt))
            .await
        {
            Ok(delivery) => NotificationRecord::from(delivery),
            Err(e) => {
                tracing::warn!(order_id = %order_id, error = %e, "receipt email failed");
                NotificationRecord::Failed {
                    error: e.to_string(),
                }
            }
        };

        // Step 6: three independent writes. A failure partway leaves the
        // earlier writes committed.
        let order = Order {
            owner: user.email.clone(),
            order_id: order_id.clone(),
            receipt,
            transaction,
            email_notification,
        };
        self.store
            .create(Collection::Orders, order_id.as_str(), &order)
            .await?;

        user.orders.push(order_id.clone());
        self.store
            .update(Collection::Users, user.email.as_str(), &user)
            .await?;

        self.store
            .update(Collection::Carts, cart_id.as_str(), &cart)
            .await?;

        tracing::info!(order_id = %order_id, amount = %order.receipt.amount, "order placed");
        Ok(order)
    }

    /// Fetch one of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is not referenced by the
    /// user's order list or its record is absent.
    pub async fn get(&self, email: &Email, order_id: &OrderId) -> Result<Order, OrderError> {
        let user = self.load_user(email).await?;
        if !user.orders.contains(order_id) {
            return Err(OrderError::NotFound);
        }
        self.store
            .read(Collection::Orders, order_id.as_str())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => OrderError::NotFound,
                other => OrderError::Store(other),
            })
    }

    async fn load_user(&self, email: &Email) -> Result<User, OrderError> {
        self.store
            .read(Collection::Users, email.as_str())
            .await
            .map_err(|e| match e {
                StoreError::NotFound => OrderError::UserNotFound,
                other => OrderError::Store(other),
            })
    }
}

/// Validate the requested items against the cart and menu.
///
/// Every item must be present in the cart with at least the requested
/// quantity, the quantity must be at least 1, and the item must still be
/// priced on the menu.
fn validate_order_items(
    items: &BTreeMap<String, u32>,
    cart: &CartContents,
    menu: &Menu,
) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::InvalidItems("no items supplied".to_owned()));
    }
    for (name, &quantity) in items {
        let Some(&in_cart) = cart.get(name) else {
            return Err(OrderError::InvalidItems(format!("{name:?} is not in the cart")));
        };
        if quantity == 0 {
            return Err(OrderError::InvalidItems(format!(
                "quantity for {name:?} must be at least 1"
            )));
        }
        if quantity > in_cart {
            return Err(OrderError::InvalidItems(format!(
                "quantity for {name:?} exceeds the {in_cart} in the cart"
            )));
        }
        if !menu.contains_key(name) {
            return Err(OrderError::InvalidItems(format!(
                "{name:?} is no longer on the menu"
            )));
        }
    }
    Ok(())
}

/// Decrement the in-memory cart copy and total the receipt.
///
/// Callers have already validated `items`; the lookups here stay defensive
/// anyway so a logic slip cannot panic.
fn compute_receipt(
    cart: &mut CartContents,
    items: &BTreeMap<String, u32>,
    menu: &Menu,
) -> Receipt {
    let mut amount = Decimal::ZERO;
    for (name, &quantity) in items {
        if let Some(remaining) = cart.get_mut(name) {
            *remaining = remaining.saturating_sub(quantity);
            if *remaining == 0 {
                cart.remove(name);
            }
        }
        if let Some(price) = menu.get(name) {
            amount += *price * Decimal::from(quantity);
        }
    }
    Receipt {
        amount,
        items_ordered: items.clone(),
    }
}

/// Human-readable charge description, truncated to the provider limit.
fn charge_description(items: &BTreeMap<String, u32>) -> String {
    let listed = items
        .iter()
        .map(|(name, quantity)| format!("{name} x{quantity}"))
        .collect::<Vec<_>>()
        .join(", ");
    let full = format!("Items Ordered : [ {listed} ]");
    truncate_chars(&full, MAX_CHARGE_DESCRIPTION)
}

/// The receipt email sent after a successful charge.
fn receipt_email(user: &User, order_id: &OrderId, receipt: &Receipt) -> EmailMessage {
    let items = receipt
        .items_ordered
        .iter()
        .map(|(name, quantity)| format!("  - {name} x{quantity}"))
        .collect::<Vec<_>>()
        .join("\n");
    EmailMessage {
        to: format!("{} <{}>", user.username, user.email),
        subject: "Thank you for ordering at Pronto Pizza".to_owned(),
        body: format!(
            "Your order has been placed and will be ready for pick-up in 15 minutes.\n\
             \n\
             Order number: {order_id}\n\
             Total cost: {amount}\n\
             Items ordered:\n{items}\n",
            amount = receipt.amount,
        ),
    }
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn items(pairs: &[(&str, u32)]) -> BTreeMap<String, u32> {
        pairs
            .iter()
            .map(|(name, quantity)| ((*name).to_owned(), *quantity))
            .collect()
    }

    fn menu() -> Menu {
        [
            ("pizza".to_owned(), Decimal::from(1000)),
            ("soda".to_owned(), Decimal::from(250)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_validate_rejects_item_not_in_cart() {
        let cart = items(&[("pizza", 2)]);
        let err = validate_order_items(&items(&[("soda", 1)]), &cart, &menu()).unwrap_err();
        assert!(matches!(err, OrderError::InvalidItems(_)));
    }

    #[test]
    fn test_validate_rejects_excess_quantity() {
        let cart = items(&[("pizza", 2)]);
        let err = validate_order_items(&items(&[("pizza", 3)]), &cart, &menu()).unwrap_err();
        assert!(matches!(err, OrderError::InvalidItems(_)));
    }

    #[test]
    fn test_validate_rejects_zero_quantity_and_empty_request() {
        let cart = items(&[("pizza", 2)]);
        assert!(validate_order_items(&items(&[("pizza", 0)]), &cart, &menu()).is_err());
        assert!(validate_order_items(&BTreeMap::new(), &cart, &menu()).is_err());
    }

    #[test]
    fn test_validate_rejects_unpriced_item() {
        let cart = items(&[("calzone", 1)]);
        let err = validate_order_items(&items(&[("calzone", 1)]), &cart, &menu()).unwrap_err();
        assert!(matches!(err, OrderError::InvalidItems(_)));
    }

    #[test]
    fn test_validate_accepts_full_cart_order() {
        let cart = items(&[("pizza", 2), ("soda", 1)]);
        assert!(validate_order_items(&items(&[("pizza", 2), ("soda", 1)]), &cart, &menu()).is_ok());
    }

    #[test]
    fn test_compute_receipt_totals_and_decrements() {
        let mut cart = items(&[("pizza", 2), ("soda", 1)]);
        let receipt = compute_receipt(&mut cart, &items(&[("pizza", 1), ("soda", 1)]), &menu());

        assert_eq!(receipt.amount, Decimal::from(1250));
        // soda dropped entirely, pizza decremented.
        assert_eq!(cart, items(&[("pizza", 1)]));
    }

    #[test]
    fn test_charge_description_is_bounded() {
        let many: BTreeMap<String, u32> = (0..50)
            .map(|i| (format!("very-long-item-name-{i}"), 1))
            .collect();
        let description = charge_description(&many);
        assert!(description.chars().count() <= MAX_CHARGE_DESCRIPTION);
    }

    #[test]
    fn test_receipt_email_mentions_order_details() {
        let user = User {
            username: "ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            password_hash: "digest".to_owned(),
            address: "1 Example St".to_owned(),
            cart: None,
            orders: Vec::new(),
        };
        let order_id = OrderId::generate();
        let receipt = Receipt {
            amount: Decimal::from(1250),
            items_ordered: items(&[("pizza", 1)]),
        };

        let message = receipt_email(&user, &order_id, &receipt);
        assert_eq!(message.to, "ada <ada@example.com>");
        assert!(message.body.contains(&order_id.to_string()));
        assert!(message.body.contains("1250"));
        assert!(message.body.contains("pizza x1"));
    }
}
