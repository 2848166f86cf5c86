//! Domain records persisted in the entity store.
//!
//! Each type here maps one-to-one onto a stored JSON record. There is no
//! schema versioning; field names are preserved as written.

pub mod order;
pub mod token;
pub mod user;

use std::collections::BTreeMap;

use rust_decimal::Decimal;

pub use order::{NotificationRecord, Order, Receipt};
pub use token::Token;
pub use user::{User, UserProfile};

/// Cart contents: item name mapped to a quantity that is always >= 1.
/// Entries that would drop below 1 are removed, never stored at zero.
pub type CartContents = BTreeMap<String, u32>;

/// The menu: item name mapped to its unit price in the major currency unit.
/// Read-only from the workflows' perspective.
pub type Menu = BTreeMap<String, Decimal>;

/// The single vendor's fixed menu id.
pub const MENU_ID: &str = "dominos";
