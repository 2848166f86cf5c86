//! Workflows layered on the entity store.
//!
//! Each service borrows the store (and, for orders, the gateways) for the
//! duration of one request; no service holds cross-request state. The store
//! gives no cross-entity atomicity, so every multi-write sequence here is
//! ordered so that the externally visible damage of a partial failure is as
//! small as possible.

pub mod carts;
pub mod orders;
pub mod tokens;
pub mod users;

pub use carts::{CartAction, CartError, CartService};
pub use orders::{OrderError, OrderService};
pub use tokens::{TokenError, TokenService};
pub use users::{ProfileChanges, UserError, UserService};
