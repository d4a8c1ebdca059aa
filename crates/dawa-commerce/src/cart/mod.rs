//! Shopping cart module.
//!
//! Contains the cart aggregate, the persisted and observable cart store, and
//! delivery pricing.

mod cart;
pub mod pricing;
mod store;

pub use cart::{Cart, CartLine, CartSnapshot, MAX_QUANTITY_PER_LINE};
pub use pricing::{delivery_fee, grand_total, DeliveryPricing};
pub use store::{CartStore, SubscriptionId, CART_STORAGE_KEY};
