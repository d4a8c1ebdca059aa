//! Storefront domain types and logic for the Dawa online pharmacy.
//!
//! This crate provides:
//!
//! - **Cart**: the cart aggregate, a persisted and observable cart store,
//!   delivery pricing
//! - **Checkout**: the shipping → payment → confirmation sequencer, forms,
//!   order types and the order-service seams
//! - **Catalog**: products and product list filters
//!
//! # Example
//!
//! ```rust
//! use dawa_commerce::prelude::*;
//!
//! let mut cart = CartStore::in_memory();
//! cart.add_item(ProductId::new("p1"), "Amoxicillin 250mg", Money::kes(850), 2, None)?;
//! cart.add_item(ProductId::new("p2"), "Digital thermometer", Money::kes(1200), 1, None)?;
//!
//! let pricing = DeliveryPricing::for_subtotal(cart.subtotal());
//! assert_eq!(pricing.subtotal.display(), "Ksh 2,900.00");
//! assert!(pricing.free_delivery);
//!
//! let checkout = CheckoutSequencer::start(&cart.snapshot()).unwrap();
//! assert_eq!(checkout.step(), CheckoutStep::Shipping);
//! # Ok::<(), CommerceError>(())
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Cart
    pub use crate::cart::{
        delivery_fee, grand_total, Cart, CartLine, CartSnapshot, CartStore, DeliveryPricing,
        SubscriptionId,
    };

    // Catalog
    pub use crate::catalog::{Product, ProductFilter, SortField, SortOrder};

    // Checkout
    pub use crate::checkout::{
        place_order, CheckoutError, CheckoutSequencer, CheckoutState, CheckoutStep,
        CreateOrderRequest, Navigation, OrderErrorCode, OrderFailure, OrderHistory, OrderPage,
        OrderReceipt, OrderService, OrderStatus, OrderSummary, PaymentForm, PaymentInfo,
        PaymentMethod, ShippingForm, ShippingInfo, SubmitOutcome,
    };
}
