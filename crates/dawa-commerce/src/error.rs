//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in cart and money operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommerceError {
    /// Quantity must be at least one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Product identifier is empty.
    #[error("Product id must not be empty")]
    InvalidProductId,

    /// Unit price is negative.
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Decimal amount cannot be represented.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),
}
