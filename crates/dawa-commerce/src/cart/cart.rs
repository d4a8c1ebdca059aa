//! Cart and line item types.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per line.
pub const MAX_QUANTITY_PER_LINE: i64 = 99;

/// One product entry in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Product being purchased; unique within a cart.
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity, always at least one.
    pub quantity: i64,
    /// Image reference for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl CartLine {
    /// `unit_price * quantity`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.try_multiply(self.quantity)
    }
}

/// An immutable copy of the cart taken at one instant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSnapshot {
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
    /// Sum of `unit_price * quantity` over all lines.
    pub subtotal: Money,
    /// Sum of quantities, used for badge displays.
    pub item_count: i64,
}

impl CartSnapshot {
    /// Check if the snapshot holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A shopping cart.
///
/// Every mutation is atomic: it either succeeds and leaves a cart whose
/// subtotal is representable, or fails and leaves the cart untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: Currency,
    subtotal: Money,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(Currency::default())
    }
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
            subtotal: Money::zero(currency),
        }
    }

    /// Rebuild a cart from stored lines.
    ///
    /// Lines are replayed through [`Cart::add_item`], so duplicates merge and
    /// lines that break an invariant are dropped.
    pub fn from_lines(currency: Currency, lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new(currency);
        for line in lines {
            let product_id = line.product_id.clone();
            if let Err(e) = cart.add_item(
                line.product_id,
                line.name,
                line.unit_price,
                line.quantity,
                line.image_ref,
            ) {
                tracing::warn!(product_id = %product_id, error = %e, "dropping stored cart line");
            }
        }
        cart
    }

    /// Add an item to the cart, merging with an existing line for the same product.
    ///
    /// Returns an error if:
    /// - The product id is empty
    /// - Quantity is not positive
    /// - The price is negative or in another currency
    /// - The merged quantity would exceed [`MAX_QUANTITY_PER_LINE`]
    /// - Arithmetic overflow would occur
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
        image_ref: Option<String>,
    ) -> Result<(), CommerceError> {
        if product_id.is_blank() {
            return Err(CommerceError::InvalidProductId);
        }
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        if unit_price.is_negative() {
            return Err(CommerceError::InvalidPrice(unit_price.display()));
        }
        if unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: unit_price.currency.code().to_string(),
            });
        }

        let mut lines = self.lines.clone();
        if let Some(existing) = lines.iter_mut().find(|l| l.product_id == product_id) {
            let merged = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;
            if merged > MAX_QUANTITY_PER_LINE {
                return Err(CommerceError::QuantityExceedsLimit(
                    merged,
                    MAX_QUANTITY_PER_LINE,
                ));
            }
            existing.quantity = merged;
        } else {
            if quantity > MAX_QUANTITY_PER_LINE {
                return Err(CommerceError::QuantityExceedsLimit(
                    quantity,
                    MAX_QUANTITY_PER_LINE,
                ));
            }
            lines.push(CartLine {
                product_id,
                name: name.into(),
                unit_price,
                quantity,
                image_ref,
            });
        }
        self.commit(lines)
    }

    /// Set a line's quantity directly.
    ///
    /// A quantity of zero or less removes the line. Returns `Ok(false)` when
    /// no line exists for `product_id`.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(product_id));
        }

        let mut lines = self.lines.clone();
        let Some(line) = lines.iter_mut().find(|l| &l.product_id == product_id) else {
            return Ok(false);
        };
        if quantity > MAX_QUANTITY_PER_LINE {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_LINE,
            ));
        }
        if line.quantity == quantity {
            return Ok(false);
        }
        line.quantity = quantity;
        self.commit(lines)?;
        Ok(true)
    }

    /// Remove a line from the cart. Returns whether anything was removed.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        let removed = self.lines.len() < len_before;
        if removed {
            // Removing lines can only shrink a representable sum.
            self.subtotal = Self::sum(&self.lines, self.currency).unwrap_or(self.subtotal);
        }
        removed
    }

    /// Clear all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.subtotal = Money::zero(self.currency);
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get a line by product id.
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Cart currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Sum of `unit_price * quantity` over all lines.
    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Take an immutable copy of the current contents.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            subtotal: self.subtotal,
            item_count: self.item_count(),
        }
    }

    fn commit(&mut self, lines: Vec<CartLine>) -> Result<(), CommerceError> {
        let subtotal = Self::sum(&lines, self.currency)?;
        self.lines = lines;
        self.subtotal = subtotal;
        Ok(())
    }

    fn sum(lines: &[CartLine], currency: Currency) -> Result<Money, CommerceError> {
        lines.iter().try_fold(Money::zero(currency), |acc, line| {
            line.line_total()
                .and_then(|total| acc.try_add(&total))
                .ok_or(CommerceError::Overflow)
        })
    }
}
