//! Persisted, observable cart.

use super::cart::{Cart, CartLine, CartSnapshot};
use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use dawa_cache::{Cache, Slot};
use std::fmt;

/// Storage key holding the serialized cart lines.
pub const CART_STORAGE_KEY: &str = "cart:items";

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&CartSnapshot) + Send>;

/// The cart the front-end works with.
///
/// Wraps a [`Cart`], writes it to the client-local store after every
/// effective change and tells observers about the new contents. A failed
/// write is logged and the in-memory change stands.
pub struct CartStore {
    cart: Cart,
    slot: Slot<Vec<CartLine>>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("key", &self.slot.key())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CartStore {
    /// Rehydrate the cart from `cache`.
    ///
    /// A missing key yields an empty cart; an unreadable one is logged and
    /// also yields an empty cart.
    pub fn load(cache: Cache) -> Self {
        let slot: Slot<Vec<CartLine>> = Slot::new(cache, CART_STORAGE_KEY);
        let lines = slot.load_or_discard().unwrap_or_default();
        let cart = Cart::from_lines(Currency::KES, lines);
        tracing::debug!(lines = cart.len(), "cart rehydrated");
        Self {
            cart,
            slot,
            observers: Vec::new(),
            next_id: 0,
        }
    }

    /// A store backed by a fresh in-memory cache.
    pub fn in_memory() -> Self {
        Self::load(Cache::memory())
    }

    /// See [`Cart::add_item`].
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
        quantity: i64,
        image_ref: Option<String>,
    ) -> Result<(), CommerceError> {
        self.cart
            .add_item(product_id, name, unit_price, quantity, image_ref)?;
        self.changed();
        Ok(())
    }

    /// See [`Cart::update_quantity`].
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        let changed = self.cart.update_quantity(product_id, quantity)?;
        if changed {
            self.changed();
        }
        Ok(changed)
    }

    /// Remove a line; a missing line is a no-op.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        let removed = self.cart.remove_item(product_id);
        if removed {
            self.changed();
        }
        removed
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.changed();
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.cart.get(product_id)
    }

    pub fn len(&self) -> usize {
        self.cart.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn subtotal(&self) -> Money {
        self.cart.subtotal()
    }

    pub fn item_count(&self) -> i64 {
        self.cart.item_count()
    }

    pub fn snapshot(&self) -> CartSnapshot {
        self.cart.snapshot()
    }

    /// Register a callback invoked with the new snapshot after each change.
    pub fn subscribe(&mut self, observer: impl Fn(&CartSnapshot) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Drop a callback. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() < before
    }

    fn changed(&mut self) {
        if let Err(e) = self.slot.store(&self.cart.lines().to_vec()) {
            tracing::warn!(key = CART_STORAGE_KEY, error = %e, "failed to persist cart");
        }
        let snapshot = self.cart.snapshot();
        tracing::trace!(
            lines = snapshot.lines.len(),
            subtotal = snapshot.subtotal.amount_cents,
            "cart changed"
        );
        for (_, observer) in &self.observers {
            observer(&snapshot);
        }
    }
}
