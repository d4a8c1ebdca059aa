//! Typed access to a single well-known key.

use crate::{Cache, CacheError};
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;

/// A typed handle to one key in a [`Cache`].
///
/// The cart and the auth session each live under a fixed key; a `Slot`
/// pins the key and the stored type together so callers cannot read one
/// as the other.
///
/// ```rust
/// use dawa_cache::{Cache, Slot};
///
/// let slot: Slot<Vec<String>> = Slot::new(Cache::memory(), "recent:searches");
/// assert_eq!(slot.load()?, None);
/// slot.store(&vec!["paracetamol".to_string()])?;
/// assert_eq!(slot.load()?.map(|v| v.len()), Some(1));
/// # Ok::<(), dawa_cache::CacheError>(())
/// ```
#[derive(Debug)]
pub struct Slot<T> {
    cache: Cache,
    key: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key,
            _phantom: PhantomData,
        }
    }
}

impl<T> Slot<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Bind `key` in `cache`.
    pub fn new(cache: Cache, key: &'static str) -> Self {
        Self {
            cache,
            key,
            _phantom: PhantomData,
        }
    }

    /// The bound key.
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Read the stored value; `None` when nothing was ever stored.
    pub fn load(&self) -> Result<Option<T>, CacheError> {
        self.cache.get(self.key)
    }

    /// Read the stored value, removing it when it cannot be decoded.
    ///
    /// Used on start-up rehydration where a corrupt entry must not stop the
    /// front-end from coming up.
    pub fn load_or_discard(&self) -> Option<T> {
        match self.load() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "discarding unreadable stored value");
                if let Err(e) = self.clear() {
                    tracing::warn!(key = self.key, error = %e, "failed to remove unreadable value");
                }
                None
            }
        }
    }

    /// Replace the stored value.
    pub fn store(&self, value: &T) -> Result<(), CacheError> {
        self.cache.set(self.key, value)
    }

    /// Remove the stored value.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.cache.delete(self.key)
    }
}
