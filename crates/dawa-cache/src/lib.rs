//! Type-safe client-local key-value storage for the Dawa storefront.
//!
//! Plays the role a browser's local storage plays for a web client: values
//! survive a restart of the front-end and are looked up under well-known
//! keys. A missing key is never an error, it simply reads back as `None`.
//!
//! # Example
//!
//! ```rust
//! use dawa_cache::Cache;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Line {
//!     product_id: String,
//!     quantity: i64,
//! }
//!
//! let cache = Cache::memory();
//!
//! cache.set("cart:items", &vec![Line { product_id: "p1".into(), quantity: 2 }])?;
//! let lines: Option<Vec<Line>> = cache.get("cart:items")?;
//! assert_eq!(lines.map(|l| l.len()), Some(1));
//!
//! cache.delete("cart:items")?;
//! assert!(!cache.exists("cart:items")?);
//! # Ok::<(), dawa_cache::CacheError>(())
//! ```

mod error;
mod kv;
mod slot;

pub use error::CacheError;
pub use kv::{Cache, FileBackend, KvBackend, MemoryBackend};
pub use slot::Slot;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, Slot};
}
