//! HTTP client for the Dawa storefront API.
//!
//! Wraps every call in the API's `{status, data, message, code}` envelope,
//! attaches the session's bearer token and transparently refreshes it once
//! on a 401.
//!
//! # Example
//!
//! ```rust,ignore
//! use dawa_data::prelude::*;
//! use std::sync::Arc;
//!
//! let transport = Arc::new(ReqwestTransport::new(TimeoutConfig::default())?);
//! let client = ApiClient::new("https://api.malricpharma.co.ke", transport)?
//!     .with_tokens(session_store);
//!
//! let orders = OrdersApi::new(client);
//! let page = orders.list_orders(1, 10).await?;
//! for order in page.orders {
//!     println!("{} {}", order.order_number, order.status);
//! }
//! ```

mod client;
mod envelope;
mod error;
mod orders;
mod request;
mod response;
mod retry;
mod timeout;
mod transport;

pub use client::{ApiClient, TokenStore, DEFAULT_PROTECTED_PATHS, REFRESH_PATH};
pub use envelope::{ResponseStatus, ServerResponse};
pub use error::FetchError;
pub use orders::OrdersApi;
pub use request::{Method, RequestBuilder};
pub use response::Response;
pub use retry::{BackoffStrategy, RetryCondition, RetryPolicy};
pub use timeout::TimeoutConfig;
pub use transport::{ReqwestTransport, Transport};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ApiClient, FetchError, Method, OrdersApi, ReqwestTransport, Response, RetryPolicy,
        TimeoutConfig, TokenStore, Transport,
    };
    pub use dawa_commerce::checkout::{OrderHistory, OrderService};
}
