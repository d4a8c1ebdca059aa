//! Shopper authentication for the Dawa storefront.
//!
//! [`AuthStore`] keeps the signed-in session (user plus access and refresh
//! tokens) under the `auth:session` key of the local store and doubles as
//! the API client's [`dawa_data::TokenStore`]. [`AuthApi`] performs the
//! login, sign-up, logout and refresh calls.
//!
//! # Example
//!
//! ```rust,ignore
//! use dawa_auth::{AuthApi, AuthStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(AuthStore::load(cache));
//! let client = ApiClient::new(base_url, transport)?.with_tokens(store.clone());
//! let auth = AuthApi::new(client, store);
//!
//! let user = auth.login("amina@example.co.ke", "correct horse").await?;
//! println!("Welcome back, {}", user.first_name());
//! ```

mod api;
mod credentials;
mod error;
mod session;
mod store;
mod user;

pub use api::{AuthApi, LOGIN_PATH, LOGOUT_PATH, SIGNUP_PATH};
pub use credentials::{CredentialField, LoginRequest, SignupRequest, MIN_PASSWORD_LEN};
pub use error::AuthError;
pub use session::AuthSession;
pub use store::{AuthStore, AUTH_STORAGE_KEY};
pub use user::{Role, User};
