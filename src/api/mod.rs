//! # API Module
//!
//! HTTP endpoints of the local callback server that is started for the
//! duration of `jammcli auth`.
//!
//! ## Endpoints
//!
//! - [`callback`] - receives the redirect from Spotify's authorization page,
//!   checks the `state` nonce and exchanges the authorization code for an
//!   access token. Requests with a wrong nonce are answered and ignored.
//!   Mounted on the path of the configured redirect uri.
//! - [`health`] - returns status, crate name and version as [`Health`],
//!   handy to check that the configured `SERVER_ADDRESS` is reachable.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use jammcli::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::{Health, health};
