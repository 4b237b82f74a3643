//! # CLI Module
//!
//! The command-line layer of jammcli. Each command builds a
//! [`SpotifyClient`] from the environment, runs one library operation and
//! turns the result into user-facing output with the crate's logging macros.
//!
//! ## Commands
//!
//! - [`auth`] - runs the OAuth 2.0 PKCE login through the browser and the local
//!   callback server
//! - [`search`] - searches tracks and prints them as a table
//! - [`playlist`] - creates a playlist and adds the given track uris
//! - [`logout`] - forgets the stored session
//!
//! ## Error Presentation
//!
//! The library never prints or exits. Here, recoverable problems are shown
//! with `warning!` and failures of the requested operation end the process
//! through `error!`.
//!
//! ## Usage Patterns
//!
//! ```bash
//! jammcli auth                                   # Authenticate with Spotify
//! jammcli search daft punk                       # Free text search
//! jammcli search --raw 'q=artist:daft%20punk'    # Pre-encoded query
//! jammcli playlist --name "Road trip" spotify:track:4uLU6hMCjMI75M1A2tKUQC
//! jammcli logout
//! ```

mod auth;
mod logout;
mod playlist;
mod search;

use std::sync::Arc;

pub use auth::auth;
pub use logout::logout;
pub use playlist::playlist;
pub use search::search;

use crate::{
    config::Config,
    error,
    management::{FileStore, SessionManager},
    spotify::SpotifyClient,
};

/// Client with configuration from the environment and the on-disk session.
/// Exits the process when the configuration is incomplete.
pub fn build_client() -> SpotifyClient {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    let session = SessionManager::new(Arc::new(FileStore::default_location()));
    SpotifyClient::new(config, session)
}
