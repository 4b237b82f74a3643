//! Error types returned by the library.
//!
//! Nothing in the library logs or exits on failure. Every operation hands a
//! typed error back and the CLI layer decides whether to warn or abort.

use thiserror::Error;

/// Failures of the Spotify client operations.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("no code verifier stored, start the login flow first")]
    MissingVerifier,

    #[error("no access token stored, run `jammcli auth` first")]
    MissingToken,

    #[error("authorization state does not match the one sent with the login request")]
    StateMismatch,

    #[error("token exchange failed with status {status}: {message}")]
    AuthExchange { status: u16, message: String },

    #[error("Spotify API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("playlist {playlist_id} was created but its tracks could not be added: {source}")]
    TracksNotAdded {
        playlist_id: String,
        #[source]
        source: Box<SpotifyError>,
    },

    #[error("failed to open {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("callback server error: {0}")]
    Server(std::io::Error),

    #[error("redirect path {0} is taken by the health route")]
    CallbackPath(String),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures of the session key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("cannot load environment file: {0}")]
    EnvFile(String),
}
