//! # Spotify Integration Module
//!
//! This module is the integration layer between jammcli and the Spotify Web
//! API. [`SpotifyClient`] owns the HTTP client, the [`Config`] and the
//! [`SessionManager`], so every operation gets its endpoints and stored
//! credentials from one explicit value instead of ambient state.
//!
//! ## Architecture
//!
//! ```text
//! CLI / callback server
//!          ↓
//! SpotifyClient
//!     ├── auth      (PKCE login, state check, code exchange)
//!     ├── search    (track search)
//!     └── playlist  (profile lookup, create, add tracks)
//!          ↓
//! reqwest  ·  SessionManager → KeyValueStore
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns `Result<_, SpotifyError>`. Non-success statuses are
//! turned into [`SpotifyError::Api`] (or [`SpotifyError::AuthExchange`] for the
//! token endpoint) carrying the status code and the response body. There is no
//! retry, no timeout and no rate-limit handling.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - authorization code exchange
//! - `GET /search` - track search
//! - `GET /me` - current user id
//! - `POST /users/{user_id}/playlists` - create playlist
//! - `POST /playlists/{playlist_id}/tracks` - add tracks
//!
//! ## Usage
//!
//! ```rust
//! let client = SpotifyClient::new(config, SessionManager::new(Arc::new(FileStore::default_location())));
//! client.initiate_login(&BrowserNavigator).await?;
//! // ... callback delivers `code`
//! client.exchange_code_for_token(&code).await?;
//! let tracks = client.search(&utils::encode_search_query("daft punk")).await?;
//! ```

pub mod auth;
pub mod playlist;
pub mod search;

use reqwest::{Client, RequestBuilder, Response};

use crate::{config::Config, error::SpotifyError, management::SessionManager};

pub use auth::{BrowserNavigator, Navigator};

/// Client for the Spotify accounts service and Web API.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    config: Config,
    session: SessionManager,
}

impl SpotifyClient {
    pub fn new(config: Config, session: SessionManager) -> Self {
        Self::with_http_client(Client::new(), config, session)
    }

    pub fn with_http_client(http: Client, config: Config, session: SessionManager) -> Self {
        Self {
            http,
            config,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    fn api_endpoint(&self, path: &str) -> String {
        format!(
            "{base}/{path}",
            base = self.config.api_url.trim_end_matches('/'),
            path = path.trim_start_matches('/')
        )
    }

    /// Attaches the stored access token to `request`.
    async fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, SpotifyError> {
        let token = self
            .session
            .access_token()
            .await?
            .ok_or(SpotifyError::MissingToken)?;
        Ok(request.bearer_auth(token))
    }
}

/// Passes successful responses through and turns anything else into
/// [`SpotifyError::Api`] with the response body as message.
async fn ensure_success(response: Response) -> Result<Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(SpotifyError::Api {
        status: status.as_u16(),
        message,
    })
}
