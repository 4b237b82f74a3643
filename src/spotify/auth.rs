use std::{sync::Arc, time::Duration};

use reqwest::Url;
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    error::SpotifyError,
    server,
    spotify::SpotifyClient,
    types::{AuthOutcome, AuthOutcomeSlot, AuthState, AuthorizationRequest, TokenResponse},
    utils, warning,
};

/// Sends the user to the authorization page.
pub trait Navigator {
    fn navigate(&self, url: &str) -> Result<(), String>;
}

/// Opens the authorization page in the default browser.
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) -> Result<(), String> {
        webbrowser::open(url).map_err(|e| e.to_string())
    }
}

impl SpotifyClient {
    /// Builds the Spotify authorization URL for a login attempt.
    ///
    /// The URL carries every parameter the authorization code flow with PKCE
    /// requires:
    ///
    /// - `client_id` - the registered application
    /// - `response_type` - always `code`
    /// - `redirect_uri` - where Spotify sends the user back to
    /// - `state` - anti-CSRF nonce checked again on return
    /// - `code_challenge_method` - always `S256`
    /// - `code_challenge` - SHA-256 of the verifier, base64url without padding
    /// - `scope` - only when a scope is configured
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Url`] when the configured authorization endpoint
    /// is not a valid URL.
    pub fn authorization_url(&self, auth: &AuthState) -> Result<String, SpotifyError> {
        let challenge = utils::generate_code_challenge(&auth.code_verifier);
        let config = self.config();

        let mut params = vec![
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("state", auth.state.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", challenge.as_str()),
        ];
        if !config.scope.trim().is_empty() {
            params.push(("scope", config.scope.as_str()));
        }

        let url = Url::parse_with_params(&config.auth_url, &params)?;
        Ok(url.to_string())
    }

    /// Starts a PKCE login attempt.
    ///
    /// Generates a fresh 128 character code verifier and a 16 character state
    /// nonce, persists both in the session store, builds the authorization URL
    /// and hands it to `navigator`.
    ///
    /// The verifier stays in the store until [`exchange_code_for_token`]
    /// consumes it, so the exchange can happen in a different process than the
    /// one that started the login.
    ///
    /// # Returns
    ///
    /// The [`AuthorizationRequest`] with the URL and the nonce it carries.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::Store`] - the session store is not writable
    /// - [`SpotifyError::Url`] - the configured authorization endpoint is invalid
    /// - [`SpotifyError::Navigation`] - the navigator failed; the error carries
    ///   the URL so the user can open it by hand. The verifier and nonce are
    ///   already stored at that point.
    ///
    /// # Example
    ///
    /// ```
    /// match client.initiate_login(&BrowserNavigator).await {
    ///     Ok(request) => println!("waiting for callback with state {}", request.state),
    ///     Err(SpotifyError::Navigation { url, .. }) => println!("open {url} manually"),
    ///     Err(e) => return Err(e),
    /// }
    /// ```
    ///
    /// [`exchange_code_for_token`]: SpotifyClient::exchange_code_for_token
    pub async fn initiate_login(
        &self,
        navigator: &dyn Navigator,
    ) -> Result<AuthorizationRequest, SpotifyError> {
        let auth = AuthState {
            code_verifier: utils::generate_code_verifier(),
            state: utils::generate_state(),
        };

        self.session().persist_auth_state(&auth).await?;

        let url = self.authorization_url(&auth)?;
        navigator
            .navigate(&url)
            .map_err(|reason| SpotifyError::Navigation {
                url: url.clone(),
                reason,
            })?;

        Ok(AuthorizationRequest {
            url,
            state: auth.state,
        })
    }

    /// Checks the `state` returned on the redirect against the stored nonce.
    ///
    /// A missing returned state, a missing stored state or any difference is a
    /// [`SpotifyError::StateMismatch`].
    pub async fn verify_state(&self, returned: Option<&str>) -> Result<(), SpotifyError> {
        let stored = self.session().auth_state().await?;
        match (stored.as_deref(), returned) {
            (Some(stored), Some(returned)) if stored == returned => Ok(()),
            _ => Err(SpotifyError::StateMismatch),
        }
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// Posts a form-encoded body to the token endpoint with
    /// `grant_type=authorization_code`, the `code`, the configured
    /// `redirect_uri` and `client_id`, and the stored `code_verifier`.
    ///
    /// On success the verifier and nonce are dropped from the session and then
    /// the access token is stored. On failure no token is stored.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::MissingVerifier`] - no login was started; no request
    ///   is sent
    /// - [`SpotifyError::AuthExchange`] - the token endpoint answered with a
    ///   non-success status
    /// - [`SpotifyError::Http`] - network failure or a body that is not a token
    ///   response
    /// - [`SpotifyError::Store`] - the session store failed
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<String, SpotifyError> {
        let verifier = self
            .session()
            .code_verifier()
            .await?
            .ok_or(SpotifyError::MissingVerifier)?;
        let config = self.config();

        let response = self
            .http
            .post(&config.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", config.redirect_uri.as_str()),
                ("client_id", config.client_id.as_str()),
                ("code_verifier", verifier.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpotifyError::AuthExchange {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        // the token is only stored once the one-shot verifier is gone
        self.session().clear_auth_state().await?;
        self.session()
            .persist_access_token(&token.access_token)
            .await?;

        Ok(token.access_token)
    }
}

/// Runs the complete interactive login.
///
/// 1. Binds the local callback server on the configured address
/// 2. Starts the login and opens the authorization page with `navigator`
/// 3. Waits for the callback server to report the outcome
///
/// When the navigator fails the URL is printed so the user can open it
/// manually, and the wait continues.
///
/// # Returns
///
/// `Some(outcome)` once the callback was hit, `None` if nothing arrived
/// within `max_wait`.
///
/// # Errors
///
/// Fails when the callback server cannot bind, or when starting the login
/// fails for any reason other than navigation.
pub async fn login(
    client: Arc<SpotifyClient>,
    navigator: &dyn Navigator,
    max_wait: Duration,
) -> Result<Option<AuthOutcome>, SpotifyError> {
    let outcome: AuthOutcomeSlot = Arc::new(Mutex::new(None));

    let app = server::router(Arc::clone(&client), Arc::clone(&outcome))?;
    let listener = TcpListener::bind(client.config().server_addr.as_str())
        .await
        .map_err(SpotifyError::Server)?;

    tokio::spawn(async move {
        if let Err(e) = server::start_api_server(listener, app).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    match client.initiate_login(navigator).await {
        Ok(_) => {}
        Err(SpotifyError::Navigation { url, reason }) => {
            warning!(
                "Failed to open browser ({}). Please navigate to the following URL manually:\n{}",
                reason,
                url
            );
        }
        Err(e) => return Err(e),
    }

    Ok(wait_for_outcome(outcome, max_wait).await)
}

/// Polls `slot` once per second until the callback server fills it or
/// `max_wait` has passed.
pub async fn wait_for_outcome(slot: AuthOutcomeSlot, max_wait: Duration) -> Option<AuthOutcome> {
    use std::time::Instant;

    let start = Instant::now();
    let poll = Duration::from_secs(1).min(max_wait);

    loop {
        if let Some(outcome) = slot.lock().await.clone() {
            return Some(outcome);
        }
        if start.elapsed() >= max_wait {
            return None;
        }
        tokio::time::sleep(poll).await;
    }
}
