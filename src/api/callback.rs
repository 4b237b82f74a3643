use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{
    spotify::SpotifyClient,
    types::{AuthOutcome, AuthOutcomeSlot},
    warning,
};

/// Handles the redirect back from the Spotify authorization page.
///
/// The returned `state` must match the nonce stored when the login started.
/// A request that fails that check gets an error page and is otherwise
/// ignored: the slot the `auth` command waits on stays empty, so a stray or
/// forged hit cannot end the login. Only a request carrying the right state
/// writes an outcome.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(client): Extension<Arc<SpotifyClient>>,
    Extension(outcome): Extension<AuthOutcomeSlot>,
) -> Html<&'static str> {
    let (result, page) = handle_redirect(&client, &params).await;
    if let Some(result) = result {
        *outcome.lock().await = Some(result);
    }
    Html(page)
}

async fn handle_redirect(
    client: &SpotifyClient,
    params: &HashMap<String, String>,
) -> (Option<AuthOutcome>, &'static str) {
    if let Err(e) = client
        .verify_state(params.get("state").map(String::as_str))
        .await
    {
        warning!("Rejected callback: {}", e);
        return (None, "<h4>Login failed: state mismatch.</h4>");
    }

    if let Some(error) = params.get("error") {
        return (
            Some(AuthOutcome::Failed(format!("authorization denied: {error}"))),
            "<h4>Login failed.</h4>",
        );
    }

    let Some(code) = params.get("code") else {
        return (
            Some(AuthOutcome::Failed(
                "callback without authorization code".to_string(),
            )),
            "<h4>Missing authorization code.</h4>",
        );
    };

    match client.exchange_code_for_token(code).await {
        Ok(_) => (
            Some(AuthOutcome::Authorized),
            "<h2>Authentication successful.</h2><p>Close browser window.</p>",
        ),
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            (
                Some(AuthOutcome::Failed(e.to_string())),
                "<h4>Login failed.</h4>",
            )
        }
    }
}
