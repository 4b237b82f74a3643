use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use reqwest::Url;
use tokio::net::TcpListener;

use crate::{api, error::SpotifyError, spotify::SpotifyClient, types::AuthOutcomeSlot};

pub const HEALTH_PATH: &str = "/health";

/// Routes of the local callback server. The callback is mounted on the path
/// of the configured redirect uri, which must not be the health route.
pub fn router(client: Arc<SpotifyClient>, outcome: AuthOutcomeSlot) -> Result<Router, SpotifyError> {
    let redirect = Url::parse(&client.config().redirect_uri)?;
    let callback_path = match redirect.path() {
        "" => "/",
        path => path,
    }
    .to_string();

    if callback_path == HEALTH_PATH {
        return Err(SpotifyError::CallbackPath(callback_path));
    }

    let app = Router::new()
        .route(HEALTH_PATH, get(api::health))
        .route(&callback_path, get(api::callback))
        .layer(Extension(client))
        .layer(Extension(outcome));

    Ok(app)
}

pub async fn start_api_server(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app).await
}
