use std::{sync::Arc, time::Duration};

use crate::{
    cli::build_client,
    error, info,
    spotify::{self, BrowserNavigator},
    success,
    types::AuthOutcome,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(60);

pub async fn auth() {
    let client = Arc::new(build_client());
    info!(
        "Waiting for Spotify to redirect to {}",
        client.config().redirect_uri
    );

    match spotify::auth::login(client, &BrowserNavigator, LOGIN_TIMEOUT).await {
        Ok(Some(AuthOutcome::Authorized)) => success!("Authentication successful!"),
        Ok(Some(AuthOutcome::Failed(reason))) => error!("Authentication failed: {}", reason),
        Ok(None) => error!("Authentication timed out."),
        Err(e) => error!("Authentication failed: {}", e),
    }
}
