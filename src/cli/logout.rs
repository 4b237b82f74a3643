use crate::{cli::build_client, success, warning};

pub async fn logout() {
    let client = build_client();
    match client.session().clear().await {
        Ok(()) => success!("Session cleared."),
        Err(e) => warning!("Failed to clear session: {}", e),
    }
}
