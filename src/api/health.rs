use axum::response::Json;
use serde::Serialize;

/// Body of `GET /health` on the callback server.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub name: &'static str,
    pub version: &'static str,
}

/// Liveness check, answered while the server waits for the redirect.
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}
