use std::sync::Arc;

use crate::{error::StoreError, management::KeyValueStore, types::AuthState};

pub const CODE_VERIFIER_KEY: &str = "code_verifier";
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const AUTH_STATE_KEY: &str = "auth_state";

/// Typed access to the login session kept in a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn persist_auth_state(&self, auth: &AuthState) -> Result<(), StoreError> {
        self.store.set(CODE_VERIFIER_KEY, &auth.code_verifier).await?;
        self.store.set(AUTH_STATE_KEY, &auth.state).await
    }

    pub async fn code_verifier(&self) -> Result<Option<String>, StoreError> {
        self.store.get(CODE_VERIFIER_KEY).await
    }

    pub async fn auth_state(&self) -> Result<Option<String>, StoreError> {
        self.store.get(AUTH_STATE_KEY).await
    }

    /// Drops the verifier and nonce once they have been used.
    pub async fn clear_auth_state(&self) -> Result<(), StoreError> {
        self.store.remove(CODE_VERIFIER_KEY).await?;
        self.store.remove(AUTH_STATE_KEY).await
    }

    pub async fn access_token(&self) -> Result<Option<String>, StoreError> {
        self.store.get(ACCESS_TOKEN_KEY).await
    }

    pub async fn persist_access_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(ACCESS_TOKEN_KEY, token).await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.clear_auth_state().await?;
        self.store.remove(ACCESS_TOKEN_KEY).await
    }
}
