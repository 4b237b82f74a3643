//! Configuration management for jammcli.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files and turns them into an explicit [`Config`] value that is
//! handed to the Spotify client. Nothing reads the environment after startup.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (Spotify's public endpoints)

use std::{env, path::PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:3000/callback";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private";

/// Returns the jammcli directory inside the platform local data directory.
///
/// - Linux: `~/.local/share/jammcli`
/// - macOS: `~/Library/Application Support/jammcli`
/// - Windows: `%LOCALAPPDATA%/jammcli`
///
/// Falls back to `./jammcli` when the platform directory cannot be resolved.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("jammcli");
    path
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the data directory if it doesn't exist and loads variables from
/// `jammcli/.env`. A missing file is not an error: every setting can come from
/// the process environment instead. Variables already present in the process
/// environment are never overwritten.
///
/// # Errors
///
/// Returns [`ConfigError::EnvFile`] if the directory cannot be created or the
/// file exists but cannot be parsed.
///
/// # Example
///
/// ```
/// use jammcli::config;
///
/// #[tokio::main]
/// async fn main() {
///     if let Err(e) = config::load_env().await {
///         eprintln!("Configuration error: {}", e);
///     }
/// }
/// ```
pub async fn load_env() -> Result<(), ConfigError> {
    let dir = data_dir();
    async_fs::create_dir_all(&dir)
        .await
        .map_err(|e| ConfigError::EnvFile(e.to_string()))?;

    let path = dir.join(".env");
    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| ConfigError::EnvFile(e.to_string()))?;
    Ok(())
}

/// Runtime settings for the Spotify client and the local callback server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Client id of the application registered with Spotify.
    pub client_id: String,
    /// Callback URL Spotify redirects to; must match the app registration.
    pub redirect_uri: String,
    /// Space separated scopes requested at login. Empty requests none.
    pub scope: String,
    /// Authorization endpoint the user is sent to.
    pub auth_url: String,
    /// Token endpoint the authorization code is exchanged at.
    pub token_url: String,
    /// Base URL of the Web API, without a trailing slash.
    pub api_url: String,
    /// Address the local callback server binds to.
    pub server_addr: String,
}

impl Config {
    /// Creates a configuration with Spotify's public endpoints and the
    /// default local redirect.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            server_addr: DEFAULT_SERVER_ADDRESS.to_string(),
        }
    }

    /// Builds the configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `SPOTIFY_API_AUTH_CLIENT_ID` | required |
    /// | `SPOTIFY_API_REDIRECT_URI` | `http://127.0.0.1:3000/callback` |
    /// | `SPOTIFY_API_AUTH_SCOPE` | `playlist-modify-public playlist-modify-private` |
    /// | `SPOTIFY_API_AUTH_URL` | `https://accounts.spotify.com/authorize` |
    /// | `SPOTIFY_API_TOKEN_URL` | `https://accounts.spotify.com/api/token` |
    /// | `SPOTIFY_API_URL` | `https://api.spotify.com/v1` |
    /// | `SERVER_ADDRESS` | `127.0.0.1:3000` |
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the client id is unset or empty.
    ///
    /// # Example
    ///
    /// ```
    /// let config = jammcli::config::Config::from_env()?;
    /// println!("logging in as client {}", config.client_id);
    /// ```
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with variables read through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let client_id = lookup("SPOTIFY_API_AUTH_CLIENT_ID")
            .filter(|id| !id.trim().is_empty())
            .ok_or(ConfigError::Missing("SPOTIFY_API_AUTH_CLIENT_ID"))?;

        let mut config = Self::new(client_id);
        let overrides = [
            (&mut config.redirect_uri, "SPOTIFY_API_REDIRECT_URI"),
            (&mut config.scope, "SPOTIFY_API_AUTH_SCOPE"),
            (&mut config.auth_url, "SPOTIFY_API_AUTH_URL"),
            (&mut config.token_url, "SPOTIFY_API_TOKEN_URL"),
            (&mut config.api_url, "SPOTIFY_API_URL"),
            (&mut config.server_addr, "SERVER_ADDRESS"),
        ];
        for (target, key) in overrides {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        }
        config.api_url = config.api_url.trim_end_matches('/').to_string();

        Ok(config)
    }
}
