//! Configuration management for kexplist.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in `<data_local_dir>/kexplist/`
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf};

use crate::error::SyncError;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
const DEFAULT_SCOPE: &str = "playlist-modify-public";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_PLAYS_URL: &str = "http://cache.kexp.org/cache/plays";
const DEFAULT_PLAYLIST_URL: &str = "http://www.kexp.org/playlist";
const DEFAULT_CHANNEL: &str = "1";

/// Which KEXP playlist source this deployment reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// JSON plays feed keyed by a time range.
    Plays,
    /// Rendered playlist pages, one per broadcast hour.
    Html,
}

impl SourceKind {
    pub fn parse(value: &str) -> Result<Self, SyncError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "plays" | "json" => Ok(SourceKind::Plays),
            "html" => Ok(SourceKind::Html),
            other => Err(SyncError::Config(format!(
                "KEXP_SOURCE must be 'plays' or 'html', got '{other}'"
            ))),
        }
    }
}

/// Loads environment variables from `<data_local_dir>/kexplist/.env`.
///
/// Creates the directory when missing. A missing `.env` file is fine: the
/// process environment is then the only source of configuration.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        log::debug!("No .env file at {}", path.display());
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("kexplist/.env");
    path
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Address the local OAuth callback server binds to.
pub fn server_addr() -> String {
    var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS)
}

/// Client ID of the registered Spotify application.
///
/// Only needed when an interactive authorization has to run, so its absence
/// is reported as an authentication failure at that point.
pub fn spotify_client_id() -> Result<String, SyncError> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| {
            SyncError::AuthenticationFailed("SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string())
        })
}

pub fn spotify_redirect_uri() -> String {
    var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)
}

pub fn spotify_scope() -> String {
    var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE)
}

pub fn spotify_apiauth_url() -> String {
    var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)
}

/// Returns the Spotify Web API base URL, e.g. `https://api.spotify.com/v1`.
pub fn spotify_apiurl() -> String {
    var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
}

pub fn spotify_apitoken_url() -> String {
    var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)
}

/// The playlist source variant selected by `KEXP_SOURCE`.
pub fn kexp_source() -> Result<SourceKind, SyncError> {
    SourceKind::parse(&var_or("KEXP_SOURCE", "plays"))
}

pub fn kexp_plays_url() -> String {
    var_or("KEXP_PLAYS_URL", DEFAULT_PLAYS_URL)
}

pub fn kexp_playlist_url() -> String {
    var_or("KEXP_PLAYLIST_URL", DEFAULT_PLAYLIST_URL)
}

pub fn kexp_channel() -> String {
    var_or("KEXP_CHANNEL", DEFAULT_CHANNEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_accepts_known_values() {
        assert_eq!(SourceKind::parse("plays").unwrap(), SourceKind::Plays);
        assert_eq!(SourceKind::parse("JSON").unwrap(), SourceKind::Plays);
        assert_eq!(SourceKind::parse(" html ").unwrap(), SourceKind::Html);
    }

    #[test]
    fn source_kind_rejects_unknown_values() {
        let err = SourceKind::parse("rss").unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
