use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;

use crate::{error::SyncError, spotify, types::Token, utils};

/// Seconds before expiry at which a token is refreshed.
const EXPIRY_MARGIN: u64 = 240;

/// Per-user token cache under `<data_local_dir>/kexplist/cache/`.
pub struct TokenManager {
    token: Token,
    path: PathBuf,
}

impl TokenManager {
    pub fn new(username: &str, token: Token) -> Self {
        Self::with_path(Self::token_path(username), token)
    }

    pub fn with_path(path: PathBuf, token: Token) -> Self {
        TokenManager { token, path }
    }

    pub async fn load(username: &str) -> Result<Self, String> {
        Self::load_from(Self::token_path(username)).await
    }

    pub async fn load_from(path: PathBuf) -> Result<Self, String> {
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { token, path })
    }

    pub async fn persist(&self) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Access token, refreshed and re-cached first if it is about to expire.
    pub async fn get_valid_token(&mut self, client: &Client) -> Result<String, SyncError> {
        if self.is_expired() {
            if self.token.refresh_token.is_empty() {
                return Err(SyncError::AuthenticationFailed(
                    "token expired and no refresh token is cached".to_string(),
                ));
            }
            self.token = spotify::auth::refresh_token(client, &self.token.refresh_token).await?;
            if let Err(e) = self.persist().await {
                log::warn!("Failed to cache refreshed token: {e}");
            }
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        let expires_at = self.token.obtained_at + self.token.expires_in;
        now + EXPIRY_MARGIN >= expires_at
    }

    fn token_path(username: &str) -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("kexplist/cache");
        path.push(utils::token_file_name(username));
        path
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(obtained_at: u64, expires_in: u64) -> Token {
        Token {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            scope: "playlist-modify-public".to_string(),
            expires_in,
            obtained_at,
        }
    }

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("alice.token.json");

        let now = Utc::now().timestamp() as u64;
        TokenManager::with_path(path.clone(), token(now, 3600))
            .persist()
            .await
            .unwrap();

        let loaded = TokenManager::load_from(path).await.unwrap();
        assert_eq!(loaded.current_token().access_token, "access");
        assert!(!loaded.is_expired());
    }

    #[tokio::test]
    async fn fresh_token_is_returned_without_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc::now().timestamp() as u64;
        let mut manager = TokenManager::with_path(dir.path().join("t.json"), token(now, 3600));

        let access = manager.get_valid_token(&Client::new()).await.unwrap();
        assert_eq!(access, "access");
    }

    #[test]
    fn token_inside_margin_counts_as_expired() {
        let now = Utc::now().timestamp() as u64;
        let manager = TokenManager::with_path(PathBuf::from("unused"), token(now - 3500, 3600));
        assert!(manager.is_expired());
    }

    #[tokio::test]
    async fn missing_cache_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TokenManager::load_from(dir.path().join("nope.json")).await.is_err());
    }
}
