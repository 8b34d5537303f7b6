//! # Spotify Integration Module
//!
//! Everything kexplist does against Spotify, scoped to one authenticated user.
//!
//! ## Layers
//!
//! ```text
//! Synchronizer
//!      ↓
//! CatalogClient   (track lookup, playlist resolution, track append)
//!      ↓
//! SpotifySession  (one authenticated user, raw Web API calls)
//!      ↓
//! Spotify Web API
//! ```
//!
//! [`CatalogConnector`] turns a username into a ready [`CatalogClient`]:
//! [`SpotifyConnector`] authenticates through [`auth`] (cached token, refresh,
//! or the interactive PKCE flow) and wraps an [`HttpSession`] in a
//! [`SpotifyCatalog`].
//!
//! ## Matching Policy
//!
//! - Track lookup sends `"<artist> <title>"` and takes the first result.
//! - Playlist lookup returns the first playlist whose name matches exactly,
//!   scanning every page of the user's playlists on each run.
//!
//! Neither is cached and neither ranks candidates.
//!
//! ## API Coverage
//!
//! - `GET /search` - track search
//! - `GET /users/{user_id}/playlists` - the user's playlists, paginated by `next`
//! - `POST /users/{user_id}/playlists` - create a public playlist
//! - `POST /playlists/{playlist_id}/tracks` - append track URIs, 100 per request
//! - `POST /api/token` - code exchange and token refresh

pub mod auth;
pub mod playlist;
pub mod search;
mod session;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config,
    error::{SearchError, SyncError},
    types::Track,
};

#[cfg(test)]
pub use session::MockSpotifySession;
pub use session::{HttpSession, PLAYLIST_PAGE_SIZE, SEARCH_LIMIT, SpotifySession};

/// Catalog operations the synchronizer needs.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn find_track_id(&self, track: &Track) -> Result<Option<String>, SearchError>;

    async fn find_playlist_by_name(&self, name: &str) -> Result<Option<String>, SyncError>;

    async fn create_playlist(&self, name: &str) -> Result<String, SyncError>;

    /// Appends matched tracks; returns how many were sent.
    async fn add_tracks(&self, playlist_id: &str, tracks: &[Track]) -> Result<usize, SyncError>;
}

/// Produces an authenticated [`CatalogClient`] for a user.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogConnector: Send + Sync {
    async fn connect(&self, username: &str) -> Result<Box<dyn CatalogClient>, SyncError>;
}

/// [`CatalogClient`] over any [`SpotifySession`].
pub struct SpotifyCatalog<S> {
    session: S,
}

impl<S: SpotifySession> SpotifyCatalog<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

#[async_trait]
impl<S: SpotifySession> CatalogClient for SpotifyCatalog<S> {
    async fn find_track_id(&self, track: &Track) -> Result<Option<String>, SearchError> {
        search::find_track_id(&self.session, track).await
    }

    async fn find_playlist_by_name(&self, name: &str) -> Result<Option<String>, SyncError> {
        playlist::find_by_name(&self.session, name)
            .await
            .map_err(|source| SyncError::PlaylistResolutionFailed {
                name: name.to_string(),
                source,
            })
    }

    async fn create_playlist(&self, name: &str) -> Result<String, SyncError> {
        playlist::create(&self.session, name)
            .await
            .map_err(|source| SyncError::PlaylistResolutionFailed {
                name: name.to_string(),
                source,
            })
    }

    async fn add_tracks(&self, playlist_id: &str, tracks: &[Track]) -> Result<usize, SyncError> {
        playlist::add_tracks(&self.session, playlist_id, tracks)
            .await
            .map_err(|source| SyncError::AppendFailed {
                playlist_id: playlist_id.to_string(),
                source,
            })
    }
}

/// Connects to the Spotify Web API configured in the environment.
pub struct SpotifyConnector {
    client: Client,
}

impl SpotifyConnector {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogConnector for SpotifyConnector {
    async fn connect(&self, username: &str) -> Result<Box<dyn CatalogClient>, SyncError> {
        let token = auth::authenticate(&self.client, username).await?;
        let session = HttpSession::new(
            self.client.clone(),
            config::spotify_apiurl(),
            username.to_string(),
            token.access_token,
        );
        Ok(Box::new(SpotifyCatalog::new(session)))
    }
}
