//! # KEXP Playlist Source
//!
//! Retrieves the songs KEXP broadcast during a [`TimeWindow`]. Two variants
//! implement the same [`PlaylistSource`] capability and exactly one is chosen
//! per deployment through `KEXP_SOURCE`:
//!
//! - [`PlaysFeed`] reads the JSON plays feed with a single request per window.
//! - [`PlaylistPages`] scrapes the rendered playlist pages, one per hour.
//!
//! Both drop station breaks and other non-music entries, keep broadcast order,
//! and report transport or parse failures as
//! [`SyncError::SourceUnavailable`]. An empty result is not an error.

mod html;
mod plays;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::{self, SourceKind},
    error::SyncError,
    types::Track,
    window::TimeWindow,
};

pub use html::{PlaylistPages, page_url, parse_air_date, parse_playlist_page};
pub use plays::{PlaysFeed, feed_time, parse_plays};

/// Type code KEXP uses for a music play.
pub const MUSIC_PLAY: i64 = 1;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistSource: Send + Sync {
    /// Music plays broadcast during `window`, in broadcast order.
    async fn fetch(&self, window: &TimeWindow) -> Result<Vec<Track>, SyncError>;
}

/// Builds the source variant selected by the configuration.
pub fn from_config(client: Client) -> Result<Box<dyn PlaylistSource>, SyncError> {
    let source: Box<dyn PlaylistSource> = match config::kexp_source()? {
        SourceKind::Plays => Box::new(PlaysFeed::new(
            client,
            config::kexp_plays_url(),
            config::kexp_channel(),
        )),
        SourceKind::Html => Box::new(PlaylistPages::new(client, config::kexp_playlist_url())),
    };
    Ok(source)
}

async fn get_text(request: reqwest::RequestBuilder) -> Result<String, SyncError> {
    let response = request
        .send()
        .await
        .map_err(|e| SyncError::SourceUnavailable(e.to_string()))?
        .error_for_status()
        .map_err(|e| SyncError::SourceUnavailable(e.to_string()))?;

    response
        .text()
        .await
        .map_err(|e| SyncError::SourceUnavailable(e.to_string()))
}
