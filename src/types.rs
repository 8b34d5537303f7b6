use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One song KEXP played, optionally resolved to a Spotify track ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub artist: Option<String>,
    pub title: Option<String>,
    pub label: Option<String>,
    pub catalog_id: Option<String>,
}

impl Track {
    pub fn new(artist: Option<&str>, title: Option<&str>) -> Self {
        Self {
            artist: artist.map(str::to_string),
            title: title.map(str::to_string),
            ..Self::default()
        }
    }

    /// Free-text search query, or `None` when artist or title is missing.
    pub fn search_query(&self) -> Option<String> {
        match (&self.artist, &self.title) {
            (Some(artist), Some(title)) => Some(format!("{artist} {title}")),
            _ => None,
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.artist.as_deref().unwrap_or("None"),
            self.title.as_deref().unwrap_or("None")
        )
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub status: String,
    pub artist: String,
    pub title: String,
    pub label: String,
}

impl From<&Track> for TrackTableRow {
    fn from(track: &Track) -> Self {
        Self {
            status: if track.catalog_id.is_some() {
                "found".to_string()
            } else {
                "missing".to_string()
            },
            artist: track.artist.clone().unwrap_or_default(),
            title: track.title.clone().unwrap_or_default(),
            label: track.label.clone().unwrap_or_default(),
        }
    }
}

/// The Spotify playlist receiving matched tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// Body of the token endpoint for both code exchange and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: Option<u64>,
}

// KEXP plays feed

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaysResponse {
    pub plays: Vec<Play>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Play {
    #[serde(rename = "Type")]
    pub play_type: i64,
    pub artist: Option<Named>,
    pub track: Option<Named>,
    #[serde(default)]
    pub label: Option<Named>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Named {
    pub name: Option<String>,
}

/// JSON carried in the `data-playlistitem` attribute of a rendered play.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlaylistItem {
    pub artist_name: Option<String>,
    pub track_name: Option<String>,
    pub label_name: Option<String>,
    pub play_type_id: Option<i64>,
    #[serde(default)]
    pub air_date: Option<String>,
}

// Spotify Web API

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistPage {
    pub items: Vec<Playlist>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}
