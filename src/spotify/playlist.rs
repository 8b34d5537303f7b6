use super::SpotifySession;
use crate::{
    error::SpotifyError,
    types::{CreatePlaylistRequest, Track},
    utils,
};

/// Spotify accepts at most this many URIs per add request.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

const PLAYLIST_DESCRIPTION: &str = "Songs played on KEXP";

/// ID of the first of the user's playlists named exactly `name`.
///
/// Walks every page until a match is found or the listing is exhausted.
pub async fn find_by_name<S: SpotifySession + ?Sized>(
    session: &S,
    name: &str,
) -> Result<Option<String>, SpotifyError> {
    let mut next: Option<String> = None;
    let mut page_number = 1;

    loop {
        let page = session.playlists_page(next.take()).await?;
        log::debug!(
            "Scanning playlist page {} ({} playlists)",
            page_number,
            page.items.len()
        );

        if let Some(playlist) = page.items.iter().find(|p| p.name == name) {
            return Ok(Some(playlist.id.clone()));
        }

        match page.next {
            Some(url) => {
                next = Some(url);
                page_number += 1;
            }
            None => return Ok(None),
        }
    }
}

/// Creates a public playlist owned by the user and returns its ID.
///
/// Does not check for an existing playlist with the same name.
pub async fn create<S: SpotifySession + ?Sized>(
    session: &S,
    name: &str,
) -> Result<String, SpotifyError> {
    let request = CreatePlaylistRequest {
        name: name.to_string(),
        description: PLAYLIST_DESCRIPTION.to_string(),
        public: true,
        collaborative: false,
    };

    let response = session.create_playlist(request).await?;
    if response.id.is_empty() {
        return Err(SpotifyError::Malformed(
            "created playlist has an empty id".to_string(),
        ));
    }
    Ok(response.id)
}

/// Appends the matched tracks to the playlist, keeping their order.
///
/// Tracks without a catalog ID are dropped. Nothing is sent when no track
/// matched. Returns the number of tracks appended.
pub async fn add_tracks<S: SpotifySession + ?Sized>(
    session: &S,
    playlist_id: &str,
    tracks: &[Track],
) -> Result<usize, SpotifyError> {
    let ids = utils::matched_ids(tracks);
    if ids.is_empty() {
        log::debug!("No matched tracks to add to {playlist_id}");
        return Ok(0);
    }

    for chunk in ids.chunks(MAX_TRACKS_PER_REQUEST) {
        let uris = chunk.iter().map(|id| utils::track_uri(id)).collect();
        let response = session.add_items(playlist_id, uris).await?;
        log::debug!("Playlist {} now at snapshot {}", playlist_id, response.snapshot_id);
    }

    Ok(ids.len())
}
