use serde_json::Value;

use super::SpotifySession;
use crate::{error::SearchError, types::Track};

/// Looks up the Spotify ID of `track`. The first search result wins.
///
/// Returns `Ok(None)` without calling Spotify when artist or title is
/// missing, and `Ok(None)` when the search has no results. A failed request
/// and a response of unexpected shape are reported separately so the caller
/// can tell them apart from a plain miss.
pub async fn find_track_id<S: SpotifySession + ?Sized>(
    session: &S,
    track: &Track,
) -> Result<Option<String>, SearchError> {
    let Some(query) = track.search_query() else {
        return Ok(None);
    };

    let result = session
        .search_tracks(&query)
        .await
        .map_err(SearchError::Request)?;

    first_track_id(&result)
}

/// Reads `tracks.items[0].id` from a search response.
pub fn first_track_id(result: &Value) -> Result<Option<String>, SearchError> {
    let items = result
        .get("tracks")
        .and_then(|tracks| tracks.get("items"))
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Malformed("response has no tracks.items".to_string()))?;

    let Some(first) = items.first() else {
        return Ok(None);
    };

    first
        .get("id")
        .and_then(Value::as_str)
        .map(|id| Some(id.to_string()))
        .ok_or_else(|| SearchError::Malformed("first result has no id".to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{error::SpotifyError, spotify::MockSpotifySession};

    #[tokio::test]
    async fn missing_title_never_searches() {
        let mut session = MockSpotifySession::new();
        session.expect_search_tracks().times(0);

        let track = Track::new(Some("Artist A"), None);
        let id = find_track_id(&session, &track).await.unwrap();
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn missing_artist_never_searches() {
        let mut session = MockSpotifySession::new();
        session.expect_search_tracks().times(0);

        let track = Track::new(None, Some("Song 2"));
        assert_eq!(find_track_id(&session, &track).await.unwrap(), None);
    }

    #[tokio::test]
    async fn first_result_wins() {
        let mut session = MockSpotifySession::new();
        session
            .expect_search_tracks()
            .withf(|q| q == "Artist A Song 1")
            .times(1)
            .returning(|_| {
                Ok(json!({
                    "tracks": { "items": [ { "id": "spot123" }, { "id": "spot456" } ] }
                }))
            });

        let track = Track::new(Some("Artist A"), Some("Song 1"));
        let id = find_track_id(&session, &track).await.unwrap();
        assert_eq!(id.as_deref(), Some("spot123"));
    }

    #[tokio::test]
    async fn request_failure_is_classified() {
        let mut session = MockSpotifySession::new();
        session.expect_search_tracks().returning(|_| {
            Err(SpotifyError::Status {
                status: 429,
                message: "Too Many Requests".to_string(),
            })
        });

        let track = Track::new(Some("Artist A"), Some("Song 1"));
        let err = find_track_id(&session, &track).await.unwrap_err();
        assert!(matches!(err, SearchError::Request(_)));
    }

    #[test]
    fn empty_items_is_a_miss() {
        let result = json!({ "tracks": { "items": [] } });
        assert_eq!(first_track_id(&result).unwrap(), None);
    }

    #[test]
    fn unexpected_shape_is_malformed() {
        let result = json!({ "albums": { "items": [] } });
        assert!(matches!(
            first_track_id(&result),
            Err(SearchError::Malformed(_))
        ));

        let result = json!({ "tracks": { "items": [ null ] } });
        assert!(matches!(
            first_track_id(&result),
            Err(SearchError::Malformed(_))
        ));
    }
}
