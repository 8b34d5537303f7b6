use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    error::SpotifyError,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, PlaylistPage,
    },
};

/// Number of results requested per search; the first one wins.
pub const SEARCH_LIMIT: u32 = 1;

/// Page size used when listing the user's playlists.
pub const PLAYLIST_PAGE_SIZE: u32 = 50;

/// An authenticated Spotify session for one user.
///
/// The catalog client only talks to Spotify through this trait, so tests can
/// hand it a fake session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotifySession: Send + Sync {
    /// Raw `/search` response for a track query.
    async fn search_tracks(&self, query: &str) -> Result<Value, SpotifyError>;

    /// One page of the user's playlists; `next` is the URL of the page to
    /// fetch, `None` for the first page.
    async fn playlists_page(&self, next: Option<String>) -> Result<PlaylistPage, SpotifyError>;

    async fn create_playlist(
        &self,
        request: CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, SpotifyError>;

    async fn add_items(
        &self,
        playlist_id: &str,
        uris: Vec<String>,
    ) -> Result<AddTrackToPlaylistResponse, SpotifyError>;
}

/// [`SpotifySession`] backed by the Spotify Web API.
pub struct HttpSession {
    client: Client,
    api_url: String,
    user_id: String,
    access_token: String,
}

impl HttpSession {
    pub fn new(client: Client, api_url: String, user_id: String, access_token: String) -> Self {
        Self {
            client,
            api_url,
            user_id,
            access_token,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SpotifyError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| SpotifyError::Malformed(format!("bad API url {}: {e}", self.api_url)))?;
        url.path_segments_mut()
            .map_err(|_| SpotifyError::Malformed(format!("bad API url {}", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, SpotifyError> {
        let response = request.bearer_auth(&self.access_token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SpotifyError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SpotifyError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl SpotifySession for HttpSession {
    async fn search_tracks(&self, query: &str) -> Result<Value, SpotifyError> {
        let url = self.endpoint(&["search"])?;
        log::debug!("GET {url} q={query}");
        let limit = SEARCH_LIMIT.to_string();
        let request = self
            .client
            .get(url)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())]);
        self.send_json(request).await
    }

    async fn playlists_page(&self, next: Option<String>) -> Result<PlaylistPage, SpotifyError> {
        let request = match next {
            Some(next) => {
                log::debug!("GET {next}");
                self.client.get(next)
            }
            None => {
                let url = self.endpoint(&["users", self.user_id.as_str(), "playlists"])?;
                log::debug!("GET {url}");
                self.client
                    .get(url)
                    .query(&[("limit", PLAYLIST_PAGE_SIZE.to_string())])
            }
        };
        self.send_json(request).await
    }

    async fn create_playlist(
        &self,
        request: CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, SpotifyError> {
        let url = self.endpoint(&["users", self.user_id.as_str(), "playlists"])?;
        log::debug!("POST {url} name={}", request.name);
        self.send_json(self.client.post(url).json(&request)).await
    }

    async fn add_items(
        &self,
        playlist_id: &str,
        uris: Vec<String>,
    ) -> Result<AddTrackToPlaylistResponse, SpotifyError> {
        let url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        log::debug!("POST {url} ({} uris)", uris.len());
        let body = AddTrackToPlaylistRequest { uris };
        self.send_json(self.client.post(url).json(&body)).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{
        Json, Router,
        extract::Query,
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::get,
    };
    use serde_json::json;

    use super::*;

    fn session(api_url: &str, token: &str) -> HttpSession {
        HttpSession::new(
            Client::new(),
            api_url.to_string(),
            "listener".to_string(),
            token.to_string(),
        )
    }

    async fn playlists(
        Query(params): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> Response {
        let authorized = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "Bearer token");
        if !authorized {
            return (StatusCode::UNAUTHORIZED, "bad token").into_response();
        }

        let limit = params.get("limit").cloned().unwrap_or_default();
        Json(json!({
            "items": [ { "id": "p1", "name": format!("limit={limit}") } ],
            "next": null
        }))
        .into_response()
    }

    async fn serve() -> String {
        let app = Router::new()
            .route(
                "/v1/search",
                get(|| async { (StatusCode::TOO_MANY_REQUESTS, "rate limited") }),
            )
            .route("/v1/users/listener/playlists", get(playlists));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/v1")
    }

    #[test]
    fn endpoint_appends_segments_to_api_path() {
        for base in ["https://api.spotify.com/v1", "https://api.spotify.com/v1/"] {
            let url = session(base, "t")
                .endpoint(&["users", "listener", "playlists"])
                .unwrap();
            assert_eq!(url.as_str(), "https://api.spotify.com/v1/users/listener/playlists");
        }
    }

    #[test]
    fn endpoint_escapes_segment_content() {
        let url = session("https://api.spotify.com/v1", "t")
            .endpoint(&["users", "a b/c", "playlists"])
            .unwrap();
        assert_eq!(url.as_str(), "https://api.spotify.com/v1/users/a%20b%2Fc/playlists");
    }

    #[test]
    fn endpoint_rejects_unusable_api_url() {
        for base in ["not a url", "mailto:someone@example.com"] {
            assert!(matches!(
                session(base, "t").endpoint(&["search"]),
                Err(SpotifyError::Malformed(_))
            ));
        }
    }

    #[tokio::test]
    async fn non_success_status_keeps_code_and_body() {
        let api_url = serve().await;

        match session(&api_url, "token").search_tracks("Artist Song").await {
            Err(SpotifyError::Status { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "rate limited");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn playlists_page_sends_bearer_token_and_page_size() {
        let api_url = serve().await;

        let page = session(&api_url, "token").playlists_page(None).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, format!("limit={PLAYLIST_PAGE_SIZE}"));
        assert!(page.next.is_none());

        let rejected = session(&api_url, "stale").playlists_page(None).await;
        assert!(matches!(
            rejected,
            Err(SpotifyError::Status { status: 401, .. })
        ));
    }
}
