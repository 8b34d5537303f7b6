use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;

use super::{MUSIC_PLAY, PlaylistSource, get_text};
use crate::{
    error::SyncError,
    types::{Named, PlaysResponse, Track},
    window::TimeWindow,
};

const FEED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// KEXP JSON plays feed, queried by `startTime`/`endTime`.
pub struct PlaysFeed {
    client: Client,
    url: String,
    channel: String,
}

impl PlaysFeed {
    pub fn new(client: Client, url: String, channel: String) -> Self {
        Self {
            client,
            url,
            channel,
        }
    }
}

#[async_trait]
impl PlaylistSource for PlaysFeed {
    async fn fetch(&self, window: &TimeWindow) -> Result<Vec<Track>, SyncError> {
        let start = feed_time(window.start());
        let end = feed_time(window.end());
        log::debug!("GET {} startTime={} endTime={}", self.url, start, end);

        let request = self.client.get(&self.url).query(&[
            ("startTime", start.as_str()),
            ("endTime", end.as_str()),
            ("channel", self.channel.as_str()),
        ]);
        let body = get_text(request).await?;

        parse_plays(&body)
    }
}

/// `startTime`/`endTime` query value, minute precision in UTC.
pub fn feed_time(instant: DateTime<Utc>) -> String {
    instant.format(FEED_TIME_FORMAT).to_string()
}

/// Parses a plays feed body, keeping music plays in feed order.
pub fn parse_plays(body: &str) -> Result<Vec<Track>, SyncError> {
    let response: PlaysResponse = serde_json::from_str(body)
        .map_err(|e| SyncError::SourceUnavailable(format!("malformed plays feed: {e}")))?;

    let tracks = response
        .plays
        .into_iter()
        .filter(|play| play.play_type == MUSIC_PLAY)
        .map(|play| Track {
            artist: name_of(play.artist),
            title: name_of(play.track),
            label: name_of(play.label),
            catalog_id: None,
        })
        .collect();

    Ok(tracks)
}

fn name_of(named: Option<Named>) -> Option<String> {
    named.and_then(|n| n.name)
}
