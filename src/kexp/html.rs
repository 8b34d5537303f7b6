use async_trait::async_trait;
use chrono::{DateTime, Datelike, Local, NaiveDateTime, TimeZone, Timelike, Utc};
use reqwest::Client;
use scraper::{Html, Selector};

use super::{MUSIC_PLAY, PlaylistSource, get_text};
use crate::{
    error::SyncError,
    types::{PlaylistItem, Track},
    window::{TimeWindow, hour_label},
};

/// Rendered KEXP playlist pages, one page per broadcast hour.
pub struct PlaylistPages {
    client: Client,
    base_url: String,
}

impl PlaylistPages {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PlaylistSource for PlaylistPages {
    async fn fetch(&self, window: &TimeWindow) -> Result<Vec<Track>, SyncError> {
        let mut tracks = Vec::new();
        for hour in window.local_hours() {
            let url = page_url(&self.base_url, hour);
            log::debug!("GET {url}");
            let body = get_text(self.client.get(&url)).await?;
            tracks.extend(parse_playlist_page(&body, window)?);
        }
        Ok(tracks)
    }
}

/// Page address for the hour starting at `hour`, e.g. `.../2017/1/31/6PM`.
pub fn page_url(base_url: &str, hour: DateTime<Local>) -> String {
    format!(
        "{base}/{year}/{month}/{day}/{label}",
        base = base_url.trim_end_matches('/'),
        year = hour.year(),
        month = hour.month(),
        day = hour.day(),
        label = hour_label(hour.hour())
    )
}

/// Extracts the music plays of one rendered page that aired inside `window`,
/// in page order.
///
/// Every `div.Play` must carry a JSON `data-playlistitem` attribute. Entries
/// typed as something other than a music play, or naming neither artist nor
/// title, are station breaks and are skipped. A page covers a whole hour, so
/// plays whose `AirDate` falls outside the window are dropped; entries without
/// an `AirDate` are kept.
pub fn parse_playlist_page(body: &str, window: &TimeWindow) -> Result<Vec<Track>, SyncError> {
    let document = Html::parse_document(body);
    let play_selector = Selector::parse("div.Play")
        .map_err(|e| SyncError::SourceUnavailable(format!("invalid selector: {e}")))?;

    let mut tracks = Vec::new();
    for element in document.select(&play_selector) {
        let raw = element.value().attr("data-playlistitem").ok_or_else(|| {
            SyncError::SourceUnavailable("play entry without data-playlistitem".to_string())
        })?;
        let item: PlaylistItem = serde_json::from_str(raw)
            .map_err(|e| SyncError::SourceUnavailable(format!("malformed play entry: {e}")))?;

        if item.play_type_id.is_some_and(|t| t != MUSIC_PLAY) {
            continue;
        }
        if item.artist_name.is_none() && item.track_name.is_none() {
            continue;
        }
        if let Some(aired) = item.air_date.as_deref() {
            let aired = parse_air_date(aired)?;
            if !window.contains(aired) {
                log::debug!("Skipping play aired at {aired}, outside {}", window.label());
                continue;
            }
        }

        tracks.push(Track {
            artist: item.artist_name,
            title: item.track_name,
            label: item.label_name,
            catalog_id: None,
        });
    }

    Ok(tracks)
}

/// Parses a play's `AirDate`, either with an offset or as local wall time.
pub fn parse_air_date(value: &str) -> Result<DateTime<Utc>, SyncError> {
    if let Ok(aired) = DateTime::parse_from_rfc3339(value) {
        return Ok(aired.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| SyncError::SourceUnavailable(format!("malformed AirDate '{value}'")))
}
