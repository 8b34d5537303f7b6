//! Synchronization of a KEXP time window into a Spotify playlist.
//!
//! A run moves through
//! `ComputeWindow → FetchSource → Authenticate → MatchTracks →
//! ResolveDestinationPlaylist → AppendTracks`, strictly one call at a time.
//! An empty window ends the run successfully right after `FetchSource`,
//! before any Spotify call. Every other failure except a per-track search
//! miss aborts the run.

use chrono::{DateTime, Utc};

use crate::{
    error::SyncError,
    info,
    kexp::PlaylistSource,
    spotify::{CatalogClient, CatalogConnector},
    success,
    types::{PlaylistRef, Track},
    utils, warning,
    window::{self, TimeWindow},
};

/// CLI-level inputs of one run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub username: String,
    /// Window start as `mm/dd/yyyyThh` in local time; now when absent.
    pub mdyh: Option<String>,
    pub hours: String,
    pub playlist: String,
    pub always_create_new_playlist: bool,
}

impl SyncRequest {
    /// Builds a request from parsed flags, requiring a username and a playlist.
    pub fn new(
        username: Option<String>,
        mdyh: Option<String>,
        hours: String,
        playlist: Option<String>,
        always_create_new_playlist: bool,
    ) -> Result<Self, SyncError> {
        let username = username.ok_or(SyncError::MissingArgument("--username"))?;
        let playlist = playlist.ok_or(SyncError::MissingArgument("--playlist"))?;
        Ok(Self {
            username,
            mdyh,
            hours,
            playlist,
            always_create_new_playlist,
        })
    }
}

#[derive(Debug)]
pub enum SyncOutcome {
    /// The source had nothing for the window; Spotify was never contacted.
    NoTracks { window: TimeWindow },
    Synced(SyncReport),
}

#[derive(Debug)]
pub struct SyncReport {
    pub window: TimeWindow,
    /// Every fetched track, with `catalog_id` set for the matches.
    pub tracks: Vec<Track>,
    pub playlist: PlaylistRef,
    pub created: bool,
    pub added: usize,
}

impl SyncReport {
    pub fn matched(&self) -> usize {
        self.tracks.iter().filter(|t| t.catalog_id.is_some()).count()
    }
}

pub struct Synchronizer<'a> {
    source: &'a dyn PlaylistSource,
    connector: &'a dyn CatalogConnector,
}

impl<'a> Synchronizer<'a> {
    pub fn new(source: &'a dyn PlaylistSource, connector: &'a dyn CatalogConnector) -> Self {
        Self { source, connector }
    }

    pub async fn run(
        &self,
        request: &SyncRequest,
        now: DateTime<Utc>,
    ) -> Result<SyncOutcome, SyncError> {
        let window = window::compute_window(request.mdyh.as_deref(), &request.hours, now)?;

        info!("FETCHING KEXP PLAYLIST FOR {}", window.label());
        let pb = utils::spinner("Fetching KEXP plays...");
        let fetched = self.source.fetch(&window).await;
        pb.finish_and_clear();
        let mut tracks = fetched?;

        if tracks.is_empty() {
            return Ok(SyncOutcome::NoTracks { window });
        }
        success!("Fetched {} tracks", tracks.len());

        let catalog = self.connector.connect(&request.username).await?;

        info!("MATCHING TRACKS AGAINST SPOTIFY");
        match_tracks(catalog.as_ref(), &mut tracks).await;

        let (playlist, created) = resolve_playlist(
            catalog.as_ref(),
            &request.playlist,
            request.always_create_new_playlist,
        )
        .await?;

        info!("ADDING FOUND TRACKS TO PLAYLIST: \"{}\"", playlist.name);
        let added = catalog.add_tracks(&playlist.id, &tracks).await?;

        Ok(SyncOutcome::Synced(SyncReport {
            window,
            tracks,
            playlist,
            created,
            added,
        }))
    }
}

/// Resolves every track to a catalog ID, in order, one search at a time.
///
/// Search failures count as misses and are reported on the MISSING line.
pub async fn match_tracks(catalog: &dyn CatalogClient, tracks: &mut [Track]) {
    for track in tracks.iter_mut() {
        match catalog.find_track_id(track).await {
            Ok(Some(id)) => {
                success!("FOUND:   {}", track);
                track.catalog_id = Some(id);
            }
            Ok(None) => warning!("MISSING: {}", track),
            Err(e) => warning!("MISSING: {} (search failed: {})", track, e),
        }
    }
}

/// Finds the destination playlist by name, creating it when absent or when
/// `always_create` is set. Returns the playlist and whether it was created.
pub async fn resolve_playlist(
    catalog: &dyn CatalogClient,
    name: &str,
    always_create: bool,
) -> Result<(PlaylistRef, bool), SyncError> {
    if !always_create {
        info!("SEARCHING FOR PLAYLIST: \"{}\"", name);
        let pb = utils::spinner("Scanning your playlists...");
        let found = catalog.find_playlist_by_name(name).await;
        pb.finish_and_clear();

        if let Some(id) = found? {
            success!("Found playlist \"{}\"", name);
            return Ok((
                PlaylistRef {
                    id,
                    name: name.to_string(),
                },
                false,
            ));
        }
    }

    info!("CREATING PLAYLIST: \"{}\"", name);
    let id = catalog.create_playlist(name).await?;
    Ok((
        PlaylistRef {
            id,
            name: name.to_string(),
        },
        true,
    ))
}
