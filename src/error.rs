use thiserror::Error;

/// Fatal outcomes of a synchronization run.
///
/// Each variant maps to a process exit code through [`SyncError::exit_code`].
/// A window without tracks is not an error and has no variant here.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The start timestamp or the number of hours could not form a window.
    #[error("Invalid time window: {0}")]
    InvalidWindow(String),

    /// The playlist source could not be reached or returned unreadable data.
    #[error("KEXP playlist unavailable: {0}")]
    SourceUnavailable(String),

    /// No usable Spotify access token could be obtained for the user.
    #[error("Spotify authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Looking up or creating the destination playlist failed.
    #[error("Failed to resolve playlist '{name}': {source}")]
    PlaylistResolutionFailed {
        name: String,
        #[source]
        source: SpotifyError,
    },

    /// Spotify rejected the track append.
    #[error("Failed to add tracks to playlist {playlist_id}: {source}")]
    AppendFailed {
        playlist_id: String,
        #[source]
        source: SpotifyError,
    },

    /// A flag the run cannot do without was not given.
    #[error("{0} is required")]
    MissingArgument(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SyncError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::InvalidWindow(_)
            | SyncError::AuthenticationFailed(_)
            | SyncError::MissingArgument(_)
            | SyncError::Config(_) => 1,
            SyncError::SourceUnavailable(_) => 2,
            SyncError::PlaylistResolutionFailed { .. } => 3,
            SyncError::AppendFailed { .. } => 4,
        }
    }
}

/// Errors raised by a [`SpotifySession`](crate::spotify::SpotifySession) call.
#[derive(Error, Debug)]
pub enum SpotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Spotify returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body did not have the shape we expect.
    #[error("Unexpected response: {0}")]
    Malformed(String),
}

/// Why a track search produced no identifier other than "no results".
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(#[source] SpotifyError),

    #[error("malformed search response: {0}")]
    Malformed(String),
}
