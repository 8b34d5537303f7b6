use chrono::Utc;
use reqwest::Client;
use tabled::Table;

use crate::{
    fatal, info, kexp,
    spotify::SpotifyConnector,
    success,
    sync::{SyncOutcome, SyncRequest, Synchronizer},
    types::TrackTableRow,
    warning,
};

const KEXP_CACHE_INFO_URL: &str = "http://cache.kexp.org/cache/info";

pub async fn sync(request: SyncRequest) {
    let client = Client::new();

    let source = match kexp::from_config(client.clone()) {
        Ok(source) => source,
        Err(e) => fatal!(e.exit_code(), "{}", e),
    };
    let connector = SpotifyConnector::new(client);

    let outcome = match Synchronizer::new(source.as_ref(), &connector)
        .run(&request, Utc::now())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => fatal!(e.exit_code(), "{}", e),
    };

    match outcome {
        SyncOutcome::NoTracks { window } => {
            warning!("No tracks found for: {}", window.label());
            info!(
                "Perhaps the KEXP cache is stale? See {}",
                KEXP_CACHE_INFO_URL
            );
        }
        SyncOutcome::Synced(report) => {
            let rows: Vec<TrackTableRow> = report.tracks.iter().map(TrackTableRow::from).collect();
            println!("{}", Table::new(rows));

            success!(
                "Added {} of {} tracks to {} playlist \"{}\"",
                report.added,
                report.tracks.len(),
                if report.created { "new" } else { "existing" },
                report.playlist.name
            );
        }
    }
}
