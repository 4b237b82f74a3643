use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::build_client,
    error, info,
    types::{TrackSummary, TrackTableRow},
    utils,
};

pub async fn search(terms: Vec<String>, raw: bool) {
    let query = if raw {
        terms.join("&")
    } else {
        utils::encode_search_query(&terms.join(" "))
    };

    let client = build_client();

    let pb = ProgressBar::new_spinner();
    pb.set_message("Searching tracks...");
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let result = client.search(&query).await;
    pb.finish_and_clear();

    let tracks: Vec<TrackSummary> = match result {
        Ok(tracks) => tracks,
        Err(e) => error!("Search failed: {}", e),
    };

    if tracks.is_empty() {
        info!("No tracks found.");
        return;
    }

    let rows: Vec<TrackTableRow> = tracks.into_iter().map(TrackTableRow::from).collect();
    println!("{}", Table::new(rows));
}
