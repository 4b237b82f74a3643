use crate::{cli::build_client, error, error::SpotifyError, info, success, warning};

pub async fn playlist(name: String, uris: Vec<String>) {
    let client = build_client();

    info!("Create playlist {} with {} tracks", name, uris.len());

    match client.save_playlist(&name, &uris).await {
        Ok(Some(playlist)) => success!("Playlist {} created ({}).", playlist.name, playlist.id),
        Ok(None) => warning!("Nothing to save: a playlist needs a name and at least one track."),
        Err(SpotifyError::TracksNotAdded {
            playlist_id,
            source,
        }) => error!(
            "Playlist {} was created but is missing its tracks: {}",
            playlist_id,
            source
        ),
        Err(e) => error!("Failed to create playlist: {}", e),
    }
}
