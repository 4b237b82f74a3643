use crate::{
    error::SpotifyError,
    spotify::{SpotifyClient, ensure_success},
    types::{
        AddTracksRequest, AddTracksResponse, CreatePlaylistRequest, CreatePlaylistResponse,
        UserProfile,
    },
};

/// Most track uris the API accepts in one add request.
pub const MAX_TRACKS_PER_REQUEST: usize = 100;

impl SpotifyClient {
    /// Creates a playlist for the current user and fills it with `uris`.
    ///
    /// Nothing is sent when `name` is blank or `uris` is empty; the call
    /// returns `Ok(None)` then.
    ///
    /// The user id is looked up first, then the playlist is created, then the
    /// tracks are added. The steps are not transactional: when adding fails
    /// after the playlist exists, the error is
    /// [`SpotifyError::TracksNotAdded`] with the id of the playlist that was
    /// left behind.
    pub async fn save_playlist(
        &self,
        name: &str,
        uris: &[String],
    ) -> Result<Option<CreatePlaylistResponse>, SpotifyError> {
        if name.trim().is_empty() || uris.is_empty() {
            return Ok(None);
        }

        let user_id = self.current_user_id().await?;
        let playlist = self.create_playlist(&user_id, name).await?;

        if let Err(e) = self.add_tracks(&playlist.id, uris).await {
            return Err(SpotifyError::TracksNotAdded {
                playlist_id: playlist.id,
                source: Box::new(e),
            });
        }

        Ok(Some(playlist))
    }

    pub async fn current_user_id(&self) -> Result<String, SpotifyError> {
        let request = self.authorized(self.http.get(self.api_endpoint("me"))).await?;
        let response = ensure_success(request.send().await?).await?;
        let profile = response.json::<UserProfile>().await?;
        Ok(profile.id)
    }

    pub async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<CreatePlaylistResponse, SpotifyError> {
        let url = self.api_endpoint(&format!("users/{user_id}/playlists"));
        let body = CreatePlaylistRequest {
            name: name.to_string(),
        };

        let request = self.authorized(self.http.post(url).json(&body)).await?;
        let response = ensure_success(request.send().await?).await?;
        Ok(response.json::<CreatePlaylistResponse>().await?)
    }

    /// Adds `uris` in order, at most [`MAX_TRACKS_PER_REQUEST`] per request.
    /// Returns the snapshot id of the last request.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<Option<String>, SpotifyError> {
        let url = self.api_endpoint(&format!("playlists/{playlist_id}/tracks"));
        let mut snapshot_id = None;

        for chunk in uris.chunks(MAX_TRACKS_PER_REQUEST) {
            let body = AddTracksRequest {
                uris: chunk.to_vec(),
            };
            let request = self.authorized(self.http.post(&url).json(&body)).await?;
            let response = ensure_success(request.send().await?).await?;
            snapshot_id = Some(response.json::<AddTracksResponse>().await?.snapshot_id);
        }

        Ok(snapshot_id)
    }
}
