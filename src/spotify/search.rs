use crate::{
    error::SpotifyError,
    spotify::{SpotifyClient, ensure_success},
    types::{SearchResponse, TrackSummary},
};

impl SpotifyClient {
    /// Searches tracks.
    ///
    /// `query` is an already encoded query string such as `q=daft%20punk`
    /// (see [`crate::utils::encode_search_query`]). The track type filter is
    /// appended here. Only the first page of results is returned.
    ///
    /// Returns an empty list when the response has no `tracks` field,
    /// otherwise one [`TrackSummary`] per result in response order.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::MissingToken`] - nobody is logged in
    /// - [`SpotifyError::Api`] - the API answered with a non-success status
    /// - [`SpotifyError::Http`] - network failure or malformed body
    pub async fn search(&self, query: &str) -> Result<Vec<TrackSummary>, SpotifyError> {
        let url = format!(
            "{endpoint}?{query}&type=track",
            endpoint = self.api_endpoint("search"),
            query = query.trim_start_matches('?')
        );

        let request = self.authorized(self.http.get(&url)).await?;
        let response = ensure_success(request.send().await?).await?;
        let json = response.json::<SearchResponse>().await?;

        Ok(json
            .tracks
            .map(|page| page.items.into_iter().map(TrackSummary::from).collect())
            .unwrap_or_default())
    }
}
