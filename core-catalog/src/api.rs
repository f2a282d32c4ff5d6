//! Typed client for the catalog backend.
//!
//! Thin endpoint wrappers over the [`HttpClient`] bridge. Every response is
//! decoded into an explicit model and validated before it is allowed past
//! this boundary; transport errors and rejected payloads both surface as
//! network-class failures. Nothing here retries automatically.

use crate::error::{CatalogError, Result};
use crate::models::{
    Album, AlbumId, Artist, ArtistId, CatalogStats, NewAlbum, NewArtist, NewSong, Song, SongId,
};
use bridge_traits::{HttpClient, HttpMethod, HttpRequest, HttpResponse, UserId};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

/// Typed catalog endpoint client.
///
/// Cheap to clone; the underlying HTTP bridge is shared.
#[derive(Clone)]
pub struct CatalogApi {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl CatalogApi {
    /// Create a client rooted at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.http.execute(request).await?;
        response.error_for_status().map_err(CatalogError::from)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path, "Fetching catalog resource");
        let request = HttpRequest::new(HttpMethod::Get, self.url(path));
        let response = self.execute(request).await?;
        response
            .json::<T>()
            .map_err(|e| CatalogError::MalformedPayload(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Catalog fetches
    // ------------------------------------------------------------------

    pub async fn fetch_artists(&self) -> Result<Vec<Artist>> {
        let artists: Vec<Artist> = self.get_json("/artists").await?;
        validate_all(&artists, Artist::validate)?;
        Ok(artists)
    }

    pub async fn fetch_albums(&self) -> Result<Vec<Album>> {
        let albums: Vec<Album> = self.get_json("/albums").await?;
        validate_all(&albums, Album::validate)?;
        Ok(albums)
    }

    pub async fn fetch_album(&self, id: &AlbumId) -> Result<Album> {
        let album: Album = self.get_json(&format!("/albums/{}", id)).await?;
        album.validate().map_err(CatalogError::MalformedPayload)?;
        Ok(album)
    }

    pub async fn fetch_album_songs(&self, id: &AlbumId) -> Result<Vec<Song>> {
        let songs: Vec<Song> = self.get_json(&format!("/albums/{}/songs", id)).await?;
        validate_all(&songs, Song::validate)?;
        Ok(songs)
    }

    pub async fn fetch_songs(&self) -> Result<Vec<Song>> {
        let songs: Vec<Song> = self.get_json("/songs").await?;
        validate_all(&songs, Song::validate)?;
        Ok(songs)
    }

    pub async fn fetch_featured_songs(&self) -> Result<Vec<Song>> {
        let songs: Vec<Song> = self.get_json("/songs/featured").await?;
        validate_all(&songs, Song::validate)?;
        Ok(songs)
    }

    pub async fn fetch_made_for_you_songs(&self) -> Result<Vec<Song>> {
        let songs: Vec<Song> = self.get_json("/songs/made-for-you").await?;
        validate_all(&songs, Song::validate)?;
        Ok(songs)
    }

    pub async fn fetch_trending_songs(&self) -> Result<Vec<Song>> {
        let songs: Vec<Song> = self.get_json("/songs/trending").await?;
        validate_all(&songs, Song::validate)?;
        Ok(songs)
    }

    pub async fn fetch_stats(&self) -> Result<CatalogStats> {
        self.get_json("/stats").await
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    pub async fn fetch_favorites(&self, user: &UserId) -> Result<Vec<Song>> {
        let songs: Vec<Song> = self
            .get_json(&format!("/users/{}/favorites", user))
            .await?;
        validate_all(&songs, Song::validate)?;
        Ok(songs)
    }

    /// Mark a song as a favorite. Acknowledgment only.
    pub async fn add_favorite(&self, user: &UserId, song: &SongId) -> Result<()> {
        let request = HttpRequest::new(
            HttpMethod::Post,
            self.url(&format!("/users/{}/favorites/{}", user, song)),
        );
        self.execute(request).await?;
        Ok(())
    }

    /// Remove a song from favorites. Acknowledgment only.
    pub async fn remove_favorite(&self, user: &UserId, song: &SongId) -> Result<()> {
        let request = HttpRequest::new(
            HttpMethod::Delete,
            self.url(&format!("/users/{}/favorites/{}", user, song)),
        );
        self.execute(request).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Admin mutations
    // ------------------------------------------------------------------

    /// Create an album. The caller validates the payload first; the backend
    /// acknowledges without echoing the entity.
    pub async fn create_album(&self, album: &NewAlbum) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Post, self.url("/admin/albums"))
            .json(album)
            .map_err(CatalogError::from)?;
        self.execute(request).await?;
        Ok(())
    }

    pub async fn create_artist(&self, artist: &NewArtist) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Post, self.url("/admin/artists"))
            .json(artist)
            .map_err(CatalogError::from)?;
        self.execute(request).await?;
        Ok(())
    }

    pub async fn create_song(&self, song: &NewSong) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Post, self.url("/admin/songs"))
            .json(song)
            .map_err(CatalogError::from)?;
        self.execute(request).await?;
        Ok(())
    }

    pub async fn delete_album(&self, id: &AlbumId) -> Result<()> {
        let request =
            HttpRequest::new(HttpMethod::Delete, self.url(&format!("/admin/albums/{}", id)));
        self.execute(request).await?;
        Ok(())
    }

    pub async fn delete_artist(&self, id: &ArtistId) -> Result<()> {
        let request = HttpRequest::new(
            HttpMethod::Delete,
            self.url(&format!("/admin/artists/{}", id)),
        );
        self.execute(request).await?;
        Ok(())
    }

    pub async fn delete_song(&self, id: &SongId) -> Result<()> {
        let request =
            HttpRequest::new(HttpMethod::Delete, self.url(&format!("/admin/songs/{}", id)));
        self.execute(request).await?;
        Ok(())
    }
}

fn validate_all<T>(items: &[T], validate: impl Fn(&T) -> std::result::Result<(), String>) -> Result<()> {
    for item in items {
        validate(item).map_err(CatalogError::MalformedPayload)?;
    }
    Ok(())
}
