//! Domain models for the music catalog
//!
//! This module contains the entities fetched from the backend plus the
//! admin-side creation payloads. Every entity validates itself; the API
//! boundary rejects payloads that fail validation instead of letting
//! malformed shapes reach the cache.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a song, assigned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub String);

impl SongId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an album, assigned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(pub String);

impl AlbumId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an artist, assigned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub String);

impl ArtistId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// Embedded artist reference carried by songs and albums
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(rename = "_id")]
    pub id: ArtistId,
    pub name: String,
}

/// A single song. Immutable once fetched; identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    #[serde(rename = "_id")]
    pub id: SongId,
    /// Song title
    pub title: String,
    /// Artist the song belongs to
    pub artist: ArtistRef,
    /// Cover image URL
    pub image_url: String,
    /// Streamable source URL handed to the audio output
    pub audio_url: String,
    /// Duration in seconds
    #[serde(rename = "duration")]
    pub duration_secs: u32,
    /// Containing album, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<AlbumId>,
}

impl Song {
    /// Validate song data
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Song title cannot be empty".to_string());
        }

        if self.duration_secs == 0 {
            return Err("Song duration must be positive".to_string());
        }

        if self.audio_url.trim().is_empty() {
            return Err("Song audio URL cannot be empty".to_string());
        }

        Ok(())
    }
}

/// An album with its ordered song list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    #[serde(rename = "_id")]
    pub id: AlbumId,
    /// Album title
    pub title: String,
    /// Album artist
    pub artist: ArtistRef,
    /// Cover image URL
    pub image_url: String,
    /// Release year; never later than the current calendar year
    pub release_year: i32,
    /// Ordered songs on this album
    #[serde(default)]
    pub songs: Vec<Song>,
}

impl Album {
    /// Validate album data, including nested songs
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Album title cannot be empty".to_string());
        }

        let year = current_year();
        if self.release_year > year {
            return Err(format!(
                "Album release year {} is in the future",
                self.release_year
            ));
        }
        if self.release_year < 1900 {
            return Err(format!(
                "Album release year {} is out of valid range",
                self.release_year
            ));
        }

        for song in &self.songs {
            song.validate()?;
        }

        Ok(())
    }
}

/// An artist with the ids of its albums and songs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    #[serde(rename = "_id")]
    pub id: ArtistId,
    /// Artist name
    pub name: String,
    /// Portrait image URL
    pub image_url: String,
    /// Albums attributed to this artist
    #[serde(default, rename = "albums")]
    pub album_ids: HashSet<AlbumId>,
    /// Songs attributed to this artist
    #[serde(default, rename = "songs")]
    pub song_ids: HashSet<SongId>,
}

impl Artist {
    /// Validate artist data
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Artist name cannot be empty".to_string());
        }

        Ok(())
    }
}

/// Aggregate catalog counters for the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_songs: u64,
    pub total_albums: u64,
    pub total_artists: u64,
    pub total_users: u64,
}

// =============================================================================
// Admin Creation Payloads
// =============================================================================

/// Uploaded media file embedded into a JSON mutation payload.
///
/// The raw bytes travel base64-encoded; the backend acknowledges the
/// mutation without echoing them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl MediaUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the MIME type starts with the given prefix (e.g. `image/`).
    pub fn has_content_type(&self, prefix: &str) -> bool {
        self.content_type.starts_with(prefix)
    }
}

/// Payload for `POST /admin/albums`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlbum {
    pub title: String,
    pub artist_id: ArtistId,
    pub release_year: i32,
    pub image: MediaUpload,
}

impl NewAlbum {
    /// Validate caller input before any network call
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Album title cannot be empty".to_string());
        }

        if self.release_year > current_year() {
            return Err("Release year cannot be in the future".to_string());
        }
        if self.release_year < 1900 {
            return Err(format!(
                "Release year {} is out of valid range",
                self.release_year
            ));
        }

        if self.image.is_empty() {
            return Err("Album artwork image is required".to_string());
        }
        if !self.image.has_content_type("image/") {
            return Err("Album artwork must be an image file".to_string());
        }

        Ok(())
    }
}

/// Payload for `POST /admin/artists`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtist {
    pub name: String,
    pub image: MediaUpload,
}

impl NewArtist {
    /// Validate caller input before any network call
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Artist name cannot be empty".to_string());
        }

        if self.image.is_empty() {
            return Err("Artist image is required".to_string());
        }
        if !self.image.has_content_type("image/") {
            return Err("Artist image must be an image file".to_string());
        }

        Ok(())
    }
}

/// Payload for `POST /admin/songs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    pub title: String,
    pub artist_id: ArtistId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_id: Option<AlbumId>,
    pub duration_secs: u32,
    pub audio: MediaUpload,
    pub image: MediaUpload,
}

impl NewSong {
    /// Validate caller input before any network call
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Song title cannot be empty".to_string());
        }

        if self.duration_secs == 0 {
            return Err("Song duration must be positive".to_string());
        }

        if self.audio.is_empty() {
            return Err("Song audio file is required".to_string());
        }
        if !self.audio.has_content_type("audio/") {
            return Err("Song audio must be an audio file".to_string());
        }

        if self.image.is_empty() {
            return Err("Song image is required".to_string());
        }
        if !self.image.has_content_type("image/") {
            return Err("Song image must be an image file".to_string());
        }

        Ok(())
    }
}

/// Current calendar year used for release-year bounds
pub(crate) fn current_year() -> i32 {
    chrono::Utc::now().year()
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
