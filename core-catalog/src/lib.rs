//! # Core Catalog
//!
//! Domain models, the typed backend client, and the reactive
//! [`CatalogCache`] store.
//!
//! ## Architecture
//!
//! ```text
//! UI action ──> CatalogCache ──> CatalogApi ──> HttpClient (bridge)
//!                   │
//!                   └──> EventBus (CatalogEvent) ──> subscribed UI
//! ```
//!
//! The cache is the single source of truth for every catalog-backed view
//! (album page, admin tables, home grid). Concurrent identical fetches are
//! de-duplicated; failed fetches keep stale data available; admin mutations
//! invalidate and re-fetch the collections whose derived counts they touch.

pub mod api;
pub mod cache;
pub mod error;
pub mod models;

pub use api::CatalogApi;
pub use cache::{CatalogCache, FetchKey};
pub use error::{CatalogError, Result};
pub use models::{
    Album, AlbumId, Artist, ArtistId, ArtistRef, CatalogStats, MediaUpload, NewAlbum, NewArtist,
    NewSong, Song, SongId,
};
