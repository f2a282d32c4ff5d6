//! Reactive catalog cache.
//!
//! Holds every fetched catalog collection, de-duplicates concurrent
//! identical fetches by sharing a single in-flight future per
//! resource+argument, keeps stale data available when a fetch fails, and
//! broadcasts a [`CatalogEvent`] on every observable change.
//!
//! Admin mutations go straight to the backend; on acknowledgment the
//! affected entity is removed or the collection re-fetched so dependent
//! counts stay consistent.

use crate::api::CatalogApi;
use crate::error::{CatalogError, Result};
use crate::models::{
    Album, AlbumId, Artist, ArtistId, CatalogStats, NewAlbum, NewArtist, NewSong, Song, SongId,
};
use bridge_traits::{Notice, NotificationSink};
use core_runtime::events::{CatalogEvent, CatalogResource, CoreEvent, EventBus};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, instrument, warn};

/// Identity of one fetch operation: resource plus argument.
///
/// The in-flight map and the loading flags are keyed by this, so two calls
/// for different albums run independently while two calls for the same
/// album share one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchKey {
    Artists,
    Albums,
    AlbumById(AlbumId),
    AlbumSongs(AlbumId),
    Songs,
    FeaturedSongs,
    MadeForYouSongs,
    TrendingSongs,
    Stats,
}

impl FetchKey {
    /// The resource this key belongs to, for events and error bookkeeping.
    pub fn resource(&self) -> CatalogResource {
        match self {
            FetchKey::Artists => CatalogResource::Artists,
            FetchKey::Albums => CatalogResource::Albums,
            FetchKey::AlbumById(_) => CatalogResource::Album,
            FetchKey::AlbumSongs(_) => CatalogResource::AlbumSongs,
            FetchKey::Songs => CatalogResource::Songs,
            FetchKey::FeaturedSongs => CatalogResource::FeaturedSongs,
            FetchKey::MadeForYouSongs => CatalogResource::MadeForYouSongs,
            FetchKey::TrendingSongs => CatalogResource::TrendingSongs,
            FetchKey::Stats => CatalogResource::Stats,
        }
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<()>>>;

#[derive(Default)]
struct CatalogState {
    artists: Vec<Artist>,
    albums: Vec<Album>,
    current_album: Option<Album>,
    songs_by_album: HashMap<AlbumId, Vec<Song>>,
    songs: Vec<Song>,
    featured_songs: Vec<Song>,
    made_for_you_songs: Vec<Song>,
    trending_songs: Vec<Song>,
    stats: CatalogStats,
    loading: HashSet<FetchKey>,
    errors: HashMap<CatalogResource, String>,
}

struct CacheInner {
    api: CatalogApi,
    state: RwLock<CatalogState>,
    in_flight: Mutex<HashMap<FetchKey, SharedFetch>>,
    events: EventBus,
    notifications: Arc<dyn NotificationSink>,
}

impl CacheInner {
    fn emit(&self, event: CatalogEvent) {
        // Nobody listening is fine.
        let _ = self.events.emit(CoreEvent::Catalog(event));
    }

    async fn begin_fetch(&self, key: &FetchKey) {
        self.state.write().await.loading.insert(key.clone());
        self.emit(CatalogEvent::FetchStarted {
            resource: key.resource(),
        });
    }

    async fn finish_fetch(&self, key: &FetchKey, result: &Result<()>) {
        let resource = key.resource();
        {
            let mut state = self.state.write().await;
            state.loading.remove(key);
            match result {
                Ok(()) => {
                    state.errors.remove(&resource);
                }
                Err(err) => {
                    state.errors.insert(resource, err.to_string());
                }
            }
        }
        match result {
            Ok(()) => self.emit(CatalogEvent::Updated { resource }),
            Err(err) => {
                self.emit(CatalogEvent::FetchFailed {
                    resource,
                    message: err.to_string(),
                });
                self.notifications
                    .notify(Notice::error(format!("Failed to load {}: {}", resource, err)));
            }
        }
    }
}

/// Reactive store over the catalog backend.
///
/// Cheap to clone; all clones observe the same state and share the same
/// in-flight request map.
#[derive(Clone)]
pub struct CatalogCache {
    inner: Arc<CacheInner>,
}

impl CatalogCache {
    pub fn new(api: CatalogApi, events: EventBus, notifications: Arc<dyn NotificationSink>) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                api,
                state: RwLock::new(CatalogState::default()),
                in_flight: Mutex::new(HashMap::new()),
                events,
                notifications,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Fetch plumbing
    // ------------------------------------------------------------------

    /// Build the fetch-and-apply future for a key. The future owns its
    /// handles, so it can outlive the caller and be shared between joined
    /// callers.
    fn fetch_future(&self, key: &FetchKey) -> BoxFuture<'static, Result<()>> {
        let inner = Arc::clone(&self.inner);
        match key.clone() {
            FetchKey::Artists => async move {
                let artists = inner.api.fetch_artists().await?;
                inner.state.write().await.artists = artists;
                Ok(())
            }
            .boxed(),
            FetchKey::Albums => async move {
                let albums = inner.api.fetch_albums().await?;
                inner.state.write().await.albums = albums;
                Ok(())
            }
            .boxed(),
            FetchKey::AlbumById(id) => async move {
                let album = inner.api.fetch_album(&id).await?;
                let mut state = inner.state.write().await;
                upsert_album(&mut state.albums, album.clone());
                state.current_album = Some(album);
                Ok(())
            }
            .boxed(),
            FetchKey::AlbumSongs(id) => async move {
                let songs = inner.api.fetch_album_songs(&id).await?;
                inner.state.write().await.songs_by_album.insert(id, songs);
                Ok(())
            }
            .boxed(),
            FetchKey::Songs => async move {
                let songs = inner.api.fetch_songs().await?;
                inner.state.write().await.songs = songs;
                Ok(())
            }
            .boxed(),
            FetchKey::FeaturedSongs => async move {
                let songs = inner.api.fetch_featured_songs().await?;
                inner.state.write().await.featured_songs = songs;
                Ok(())
            }
            .boxed(),
            FetchKey::MadeForYouSongs => async move {
                let songs = inner.api.fetch_made_for_you_songs().await?;
                inner.state.write().await.made_for_you_songs = songs;
                Ok(())
            }
            .boxed(),
            FetchKey::TrendingSongs => async move {
                let songs = inner.api.fetch_trending_songs().await?;
                inner.state.write().await.trending_songs = songs;
                Ok(())
            }
            .boxed(),
            FetchKey::Stats => async move {
                let stats = inner.api.fetch_stats().await?;
                inner.state.write().await.stats = stats;
                Ok(())
            }
            .boxed(),
        }
    }

    /// Run a fetch with in-flight de-duplication: the first caller for a
    /// key installs the canonical future, later concurrent callers for the
    /// same key await the same shared resolution instead of issuing a
    /// duplicate request.
    async fn run_fetch(&self, key: FetchKey) -> Result<()> {
        let shared = {
            let mut in_flight = self.inner.in_flight.lock().await;
            if let Some(existing) = in_flight.get(&key) {
                debug!(?key, "Joining in-flight fetch");
                existing.clone()
            } else {
                let inner = Arc::clone(&self.inner);
                let fetch = self.fetch_future(&key);
                let wrap_key = key.clone();
                let wrapped = async move {
                    inner.begin_fetch(&wrap_key).await;
                    let result = fetch.await;
                    inner.finish_fetch(&wrap_key, &result).await;
                    inner.in_flight.lock().await.remove(&wrap_key);
                    result
                }
                .boxed()
                .shared();
                in_flight.insert(key, wrapped.clone());
                wrapped
            }
        };
        shared.await
    }

    /// Re-fetch a collection after an acknowledged mutation. Failures are
    /// logged, not surfaced: the mutation itself already produced its
    /// notice.
    async fn refresh_silently(&self, keys: &[FetchKey]) {
        for key in keys {
            match self.fetch_future(key).await {
                Ok(()) => self.inner.emit(CatalogEvent::Updated {
                    resource: key.resource(),
                }),
                Err(err) => {
                    warn!(resource = %key.resource(), %err, "Post-mutation refresh failed")
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Fetch operations
    // ------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn fetch_artists(&self) -> Result<Vec<Artist>> {
        self.run_fetch(FetchKey::Artists).await?;
        Ok(self.artists().await)
    }

    #[instrument(skip(self))]
    pub async fn fetch_albums(&self) -> Result<Vec<Album>> {
        self.run_fetch(FetchKey::Albums).await?;
        Ok(self.albums().await)
    }

    #[instrument(skip(self))]
    pub async fn fetch_album_by_id(&self, id: &AlbumId) -> Result<Album> {
        self.run_fetch(FetchKey::AlbumById(id.clone())).await?;
        self.album_by_id(id).await.ok_or_else(|| {
            CatalogError::Network(format!("Album {} missing from cache after fetch", id))
        })
    }

    #[instrument(skip(self))]
    pub async fn fetch_songs_by_album_id(&self, id: &AlbumId) -> Result<Vec<Song>> {
        self.run_fetch(FetchKey::AlbumSongs(id.clone())).await?;
        Ok(self.songs_for_album(id).await.unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn fetch_songs(&self) -> Result<Vec<Song>> {
        self.run_fetch(FetchKey::Songs).await?;
        Ok(self.songs().await)
    }

    #[instrument(skip(self))]
    pub async fn fetch_featured_songs(&self) -> Result<Vec<Song>> {
        self.run_fetch(FetchKey::FeaturedSongs).await?;
        Ok(self.featured_songs().await)
    }

    #[instrument(skip(self))]
    pub async fn fetch_made_for_you_songs(&self) -> Result<Vec<Song>> {
        self.run_fetch(FetchKey::MadeForYouSongs).await?;
        Ok(self.made_for_you_songs().await)
    }

    #[instrument(skip(self))]
    pub async fn fetch_trending_songs(&self) -> Result<Vec<Song>> {
        self.run_fetch(FetchKey::TrendingSongs).await?;
        Ok(self.trending_songs().await)
    }

    #[instrument(skip(self))]
    pub async fn fetch_stats(&self) -> Result<CatalogStats> {
        self.run_fetch(FetchKey::Stats).await?;
        Ok(self.stats().await)
    }

    // ------------------------------------------------------------------
    // Admin mutations
    // ------------------------------------------------------------------

    #[instrument(skip(self, album))]
    pub async fn create_album(&self, album: NewAlbum) -> Result<()> {
        if let Err(message) = album.validate() {
            self.inner.notifications.notify(Notice::error(&message));
            return Err(CatalogError::validation("album", message));
        }

        match self.inner.api.create_album(&album).await {
            Ok(()) => {
                self.inner.emit(CatalogEvent::EntityCreated {
                    resource: CatalogResource::Albums,
                });
                self.inner
                    .notifications
                    .notify(Notice::success("Album created successfully"));
                self.refresh_silently(&[FetchKey::Albums, FetchKey::Artists, FetchKey::Stats])
                    .await;
                Ok(())
            }
            Err(err) => {
                self.inner
                    .notifications
                    .notify(Notice::error(format!("Failed to create album: {}", err)));
                Err(err)
            }
        }
    }

    #[instrument(skip(self, artist))]
    pub async fn create_artist(&self, artist: NewArtist) -> Result<()> {
        if let Err(message) = artist.validate() {
            self.inner.notifications.notify(Notice::error(&message));
            return Err(CatalogError::validation("artist", message));
        }

        match self.inner.api.create_artist(&artist).await {
            Ok(()) => {
                self.inner.emit(CatalogEvent::EntityCreated {
                    resource: CatalogResource::Artists,
                });
                self.inner
                    .notifications
                    .notify(Notice::success("Artist created successfully"));
                self.refresh_silently(&[FetchKey::Artists, FetchKey::Stats]).await;
                Ok(())
            }
            Err(err) => {
                self.inner
                    .notifications
                    .notify(Notice::error(format!("Failed to create artist: {}", err)));
                Err(err)
            }
        }
    }

    #[instrument(skip(self, song))]
    pub async fn create_song(&self, song: NewSong) -> Result<()> {
        if let Err(message) = song.validate() {
            self.inner.notifications.notify(Notice::error(&message));
            return Err(CatalogError::validation("song", message));
        }

        match self.inner.api.create_song(&song).await {
            Ok(()) => {
                self.inner.emit(CatalogEvent::EntityCreated {
                    resource: CatalogResource::Songs,
                });
                self.inner
                    .notifications
                    .notify(Notice::success("Song created successfully"));
                self.refresh_silently(&[FetchKey::Songs, FetchKey::Artists, FetchKey::Stats])
                    .await;
                Ok(())
            }
            Err(err) => {
                self.inner
                    .notifications
                    .notify(Notice::error(format!("Failed to create song: {}", err)));
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_album(&self, id: &AlbumId) -> Result<()> {
        match self.inner.api.delete_album(id).await {
            Ok(()) => {
                {
                    let mut state = self.inner.state.write().await;
                    state.albums.retain(|album| &album.id != id);
                    state.songs_by_album.remove(id);
                    if state.current_album.as_ref().map(|album| &album.id) == Some(id) {
                        state.current_album = None;
                    }
                }
                self.inner.emit(CatalogEvent::EntityDeleted {
                    resource: CatalogResource::Albums,
                    id: id.to_string(),
                });
                self.inner
                    .notifications
                    .notify(Notice::success("Album deleted successfully"));
                self.refresh_silently(&[FetchKey::Artists, FetchKey::Stats]).await;
                Ok(())
            }
            Err(err) => {
                self.inner
                    .notifications
                    .notify(Notice::error(format!("Failed to delete album: {}", err)));
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_artist(&self, id: &ArtistId) -> Result<()> {
        match self.inner.api.delete_artist(id).await {
            Ok(()) => {
                {
                    let mut state = self.inner.state.write().await;
                    state.artists.retain(|artist| &artist.id != id);
                }
                self.inner.emit(CatalogEvent::EntityDeleted {
                    resource: CatalogResource::Artists,
                    id: id.to_string(),
                });
                self.inner
                    .notifications
                    .notify(Notice::success("Artist deleted successfully"));
                // The backend cascades albums and songs; pull fresh copies.
                self.refresh_silently(&[FetchKey::Albums, FetchKey::Songs, FetchKey::Stats])
                    .await;
                Ok(())
            }
            Err(err) => {
                self.inner
                    .notifications
                    .notify(Notice::error(format!("Failed to delete artist: {}", err)));
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_song(&self, id: &SongId) -> Result<()> {
        match self.inner.api.delete_song(id).await {
            Ok(()) => {
                {
                    let mut state = self.inner.state.write().await;
                    state.songs.retain(|song| &song.id != id);
                    state.featured_songs.retain(|song| &song.id != id);
                    state.made_for_you_songs.retain(|song| &song.id != id);
                    state.trending_songs.retain(|song| &song.id != id);
                    for songs in state.songs_by_album.values_mut() {
                        songs.retain(|song| &song.id != id);
                    }
                }
                self.inner.emit(CatalogEvent::EntityDeleted {
                    resource: CatalogResource::Songs,
                    id: id.to_string(),
                });
                self.inner
                    .notifications
                    .notify(Notice::success("Song deleted successfully"));
                self.refresh_silently(&[FetchKey::Albums, FetchKey::Artists, FetchKey::Stats])
                    .await;
                Ok(())
            }
            Err(err) => {
                self.inner
                    .notifications
                    .notify(Notice::error(format!("Failed to delete song: {}", err)));
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub async fn artists(&self) -> Vec<Artist> {
        self.inner.state.read().await.artists.clone()
    }

    pub async fn albums(&self) -> Vec<Album> {
        self.inner.state.read().await.albums.clone()
    }

    /// The most recently fetched single album.
    pub async fn current_album(&self) -> Option<Album> {
        self.inner.state.read().await.current_album.clone()
    }

    pub async fn album_by_id(&self, id: &AlbumId) -> Option<Album> {
        self.inner
            .state
            .read()
            .await
            .albums
            .iter()
            .find(|album| &album.id == id)
            .cloned()
    }

    pub async fn songs_for_album(&self, id: &AlbumId) -> Option<Vec<Song>> {
        self.inner.state.read().await.songs_by_album.get(id).cloned()
    }

    pub async fn songs(&self) -> Vec<Song> {
        self.inner.state.read().await.songs.clone()
    }

    pub async fn featured_songs(&self) -> Vec<Song> {
        self.inner.state.read().await.featured_songs.clone()
    }

    pub async fn made_for_you_songs(&self) -> Vec<Song> {
        self.inner.state.read().await.made_for_you_songs.clone()
    }

    pub async fn trending_songs(&self) -> Vec<Song> {
        self.inner.state.read().await.trending_songs.clone()
    }

    pub async fn stats(&self) -> CatalogStats {
        self.inner.state.read().await.stats
    }

    /// Whether the given fetch is currently outstanding.
    pub async fn is_loading(&self, key: &FetchKey) -> bool {
        self.inner.state.read().await.loading.contains(key)
    }

    /// Whether any fetch is currently outstanding.
    pub async fn is_any_loading(&self) -> bool {
        !self.inner.state.read().await.loading.is_empty()
    }

    /// Last recorded error for a resource, cleared by the next success.
    pub async fn error_for(&self, resource: CatalogResource) -> Option<String> {
        self.inner.state.read().await.errors.get(&resource).cloned()
    }

    /// Empty the cache at session teardown.
    pub async fn clear(&self) {
        self.inner.in_flight.lock().await.clear();
        *self.inner.state.write().await = CatalogState::default();
        self.inner.emit(CatalogEvent::Cleared);
    }
}

fn upsert_album(albums: &mut Vec<Album>, album: Album) {
    match albums.iter_mut().find(|existing| existing.id == album.id) {
        Some(slot) => *slot = album,
        None => albums.push(album),
    }
}
