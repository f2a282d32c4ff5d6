//! Optimistic per-user favorites ledger.
//!
//! Membership flips locally the moment the user toggles; the backend
//! mutation follows. A failed acknowledgment rolls the flip back with a
//! notice, unless a newer toggle for the same song has superseded it: every
//! toggle takes a per-song sequence number and a response is applied only
//! while its number is still the latest, so the visible state always matches
//! the most recent user intent. Backend mutations for the same song are
//! serialized in call order through a per-song lock.

use crate::error::{FavoritesError, Result};
use bridge_traits::{Notice, NotificationSink, UserId};
use core_catalog::{CatalogApi, Song, SongId};
use core_runtime::events::{CoreEvent, EventBus, FavoritesEvent};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, instrument};

#[derive(Default)]
struct FavoritesState {
    user: Option<UserId>,
    ids: HashSet<SongId>,
    songs: Vec<Song>,
    is_loading: bool,
}

struct LedgerInner {
    api: CatalogApi,
    state: RwLock<FavoritesState>,
    /// Monotonic per-song toggle counters; the reconciliation guard.
    seqs: StdMutex<HashMap<SongId, u64>>,
    /// Per-song locks serializing backend mutations in call order.
    mutation_locks: StdMutex<HashMap<SongId, Arc<AsyncMutex<()>>>>,
    events: EventBus,
    notifications: Arc<dyn NotificationSink>,
}

impl LedgerInner {
    fn emit(&self, event: FavoritesEvent) {
        let _ = self.events.emit(CoreEvent::Favorites(event));
    }

    fn mutation_lock(&self, song_id: &SongId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.mutation_locks.lock().expect("lock map poisoned");
        Arc::clone(locks.entry(song_id.clone()).or_default())
    }

    fn next_seq(&self, song_id: &SongId) -> u64 {
        let mut seqs = self.seqs.lock().expect("seq map poisoned");
        let counter = seqs.entry(song_id.clone()).or_insert(0);
        *counter += 1;
        *counter
    }

    fn current_seq(&self, song_id: &SongId) -> u64 {
        self.seqs
            .lock()
            .expect("seq map poisoned")
            .get(song_id)
            .copied()
            .unwrap_or(0)
    }
}

/// Per-user favorites store with optimistic toggles.
///
/// Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct FavoritesLedger {
    inner: Arc<LedgerInner>,
}

impl FavoritesLedger {
    pub fn new(api: CatalogApi, events: EventBus, notifications: Arc<dyn NotificationSink>) -> Self {
        Self {
            inner: Arc::new(LedgerInner {
                api,
                state: RwLock::new(FavoritesState::default()),
                seqs: StdMutex::new(HashMap::new()),
                mutation_locks: StdMutex::new(HashMap::new()),
                events,
                notifications,
            }),
        }
    }

    /// Load the favorite set for `user`, replacing any previously loaded
    /// set (including one belonging to a different user).
    #[instrument(skip(self))]
    pub async fn fetch_favorites(&self, user: &UserId) -> Result<Vec<Song>> {
        {
            let mut state = self.inner.state.write().expect("state lock poisoned");
            if state.user.as_ref() != Some(user) {
                state.ids.clear();
                state.songs.clear();
                state.user = Some(user.clone());
            }
            state.is_loading = true;
        }

        match self.inner.api.fetch_favorites(user).await {
            Ok(songs) => {
                {
                    let mut state = self.inner.state.write().expect("state lock poisoned");
                    state.is_loading = false;
                    state.ids = songs.iter().map(|song| song.id.clone()).collect();
                    state.songs = songs.clone();
                }
                self.inner.emit(FavoritesEvent::Loaded {
                    user_id: user.to_string(),
                    count: songs.len(),
                });
                Ok(songs)
            }
            Err(err) => {
                self.inner
                    .state
                    .write()
                    .expect("state lock poisoned")
                    .is_loading = false;
                self.inner
                    .notifications
                    .notify(Notice::error(format!("Failed to load favorites: {}", err)));
                Err(err.into())
            }
        }
    }

    /// Optimistically flip a song's favorite membership, then confirm with
    /// the backend.
    ///
    /// Returns the membership the toggle established locally. Unauthenticated
    /// callers are rejected before anything is mutated. A failed
    /// acknowledgment rolls the flip back and produces one error notice,
    /// unless a newer toggle has already superseded this one, in which case
    /// the response is discarded and the newer intent stands.
    #[instrument(skip(self), fields(song = %song_id))]
    pub async fn toggle_favorite(
        &self,
        user: Option<&UserId>,
        song_id: &SongId,
    ) -> Result<bool> {
        let Some(user) = user else {
            self.inner
                .notifications
                .notify(Notice::error("Please sign in to add songs to favorites"));
            return Err(FavoritesError::SignInRequired);
        };

        // Optimistic flip, visible immediately.
        let (favorited, removed_song, seq) = {
            let mut state = self.inner.state.write().expect("state lock poisoned");
            if state.user.as_ref() != Some(user) {
                state.ids.clear();
                state.songs.clear();
                state.user = Some(user.clone());
            }

            let (favorited, removed_song) = if state.ids.contains(song_id) {
                state.ids.remove(song_id);
                let position = state.songs.iter().position(|song| &song.id == song_id);
                (false, position.map(|index| state.songs.remove(index)))
            } else {
                state.ids.insert(song_id.clone());
                (true, None)
            };

            (favorited, removed_song, self.inner.next_seq(song_id))
        };
        self.inner.emit(FavoritesEvent::Toggled {
            song_id: song_id.to_string(),
            favorited,
        });

        // Serialize backend mutations for this song in call order.
        let lock = self.inner.mutation_lock(song_id);
        let result = {
            let _guard = lock.lock().await;
            if favorited {
                self.inner.api.add_favorite(user, song_id).await
            } else {
                self.inner.api.remove_favorite(user, song_id).await
            }
        };

        // A newer toggle owns the state now; this response no longer applies.
        if self.inner.current_seq(song_id) != seq {
            debug!(song = %song_id, "Discarding stale favorite acknowledgment");
            return Ok(self.is_favorite(song_id));
        }

        match result {
            Ok(()) => Ok(favorited),
            Err(err) => {
                {
                    let mut state = self.inner.state.write().expect("state lock poisoned");
                    if favorited {
                        state.ids.remove(song_id);
                    } else {
                        state.ids.insert(song_id.clone());
                        if let Some(song) = removed_song {
                            state.songs.push(song);
                        }
                    }
                }
                self.inner.emit(FavoritesEvent::RolledBack {
                    song_id: song_id.to_string(),
                    favorited: !favorited,
                });
                self.inner.notifications.notify(Notice::error(format!(
                    "Could not update favorites, change reverted: {}",
                    err
                )));
                Err(FavoritesError::from(err))
            }
        }
    }

    /// Pure membership lookup.
    pub fn is_favorite(&self, song_id: &SongId) -> bool {
        self.inner
            .state
            .read()
            .expect("state lock poisoned")
            .ids
            .contains(song_id)
    }

    /// The loaded favorite songs, unordered.
    pub fn favorite_songs(&self) -> Vec<Song> {
        self.inner
            .state
            .read()
            .expect("state lock poisoned")
            .songs
            .clone()
    }

    /// Number of favorited songs.
    pub fn favorite_count(&self) -> usize {
        self.inner
            .state
            .read()
            .expect("state lock poisoned")
            .ids
            .len()
    }

    /// The user the ledger is currently scoped to.
    pub fn user(&self) -> Option<UserId> {
        self.inner
            .state
            .read()
            .expect("state lock poisoned")
            .user
            .clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner
            .state
            .read()
            .expect("state lock poisoned")
            .is_loading
    }

    /// Discard the ledger at sign-out.
    pub fn clear(&self) {
        {
            let mut state = self.inner.state.write().expect("state lock poisoned");
            *state = FavoritesState::default();
        }
        self.inner.seqs.lock().expect("seq map poisoned").clear();
        self.inner
            .mutation_locks
            .lock()
            .expect("lock map poisoned")
            .clear();
        self.inner.emit(FavoritesEvent::Cleared);
    }
}
