//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, audio
//! output, identity, notifications) into the three core stores. A
//! [`Session`] owns explicit store instances: it is constructed at session
//! start, injected into consumers, and torn down at sign-out; nothing in
//! the core is an ambient global.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{IdentityProvider, UserId};
use core_catalog::{CatalogApi, CatalogCache, SongId};
use core_favorites::FavoritesLedger;
use core_playback::PlaybackEngine;
use core_runtime::events::{CoreEvent, EventBus, Receiver, SessionEvent};
use core_runtime::{CoreConfig, CoreConfigBuilder};
use tracing::info;

/// Primary façade exposed to host applications.
///
/// Holds the catalog cache, the favorites ledger, and the playback engine,
/// all sharing one event bus. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    events: EventBus,
    catalog: CatalogCache,
    favorites: FavoritesLedger,
    playback: PlaybackEngine,
    identity: Arc<dyn IdentityProvider>,
}

impl Session {
    /// Construct the stores from a validated configuration.
    pub fn start(config: CoreConfig) -> Self {
        let events = EventBus::new(config.event_buffer);
        let api = CatalogApi::new(config.api_base_url.clone(), Arc::clone(&config.http_client));

        let catalog = CatalogCache::new(
            api.clone(),
            events.clone(),
            Arc::clone(&config.notifications),
        );
        let favorites = FavoritesLedger::new(
            api,
            events.clone(),
            Arc::clone(&config.notifications),
        );
        let playback = PlaybackEngine::new(
            Arc::clone(&config.audio_output),
            events.clone(),
            Arc::clone(&config.notifications),
        );

        let session = Self {
            events,
            catalog,
            favorites,
            playback,
            identity: Arc::clone(&config.identity),
        };
        info!("Client core session started");
        let _ = session.events.emit(CoreEvent::Session(SessionEvent::Started));
        session
    }

    /// Build the configuration and start a session in one step.
    pub fn bootstrap(builder: CoreConfigBuilder) -> Result<Self> {
        let config = builder.build()?;
        Ok(Self::start(config))
    }

    /// The catalog store.
    pub fn catalog(&self) -> &CatalogCache {
        &self.catalog
    }

    /// The favorites store.
    pub fn favorites(&self) -> &FavoritesLedger {
        &self.favorites
    }

    /// The playback engine.
    pub fn playback(&self) -> &PlaybackEngine {
        &self.playback
    }

    /// The shared event bus.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to all store events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<UserId> {
        self.identity.current_user()
    }

    /// Toggle a favorite for the signed-in user; rejected when nobody is.
    pub async fn toggle_favorite(&self, song_id: &SongId) -> core_favorites::Result<bool> {
        let user = self.identity.current_user();
        self.favorites.toggle_favorite(user.as_ref(), song_id).await
    }

    /// Load the signed-in user's favorites; rejected when nobody is.
    pub async fn fetch_favorites(&self) -> core_favorites::Result<Vec<core_catalog::Song>> {
        match self.identity.current_user() {
            Some(user) => self.favorites.fetch_favorites(&user).await,
            None => Err(core_favorites::FavoritesError::SignInRequired),
        }
    }

    /// Tear down every store at sign-out: the catalog empties, the
    /// favorite set is discarded, and playback stops.
    pub async fn sign_out(&self) {
        self.catalog.clear().await;
        self.favorites.clear();
        self.playback.clear();
        info!("Client core session torn down");
        let _ = self
            .events
            .emit(CoreEvent::Session(SessionEvent::SignedOut));
    }
}
