//! # Event Bus System
//!
//! Provides an event-driven architecture for the client core using
//! `tokio::sync::broadcast`. Stores publish typed events on every observable
//! state change; UI surfaces subscribe and re-render from store snapshots.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐     emit      ┌───────────┐
//! │ CatalogCache  ├──────────────>│           │
//! └───────────────┘               │           │
//! ┌───────────────┐     emit      │ EventBus  │     subscribe    ┌────────────┐
//! │FavoritesLedger├──────────────>│ (broadcast├─────────────────>│ Album view │
//! └───────────────┘               │  channel) │                  └────────────┘
//! ┌───────────────┐     emit      │           │     subscribe    ┌────────────┐
//! │PlaybackEngine ├──────────────>│           ├─────────────────>│ Player bar │
//! └───────────────┘               └───────────┘                  └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, CoreEvent, PlaybackEvent};
//!
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Playback(PlaybackEvent::Paused))
//!     .ok();
//! ```
//!
//! ## Error Handling
//!
//! Subscribers receive `RecvError::Lagged(n)` when they fall behind by more
//! than the bus capacity; this is non-fatal and they keep receiving newer
//! events. `RecvError::Closed` signals shutdown.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Catalog cache changes
    Catalog(CatalogEvent),
    /// Favorites ledger changes
    Favorites(FavoritesEvent),
    /// Playback engine transitions
    Playback(PlaybackEvent),
    /// Session lifecycle
    Session(SessionEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Catalog(e) => e.description(),
            CoreEvent::Favorites(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Session(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Catalog(CatalogEvent::FetchFailed { .. }) => EventSeverity::Error,
            CoreEvent::Favorites(FavoritesEvent::RolledBack { .. }) => EventSeverity::Error,
            CoreEvent::Catalog(CatalogEvent::EntityCreated { .. }) => EventSeverity::Info,
            CoreEvent::Session(_) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Catalog Events
// ============================================================================

/// Resource kinds tracked by the catalog cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogResource {
    Artists,
    Albums,
    Album,
    AlbumSongs,
    Songs,
    FeaturedSongs,
    MadeForYouSongs,
    TrendingSongs,
    Stats,
}

impl fmt::Display for CatalogResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogResource::Artists => "artists",
            CatalogResource::Albums => "albums",
            CatalogResource::Album => "album",
            CatalogResource::AlbumSongs => "album songs",
            CatalogResource::Songs => "songs",
            CatalogResource::FeaturedSongs => "featured songs",
            CatalogResource::MadeForYouSongs => "made-for-you songs",
            CatalogResource::TrendingSongs => "trending songs",
            CatalogResource::Stats => "stats",
        };
        write!(f, "{}", name)
    }
}

/// Events emitted by the catalog cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    /// A fetch started and its loading flag was raised.
    FetchStarted { resource: CatalogResource },
    /// A fetch finished and its result was merged into the cache.
    Updated { resource: CatalogResource },
    /// A fetch failed; previously cached data was left intact.
    FetchFailed {
        resource: CatalogResource,
        message: String,
    },
    /// An admin mutation was acknowledged and an entity now exists. Creation
    /// acks carry no body echo, so no id is reported here; the refreshed
    /// collection follows as an `Updated` event.
    EntityCreated { resource: CatalogResource },
    /// An admin mutation was acknowledged and an entity is gone.
    EntityDeleted { resource: CatalogResource, id: String },
    /// The cache was emptied at session teardown.
    Cleared,
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::FetchStarted { .. } => "Catalog fetch started",
            CatalogEvent::Updated { .. } => "Catalog resource updated",
            CatalogEvent::FetchFailed { .. } => "Catalog fetch failed",
            CatalogEvent::EntityCreated { .. } => "Catalog entity created",
            CatalogEvent::EntityDeleted { .. } => "Catalog entity deleted",
            CatalogEvent::Cleared => "Catalog cleared",
        }
    }
}

// ============================================================================
// Favorites Events
// ============================================================================

/// Events emitted by the favorites ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum FavoritesEvent {
    /// A user's favorite set finished loading.
    Loaded { user_id: String, count: usize },
    /// A song's membership was flipped optimistically.
    Toggled { song_id: String, favorited: bool },
    /// A failed backend mutation reverted an optimistic flip.
    RolledBack { song_id: String, favorited: bool },
    /// The ledger was discarded at sign-out.
    Cleared,
}

impl FavoritesEvent {
    fn description(&self) -> &str {
        match self {
            FavoritesEvent::Loaded { .. } => "Favorites loaded",
            FavoritesEvent::Toggled { .. } => "Favorite toggled",
            FavoritesEvent::RolledBack { .. } => "Favorite toggle rolled back",
            FavoritesEvent::Cleared => "Favorites cleared",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events emitted by the playback engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A queue replaced the previous one wholesale.
    QueueLoaded { count: usize, start_index: usize },
    /// The current song changed (user navigation or auto-advance).
    TrackChanged { index: usize, song_id: String },
    /// Output was paused.
    Paused,
    /// Output resumed from pause.
    Resumed,
    /// Shuffle mode was toggled.
    ShuffleChanged { enabled: bool },
    /// The engine returned to the empty state.
    Cleared,
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::QueueLoaded { .. } => "Playback queue loaded",
            PlaybackEvent::TrackChanged { .. } => "Playback track changed",
            PlaybackEvent::Paused => "Playback paused",
            PlaybackEvent::Resumed => "Playback resumed",
            PlaybackEvent::ShuffleChanged { .. } => "Shuffle toggled",
            PlaybackEvent::Cleared => "Playback queue cleared",
        }
    }
}

// ============================================================================
// Session Events
// ============================================================================

/// Session lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// Stores were constructed and are ready for use.
    Started,
    /// Stores were torn down at sign-out.
    SignedOut,
}

impl SessionEvent {
    fn description(&self) -> &str {
        match self {
            SessionEvent::Started => "Session started",
            SessionEvent::SignedOut => "Session signed out",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central broadcast channel for publishing [`CoreEvent`]s.
///
/// Cloning the bus clones the sender; all clones feed the same subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error when nobody is listening (which callers may ignore).
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber receiving all future events.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with optional filtering, for
/// subscribers that only care about one store's events.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Adds a filter; only matching events are returned by `recv()`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n`
    /// events, `RecvError::Closed` once all senders are gone.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;

            let Some(filter) = &self.filter else {
                return Ok(event);
            };

            if filter(&event) {
                return Ok(event);
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
