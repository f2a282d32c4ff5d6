//! Behavior tests for the favorites ledger
//!
//! Covers toggle idempotence, optimistic rollback, unauthenticated
//! rejection, user replacement, and last-intent-wins reconciliation under
//! racing toggles.

use async_trait::async_trait;
use bridge_traits::{
    error::Result as BridgeResult, HttpClient, HttpMethod, HttpRequest, HttpResponse, Notice,
    NoticeLevel, NotificationSink, UserId,
};
use bytes::Bytes;
use core_catalog::{CatalogApi, SongId};
use core_favorites::{FavoritesError, FavoritesLedger};
use core_runtime::events::{CoreEvent, EventBus, FavoritesEvent};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

const BASE: &str = "https://api.test";

// ============================================================================
// Fakes
// ============================================================================

/// Route-based HTTP fake with optional per-route gates for holding a
/// response until the test releases it.
#[derive(Default)]
struct FakeHttp {
    routes: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
}

impl FakeHttp {
    fn on(&self, method: &str, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .entry(format!("{} {}", method, path))
            .or_default()
            .push_back((status, body.to_string()));
    }

    fn gate(&self, method: &str, path: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .unwrap()
            .insert(format!("{} {}", method, path), Arc::clone(&gate));
        gate
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let method = match request.method {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        };
        let path = request
            .url
            .strip_prefix(BASE)
            .unwrap_or(&request.url)
            .to_string();
        let route = format!("{} {}", method, path);
        self.calls.lock().unwrap().push(route.clone());

        let gate = self.gates.lock().unwrap().get(&route).cloned();
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }

        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .get_mut(&route)
            .unwrap_or_else(|| panic!("unexpected request: {}", route));
        let (status, body) = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| panic!("no response configured for {}", route))
        };

        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body),
        })
    }
}

#[derive(Default)]
struct RecordingSink {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingSink {
    fn count(&self, level: NoticeLevel) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|notice| notice.level == level)
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

fn make_ledger(http: Arc<dyn HttpClient>) -> (FavoritesLedger, Arc<RecordingSink>, EventBus) {
    let events = EventBus::new(64);
    let sink = Arc::new(RecordingSink::default());
    let api = CatalogApi::new(BASE, http);
    let ledger = FavoritesLedger::new(api, events.clone(), sink.clone());
    (ledger, sink, events)
}

fn song_json(id: &str) -> String {
    format!(
        r#"{{
            "_id": "{id}",
            "title": "Song {id}",
            "artist": {{ "_id": "artist-1", "name": "The Band" }},
            "imageUrl": "https://cdn.test/covers/{id}.jpg",
            "audioUrl": "https://cdn.test/audio/{id}.mp3",
            "duration": 200
        }}"#
    )
}

fn user() -> UserId {
    UserId::new("user-1")
}

fn song() -> SongId {
    SongId::new("song-1")
}

// ============================================================================
// Toggle basics
// ============================================================================

#[tokio::test]
async fn double_toggle_returns_to_original_state() {
    let http = Arc::new(FakeHttp::default());
    http.on("POST", "/users/user-1/favorites/song-1", 204, "");
    http.on("DELETE", "/users/user-1/favorites/song-1", 204, "");
    let (ledger, _sink, _events) = make_ledger(http.clone());

    assert!(!ledger.is_favorite(&song()));

    let now = ledger.toggle_favorite(Some(&user()), &song()).await.unwrap();
    assert!(now);
    assert!(ledger.is_favorite(&song()));

    let now = ledger.toggle_favorite(Some(&user()), &song()).await.unwrap();
    assert!(!now);
    assert!(!ledger.is_favorite(&song()));

    assert_eq!(
        http.calls(),
        vec![
            "POST /users/user-1/favorites/song-1".to_string(),
            "DELETE /users/user-1/favorites/song-1".to_string(),
        ]
    );
}

#[tokio::test]
async fn toggle_is_visible_before_acknowledgment() {
    let http = Arc::new(FakeHttp::default());
    http.on("POST", "/users/user-1/favorites/song-1", 204, "");
    let gate = http.gate("POST", "/users/user-1/favorites/song-1");
    let (ledger, _sink, _events) = make_ledger(http);

    let task = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.toggle_favorite(Some(&user()), &song()).await })
    };

    // Flip is observable while the backend call is still pending.
    while !ledger.is_favorite(&song()) {
        tokio::task::yield_now().await;
    }

    gate.add_permits(1);
    task.await.unwrap().unwrap();
    assert!(ledger.is_favorite(&song()));
}

// ============================================================================
// Rollback and rejection
// ============================================================================

#[tokio::test]
async fn failed_acknowledgment_rolls_back_with_one_notice() {
    let http = Arc::new(FakeHttp::default());
    http.on("POST", "/users/user-1/favorites/song-1", 500, "nope");
    let (ledger, sink, events) = make_ledger(http);
    let mut receiver = events.subscribe();

    let err = ledger
        .toggle_favorite(Some(&user()), &song())
        .await
        .unwrap_err();

    assert!(matches!(err, FavoritesError::Network(_)));
    assert!(!ledger.is_favorite(&song()));
    assert_eq!(sink.count(NoticeLevel::Error), 1);

    // Toggled then RolledBack, in that order.
    assert_eq!(
        receiver.try_recv().unwrap(),
        CoreEvent::Favorites(FavoritesEvent::Toggled {
            song_id: "song-1".to_string(),
            favorited: true,
        })
    );
    assert_eq!(
        receiver.try_recv().unwrap(),
        CoreEvent::Favorites(FavoritesEvent::RolledBack {
            song_id: "song-1".to_string(),
            favorited: false,
        })
    );
}

#[tokio::test]
async fn unauthenticated_toggle_rejected_before_network() {
    // No routes: any request would panic the fake.
    let http = Arc::new(FakeHttp::default());
    let (ledger, sink, _events) = make_ledger(http.clone());

    let err = ledger.toggle_favorite(None, &song()).await.unwrap_err();

    assert_eq!(err, FavoritesError::SignInRequired);
    assert!(!ledger.is_favorite(&song()));
    assert!(http.calls().is_empty());
    assert_eq!(sink.count(NoticeLevel::Error), 1);
}

// ============================================================================
// Fetching
// ============================================================================

#[tokio::test]
async fn fetch_favorites_loads_ids_and_songs() {
    let http = Arc::new(FakeHttp::default());
    http.on(
        "GET",
        "/users/user-1/favorites",
        200,
        &format!("[{},{}]", song_json("song-1"), song_json("song-2")),
    );
    let (ledger, _sink, _events) = make_ledger(http);

    let songs = ledger.fetch_favorites(&user()).await.unwrap();
    assert_eq!(songs.len(), 2);
    assert_eq!(ledger.favorite_count(), 2);
    assert!(ledger.is_favorite(&SongId::new("song-1")));
    assert!(ledger.is_favorite(&SongId::new("song-2")));
    assert!(!ledger.is_favorite(&SongId::new("song-3")));
    assert_eq!(ledger.user(), Some(user()));
    assert!(!ledger.is_loading());
}

#[tokio::test]
async fn fetch_for_different_user_replaces_set() {
    let http = Arc::new(FakeHttp::default());
    http.on(
        "GET",
        "/users/user-1/favorites",
        200,
        &format!("[{},{}]", song_json("song-1"), song_json("song-2")),
    );
    http.on(
        "GET",
        "/users/user-2/favorites",
        200,
        &format!("[{}]", song_json("song-9")),
    );
    let (ledger, _sink, _events) = make_ledger(http);

    ledger.fetch_favorites(&user()).await.unwrap();
    ledger.fetch_favorites(&UserId::new("user-2")).await.unwrap();

    assert_eq!(ledger.user(), Some(UserId::new("user-2")));
    assert_eq!(ledger.favorite_count(), 1);
    assert!(ledger.is_favorite(&SongId::new("song-9")));
    assert!(!ledger.is_favorite(&SongId::new("song-1")));
}

#[tokio::test]
async fn fetch_failure_reports_one_notice() {
    let http = Arc::new(FakeHttp::default());
    http.on("GET", "/users/user-1/favorites", 500, "boom");
    let (ledger, sink, _events) = make_ledger(http);

    let err = ledger.fetch_favorites(&user()).await.unwrap_err();
    assert!(matches!(err, FavoritesError::Network(_)));
    assert_eq!(sink.count(NoticeLevel::Error), 1);
    assert!(!ledger.is_loading());
}

// ============================================================================
// Reconciliation under racing toggles
// ============================================================================

#[tokio::test]
async fn late_failure_of_superseded_toggle_does_not_flip_back() {
    let http = Arc::new(FakeHttp::default());
    // The add fails, but only after the user has already toggled again.
    http.on("POST", "/users/user-1/favorites/song-1", 500, "late failure");
    http.on("DELETE", "/users/user-1/favorites/song-1", 204, "");
    let gate = http.gate("POST", "/users/user-1/favorites/song-1");
    let (ledger, sink, events) = make_ledger(http.clone());
    let mut receiver = events.subscribe();

    // First toggle: add, suspended inside the backend call.
    let first = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.toggle_favorite(Some(&user()), &song()).await })
    };
    while http.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    assert!(ledger.is_favorite(&song()));

    // Second toggle: remove. The newest intent is "not favorited".
    let second = {
        let ledger = ledger.clone();
        tokio::spawn(async move { ledger.toggle_favorite(Some(&user()), &song()).await })
    };
    while !second.is_finished() && ledger.is_favorite(&song()) {
        tokio::task::yield_now().await;
    }

    // Now let the first acknowledgment come back as a failure.
    gate.add_permits(1);
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    // Last intent wins; the stale failure neither flips state nor notifies.
    assert!(!ledger.is_favorite(&song()));
    assert_eq!(sink.count(NoticeLevel::Error), 0);

    let mut rollbacks = 0;
    while let Ok(event) = receiver.try_recv() {
        if matches!(event, CoreEvent::Favorites(FavoritesEvent::RolledBack { .. })) {
            rollbacks += 1;
        }
    }
    assert_eq!(rollbacks, 0);

    // Backend calls were serialized in call order.
    assert_eq!(
        http.calls(),
        vec![
            "POST /users/user-1/favorites/song-1".to_string(),
            "DELETE /users/user-1/favorites/song-1".to_string(),
        ]
    );
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test]
async fn clear_discards_ledger() {
    let http = Arc::new(FakeHttp::default());
    http.on(
        "GET",
        "/users/user-1/favorites",
        200,
        &format!("[{}]", song_json("song-1")),
    );
    let (ledger, _sink, events) = make_ledger(http);

    ledger.fetch_favorites(&user()).await.unwrap();
    assert_eq!(ledger.favorite_count(), 1);

    let mut receiver = events.subscribe();
    ledger.clear();

    assert_eq!(ledger.favorite_count(), 0);
    assert!(ledger.user().is_none());
    assert!(ledger.favorite_songs().is_empty());
    assert_eq!(
        receiver.try_recv().unwrap(),
        CoreEvent::Favorites(FavoritesEvent::Cleared)
    );
}
