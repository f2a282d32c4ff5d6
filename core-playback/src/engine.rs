//! Playback engine state machine.
//!
//! Owns the active queue and the play/pause state, and is the only
//! component allowed to command the audio output. Transitions are
//! synchronous: local state changes take effect immediately and driver
//! commands are fire-and-forget. The single asynchronous input is the
//! host-delivered "ended" notification, which auto-advances the queue
//! only when its session id still matches the current load, so an
//! "ended" that belongs to a queue replaced in the meantime is discarded.
//!
//! States: `Empty` (no queue), `Paused`, `Playing`. Out-of-range indices
//! clamp, navigation on an empty queue is a no-op, and playing an empty
//! song list is an accepted no-op that reports a notice.

use crate::queue::PlaybackQueue;
use bridge_traits::{AudioOutput, AudioSessionId, Notice, NotificationSink};
use core_catalog::Song;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::debug;

/// Direction of a queue step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Forward,
    Backward,
}

/// Immutable view of the engine for UI binding.
#[derive(Debug, Clone)]
pub struct PlaybackSnapshot {
    pub songs: Vec<Song>,
    pub current_index: Option<usize>,
    pub current_song: Option<Song>,
    pub is_playing: bool,
    pub shuffle_enabled: bool,
}

struct EngineState {
    queue: PlaybackQueue,
    is_playing: bool,
    session: Option<AudioSessionId>,
    rng: SmallRng,
}

struct EngineInner {
    state: Mutex<EngineState>,
    driver: Arc<dyn AudioOutput>,
    events: EventBus,
    notifications: Arc<dyn NotificationSink>,
}

impl EngineInner {
    fn emit(&self, event: PlaybackEvent) {
        let _ = self.events.emit(CoreEvent::Playback(event));
    }
}

/// The playback state machine.
///
/// Cheap to clone; all clones drive the same queue and the same output.
#[derive(Clone)]
pub struct PlaybackEngine {
    inner: Arc<EngineInner>,
}

impl PlaybackEngine {
    pub fn new(
        driver: Arc<dyn AudioOutput>,
        events: EventBus,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::with_rng(driver, events, notifications, SmallRng::from_os_rng())
    }

    /// Engine with a deterministic shuffle seed, for tests.
    pub fn with_seed(
        driver: Arc<dyn AudioOutput>,
        events: EventBus,
        notifications: Arc<dyn NotificationSink>,
        seed: u64,
    ) -> Self {
        Self::with_rng(driver, events, notifications, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(
        driver: Arc<dyn AudioOutput>,
        events: EventBus,
        notifications: Arc<dyn NotificationSink>,
        rng: SmallRng,
    ) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                state: Mutex::new(EngineState {
                    queue: PlaybackQueue::new(),
                    is_playing: false,
                    session: None,
                    rng,
                }),
                driver,
                events,
                notifications,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Replace the queue wholesale and start playing at `start_index`
    /// (clamped). Always restarts from the given index, even when the same
    /// song is already current; re-entrant play is explicit, not a toggle.
    ///
    /// An empty `songs` list transitions to `Empty`, commands nothing, and
    /// reports the no-op.
    pub fn play_album(&self, songs: Vec<Song>, start_index: usize) {
        if songs.is_empty() {
            {
                let mut state = self.inner.state.lock();
                let EngineState { queue, rng, .. } = &mut *state;
                queue.load(Vec::new(), 0, rng);
                state.is_playing = false;
                state.session = None;
            }
            self.inner.emit(PlaybackEvent::Cleared);
            self.inner
                .notifications
                .notify(Notice::info("Nothing to play"));
            return;
        }

        let (session, song, index, count) = {
            let mut state = self.inner.state.lock();
            let EngineState { queue, rng, .. } = &mut *state;
            let Some(index) = queue.load(songs, start_index, rng) else {
                return;
            };
            let Some(song) = queue.current_song().cloned() else {
                return;
            };
            let count = queue.len();
            let session = AudioSessionId::new();
            state.session = Some(session);
            state.is_playing = true;
            (session, song, index, count)
        };

        self.inner.driver.load(session, &song.audio_url);
        self.inner.driver.play();
        self.inner.emit(PlaybackEvent::QueueLoaded {
            count,
            start_index: index,
        });
        self.inner.emit(PlaybackEvent::TrackChanged {
            index,
            song_id: song.id.to_string(),
        });
    }

    /// Same contract as [`play_album`](Self::play_album); the name the
    /// favorites and grid views use for ad-hoc song lists.
    pub fn play_queue(&self, songs: Vec<Song>, start_index: usize) {
        self.play_album(songs, start_index)
    }

    /// Flip between `Playing` and `Paused`. No-op while the queue is empty.
    pub fn toggle_play(&self) {
        let now_playing = {
            let mut state = self.inner.state.lock();
            if state.queue.is_empty() {
                return;
            }
            state.is_playing = !state.is_playing;
            state.is_playing
        };

        if now_playing {
            self.inner.driver.play();
            self.inner.emit(PlaybackEvent::Resumed);
        } else {
            self.inner.driver.pause();
            self.inner.emit(PlaybackEvent::Paused);
        }
    }

    /// Advance to the next position in the play order, wrapping at the end.
    /// A single-song queue replays its song. No-op from `Empty`.
    pub fn play_next(&self) {
        self.step(Step::Forward, None);
    }

    /// Step back to the previous position in the play order, wrapping to
    /// the last position at the start. No-op from `Empty`.
    pub fn play_previous(&self) {
        self.step(Step::Backward, None);
    }

    fn step(&self, direction: Step, expected_session: Option<AudioSessionId>) {
        let (session, song, index) = {
            let mut state = self.inner.state.lock();
            // An expected session pins the step to the load it belongs to;
            // a mismatch means the queue has been replaced since.
            if let Some(expected) = expected_session {
                if state.session != Some(expected) {
                    debug!(%expected, "Discarding ended notification for a superseded load");
                    return;
                }
            }
            let EngineState { queue, .. } = &mut *state;
            let moved = match direction {
                Step::Forward => queue.advance(),
                Step::Backward => queue.retreat(),
            };
            let Some(index) = moved else {
                return;
            };
            let Some(song) = queue.current_song().cloned() else {
                return;
            };
            let session = AudioSessionId::new();
            state.session = Some(session);
            state.is_playing = true;
            (session, song, index)
        };

        self.inner.driver.load(session, &song.audio_url);
        self.inner.driver.play();
        self.inner.emit(PlaybackEvent::TrackChanged {
            index,
            song_id: song.id.to_string(),
        });
    }

    /// Enable or disable shuffle, recomputing the play order so the
    /// current song is neither skipped nor repeated.
    pub fn set_shuffle(&self, enabled: bool) {
        {
            let mut state = self.inner.state.lock();
            let EngineState { queue, rng, .. } = &mut *state;
            queue.set_shuffle(enabled, rng);
        }
        self.inner.emit(PlaybackEvent::ShuffleChanged { enabled });
    }

    /// Flip shuffle mode.
    pub fn toggle_shuffle(&self) {
        let enabled = !self.inner.state.lock().queue.shuffle_enabled();
        self.set_shuffle(enabled);
    }

    /// React to the driver's "ended" notification for `session`.
    ///
    /// Auto-advances like [`play_next`](Self::play_next), unless the
    /// session no longer matches the current load, meaning the queue was
    /// replaced while this notification was in flight; such stale endings
    /// are discarded.
    pub fn handle_ended(&self, session: AudioSessionId) {
        self.step(Step::Forward, Some(session));
    }

    /// Empty the queue and silence the output at session teardown.
    pub fn clear(&self) {
        {
            let mut state = self.inner.state.lock();
            let EngineState { queue, rng, .. } = &mut *state;
            queue.load(Vec::new(), 0, rng);
            state.is_playing = false;
            state.session = None;
        }
        self.inner.driver.pause();
        self.inner.emit(PlaybackEvent::Cleared);
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let state = self.inner.state.lock();
        PlaybackSnapshot {
            songs: state.queue.songs().to_vec(),
            current_index: state.queue.current_index(),
            current_song: state.queue.current_song().cloned(),
            is_playing: state.is_playing,
            shuffle_enabled: state.queue.shuffle_enabled(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.inner.state.lock().is_playing
    }

    pub fn current_index(&self) -> Option<usize> {
        self.inner.state.lock().queue.current_index()
    }

    pub fn current_song(&self) -> Option<Song> {
        self.inner.state.lock().queue.current_song().cloned()
    }

    pub fn shuffle_enabled(&self) -> bool {
        self.inner.state.lock().queue.shuffle_enabled()
    }

    /// The play order currently in effect.
    pub fn play_order(&self) -> Vec<usize> {
        self.inner.state.lock().queue.play_order().to_vec()
    }

    /// Session id of the current load; the host hands it back with the
    /// driver's "ended" notification.
    pub fn current_session(&self) -> Option<AudioSessionId> {
        self.inner.state.lock().session
    }

    pub fn queue_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }
}
