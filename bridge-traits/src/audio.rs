//! Audio output abstraction.
//!
//! The host owns exactly one playable-media primitive for the process
//! lifetime (an HTML audio element, a native output stream, ...). This module
//! wraps it behind a deliberately narrow interface: load a source, play,
//! pause. Commands are fire-and-forget; the only feedback the core consumes
//! is the host-delivered "ended" notification, which must carry the
//! [`AudioSessionId`] of the load it belongs to so that notifications for a
//! superseded queue can be told apart from current ones.

use std::fmt;
use uuid::Uuid;

/// Identifier minted for every source loaded into the output primitive.
///
/// A fresh id per load lets the playback engine discard "ended"
/// notifications that logically belong to a queue it has since replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AudioSessionId(Uuid);

impl AudioSessionId {
    /// Generate a new session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AudioSessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AudioSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for the single host audio-output primitive.
///
/// All methods are fire-and-forget: the core updates its own state
/// synchronously and does not wait for the host to act. Implementations
/// must tolerate `play`/`pause` arriving before any `load`.
///
/// Only the playback engine may call these methods; handing the driver to
/// anything else risks two simultaneous audio streams.
pub trait AudioOutput: Send + Sync {
    /// Point the output at a new source. The session id identifies this
    /// load in later "ended" notifications.
    fn load(&self, session: AudioSessionId, url: &str);

    /// Begin or resume output of the loaded source.
    fn play(&self);

    /// Pause output without releasing the loaded source.
    fn pause(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_is_unique() {
        let a = AudioSessionId::new();
        let b = AudioSessionId::new();
        assert_ne!(a, b);
        assert_eq!(a, AudioSessionId::from_uuid(*a.as_uuid()));
    }
}
