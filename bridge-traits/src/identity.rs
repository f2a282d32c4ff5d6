//! Identity abstraction.
//!
//! Session and login lifecycle belong to the host; the core only ever asks
//! "who is signed in right now, if anyone" and gates favorite mutations on
//! the answer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::RwLock;

/// Opaque server-assigned user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supplies the current signed-in identity, or none.
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, if any. Cheap; may be called on every mutation.
    fn current_user(&self) -> Option<UserId>;
}

/// In-memory identity holder for hosts and tests.
///
/// Hosts that manage their own session state can update this from their
/// auth flow; tests flip it directly.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    user: RwLock<Option<UserId>>,
}

impl StaticIdentity {
    pub fn new(user: Option<UserId>) -> Self {
        Self {
            user: RwLock::new(user),
        }
    }

    pub fn signed_in(id: impl Into<String>) -> Self {
        Self::new(Some(UserId::new(id)))
    }

    pub fn set_user(&self, user: Option<UserId>) {
        *self.user.write().expect("identity lock poisoned") = user;
    }
}

impl IdentityProvider for StaticIdentity {
    fn current_user(&self) -> Option<UserId> {
        self.user.read().expect("identity lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_identity_roundtrip() {
        let identity = StaticIdentity::default();
        assert!(identity.current_user().is_none());

        identity.set_user(Some(UserId::new("user-1")));
        assert_eq!(identity.current_user(), Some(UserId::new("user-1")));

        identity.set_user(None);
        assert!(identity.current_user().is_none());
    }
}
