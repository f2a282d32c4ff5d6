//! # Core Favorites
//!
//! The per-user favorites store. Toggles are optimistic: the local flip is
//! visible immediately, the backend confirms afterwards, and failures roll
//! back, reconciled so that the displayed state always reflects the most
//! recent user intent, never a late acknowledgment of an older one.

pub mod error;
pub mod ledger;

pub use error::{FavoritesError, Result};
pub use ledger::FavoritesLedger;
