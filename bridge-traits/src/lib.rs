//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host.
//!
//! ## Overview
//!
//! This crate defines the contract between the core stores and the
//! platform-specific world they live in. Each trait represents a capability
//! the core requires but cannot own itself:
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations against the
//!   catalog backend
//! - [`AudioOutput`](audio::AudioOutput) - The single playable-media
//!   primitive (load/play/pause), commanded fire-and-forget
//! - [`IdentityProvider`](identity::IdentityProvider) - The signed-in user,
//!   or none; the core never manages session lifecycle
//! - [`NotificationSink`](notify::NotificationSink) - Human-readable
//!   success/error notices for user-initiated actions
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Platform
//! implementations should convert their native errors into it and keep the
//! messages actionable.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! across async tasks behind `Arc`.

pub mod audio;
pub mod error;
pub mod http;
pub mod identity;
pub mod notify;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::{AudioOutput, AudioSessionId};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use identity::{IdentityProvider, StaticIdentity, UserId};
pub use notify::{ConsoleNotifier, Notice, NoticeLevel, NotificationSink};
