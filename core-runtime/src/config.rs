//! # Core Configuration Module
//!
//! Builder-pattern configuration for the client core. A [`CoreConfig`]
//! bundles the settings and host bridge handles every store needs; the
//! builder enforces fail-fast validation so a missing capability surfaces at
//! startup with an actionable message instead of as a latent panic.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - catalog and favorites traffic
//! - `AudioOutput` - the single playable-media primitive
//! - `IdentityProvider` - the signed-in user, or none
//! - `NotificationSink` - user-visible success/error notices
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://api.example.com")
//!     .http_client(Arc::new(MyHttpClient))
//!     .audio_output(Arc::new(MyAudioOutput))
//!     .identity(Arc::new(MyIdentity))
//!     .notifications(Arc::new(MyToasts))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{AudioOutput, HttpClient, IdentityProvider, NotificationSink};
use std::sync::Arc;

/// Configuration for the client core.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the catalog backend, without a trailing slash.
    pub api_base_url: String,

    /// Event bus buffer capacity per subscriber.
    pub event_buffer: usize,

    /// HTTP bridge for all backend traffic.
    pub http_client: Arc<dyn HttpClient>,

    /// The single audio-output primitive.
    pub audio_output: Arc<dyn AudioOutput>,

    /// Current-user lookup.
    pub identity: Arc<dyn IdentityProvider>,

    /// User-visible notice sink.
    pub notifications: Arc<dyn NotificationSink>,
}

impl CoreConfig {
    /// Start building a configuration.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    event_buffer: Option<usize>,
    http_client: Option<Arc<dyn HttpClient>>,
    audio_output: Option<Arc<dyn AudioOutput>>,
    identity: Option<Arc<dyn IdentityProvider>>,
    notifications: Option<Arc<dyn NotificationSink>>,
}

impl CoreConfigBuilder {
    /// Base URL of the catalog backend. A trailing slash is stripped.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Event bus buffer capacity (defaults to
    /// [`DEFAULT_EVENT_BUFFER_SIZE`]).
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn audio_output(mut self, output: Arc<dyn AudioOutput>) -> Self {
        self.audio_output = Some(output);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn notifications(mut self, notifications: Arc<dyn NotificationSink>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a missing or empty base URL and
    /// [`Error::CapabilityMissing`] for each absent bridge handle.
    pub fn build(self) -> Result<CoreConfig> {
        let api_base_url = self
            .api_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                Error::InvalidConfig("api_base_url must be set and non-empty".to_string())
            })?;

        let http_client = self.http_client.ok_or_else(|| capability_missing(
            "HttpClient",
            "No HTTP client provided. Desktop hosts can inject bridge_desktop::ReqwestHttpClient.",
        ))?;

        let audio_output = self.audio_output.ok_or_else(|| {
            capability_missing(
                "AudioOutput",
                "No audio output provided. Wrap the host's playable-media primitive.",
            )
        })?;

        let identity = self.identity.ok_or_else(|| {
            capability_missing(
                "IdentityProvider",
                "No identity provider given. Use bridge_traits::StaticIdentity if the host \
                 manages sessions elsewhere.",
            )
        })?;

        let notifications = self.notifications.ok_or_else(|| {
            capability_missing(
                "NotificationSink",
                "No notification sink given. Use bridge_traits::ConsoleNotifier for development.",
            )
        })?;

        Ok(CoreConfig {
            api_base_url,
            event_buffer: self.event_buffer.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            http_client,
            audio_output,
            identity,
            notifications,
        })
    }
}

fn capability_missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{
        audio::AudioSessionId, ConsoleNotifier, HttpRequest, HttpResponse, StaticIdentity,
    };

    struct NoopHttp;

    #[async_trait::async_trait]
    impl HttpClient for NoopHttp {
        async fn execute(&self, _request: HttpRequest) -> bridge_traits::error::Result<HttpResponse> {
            Err(bridge_traits::BridgeError::NotAvailable("noop".to_string()))
        }
    }

    struct NoopAudio;

    impl AudioOutput for NoopAudio {
        fn load(&self, _session: AudioSessionId, _url: &str) {}
        fn play(&self) {}
        fn pause(&self) {}
    }

    fn full_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .api_base_url("https://api.example.com/")
            .http_client(Arc::new(NoopHttp))
            .audio_output(Arc::new(NoopAudio))
            .identity(Arc::new(StaticIdentity::default()))
            .notifications(Arc::new(ConsoleNotifier))
    }

    #[test]
    fn test_build_succeeds_with_all_bridges() {
        let config = full_builder().build().unwrap();
        // Trailing slash is normalized away.
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.event_buffer, DEFAULT_EVENT_BUFFER_SIZE);
    }

    #[test]
    fn test_missing_base_url_rejected() {
        let result = CoreConfig::builder()
            .http_client(Arc::new(NoopHttp))
            .audio_output(Arc::new(NoopAudio))
            .identity(Arc::new(StaticIdentity::default()))
            .notifications(Arc::new(ConsoleNotifier))
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_audio_output_named_in_error() {
        let result = CoreConfig::builder()
            .api_base_url("https://api.example.com")
            .http_client(Arc::new(NoopHttp))
            .identity(Arc::new(StaticIdentity::default()))
            .notifications(Arc::new(ConsoleNotifier))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "AudioOutput");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_custom_event_buffer() {
        let config = full_builder().event_buffer(7).build().unwrap();
        assert_eq!(config.event_buffer, 7);
    }
}
