//! Desktop bridge implementations.
//!
//! Concrete adapters for the capabilities a desktop host can satisfy out of
//! the box. Currently that is the HTTP client; the audio output, identity,
//! and notification bridges are host-app specific and injected by the
//! embedding application.

pub mod http;

pub use http::ReqwestHttpClient;
