//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the client core:
//! - Event bus system for reactive store-to-UI notification
//! - Logging and tracing infrastructure
//! - Configuration management with fail-fast bridge validation
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the store crates depend on. It
//! establishes the event broadcasting mechanism, logging conventions, and
//! dependency-injection shape used throughout the system.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus};
