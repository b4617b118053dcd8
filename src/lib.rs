//! nmapplet - NetworkManager applet core.
//!
//! The parts of a NetworkManager tray applet that do not draw anything:
//!
//! - A deduplicated Wi-Fi network menu that merges access points sharing an
//!   SSID and security profile into one entry
//! - A secrets agent answering the daemon's GetSecrets, SaveSecrets and
//!   DeleteSecrets calls from the Secret Service keyring
//! - TOML configuration and structured logging for the `nmapplet` binary
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use nmapplet::services::{
//!     network_manager::connection::MemoryConnectionStore,
//!     secrets::{
//!         FilePrivateKeyLoader, HeadlessPrompt, KeyringSecretsResolver, ResolverParts,
//!         SecretAgent, keyring::MemorySecretStore,
//!     },
//! };
//!
//! let resolver = KeyringSecretsResolver::new(
//!     ResolverParts {
//!         secrets: Arc::new(MemorySecretStore::new()),
//!         prompt: Arc::new(HeadlessPrompt),
//!         connections: Arc::new(MemoryConnectionStore::new()),
//!         private_keys: Arc::new(FilePrivateKeyLoader),
//!     },
//!     true,
//! );
//! let agent = SecretAgent::new(resolver);
//! assert!(agent.registry().is_empty());
//! ```

/// Configuration schema definitions and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Network menu and secrets agent services.
pub mod services;

/// Logging setup for the binary.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{AppletError, Result};
