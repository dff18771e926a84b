//! Tunnel Settings: settings resolution for a VPN gateway
//!
//! This library collects the gateway settings from environment variables and
//! secret files, combines them in priority order, fills in defaults and
//! validates the result. The resolved settings can be rendered as a
//! redacted summary for diagnostics.
//!
//! # Main Features
//!
//! - Environment variables with support for their deprecated names
//! - Secret files, including PEM certificates and keys
//! - Override and merge policies with compiled-in defaults
//! - Validation of addresses, ports and IDs against the process privileges
//! - Tree and JSON summaries with secrets redacted
//!
//! # Example
//!
//! ```no_run
//! use tunnel_settings::config::{EnvSource, SettingsBuilder};
//! use tunnel_settings::Result;
//!
//! fn main() -> Result<()> {
//!     let env = EnvSource::from_process();
//!     let settings = SettingsBuilder::new()
//!         .with_env(env.clone())
//!         .with_secrets(env, "/run/secrets")
//!         .build()?;
//!
//!     println!("{}", settings);
//!
//!     if settings.http_proxy().enabled() {
//!         println!("HTTP proxy on {}", settings.http_proxy().listening_address());
//!     }
//!
//!     Ok(())
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod dns;
pub mod splash;

// Re-export commonly used structures and functions for convenience
pub use common::{Error, Result};
pub use config::{Resolved, Settings, SettingsBuilder};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
