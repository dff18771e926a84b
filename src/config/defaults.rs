//! Default configuration values
//!
//! Single source of truth for the values filled in by the defaulting pass
//! of each settings category.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Directory secret files are looked up in when no explicit path is set
pub const SECRETS_DIR: &str = "/run/secrets";

/// Suffix of the environment variables holding explicit secret file paths
pub const SECRET_FILE_SUFFIX: &str = "_SECRETFILE";

// HTTP proxy

/// Default HTTP proxy listening address
pub const HTTP_PROXY_LISTENING_ADDRESS: &str = ":8888";

/// Default HTTP header read timeout
pub const HTTP_PROXY_READ_HEADER_TIMEOUT: Duration = Duration::from_secs(1);

/// Default HTTP read timeout
pub const HTTP_PROXY_READ_TIMEOUT: Duration = Duration::from_secs(3);

// Firewall

/// The firewall is on unless explicitly disabled
pub const FIREWALL_ENABLED: bool = true;

// System

/// Default process user ID
pub const PUID: u32 = 1000;

/// Default process group ID
pub const PGID: u32 = 1000;

// DNS

/// Loopback sentinel meaning "no plaintext DNS server configured"
pub const DNS_SERVER_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// DNS over TLS is on unless explicitly disabled
pub const DOT_ENABLED: bool = true;

/// Provider used when no DNS over TLS provider is configured
pub const DOT_PROVIDER: &str = "cloudflare";
