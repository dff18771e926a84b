//! DNS target selection
//!
//! Decides which plaintext DNS server the resolver should use from the
//! resolved DNS settings. Applying the choice (resolver configuration,
//! `/etc/resolv.conf`) belongs to the DNS loop, not to this crate.

pub mod providers;

use std::net::{IpAddr, Ipv4Addr};

use log::info;

use crate::config::{Dns, Resolved};
use self::providers::PROVIDERS;

/// Plaintext DNS server to use when DNS over TLS is off or has failed
///
/// The configured server address is used unless it is the loopback
/// sentinel `127.0.0.1`, in which case the first plaintext IPv4 address of
/// the first configured provider is used instead.
pub fn plaintext_target(settings: &Resolved<Dns>, fallback: bool) -> IpAddr {
    let target = select_plaintext_target(settings);

    if fallback {
        info!("falling back on plaintext DNS at address {}", target);
    } else {
        info!("using plaintext DNS at address {}", target);
    }

    target
}

fn select_plaintext_target(settings: &Resolved<Dns>) -> IpAddr {
    let configured = settings.server_address();
    if configured != IpAddr::V4(Ipv4Addr::LOCALHOST) {
        return configured;
    }

    // Providers were validated, the default provider only covers settings
    // built without validation.
    let provider = settings
        .providers()
        .first()
        .and_then(|name| PROVIDERS.get(name))
        .unwrap_or_else(|| PROVIDERS.default_provider());

    IpAddr::V4(provider.first_plaintext_ipv4())
}
