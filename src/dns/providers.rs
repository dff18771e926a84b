//! DNS over TLS providers and their plaintext fallback addresses

use std::net::Ipv4Addr;

use once_cell::sync::Lazy;

use crate::config::defaults;

/// A DNS over TLS provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    pub name: &'static str,
    /// Host name presented in the provider's TLS certificate
    pub tls_name: &'static str,
    plaintext_ipv4: Vec<Ipv4Addr>,
}

impl Provider {
    /// Create a provider.
    ///
    /// # Panics
    ///
    /// Panics when `plaintext_ipv4` is empty.
    pub fn new(name: &'static str, tls_name: &'static str, plaintext_ipv4: Vec<Ipv4Addr>) -> Self {
        assert!(
            !plaintext_ipv4.is_empty(),
            "DNS provider {} has no plaintext IPv4 address",
            name
        );
        Self {
            name,
            tls_name,
            plaintext_ipv4,
        }
    }

    /// Plaintext IPv4 addresses of the provider
    pub fn plaintext_ipv4(&self) -> &[Ipv4Addr] {
        &self.plaintext_ipv4
    }

    /// First plaintext IPv4 address; every provider has one
    pub fn first_plaintext_ipv4(&self) -> Ipv4Addr {
        self.plaintext_ipv4[0]
    }
}

/// Provider lookup table with a guaranteed default entry
#[derive(Debug)]
pub struct ProviderTable {
    providers: Vec<Provider>,
    default_index: usize,
}

impl ProviderTable {
    /// Build a table.
    ///
    /// # Panics
    ///
    /// Panics when the default provider is missing from `providers`.
    pub fn new(providers: Vec<Provider>, default: &str) -> Self {
        let default_index = providers
            .iter()
            .position(|provider| provider.name == default)
            .unwrap_or_else(|| panic!("default DNS provider {} is missing from the provider table", default));

        Self {
            providers,
            default_index,
        }
    }

    /// Look a provider up by name, case-insensitively
    pub fn get(&self, name: &str) -> Option<&Provider> {
        self.providers
            .iter()
            .find(|provider| provider.name.eq_ignore_ascii_case(name))
    }

    pub fn default_provider(&self) -> &Provider {
        &self.providers[self.default_index]
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|provider| provider.name).collect()
    }
}

/// Built-in providers
pub static PROVIDERS: Lazy<ProviderTable> = Lazy::new(|| {
    ProviderTable::new(
        vec![
            Provider::new(
                "cloudflare",
                "cloudflare-dns.com",
                vec![Ipv4Addr::new(1, 1, 1, 1), Ipv4Addr::new(1, 0, 0, 1)],
            ),
            Provider::new(
                "google",
                "dns.google",
                vec![Ipv4Addr::new(8, 8, 8, 8), Ipv4Addr::new(8, 8, 4, 4)],
            ),
            Provider::new(
                "quad9",
                "dns.quad9.net",
                vec![Ipv4Addr::new(9, 9, 9, 9), Ipv4Addr::new(149, 112, 112, 112)],
            ),
            Provider::new(
                "cira",
                "protected.canadianshield.cira.ca",
                vec![Ipv4Addr::new(149, 112, 121, 20), Ipv4Addr::new(149, 112, 122, 20)],
            ),
            Provider::new(
                "opendns",
                "dns.opendns.com",
                vec![Ipv4Addr::new(208, 67, 222, 222), Ipv4Addr::new(208, 67, 220, 220)],
            ),
        ],
        defaults::DOT_PROVIDER,
    )
});
