//! DNS settings

use std::fmt;
use std::net::IpAddr;

use serde::Serialize;

use crate::config::defaults;
use crate::config::error::{ConfigError, Result};
use crate::config::merger::{default_field, merge_field, override_field, push_missing, resolved};
use crate::config::tree::{bool_to_yes_no, list_or_none, or_not_set, LinesNode};
use crate::config::validator::PrivilegeContext;
use crate::config::{Resolved, SettingsEntity};
use crate::dns::providers::PROVIDERS;

/// Settings of the DNS resolution used by the tunnel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dns {
    /// Resolve through DNS over TLS instead of plaintext DNS
    pub dot_enabled: Option<bool>,
    /// Plaintext DNS server; the loopback sentinel means "use the provider's"
    pub server_address: Option<IpAddr>,
    /// Leave the existing nameserver in the system resolver configuration
    pub keep_nameserver: Option<bool>,
    /// DNS over TLS provider names, in order of preference
    pub providers: Option<Vec<String>>,
}

impl SettingsEntity for Dns {
    const CATEGORY: &'static str = "DNS";

    fn merge_with(&mut self, other: Self) {
        self.dot_enabled = merge_field(self.dot_enabled, other.dot_enabled);
        self.server_address = merge_field(self.server_address, other.server_address);
        self.keep_nameserver = merge_field(self.keep_nameserver, other.keep_nameserver);
        self.providers = merge_field(self.providers.take(), other.providers);
    }

    fn override_with(&mut self, other: Self) {
        self.dot_enabled = override_field(self.dot_enabled, other.dot_enabled);
        self.server_address = override_field(self.server_address, other.server_address);
        self.keep_nameserver = override_field(self.keep_nameserver, other.keep_nameserver);
        self.providers = override_field(self.providers.take(), other.providers);
    }

    fn set_defaults(&mut self) {
        self.dot_enabled = default_field(self.dot_enabled, defaults::DOT_ENABLED);
        self.server_address = default_field(self.server_address, defaults::DNS_SERVER_ADDRESS);
        self.keep_nameserver = default_field(self.keep_nameserver, false);
        self.providers = default_field(
            self.providers.take().filter(|providers| !providers.is_empty()),
            vec![defaults::DOT_PROVIDER.to_string()],
        );
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        push_missing(&mut missing, &self.dot_enabled, "DNS over TLS");
        push_missing(&mut missing, &self.server_address, "server address");
        push_missing(&mut missing, &self.keep_nameserver, "keep nameserver");
        push_missing(&mut missing, &self.providers, "providers");
        missing
    }

    fn validate(&self, _privileges: &dyn PrivilegeContext) -> Result<()> {
        self.ensure_resolved()?;

        let providers = self.providers.as_deref().unwrap_or_default();
        if providers.is_empty() {
            return Err(ConfigError::validation(Self::CATEGORY, "providers", "at least one provider is required"));
        }
        if let Some(unknown) = providers.iter().find(|name| PROVIDERS.get(name).is_none()) {
            return Err(ConfigError::validation(
                Self::CATEGORY,
                "providers",
                format!("unknown provider {:?}, valid providers are: {}", unknown, PROVIDERS.names().join(", ")),
            ));
        }

        Ok(())
    }

    fn to_lines_node(&self) -> LinesNode {
        let mut node = LinesNode::new("DNS settings:");
        node.append(format!("DNS over TLS: {}", bool_to_yes_no(self.dot_enabled)));
        if self.dot_enabled == Some(true) {
            node.append(format!("Providers: {}", list_or_none(self.providers.as_ref())));
        }
        node.append(format!("Plaintext address: {}", or_not_set(self.server_address.as_ref())));
        node.append(format!("Keep nameserver: {}", bool_to_yes_no(self.keep_nameserver)));
        node
    }
}

impl fmt::Display for Dns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_lines_node().fmt(f)
    }
}

impl Resolved<Dns> {
    pub fn dot_enabled(&self) -> bool {
        *resolved(&self.dot_enabled, "DNS over TLS")
    }

    pub fn server_address(&self) -> IpAddr {
        *resolved(&self.server_address, "server address")
    }

    pub fn keep_nameserver(&self) -> bool {
        *resolved(&self.keep_nameserver, "keep nameserver")
    }

    pub fn providers(&self) -> &[String] {
        resolved(&self.providers, "providers").as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validator::FixedPrivileges;

    #[test]
    fn test_defaults() {
        let mut dns = Dns::default();
        dns.set_defaults();
        assert!(dns.missing_fields().is_empty());
        assert_eq!(dns.server_address, Some("127.0.0.1".parse().unwrap()));
        assert_eq!(dns.providers, Some(vec!["cloudflare".to_string()]));
        assert!(dns.validate(&FixedPrivileges(1000)).is_ok());
    }

    #[test]
    fn test_empty_provider_list_is_defaulted() {
        let mut dns = Dns {
            providers: Some(vec![]),
            ..Default::default()
        };
        dns.set_defaults();
        assert_eq!(dns.providers, Some(vec!["cloudflare".to_string()]));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut dns = Dns {
            providers: Some(vec!["google".to_string(), "nope".to_string()]),
            ..Default::default()
        };
        dns.set_defaults();
        let err = dns.validate(&FixedPrivileges(1000)).unwrap_err();
        assert!(err.to_string().contains("\"nope\""));
    }

    #[test]
    fn test_render_plaintext_only() {
        let mut dns = Dns {
            dot_enabled: Some(false),
            server_address: Some("9.9.9.9".parse().unwrap()),
            ..Default::default()
        };
        dns.set_defaults();
        let rendered = dns.to_string();
        assert!(!rendered.contains("Providers"));
        assert!(rendered.contains("Plaintext address: 9.9.9.9"));
    }
}
