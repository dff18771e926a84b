//! Configuration module
//!
//! This module resolves the service settings: partial settings are read from
//! sources (environment variables, secret files), combined in priority
//! order, completed with defaults and validated. The result is a
//! [`Resolved`] value that can be rendered as a redacted summary and handed
//! to the subsystems that consume it.
//!
//! Every settings category implements [`SettingsEntity`]:
//!
//! - `merge_with` fills the fields still unset from another value
//! - `override_with` replaces the fields set in another value
//! - `set_defaults` fills whatever is still unset
//! - `validate` checks the resolved values
//! - `to_lines_node` renders the category as a tree, secrets redacted
//!
//! `Clone` is the deep copy used to hand settings over.

// Submodules
pub mod builder;
pub mod defaults;
pub mod error;
pub mod merger;
pub mod parse;
pub mod redact;
pub mod secrets;
pub mod source;
pub mod tree;
pub mod validator;

mod dns;
mod firewall;
mod httpproxy;
mod system;
mod vpn;

// Re-export types and traits
pub use self::builder::SettingsBuilder;
pub use self::dns::Dns;
pub use self::error::{ConfigError, Result};
pub use self::firewall::Firewall;
pub use self::httpproxy::HttpProxy;
pub use self::secrets::SecretsSource;
pub use self::source::{EnvSource, SettingsSource};
pub use self::system::System;
pub use self::tree::LinesNode;
pub use self::validator::{FixedPrivileges, PrivilegeContext, ProcessPrivileges};
pub use self::vpn::Vpn;

use std::fmt;
use std::ops::Deref;

use serde::Serialize;

use self::merger::resolved;

/// Operations shared by every settings category
pub trait SettingsEntity: Clone + Default {
    /// Category name used in errors and logs
    const CATEGORY: &'static str;

    /// Fill every unset field from `other`
    fn merge_with(&mut self, other: Self);

    /// Replace every field set in `other`
    fn override_with(&mut self, other: Self);

    /// Fill every unset field with its default value
    fn set_defaults(&mut self);

    /// Names of the fields still unset
    fn missing_fields(&self) -> Vec<&'static str>;

    /// Check the settings, which must have no unset field
    fn validate(&self, privileges: &dyn PrivilegeContext) -> Result<()>;

    /// Render the settings as a tree, secrets redacted
    fn to_lines_node(&self) -> LinesNode;

    /// Fail on the first unset field
    fn ensure_resolved(&self) -> Result<()> {
        match self.missing_fields().first().copied() {
            Some(field) => Err(ConfigError::Unresolved {
                category: Self::CATEGORY,
                field,
            }),
            None => Ok(()),
        }
    }
}

/// Settings with every field set and validated
///
/// Can only be built through [`Resolved::new`], so the accessors defined
/// per category never see an unset field. There is no mutable access: share
/// it behind an `Arc` or clone it for an independent copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Resolved<T>(T);

impl<T: SettingsEntity> Resolved<T> {
    /// Validate settings and mark them as resolved
    pub fn new(settings: T, privileges: &dyn PrivilegeContext) -> Result<Self> {
        settings.validate(privileges)?;
        Ok(Self(settings))
    }

    /// Give back the underlying settings
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> Resolved<T> {
    /// JSON view of the settings, secrets redacted
    pub fn to_redacted_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.0)
    }
}

impl<T> Deref for Resolved<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: fmt::Display> fmt::Display for Resolved<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Combine fragments, lowest priority first, then default and validate
pub fn resolve<T: SettingsEntity>(
    fragments: impl IntoIterator<Item = T>,
    privileges: &dyn PrivilegeContext,
) -> Result<Resolved<T>> {
    let mut settings = T::default();
    for fragment in fragments {
        settings.override_with(fragment);
    }
    settings.set_defaults();
    Resolved::new(settings, privileges)
}

/// All settings of the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub http_proxy: HttpProxy,
    pub firewall: Firewall,
    pub system: System,
    pub dns: Dns,
    pub vpn: Vpn,
}

impl SettingsEntity for Settings {
    const CATEGORY: &'static str = "All";

    fn merge_with(&mut self, other: Self) {
        self.http_proxy.merge_with(other.http_proxy);
        self.firewall.merge_with(other.firewall);
        self.system.merge_with(other.system);
        self.dns.merge_with(other.dns);
        self.vpn.merge_with(other.vpn);
    }

    fn override_with(&mut self, other: Self) {
        self.http_proxy.override_with(other.http_proxy);
        self.firewall.override_with(other.firewall);
        self.system.override_with(other.system);
        self.dns.override_with(other.dns);
        self.vpn.override_with(other.vpn);
    }

    fn set_defaults(&mut self) {
        self.http_proxy.set_defaults();
        self.firewall.set_defaults();
        self.system.set_defaults();
        self.dns.set_defaults();
        self.vpn.set_defaults();
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = self.http_proxy.missing_fields();
        missing.extend(self.firewall.missing_fields());
        missing.extend(self.system.missing_fields());
        missing.extend(self.dns.missing_fields());
        missing.extend(self.vpn.missing_fields());
        missing
    }

    // Errors name the category owning the field.
    fn ensure_resolved(&self) -> Result<()> {
        self.http_proxy.ensure_resolved()?;
        self.firewall.ensure_resolved()?;
        self.system.ensure_resolved()?;
        self.dns.ensure_resolved()?;
        self.vpn.ensure_resolved()
    }

    fn validate(&self, privileges: &dyn PrivilegeContext) -> Result<()> {
        self.ensure_resolved()?;
        self.http_proxy.validate(privileges)?;
        self.firewall.validate(privileges)?;
        self.system.validate(privileges)?;
        self.dns.validate(privileges)?;
        self.vpn.validate(privileges)
    }

    fn to_lines_node(&self) -> LinesNode {
        let mut node = LinesNode::new("Settings summary:");
        node.append_node(self.vpn.to_lines_node());
        node.append_node(self.dns.to_lines_node());
        node.append_node(self.firewall.to_lines_node());
        node.append_node(self.http_proxy.to_lines_node());
        node.append_node(self.system.to_lines_node());
        node
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_lines_node().fmt(f)
    }
}

// Each accessor hands out an independent copy of one category.
impl Resolved<Settings> {
    pub fn http_proxy(&self) -> Resolved<HttpProxy> {
        Resolved(self.0.http_proxy.clone())
    }

    pub fn firewall(&self) -> Resolved<Firewall> {
        Resolved(self.0.firewall.clone())
    }

    pub fn system(&self) -> Resolved<System> {
        Resolved(self.0.system.clone())
    }

    pub fn dns(&self) -> Resolved<Dns> {
        Resolved(self.0.dns.clone())
    }

    pub fn vpn(&self) -> Resolved<Vpn> {
        Resolved(self.0.vpn.clone())
    }

    /// Whether any server must listen on a privileged port
    pub fn needs_root(&self) -> bool {
        let http_proxy = &self.0.http_proxy;
        *resolved(&http_proxy.enabled, "enabled")
            && resolved(&http_proxy.listening_address, "listening address")
                .rsplit_once(':')
                .and_then(|(_, port)| port.parse::<u16>().ok())
                .is_some_and(|port| port < validator::PRIVILEGED_PORT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial() -> Settings {
        let mut settings = Settings::default();
        settings.firewall.debug = Some(true);
        settings.system.puid = Some(0);
        settings.http_proxy.user = Some("a".to_string());
        settings
    }

    #[test]
    fn test_merge_keeps_receiver_fields() {
        let mut a = partial();
        let mut b = Settings::default();
        b.firewall.debug = Some(false);
        b.firewall.enabled = Some(false);
        b.system.puid = Some(1);
        b.system.pgid = Some(2);

        a.merge_with(b);
        assert_eq!(a.firewall.debug, Some(true));
        assert_eq!(a.firewall.enabled, Some(false));
        assert_eq!(a.system.puid, Some(0));
        assert_eq!(a.system.pgid, Some(2));
    }

    #[test]
    fn test_override_replaces_set_fields_only() {
        let mut a = partial();
        let mut b = Settings::default();
        b.system.puid = Some(1);

        a.override_with(b);
        assert_eq!(a.system.puid, Some(1));
        assert_eq!(a.firewall.debug, Some(true));
        assert_eq!(a.http_proxy.user.as_deref(), Some("a"));
    }

    #[test]
    fn test_defaults_complete_and_idempotent() {
        let mut once = partial();
        assert!(!once.missing_fields().is_empty());
        once.set_defaults();
        assert!(once.missing_fields().is_empty());

        let mut twice = once.clone();
        twice.set_defaults();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unresolved_error_names_category() {
        let mut settings = Settings::default();
        settings.set_defaults();
        settings.system.timezone = None;

        let err = settings.validate(&FixedPrivileges(0)).unwrap_err();
        assert!(matches!(err, ConfigError::Unresolved { category: "System", field: "timezone" }));
    }

    #[test]
    fn test_resolve_fragments_in_priority_order() {
        let low = System {
            puid: Some(1),
            pgid: Some(1),
            ..Default::default()
        };
        let high = System {
            puid: Some(2),
            ..Default::default()
        };

        let resolved = resolve(vec![low, high], &FixedPrivileges(1000)).unwrap();
        assert_eq!(resolved.puid(), 2);
        assert_eq!(resolved.pgid(), 1);
        assert_eq!(resolved.timezone(), "");
    }

    #[test]
    fn test_resolved_copies_are_independent() {
        let settings = resolve(vec![partial()], &FixedPrivileges(0)).unwrap();
        let copy = settings.clone().into_inner();
        let mut modified = copy.clone();
        modified.system.puid = Some(42);

        assert_eq!(modified.system.puid, Some(42));
        assert_eq!(settings.system().puid(), 0);
        assert_eq!(copy.system.puid, Some(0));
    }

    #[test]
    fn test_needs_root() {
        let mut settings = Settings::default();
        settings.http_proxy.enabled = Some(true);
        settings.http_proxy.listening_address = Some(":80".to_string());
        let resolved = resolve(vec![settings], &FixedPrivileges(0)).unwrap();
        assert!(resolved.needs_root());

        let resolved = resolve(vec![Settings::default()], &FixedPrivileges(0)).unwrap();
        assert!(!resolved.needs_root());
    }

    #[test]
    fn test_summary_tree() {
        let settings = resolve(vec![partial()], &FixedPrivileges(0)).unwrap();
        let node = settings.to_lines_node();
        assert_eq!(node.line(), "Settings summary:");
        let categories: Vec<&str> = node.children().iter().map(|c| c.line()).collect();
        assert_eq!(
            categories,
            vec![
                "VPN client settings:",
                "DNS settings:",
                "Firewall settings:",
                "HTTP proxy settings:",
                "System settings:",
            ]
        );
    }

    #[test]
    fn test_resolved_accessors_borrow_fields() {
        let mut settings = Settings::default();
        settings.http_proxy.user = Some("alice".to_string());
        settings.http_proxy.password = Some("hunter2".to_string());
        settings.firewall.vpn_input_ports = Some(vec![1194]);
        settings.firewall.outbound_subnets = Some(vec!["10.0.0.0/8".parse().unwrap()]);
        settings.system.timezone = Some("UTC".to_string());
        settings.dns.providers = Some(vec!["quad9".to_string()]);
        settings.vpn.user = Some("p1234567".to_string());
        let resolved = resolve(vec![settings], &FixedPrivileges(1000)).unwrap();

        let http_proxy = resolved.http_proxy();
        assert_eq!(http_proxy.user(), "alice");
        assert_eq!(http_proxy.password(), "hunter2");
        assert_eq!(http_proxy.cert_file(), "");
        assert_eq!(http_proxy.key_file(), "");
        assert_eq!(http_proxy.listening_address(), ":8888");

        let firewall = resolved.firewall();
        assert_eq!(firewall.vpn_input_ports(), &[1194]);
        assert!(firewall.input_ports().is_empty());
        assert_eq!(firewall.outbound_subnets()[0].to_string(), "10.0.0.0/8");

        assert_eq!(resolved.system().timezone(), "UTC");
        assert_eq!(resolved.dns().providers(), &["quad9".to_string()]);

        let vpn = resolved.vpn();
        assert_eq!(vpn.user(), "p1234567");
        assert_eq!(vpn.password(), "");
        assert_eq!(vpn.client_crt(), "");
        assert_eq!(vpn.client_key(), "");
    }

    #[test]
    fn test_redacted_json() {
        let mut settings = Settings::default();
        settings.http_proxy.password = Some("hunter2".to_string());
        let resolved = resolve(vec![settings], &FixedPrivileges(0)).unwrap();

        let json = resolved.to_redacted_json().unwrap();
        assert!(!json.contains("hunter2"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["http_proxy"]["password"], "[set]");
        assert_eq!(value["http_proxy"]["read_timeout"], "3s");
        assert_eq!(value["firewall"]["enabled"], true);
    }
}
