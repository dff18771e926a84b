//! HTTP proxy settings

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::config::defaults;
use crate::config::error::{ConfigError, Result};
use crate::config::merger::{default_field, merge_field, override_field, push_missing, resolved};
use crate::config::parse::format_duration;
use crate::config::redact;
use crate::config::tree::{bool_to_yes_no, obfuscate, or_not_set, LinesNode};
use crate::config::validator::{validate_listening_address, PrivilegeContext};
use crate::config::{Resolved, SettingsEntity};

/// Settings of the HTTP proxy server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HttpProxy {
    /// Username clients must authenticate with, empty for no authentication
    pub user: Option<String>,
    /// Password clients must authenticate with
    #[serde(serialize_with = "redact::secret")]
    pub password: Option<String>,
    /// Path to the TLS certificate, empty for plain HTTP
    pub cert_file: Option<String>,
    /// Path to the TLS private key
    pub key_file: Option<String>,
    /// Address the server listens on, never empty once resolved
    pub listening_address: Option<String>,
    /// Whether the server runs at all
    pub enabled: Option<bool>,
    /// Hide from the destination that the request was proxied
    pub stealth: Option<bool>,
    /// Log every request and response
    pub log: Option<bool>,
    #[serde(serialize_with = "redact::duration")]
    pub read_header_timeout: Option<Duration>,
    #[serde(serialize_with = "redact::duration")]
    pub read_timeout: Option<Duration>,
}

impl SettingsEntity for HttpProxy {
    const CATEGORY: &'static str = "HTTP proxy";

    fn merge_with(&mut self, other: Self) {
        self.user = merge_field(self.user.take(), other.user);
        self.password = merge_field(self.password.take(), other.password);
        self.cert_file = merge_field(self.cert_file.take(), other.cert_file);
        self.key_file = merge_field(self.key_file.take(), other.key_file);
        self.listening_address = merge_field(self.listening_address.take(), other.listening_address);
        self.enabled = merge_field(self.enabled, other.enabled);
        self.stealth = merge_field(self.stealth, other.stealth);
        self.log = merge_field(self.log, other.log);
        self.read_header_timeout = merge_field(self.read_header_timeout, other.read_header_timeout);
        self.read_timeout = merge_field(self.read_timeout, other.read_timeout);
    }

    fn override_with(&mut self, other: Self) {
        self.user = override_field(self.user.take(), other.user);
        self.password = override_field(self.password.take(), other.password);
        self.cert_file = override_field(self.cert_file.take(), other.cert_file);
        self.key_file = override_field(self.key_file.take(), other.key_file);
        self.listening_address = override_field(self.listening_address.take(), other.listening_address);
        self.enabled = override_field(self.enabled, other.enabled);
        self.stealth = override_field(self.stealth, other.stealth);
        self.log = override_field(self.log, other.log);
        self.read_header_timeout = override_field(self.read_header_timeout, other.read_header_timeout);
        self.read_timeout = override_field(self.read_timeout, other.read_timeout);
    }

    fn set_defaults(&mut self) {
        self.user = default_field(self.user.take(), String::new());
        self.password = default_field(self.password.take(), String::new());
        self.cert_file = default_field(self.cert_file.take(), String::new());
        self.key_file = default_field(self.key_file.take(), String::new());
        // An empty address counts as unset.
        self.listening_address = default_field(
            self.listening_address.take().filter(|a| !a.is_empty()),
            defaults::HTTP_PROXY_LISTENING_ADDRESS.to_string(),
        );
        self.enabled = default_field(self.enabled, false);
        self.stealth = default_field(self.stealth, false);
        self.log = default_field(self.log, false);
        self.read_header_timeout =
            default_field(self.read_header_timeout, defaults::HTTP_PROXY_READ_HEADER_TIMEOUT);
        self.read_timeout = default_field(self.read_timeout, defaults::HTTP_PROXY_READ_TIMEOUT);
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        push_missing(&mut missing, &self.user, "user");
        push_missing(&mut missing, &self.password, "password");
        push_missing(&mut missing, &self.cert_file, "certificate file");
        push_missing(&mut missing, &self.key_file, "key file");
        push_missing(&mut missing, &self.listening_address, "listening address");
        push_missing(&mut missing, &self.enabled, "enabled");
        push_missing(&mut missing, &self.stealth, "stealth");
        push_missing(&mut missing, &self.log, "log");
        push_missing(&mut missing, &self.read_header_timeout, "read header timeout");
        push_missing(&mut missing, &self.read_timeout, "read timeout");
        missing
    }

    fn validate(&self, privileges: &dyn PrivilegeContext) -> Result<()> {
        self.ensure_resolved()?;

        // User and password are not validated.
        let address = self.listening_address.as_deref().unwrap_or_default();
        if address.is_empty() {
            return Err(ConfigError::validation(Self::CATEGORY, "listening address", "cannot be empty"));
        }
        validate_listening_address(address, privileges)
            .map_err(|message| ConfigError::validation(Self::CATEGORY, "listening address", message))?;

        if self.read_header_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::validation(Self::CATEGORY, "read header timeout", "cannot be zero"));
        }
        if self.read_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::validation(Self::CATEGORY, "read timeout", "cannot be zero"));
        }

        Ok(())
    }

    fn to_lines_node(&self) -> LinesNode {
        let mut node = LinesNode::new("HTTP proxy settings:");
        node.append(format!("Enabled: {}", bool_to_yes_no(self.enabled)));
        if self.enabled != Some(true) {
            return node;
        }

        node.append(format!("Listening address: {}", or_not_set(self.listening_address.as_ref())));
        node.append(format!("User: {}", or_not_set(self.user.as_ref())));
        node.append(format!("Password: {}", obfuscate(self.password.as_deref())));
        node.append(format!("Certificate file: {}", or_not_set(self.cert_file.as_ref())));
        node.append(format!("Key file: {}", or_not_set(self.key_file.as_ref())));
        node.append(format!("Stealth mode: {}", bool_to_yes_no(self.stealth)));
        node.append(format!("Log: {}", bool_to_yes_no(self.log)));
        node.append(format!(
            "Read header timeout: {}",
            or_not_set(self.read_header_timeout.map(format_duration).as_ref())
        ));
        node.append(format!(
            "Read timeout: {}",
            or_not_set(self.read_timeout.map(format_duration).as_ref())
        ));
        node
    }
}

impl fmt::Display for HttpProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_lines_node().fmt(f)
    }
}

impl Resolved<HttpProxy> {
    pub fn user(&self) -> &str {
        resolved(&self.user, "user").as_str()
    }

    pub fn password(&self) -> &str {
        resolved(&self.password, "password").as_str()
    }

    pub fn cert_file(&self) -> &str {
        resolved(&self.cert_file, "certificate file").as_str()
    }

    pub fn key_file(&self) -> &str {
        resolved(&self.key_file, "key file").as_str()
    }

    /// Whether the server should serve TLS
    pub fn tls(&self) -> bool {
        !self.cert_file().is_empty() && !self.key_file().is_empty()
    }

    pub fn listening_address(&self) -> &str {
        resolved(&self.listening_address, "listening address").as_str()
    }

    pub fn enabled(&self) -> bool {
        *resolved(&self.enabled, "enabled")
    }

    pub fn stealth(&self) -> bool {
        *resolved(&self.stealth, "stealth")
    }

    pub fn log(&self) -> bool {
        *resolved(&self.log, "log")
    }

    pub fn read_header_timeout(&self) -> Duration {
        *resolved(&self.read_header_timeout, "read header timeout")
    }

    pub fn read_timeout(&self) -> Duration {
        *resolved(&self.read_timeout, "read timeout")
    }
}
