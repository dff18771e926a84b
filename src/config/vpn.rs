//! VPN client credential settings

use std::fmt;

use serde::Serialize;

use crate::config::error::{ConfigError, Result};
use crate::config::merger::{default_field, merge_field, override_field, push_missing, resolved};
use crate::config::redact;
use crate::config::tree::{obfuscate, or_not_set, LinesNode};
use crate::config::validator::PrivilegeContext;
use crate::config::{Resolved, SettingsEntity};

/// Credentials the VPN client authenticates with
///
/// `client_crt` and `client_key` hold the base64 body of PEM data, without
/// the PEM markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vpn {
    pub user: Option<String>,
    #[serde(serialize_with = "redact::secret")]
    pub password: Option<String>,
    #[serde(serialize_with = "redact::secret")]
    pub client_crt: Option<String>,
    #[serde(serialize_with = "redact::secret")]
    pub client_key: Option<String>,
}

impl SettingsEntity for Vpn {
    const CATEGORY: &'static str = "VPN";

    fn merge_with(&mut self, other: Self) {
        self.user = merge_field(self.user.take(), other.user);
        self.password = merge_field(self.password.take(), other.password);
        self.client_crt = merge_field(self.client_crt.take(), other.client_crt);
        self.client_key = merge_field(self.client_key.take(), other.client_key);
    }

    fn override_with(&mut self, other: Self) {
        self.user = override_field(self.user.take(), other.user);
        self.password = override_field(self.password.take(), other.password);
        self.client_crt = override_field(self.client_crt.take(), other.client_crt);
        self.client_key = override_field(self.client_key.take(), other.client_key);
    }

    fn set_defaults(&mut self) {
        self.user = default_field(self.user.take(), String::new());
        self.password = default_field(self.password.take(), String::new());
        self.client_crt = default_field(self.client_crt.take(), String::new());
        self.client_key = default_field(self.client_key.take(), String::new());
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        push_missing(&mut missing, &self.user, "user");
        push_missing(&mut missing, &self.password, "password");
        push_missing(&mut missing, &self.client_crt, "client certificate");
        push_missing(&mut missing, &self.client_key, "client key");
        missing
    }

    fn validate(&self, _privileges: &dyn PrivilegeContext) -> Result<()> {
        self.ensure_resolved()?;

        let has_crt = self.client_crt.as_deref().is_some_and(|crt| !crt.is_empty());
        let has_key = self.client_key.as_deref().is_some_and(|key| !key.is_empty());
        if has_key && !has_crt {
            return Err(ConfigError::validation(
                Self::CATEGORY,
                "client key",
                "a client key is set but no client certificate is set",
            ));
        }

        Ok(())
    }

    fn to_lines_node(&self) -> LinesNode {
        let mut node = LinesNode::new("VPN client settings:");
        node.append(format!("User: {}", or_not_set(self.user.as_ref())));
        node.append(format!("Password: {}", obfuscate(self.password.as_deref())));
        node.append(format!("Client certificate: {}", obfuscate(self.client_crt.as_deref())));
        node.append(format!("Client key: {}", obfuscate(self.client_key.as_deref())));
        node
    }
}

impl fmt::Display for Vpn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_lines_node().fmt(f)
    }
}

impl Resolved<Vpn> {
    pub fn user(&self) -> &str {
        resolved(&self.user, "user").as_str()
    }

    pub fn password(&self) -> &str {
        resolved(&self.password, "password").as_str()
    }

    pub fn client_crt(&self) -> &str {
        resolved(&self.client_crt, "client certificate").as_str()
    }

    pub fn client_key(&self) -> &str {
        resolved(&self.client_key, "client key").as_str()
    }
}
