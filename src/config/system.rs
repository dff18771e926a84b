//! System identity settings

use std::fmt;

use serde::Serialize;

use crate::config::defaults;
use crate::config::error::{ConfigError, Result};
use crate::config::merger::{default_field, merge_field, override_field, push_missing, resolved};
use crate::config::tree::{or_not_set, LinesNode};
use crate::config::validator::{validate_timezone, PrivilegeContext};
use crate::config::{Resolved, SettingsEntity};

/// Identity the service runs its files and subprocesses as
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct System {
    pub puid: Option<u32>,
    pub pgid: Option<u32>,
    /// Timezone name, empty to keep the image default
    pub timezone: Option<String>,
}

impl SettingsEntity for System {
    const CATEGORY: &'static str = "System";

    fn merge_with(&mut self, other: Self) {
        self.puid = merge_field(self.puid, other.puid);
        self.pgid = merge_field(self.pgid, other.pgid);
        self.timezone = merge_field(self.timezone.take(), other.timezone);
    }

    fn override_with(&mut self, other: Self) {
        self.puid = override_field(self.puid, other.puid);
        self.pgid = override_field(self.pgid, other.pgid);
        self.timezone = override_field(self.timezone.take(), other.timezone);
    }

    fn set_defaults(&mut self) {
        self.puid = default_field(self.puid, defaults::PUID);
        self.pgid = default_field(self.pgid, defaults::PGID);
        self.timezone = default_field(self.timezone.take(), String::new());
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        push_missing(&mut missing, &self.puid, "process user ID");
        push_missing(&mut missing, &self.pgid, "process group ID");
        push_missing(&mut missing, &self.timezone, "timezone");
        missing
    }

    fn validate(&self, _privileges: &dyn PrivilegeContext) -> Result<()> {
        self.ensure_resolved()?;

        validate_timezone(self.timezone.as_deref().unwrap_or_default())
            .map_err(|message| ConfigError::validation(Self::CATEGORY, "timezone", message))
    }

    fn to_lines_node(&self) -> LinesNode {
        let mut node = LinesNode::new("System settings:");
        node.append(format!("Process UID: {}", or_not_set(self.puid.as_ref())));
        node.append(format!("Process GID: {}", or_not_set(self.pgid.as_ref())));
        if let Some(timezone) = self.timezone.as_deref().filter(|tz| !tz.is_empty()) {
            node.append(format!("Timezone: {}", timezone));
        }
        node
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_lines_node().fmt(f)
    }
}

impl Resolved<System> {
    pub fn puid(&self) -> u32 {
        *resolved(&self.puid, "process user ID")
    }

    pub fn pgid(&self) -> u32 {
        *resolved(&self.pgid, "process group ID")
    }

    pub fn timezone(&self) -> &str {
        resolved(&self.timezone, "timezone").as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validator::FixedPrivileges;

    #[test]
    fn test_defaults_keep_explicit_root_ids() {
        let mut system = System {
            puid: Some(0),
            ..Default::default()
        };
        system.set_defaults();
        assert_eq!(system.puid, Some(0));
        assert_eq!(system.pgid, Some(1000));
        assert_eq!(system.timezone.as_deref(), Some(""));
    }

    #[test]
    fn test_validate_timezone() {
        let mut system = System {
            timezone: Some("Europe/Paris".to_string()),
            ..Default::default()
        };
        system.set_defaults();
        assert!(system.validate(&FixedPrivileges(0)).is_ok());

        system.timezone = Some("Europe Paris".to_string());
        let err = system.validate(&FixedPrivileges(0)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { category: "System", field: "timezone", .. }));
    }

    #[test]
    fn test_render() {
        let mut system = System::default();
        system.set_defaults();
        assert_eq!(
            system.to_string(),
            "System settings:\n├── Process UID: 1000\n└── Process GID: 1000"
        );

        system.timezone = Some("UTC".to_string());
        assert!(system.to_string().ends_with("└── Timezone: UTC"));
    }
}
