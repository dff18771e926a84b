//! Settings builder
//!
//! This module provides a builder pattern for resolving settings from
//! multiple sources.

use std::path::Path;

use log::debug;

use crate::config::error::Result;
use crate::config::secrets::SecretsSource;
use crate::config::source::{EnvSource, SettingsSource};
use crate::config::validator::{PrivilegeContext, ProcessPrivileges};
use crate::config::{Resolved, Settings, SettingsEntity};

/// Settings builder
///
/// Sources are applied in the order they are added, each one overriding
/// the fields set by the previous ones.
pub struct SettingsBuilder {
    sources: Vec<Box<dyn SettingsSource>>,
    privileges: Box<dyn PrivilegeContext>,
}

impl SettingsBuilder {
    /// Create a builder with no source, checking against the process privileges
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            privileges: Box::new(ProcessPrivileges),
        }
    }

    /// Add an environment source
    pub fn with_env(self, env: EnvSource) -> Self {
        self.with_source(Box::new(env))
    }

    /// Add a secret files source reading default files from `secrets_dir`
    pub fn with_secrets<P: AsRef<Path>>(self, env: EnvSource, secrets_dir: P) -> Self {
        self.with_source(Box::new(SecretsSource::new(env, secrets_dir.as_ref())))
    }

    /// Add any source
    pub fn with_source(mut self, source: Box<dyn SettingsSource>) -> Self {
        debug!("Adding {} settings source", source.name());
        self.sources.push(source);
        self
    }

    /// Check settings against these privileges instead of the process ones
    pub fn with_privileges<P: PrivilegeContext + 'static>(mut self, privileges: P) -> Self {
        self.privileges = Box::new(privileges);
        self
    }

    /// Read every source, combine them, apply defaults and validate
    pub fn build(self) -> Result<Resolved<Settings>> {
        let mut settings = Settings::default();

        debug!("Building settings from {} sources", self.sources.len());

        // Lowest to highest priority
        for source in &self.sources {
            debug!("Reading settings from the {} source", source.name());
            settings.override_with(source.read()?);
        }

        settings.set_defaults();

        debug!("Validating settings");
        let resolved = Resolved::new(settings, self.privileges.as_ref())?;

        debug!("Final settings:\n{}", resolved);

        Ok(resolved)
    }
}

impl Default for SettingsBuilder {
    /// Environment variables, then secret files in the default directory
    fn default() -> Self {
        let env = EnvSource::from_process();
        Self::new()
            .with_env(env.clone())
            .with_secrets(env, crate::config::defaults::SECRETS_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validator::{FixedPrivileges, MockPrivilegeContext};
    use crate::config::ConfigError;
    use std::fs;
    use tempfile::tempdir;

    struct FixedSource(Settings);

    impl SettingsSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn read(&self) -> Result<Settings> {
            Ok(self.0.clone())
        }
    }

    fn env(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_build_without_sources_gives_defaults() {
        let settings = SettingsBuilder::new()
            .with_privileges(FixedPrivileges(1000))
            .build()
            .unwrap();

        assert!(settings.firewall().enabled());
        assert_eq!(settings.system().puid(), 1000);
        assert_eq!(settings.http_proxy().listening_address(), ":8888");
    }

    #[test]
    fn test_later_sources_win() {
        let mut low = Settings::default();
        low.system.puid = Some(1);
        low.system.pgid = Some(1);
        let mut high = Settings::default();
        high.system.puid = Some(2);

        let settings = SettingsBuilder::new()
            .with_source(Box::new(FixedSource(low)))
            .with_source(Box::new(FixedSource(high)))
            .with_privileges(FixedPrivileges(1000))
            .build()
            .unwrap();

        assert_eq!(settings.system().puid(), 2);
        assert_eq!(settings.system().pgid(), 1);
    }

    #[test]
    fn test_secrets_override_environment() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("httpproxy_password"), "from-file").unwrap();

        let env = env(&[("HTTPPROXY_PASSWORD", "from-env"), ("HTTPPROXY_USER", "user")]);
        let settings = SettingsBuilder::new()
            .with_env(env.clone())
            .with_secrets(env, dir.path())
            .with_privileges(FixedPrivileges(1000))
            .build()
            .unwrap();

        let proxy = settings.http_proxy();
        assert_eq!(proxy.password(), "from-file");
        assert_eq!(proxy.user(), "user");
    }

    #[test]
    fn test_source_error_stops_the_build() {
        let err = SettingsBuilder::new()
            .with_env(env(&[("PUID", "-1")]))
            .with_privileges(FixedPrivileges(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::IdParsing { .. }));
    }

    #[test]
    fn test_privileged_port_uses_injected_privileges() {
        let env = env(&[("HTTPPROXY", "on"), ("HTTPPROXY_LISTENING_ADDRESS", ":80")]);

        let mut unprivileged = MockPrivilegeContext::new();
        unprivileged.expect_uid().return_const(1000u32);
        unprivileged.expect_is_root().return_const(false);
        let err = SettingsBuilder::new()
            .with_env(env.clone())
            .with_privileges(unprivileged)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation { category: "HTTP proxy", field: "listening address", .. }
        ));

        let settings = SettingsBuilder::new()
            .with_env(env)
            .with_privileges(FixedPrivileges(0))
            .build()
            .unwrap();
        assert!(settings.needs_root());
    }
}
