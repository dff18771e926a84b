//! Configuration sources
//!
//! This module defines the trait settings sources implement and the
//! environment variable source.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use log::{debug, warn};

use crate::config::error::Result;
use crate::config::parse::{parse_bool, parse_duration, parse_id, parse_ip, parse_ip_nets, parse_ports};
use crate::config::{Dns, Firewall, HttpProxy, Settings, System, Vpn};

/// Configuration source trait
pub trait SettingsSource {
    /// Short name of the source, for logs
    fn name(&self) -> &'static str;

    /// Read a partial settings fragment from this source
    fn read(&self) -> Result<Settings>;
}

/// Environment variable configuration source
///
/// Works on a snapshot of the variables taken at construction. Values are
/// trimmed and empty values count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
}

impl EnvSource {
    /// Snapshot the environment of the current process
    ///
    /// Variables whose key or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        Self::from_pairs(
            env::vars_os().filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?))),
        )
    }

    /// Build a source from explicit key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Value of a variable, `None` when unset or empty
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Value of a variable, trying its retro keys in order when it is unset
    ///
    /// Returns the key the value was read from, which is `key` itself when
    /// nothing is set.
    pub fn get_with_retro<'a>(&self, key: &'a str, retro_keys: &[&'a str]) -> (&'a str, Option<String>) {
        if let Some(value) = self.get(key) {
            return (key, Some(value));
        }

        for &retro_key in retro_keys {
            if let Some(value) = self.get(retro_key) {
                warn!(
                    "You are using the old environment variable {}, please consider changing it to {}",
                    retro_key, key
                );
                return (retro_key, Some(value));
            }
        }

        (key, None)
    }

    /// Comma separated values of a variable
    pub fn csv(&self, key: &str) -> Option<Vec<String>> {
        self.get(key).map(|value| split_csv(&value))
    }

    /// Boolean value of a variable
    pub fn bool(&self, key: &str) -> Result<Option<bool>> {
        self.get(key).map(|value| parse_bool(key, &value)).transpose()
    }

    /// Duration value of a variable
    pub fn duration(&self, key: &str) -> Result<Option<Duration>> {
        self.get(key).map(|value| parse_duration(key, &value)).transpose()
    }

    fn read_firewall(&self) -> Result<Firewall> {
        let vpn_input_ports = self
            .csv("FIREWALL_VPN_INPUT_PORTS")
            .map(|ports| parse_ports("FIREWALL_VPN_INPUT_PORTS", &ports))
            .transpose()?;

        let input_ports = self
            .csv("FIREWALL_INPUT_PORTS")
            .map(|ports| parse_ports("FIREWALL_INPUT_PORTS", &ports))
            .transpose()?;

        let (subnets_key, subnets) = self.get_with_retro("FIREWALL_OUTBOUND_SUBNETS", &["EXTRA_SUBNETS"]);
        let outbound_subnets = subnets
            .map(|value| parse_ip_nets(subnets_key, &split_csv(&value)))
            .transpose()?;

        Ok(Firewall {
            vpn_input_ports,
            input_ports,
            outbound_subnets,
            enabled: self.bool("FIREWALL")?,
            debug: self.bool("FIREWALL_DEBUG")?,
        })
    }

    fn read_system(&self) -> Result<System> {
        Ok(System {
            puid: self.read_id("PUID", "UID")?,
            pgid: self.read_id("PGID", "GID")?,
            timezone: self.get("TZ"),
        })
    }

    fn read_id(&self, key: &str, retro_key: &str) -> Result<Option<u32>> {
        let (key_used, value) = self.get_with_retro(key, &[retro_key]);
        value.map(|value| parse_id(key_used, &value)).transpose()
    }

    fn read_http_proxy(&self) -> Result<HttpProxy> {
        let (_, user) = self.get_with_retro("HTTPPROXY_USER", &["PROXY_USER", "TINYPROXY_USER"]);
        let (_, password) =
            self.get_with_retro("HTTPPROXY_PASSWORD", &["PROXY_PASSWORD", "TINYPROXY_PASSWORD"]);

        let (enabled_key, enabled) = self.get_with_retro("HTTPPROXY", &["PROXY", "TINYPROXY"]);
        let enabled = enabled.map(|value| parse_bool(enabled_key, &value)).transpose()?;

        Ok(HttpProxy {
            user,
            password,
            cert_file: self.get("HTTPPROXY_CERTFILE"),
            key_file: self.get("HTTPPROXY_KEYFILE"),
            listening_address: self.read_http_proxy_listening_address(),
            enabled,
            stealth: self.bool("HTTPPROXY_STEALTH")?,
            log: self.read_http_proxy_log()?,
            read_header_timeout: self.duration("HTTPPROXY_READ_HEADER_TIMEOUT")?,
            read_timeout: self.duration("HTTPPROXY_READ_TIMEOUT")?,
        })
    }

    fn read_http_proxy_listening_address(&self) -> Option<String> {
        let (key, value) = self.get_with_retro(
            "HTTPPROXY_LISTENING_ADDRESS",
            &["HTTPPROXY_PORT", "PROXY_PORT", "TINYPROXY_PORT"],
        );
        let value = value?;
        if key == "HTTPPROXY_LISTENING_ADDRESS" {
            Some(value)
        } else {
            // Retro keys only held a port.
            Some(format!(":{}", value))
        }
    }

    fn read_http_proxy_log(&self) -> Result<Option<bool>> {
        let (key, value) = self.get_with_retro("HTTPPROXY_LOG", &["PROXY_LOG_LEVEL", "TINYPROXY_LOG"]);
        let Some(value) = value else {
            return Ok(None);
        };

        if key == "HTTPPROXY_LOG" {
            return parse_bool(key, &value).map(Some);
        }

        // Retro keys held a log level of the previous proxy implementation.
        match value.to_lowercase().as_str() {
            "info" | "connect" | "notice" => Ok(Some(true)),
            "critical" | "error" | "warning" => Ok(Some(false)),
            _ => parse_bool(key, &value).map(Some),
        }
    }

    fn read_dns(&self) -> Result<Dns> {
        let (address_key, address) = self.get_with_retro("DNS_ADDRESS", &["DNS_PLAINTEXT_ADDRESS"]);
        let server_address = address.map(|value| parse_ip(address_key, &value)).transpose()?;

        Ok(Dns {
            dot_enabled: self.bool("DOT")?,
            server_address,
            keep_nameserver: self.bool("DNS_KEEP_NAMESERVER")?,
            providers: self
                .csv("DOT_PROVIDERS")
                .map(|names| names.into_iter().map(|name| name.to_lowercase()).collect()),
        })
    }

    fn read_vpn(&self) -> Vpn {
        Vpn {
            user: self.get("OPENVPN_USER"),
            password: self.get("OPENVPN_PASSWORD"),
            ..Default::default()
        }
    }
}

impl SettingsSource for EnvSource {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn read(&self) -> Result<Settings> {
        debug!("Loading settings from {} environment variables", self.vars.len());

        Ok(Settings {
            http_proxy: self.read_http_proxy()?,
            firewall: self.read_firewall()?,
            system: self.read_system()?,
            dns: self.read_dns()?,
            vpn: self.read_vpn(),
        })
    }
}

/// Split a comma separated value, dropping empty entries
fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;

    fn source(pairs: &[(&str, &str)]) -> EnvSource {
        EnvSource::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_empty_and_blank_values_are_unset() {
        let env = source(&[("A", ""), ("B", "   "), ("C", " value ")]);
        assert_eq!(env.get("A"), None);
        assert_eq!(env.get("B"), None);
        assert_eq!(env.get("C").as_deref(), Some("value"));
        assert_eq!(env.get("D"), None);
    }

    #[test]
    fn test_get_with_retro() {
        let env = source(&[("OLD", "1"), ("OLDER", "2")]);
        assert_eq!(env.get_with_retro("NEW", &["OLD", "OLDER"]), ("OLD", Some("1".to_string())));
        assert_eq!(env.get_with_retro("NEW", &["MISSING"]), ("NEW", None));

        let env = source(&[("NEW", "0"), ("OLD", "1")]);
        assert_eq!(env.get_with_retro("NEW", &["OLD"]), ("NEW", Some("0".to_string())));
    }

    #[test]
    fn test_csv() {
        let env = source(&[("LIST", "a, b,,c ")]);
        assert_eq!(env.csv("LIST"), Some(vec!["a".to_string(), "b".to_string(), "c".to_string()]));
        assert_eq!(env.csv("UNSET"), None);
    }

    #[test]
    fn test_read_firewall() {
        let env = source(&[
            ("FIREWALL", "off"),
            ("FIREWALL_VPN_INPUT_PORTS", "80,443"),
            ("FIREWALL_OUTBOUND_SUBNETS", "10.0.0.0/8,192.168.1.0/24"),
        ]);
        let firewall = env.read_firewall().unwrap();
        assert_eq!(firewall.enabled, Some(false));
        assert_eq!(firewall.debug, None);
        assert_eq!(firewall.vpn_input_ports, Some(vec![80, 443]));
        assert_eq!(firewall.input_ports, None);
        assert_eq!(firewall.outbound_subnets.map(|s| s.len()), Some(2));
    }

    #[test]
    fn test_read_firewall_errors_name_the_variable() {
        let err = source(&[("FIREWALL_INPUT_PORTS", "22,0")]).read_firewall().unwrap_err();
        assert!(matches!(err, ConfigError::PortValue { value: 0, .. }));
        assert_eq!(err.env_key(), Some("FIREWALL_INPUT_PORTS"));

        let err = source(&[("EXTRA_SUBNETS", "10.0.0.0/8,nope")]).read_firewall().unwrap_err();
        assert_eq!(err.env_key(), Some("EXTRA_SUBNETS"));
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn test_read_system_with_retro_keys() {
        let system = source(&[("UID", "1001"), ("PGID", "1002"), ("TZ", "UTC")])
            .read_system()
            .unwrap();
        assert_eq!(system.puid, Some(1001));
        assert_eq!(system.pgid, Some(1002));
        assert_eq!(system.timezone.as_deref(), Some("UTC"));

        let err = source(&[("GID", "x")]).read_system().unwrap_err();
        assert!(matches!(err, ConfigError::IdParsing { .. }));
        assert_eq!(err.env_key(), Some("GID"));
    }

    #[test]
    fn test_read_http_proxy_retro_port() {
        let proxy = source(&[("TINYPROXY", "on"), ("PROXY_PORT", "9999"), ("TINYPROXY_LOG", "Info")])
            .read_http_proxy()
            .unwrap();
        assert_eq!(proxy.enabled, Some(true));
        assert_eq!(proxy.listening_address.as_deref(), Some(":9999"));
        assert_eq!(proxy.log, Some(true));
    }

    #[test]
    fn test_read_http_proxy_timeouts() {
        let proxy = source(&[("HTTPPROXY_READ_HEADER_TIMEOUT", "250ms"), ("HTTPPROXY_READ_TIMEOUT", "10s")])
            .read_http_proxy()
            .unwrap();
        assert_eq!(proxy.read_header_timeout, Some(Duration::from_millis(250)));
        assert_eq!(proxy.read_timeout, Some(Duration::from_secs(10)));

        let err = source(&[("HTTPPROXY_READ_TIMEOUT", "soon")]).read_http_proxy().unwrap_err();
        assert!(matches!(err, ConfigError::Duration { .. }));
    }

    #[test]
    fn test_read_dns() {
        let dns = source(&[("DOT", "no"), ("DNS_PLAINTEXT_ADDRESS", "9.9.9.9"), ("DOT_PROVIDERS", "Google,quad9")])
            .read_dns()
            .unwrap();
        assert_eq!(dns.dot_enabled, Some(false));
        assert_eq!(dns.server_address, Some("9.9.9.9".parse().unwrap()));
        assert_eq!(dns.providers, Some(vec!["google".to_string(), "quad9".to_string()]));

        let err = source(&[("DNS_ADDRESS", "dns.local")]).read_dns().unwrap_err();
        assert!(matches!(err, ConfigError::IpAddress { .. }));
    }

    #[test]
    fn test_read_unset_environment_gives_empty_fragment() {
        let settings = EnvSource::default().read().unwrap();
        assert_eq!(settings, Settings::default());
    }
}
