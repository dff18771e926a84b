//! Firewall settings

use std::fmt;

use ipnet::IpNet;
use serde::Serialize;

use crate::config::defaults;
use crate::config::error::{ConfigError, Result};
use crate::config::merger::{default_field, merge_field, override_field, push_missing, resolved};
use crate::config::tree::{bool_to_yes_no, list_or_none, LinesNode};
use crate::config::validator::PrivilegeContext;
use crate::config::{Resolved, SettingsEntity};

/// Settings of the firewall
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Firewall {
    /// Ports to allow through the VPN interface, in order
    pub vpn_input_ports: Option<Vec<u16>>,
    /// Ports to allow on the default interface
    pub input_ports: Option<Vec<u16>>,
    /// Subnets reachable outside of the VPN tunnel
    pub outbound_subnets: Option<Vec<IpNet>>,
    pub enabled: Option<bool>,
    pub debug: Option<bool>,
}

impl SettingsEntity for Firewall {
    const CATEGORY: &'static str = "Firewall";

    fn merge_with(&mut self, other: Self) {
        self.vpn_input_ports = merge_field(self.vpn_input_ports.take(), other.vpn_input_ports);
        self.input_ports = merge_field(self.input_ports.take(), other.input_ports);
        self.outbound_subnets = merge_field(self.outbound_subnets.take(), other.outbound_subnets);
        self.enabled = merge_field(self.enabled, other.enabled);
        self.debug = merge_field(self.debug, other.debug);
    }

    fn override_with(&mut self, other: Self) {
        self.vpn_input_ports = override_field(self.vpn_input_ports.take(), other.vpn_input_ports);
        self.input_ports = override_field(self.input_ports.take(), other.input_ports);
        self.outbound_subnets = override_field(self.outbound_subnets.take(), other.outbound_subnets);
        self.enabled = override_field(self.enabled, other.enabled);
        self.debug = override_field(self.debug, other.debug);
    }

    fn set_defaults(&mut self) {
        self.vpn_input_ports = default_field(self.vpn_input_ports.take(), Vec::new());
        self.input_ports = default_field(self.input_ports.take(), Vec::new());
        self.outbound_subnets = default_field(self.outbound_subnets.take(), Vec::new());
        self.enabled = default_field(self.enabled, defaults::FIREWALL_ENABLED);
        self.debug = default_field(self.debug, false);
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        push_missing(&mut missing, &self.vpn_input_ports, "VPN input ports");
        push_missing(&mut missing, &self.input_ports, "input ports");
        push_missing(&mut missing, &self.outbound_subnets, "outbound subnets");
        push_missing(&mut missing, &self.enabled, "enabled");
        push_missing(&mut missing, &self.debug, "debug");
        missing
    }

    fn validate(&self, _privileges: &dyn PrivilegeContext) -> Result<()> {
        self.ensure_resolved()?;

        let subnets = self.outbound_subnets.as_deref().unwrap_or_default();
        if let Some(subnet) = subnets.iter().find(|subnet| subnet.prefix_len() == 0) {
            return Err(ConfigError::validation(
                Self::CATEGORY,
                "outbound subnets",
                format!("{} would route all traffic outside the VPN", subnet),
            ));
        }

        Ok(())
    }

    fn to_lines_node(&self) -> LinesNode {
        let mut node = LinesNode::new("Firewall settings:");
        node.append(format!("Enabled: {}", bool_to_yes_no(self.enabled)));
        if self.enabled != Some(true) {
            return node;
        }

        node.append(format!("Debug mode: {}", bool_to_yes_no(self.debug)));
        node.append(format!("VPN input ports: {}", list_or_none(self.vpn_input_ports.as_ref())));
        node.append(format!("Input ports: {}", list_or_none(self.input_ports.as_ref())));
        node.append(format!("Outbound subnets: {}", list_or_none(self.outbound_subnets.as_ref())));
        node
    }
}

impl fmt::Display for Firewall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_lines_node().fmt(f)
    }
}

impl Resolved<Firewall> {
    pub fn vpn_input_ports(&self) -> &[u16] {
        resolved(&self.vpn_input_ports, "VPN input ports").as_slice()
    }

    pub fn input_ports(&self) -> &[u16] {
        resolved(&self.input_ports, "input ports").as_slice()
    }

    pub fn outbound_subnets(&self) -> &[IpNet] {
        resolved(&self.outbound_subnets, "outbound subnets").as_slice()
    }

    pub fn enabled(&self) -> bool {
        *resolved(&self.enabled, "enabled")
    }

    pub fn debug(&self) -> bool {
        *resolved(&self.debug, "debug")
    }
}
