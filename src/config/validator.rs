//! Configuration validator
//!
//! Semantic checks run once all sources are merged and defaults applied.
//! The process identity is injected through [`PrivilegeContext`] so that
//! checks depending on it can run under any user.

use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

/// Ports below this value need root to be bound
pub const PRIVILEGED_PORT_LIMIT: u16 = 1024;

/// Privilege level of the process the settings are resolved for
#[cfg_attr(test, mockall::automock)]
pub trait PrivilegeContext {
    /// Effective user ID of the process
    fn uid(&self) -> u32;

    /// Whether the process runs as root
    fn is_root(&self) -> bool {
        self.uid() == 0
    }
}

/// Privileges of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessPrivileges;

impl PrivilegeContext for ProcessPrivileges {
    fn uid(&self) -> u32 {
        // SAFETY: getuid takes no arguments and cannot fail.
        unsafe { libc::getuid() }
    }
}

/// A fixed user ID, for embedding and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPrivileges(pub u32);

impl PrivilegeContext for FixedPrivileges {
    fn uid(&self) -> u32 {
        self.0
    }
}

/// Validate an address a server will listen on
///
/// The address is `host:port`, where the host may be empty (all interfaces),
/// an IP address (IPv6 in brackets) or a hostname. Ports below 1024 are only
/// accepted for root.
pub fn validate_listening_address(
    address: &str,
    privileges: &dyn PrivilegeContext,
) -> std::result::Result<(), String> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| format!("{}: missing port", address))?;

    validate_host(host).map_err(|reason| format!("{}: {}", address, reason))?;

    let port = port
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| format!("{}: port must be between 1 and 65535", address))?;

    if port < PRIVILEGED_PORT_LIMIT && !privileges.is_root() {
        return Err(format!(
            "{}: port {} is privileged and cannot be used by user ID {}",
            address,
            port,
            privileges.uid()
        ));
    }

    Ok(())
}

fn validate_host(host: &str) -> std::result::Result<(), String> {
    if host.is_empty() {
        return Ok(());
    }

    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return Ipv6Addr::from_str(inner)
            .map(|_| ())
            .map_err(|_| format!("host {} is not a valid IPv6 address", host));
    }

    // IPv6 hosts must be bracketed to be told apart from the port
    if host.contains(':') {
        return Err(format!("host {} has too many colons, IPv6 addresses must be in brackets", host));
    }

    if IpAddr::from_str(host).is_ok() {
        return Ok(());
    }

    if is_hostname(host) {
        Ok(())
    } else {
        Err(format!("host {} is not valid", host))
    }
}

/// A numeric last label is an invalid IPv4 address, not a host name.
fn is_hostname(host: &str) -> bool {
    let numeric_tld = host
        .rsplit('.')
        .next()
        .is_some_and(|label| label.chars().all(|c| c.is_ascii_digit()));

    !numeric_tld
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

/// Validate a `TZ` value
///
/// Accepts zone names such as `Europe/Paris`, `:`-prefixed names and paths,
/// and POSIX rules such as `<+03>-3` or `EST5EDT,M3.2.0,M11.1.0`. Only
/// whitespace, control and non-ASCII characters are rejected.
pub fn validate_timezone(timezone: &str) -> std::result::Result<(), String> {
    if timezone.chars().all(|c| c.is_ascii_graphic()) {
        Ok(())
    } else {
        Err(format!("{:?} is not a valid timezone", timezone))
    }
}
