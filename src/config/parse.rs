//! Typed parsing of raw setting values
//!
//! Every parser takes the name of the source it reads from so that errors
//! can be attributed to it.

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use ipnet::IpNet;

use crate::config::error::{ConfigError, Result};

/// Parse a list of port literals, each in 1..=65535
pub fn parse_ports(key: &str, values: &[String]) -> Result<Vec<u16>> {
    values
        .iter()
        .map(|value| {
            let port = value.parse::<i64>().map_err(|e| ConfigError::PortParsing {
                key: key.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })?;
            u16::try_from(port)
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| ConfigError::PortValue {
                    key: key.to_string(),
                    value: port,
                })
        })
        .collect()
}

/// Parse a list of IP network literals such as `10.0.0.0/8`
pub fn parse_ip_nets(key: &str, values: &[String]) -> Result<Vec<IpNet>> {
    values
        .iter()
        .map(|value| {
            IpNet::from_str(value).map_err(|e| ConfigError::IpNetwork {
                key: key.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Parse an IP address literal
pub fn parse_ip(key: &str, value: &str) -> Result<IpAddr> {
    IpAddr::from_str(value).map_err(|e| ConfigError::IpAddress {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parse a process user or group ID
///
/// The literal is read as an unsigned 64-bit integer first so that values
/// that are numbers but too large get a range error instead of a parse error.
pub fn parse_id(key: &str, value: &str) -> Result<u32> {
    let id = value.parse::<u64>().map_err(|e| ConfigError::IdParsing {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    u32::try_from(id).map_err(|_| ConfigError::IdRange {
        key: key.to_string(),
        value: id,
        max: u32::MAX,
    })
}

/// Parse a boolean literal
pub fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "yes" | "true" | "on" | "enabled" | "1" => Ok(true),
        "no" | "false" | "off" | "disabled" | "0" => Ok(false),
        _ => Err(ConfigError::Bool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Parse a duration such as `500ms`, `1m30s` or a bare number of seconds
pub fn parse_duration(key: &str, value: &str) -> Result<Duration> {
    let err = |reason: &str| ConfigError::Duration {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if let Ok(seconds) = value.parse::<u64>() {
        return Ok(Duration::from_secs(seconds));
    }
    if value.is_empty() {
        return Err(err("empty value"));
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut total = Duration::ZERO;
    let mut rest = value;
    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if number_end == 0 {
            return Err(err("expected a number"));
        }
        let number = rest[..number_end]
            .parse::<f64>()
            .map_err(|_| err("invalid number"))?;
        rest = &rest[number_end..];

        let unit_end = rest.find(is_number).unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(err("missing unit")),
            _ => return Err(err("unknown unit")),
        };
        rest = &rest[unit_end..];

        let nanos = number * nanos_per_unit;
        if nanos > u64::MAX as f64 {
            return Err(err("overflow"));
        }
        total = total
            .checked_add(Duration::from_nanos(nanos.round() as u64))
            .ok_or_else(|| err("overflow"))?;
    }
    Ok(total)
}

/// Format a duration the way it is written in settings, e.g. `1s` or `1m30s`
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    if duration < Duration::from_secs(1) {
        let nanos = duration.subsec_nanos();
        return if nanos % 1_000_000 == 0 {
            format!("{}ms", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{}µs", nanos / 1_000)
        } else {
            format!("{}ns", nanos)
        };
    }

    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    let mut seconds = seconds.to_string();
    let nanos = duration.subsec_nanos();
    if nanos != 0 {
        let fraction = format!("{:09}", nanos);
        seconds.push('.');
        seconds.push_str(fraction.trim_end_matches('0'));
    }

    if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
