//! Serializers for the redacted JSON view of settings
//!
//! Used through `#[serde(serialize_with = ...)]` so that serializing any
//! settings entity yields the same information as its rendered tree.

use std::time::Duration;

use serde::Serializer;

use crate::config::parse::format_duration;
use crate::config::tree::obfuscate;

/// Serialize a secret as its obfuscation marker
pub fn secret<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => serializer.serialize_str(obfuscate(Some(value))),
        None => serializer.serialize_none(),
    }
}

/// Serialize a duration in its settings notation, e.g. `1m30s`
pub fn duration<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => serializer.serialize_str(&format_duration(*value)),
        None => serializer.serialize_none(),
    }
}
