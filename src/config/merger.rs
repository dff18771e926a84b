//! Configuration merging functionality
//!
//! Field-level combinators shared by every settings category. Each field is
//! combined independently, so the order in which fields are visited does
//! not matter.

/// Merge policy: keep the receiver value when set, otherwise take the other one.
#[inline]
pub fn merge_field<T>(receiver: Option<T>, other: Option<T>) -> Option<T> {
    receiver.or(other)
}

/// Override policy: take the other value when set, otherwise keep the receiver.
#[inline]
pub fn override_field<T>(receiver: Option<T>, other: Option<T>) -> Option<T> {
    other.or(receiver)
}

/// Defaulting pass: a merge against a value that is always set.
#[inline]
pub fn default_field<T>(receiver: Option<T>, default: T) -> Option<T> {
    receiver.or(Some(default))
}

/// Read a field that resolution guarantees to be present.
///
/// Only called from accessors on `Resolved<T>`, which cannot be built while
/// any field is absent.
#[inline]
pub(crate) fn resolved<'a, T>(value: &'a Option<T>, field: &'static str) -> &'a T {
    match value {
        Some(value) => value,
        None => panic!("{} read from settings that were not resolved", field),
    }
}

/// Collect the names of absent fields.
pub(crate) fn push_missing<T>(missing: &mut Vec<&'static str>, value: &Option<T>, field: &'static str) {
    if value.is_none() {
        missing.push(field);
    }
}
