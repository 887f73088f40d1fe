//! Helpers for partial-update payloads.
//!
//! Patches distinguish three states for nullable columns: the field is absent
//! (leave untouched), explicitly `null` (clear it), or carries a value.

use serde::{Deserialize, Deserializer};

/// Deserialise a nullable patch field into `Some(None)` for an explicit
/// `null` and `Some(Some(v))` for a value. Pair with `#[serde(default)]` so an
/// absent field stays `None`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Overwrite `target` when the patch supplied a value.
pub(crate) fn assign<T: Clone>(target: &mut T, value: Option<&T>) {
    if let Some(value) = value {
        target.clone_from(value);
    }
}

/// Reject blank text fields.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

/// Minimal shape check for e-mail addresses: one `@` with text on both
/// sides, a dot in the domain part and no whitespace.
pub(crate) fn require_email(value: &str) -> Result<(), String> {
    let malformed = || Err(format!("email '{value}' is not a valid address"));
    if value.chars().any(char::is_whitespace) {
        return malformed();
    }
    match value.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.') =>
        {
            Ok(())
        }
        _ => malformed(),
    }
}
