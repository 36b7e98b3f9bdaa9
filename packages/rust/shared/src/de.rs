//! Deserialization helpers for loosely-shaped upstream JSON.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that may be missing *or* explicitly `null` into its
/// default value. Pair with `#[serde(default)]` so absent keys also work.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
