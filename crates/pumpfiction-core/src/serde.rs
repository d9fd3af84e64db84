//! Serde helpers for query-string parameters.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

/// Deserializes an optional query value through [`FromStr`], treating a blank
/// string the same as an absent parameter.
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct Filter {
///     #[serde(default, deserialize_with = "deserialize_blank_as_none")]
///     status: Option<ApplicationStatus>,
/// }
/// ```
pub fn deserialize_blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
