//! Shared utility functions used across the codebase.

use std::str::FromStr;

/// Parse an environment variable as a boolean, returning `default` if unset.
///
/// Recognises `1`, `true`, `yes`, `y`, `on` (case-insensitive) as `true`;
/// everything else maps to `false`. Unset maps to `default`.
pub fn env_var_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(value) => parse_bool(&value),
        Err(_) => default,
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

/// Parse an environment variable with `FromStr`, falling back to `default`
/// when it is unset.
///
/// # Errors
/// Returns `(name, reason)` if the variable is set but does not parse.
pub fn env_var_parse<T>(name: &str, default: T) -> Result<T, (String, String)>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| (name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated list of floats (`"0.7, 0.3"`).
pub fn parse_float_list(value: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
    value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect()
}
