//! Utilities for reading environment variables.

use std::ffi::{OsStr, OsString};

/// Values that we consider "false" for a boolean environment variable.
static FALSEY: &[&str] = &["0", "", "no", "false", "off"];

/// Returns true if the environment variable is set, and is _not_ one of the following:
/// `'0', '', 'no', 'false', 'off'`.
pub fn is_truthy<K: AsRef<OsStr>>(var: K) -> bool {
    // Return early if the value is not set.
    let Some(value) = std::env::var_os(var) else {
        return false;
    };
    is_truthy_value(value)
}

/// Returns true if `value` is not one of our "falsey" candidates, case insensitive.
pub fn is_truthy_value(mut value: OsString) -> bool {
    OsStr::make_ascii_lowercase(&mut value);
    !FALSEY.iter().any(|falsey| value == *falsey)
}

/// Strictly parse a boolean setting, case insensitive.
///
/// Accepts `true/false`, `1/0`, `yes/no`, and `on/off`, anything else is `None`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Returns the name of the variable that overrides `name`, e.g. `LIBREG_` and
/// `tool_suffix` become `LIBREG_TOOL_SUFFIX`.
pub fn override_var(prefix: &str, name: &str) -> String {
    format!("{prefix}{}", name.to_ascii_uppercase())
}

/// Reads the override for `name` under `prefix`, if one is set.
pub fn var_with_prefix(prefix: &str, name: &str) -> Option<OsString> {
    std::env::var_os(override_var(prefix, name))
}
