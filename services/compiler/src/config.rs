//! Run configuration.
//!
//! Values come from the environment (after `.env` is loaded by the binary) and
//! can be overridden by CLI flags. The resolved [`CompileOptions`] is passed
//! explicitly into the engine; nothing below reads global state.

use crate::canonical::{KeyGen, DEFAULT_KEY_LENGTH};

/// Options that change what a compilation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Abort with a validation error when any configured sheet is not ok.
    pub strict: bool,
    /// Copy the configured source sheets into the output ahead of the
    /// compiled tables.
    pub copy_raw: bool,
    pub keys: KeyGen,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            strict: true,
            copy_raw: true,
            keys: KeyGen::default(),
        }
    }
}

impl CompileOptions {
    pub fn permissive() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_copy_raw(mut self, copy_raw: bool) -> Self {
        self.copy_raw = copy_raw;
        self
    }

    pub fn with_key_length(mut self, len: usize) -> Self {
        self.keys = KeyGen::new(len);
        self
    }
}

/// Environment-backed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub strict_validation: bool,
    pub copy_raw_sheets: bool,
    pub key_hex_length: usize,
}

impl Config {
    /// Reads `STRICT_VALIDATION`, `COPY_RAW_SHEETS` and `KEY_HEX_LENGTH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            strict_validation: lookup("STRICT_VALIDATION")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
            copy_raw_sheets: lookup("COPY_RAW_SHEETS")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(true),
            key_hex_length: lookup("KEY_HEX_LENGTH")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_KEY_LENGTH),
        }
    }

    pub fn options(&self) -> CompileOptions {
        CompileOptions::default()
            .with_strict(self.strict_validation)
            .with_copy_raw(self.copy_raw_sheets)
            .with_key_length(self.key_hex_length)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert!(config.strict_validation);
        assert!(config.copy_raw_sheets);
        assert_eq!(config.key_hex_length, 16);
        assert_eq!(config.options(), CompileOptions::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("STRICT_VALIDATION", "false"),
            ("COPY_RAW_SHEETS", "0"),
            ("KEY_HEX_LENGTH", "24"),
        ]));
        let options = config.options();
        assert!(!options.strict);
        assert!(!options.copy_raw);
        assert_eq!(options.keys.len(), 24);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("STRICT_VALIDATION", "maybe"),
            ("KEY_HEX_LENGTH", "lots"),
        ]));
        assert!(config.strict_validation);
        assert_eq!(config.key_hex_length, 16);
    }

    #[test]
    fn test_key_length_is_clamped_in_options() {
        let config = Config::from_lookup(lookup_from(&[("KEY_HEX_LENGTH", "3")]));
        assert_eq!(config.options().keys.len(), 8);
    }
}
