//! Fns to read variables from the environment more conveniently, and the config the importer
//! runs with.

use std::env;

use chrono_tz::Tz;
use thiserror::Error;
use tracing::{debug, warn};

use crate::units::UnitDivisor;

const SECRET_LOG_BLACKLIST: [&str; 1] = ["NOTION_TOKEN"];

const DEFAULT_CHAIN: &str = "ethereum";
const DEFAULT_MAGIC_EDEN_API_URL: &str = "https://api-mainnet.magiceden.dev";
const DEFAULT_NOTION_API_URL: &str = "https://api.notion.com";
const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Amsterdam;

fn obfuscate_if_secret(blacklist: &[&str], key: &str, value: &str) -> String {
    if blacklist.contains(&key) {
        let mut last_four = value.to_string();
        last_four.drain(0..value.len().saturating_sub(4));
        format!("****{last_four}")
    } else {
        value.to_string()
    }
}

/// Get an environment variable, encoding found or missing as Option, and panic otherwise.
pub fn get_env_var(key: &str) -> Option<String> {
    let var = match env::var(key) {
        Err(env::VarError::NotPresent) => None,
        Err(e) => panic!("{e}"),
        Ok(var) => Some(var),
    };

    if let Some(ref existing_var) = var {
        let output = obfuscate_if_secret(&SECRET_LOG_BLACKLIST, key, existing_var);
        debug!("env var {key}: {output}");
    } else {
        debug!("env var {key} requested but not found")
    };

    var
}

/// Unrecognized values are logged and read as unset, callers fall back to their default.
pub fn get_env_bool(key: &str) -> Option<bool> {
    get_env_var(key).and_then(|var| {
        let flag = parse_bool(&var);
        if flag.is_none() {
            warn!("invalid bool value {var} for {key}, ignoring it");
        }
        flag
    })
}

fn parse_bool(var: &str) -> Option<bool> {
    match var.to_lowercase().as_str() {
        "true" | "t" | "1" => Some(true),
        "false" | "f" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum EnvConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("UNIT_DIVISOR must be a positive integer, got {0}")]
    InvalidUnitDivisor(String),
    #[error("SALES_TIMEZONE must be an IANA timezone like Europe/Amsterdam, got {0}")]
    InvalidTimezone(String),
}

/// No Debug impl, the notion token should never end up in a log line.
pub struct EnvConfig {
    pub chain: String,
    pub collection: String,
    pub magic_eden_api_url: String,
    pub notion_api_url: String,
    pub notion_token: String,
    pub sales_db_id: String,
    pub summary_db_id: String,
    pub timezone: Tz,
    pub unit_divisor: UnitDivisor,
}

impl EnvConfig {
    pub fn from_env() -> Result<Self, EnvConfigError> {
        Self::from_lookup(get_env_var)
    }

    /// Builds the config from any key lookup. Required keys are checked before optional ones are
    /// parsed so a missing token is always the reported error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EnvConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(EnvConfigError::Missing(key))
        };

        let notion_token = required("NOTION_TOKEN")?;
        let sales_db_id = required("SALES_DB_ID")?;
        let summary_db_id = required("SUMMARY_DB_ID")?;
        let collection = required("ME_COLLECTION")?;

        let unit_divisor = match lookup("UNIT_DIVISOR") {
            None => UnitDivisor::default(),
            Some(raw) => raw
                .parse::<UnitDivisor>()
                .map_err(|_| EnvConfigError::InvalidUnitDivisor(raw))?,
        };

        let timezone = match lookup("SALES_TIMEZONE") {
            None => DEFAULT_TIMEZONE,
            Some(raw) => raw
                .parse::<Tz>()
                .map_err(|_| EnvConfigError::InvalidTimezone(raw))?,
        };

        Ok(Self {
            chain: lookup("ME_CHAIN").unwrap_or_else(|| DEFAULT_CHAIN.to_string()),
            collection,
            magic_eden_api_url: lookup("MAGIC_EDEN_API_URL")
                .unwrap_or_else(|| DEFAULT_MAGIC_EDEN_API_URL.to_string()),
            notion_api_url: lookup("NOTION_API_URL")
                .unwrap_or_else(|| DEFAULT_NOTION_API_URL.to_string()),
            notion_token,
            sales_db_id,
            summary_db_id,
            timezone,
            unit_divisor,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 4] = [
        ("NOTION_TOKEN", "secret_abcdef"),
        ("SALES_DB_ID", "sales-db"),
        ("SUMMARY_DB_ID", "summary-db"),
        ("ME_COLLECTION", "0xcollection"),
    ];

    #[test]
    fn test_get_env_var_safe_some() {
        let test_key = "TEST_KEY_SAFE_SOME";
        let test_value = "my-env-value";
        std::env::set_var(test_key, test_value);
        assert_eq!(get_env_var(test_key), Some(test_value.to_string()));
    }

    #[test]
    fn test_get_env_var_safe_none() {
        let key = get_env_var("DOESNT_EXIST");
        assert!(key.is_none());
    }

    #[test]
    fn test_get_env_bool_not_there() {
        let flag = get_env_bool("DOESNT_EXIST");
        assert_eq!(flag, None);
    }

    #[test]
    fn test_get_env_bool_true_upper() {
        let test_key = "TEST_KEY_BOOL_TRUE_UPPER";
        std::env::set_var(test_key, "TRUE");
        assert_eq!(get_env_bool(test_key), Some(true));
    }

    #[test]
    fn test_get_env_bool_false() {
        let test_key = "TEST_KEY_BOOL_FALSE";
        std::env::set_var(test_key, "0");
        assert_eq!(get_env_bool(test_key), Some(false));
    }

    #[test]
    fn test_get_env_bool_invalid_is_unset() {
        let test_key = "TEST_KEY_BOOL_INVALID";
        std::env::set_var(test_key, "yes");
        assert_eq!(get_env_bool(test_key), None);
        assert!(!get_env_bool(test_key).unwrap_or(false));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("T"), Some(true));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("False"), Some(false));
        assert_eq!(parse_bool("nope"), None);
    }

    #[test]
    fn test_obfuscate_if_secret() {
        assert_eq!(
            obfuscate_if_secret(&SECRET_LOG_BLACKLIST, "NOTION_TOKEN", "secret_abcdef"),
            "****cdef"
        );
        assert_eq!(
            obfuscate_if_secret(&SECRET_LOG_BLACKLIST, "ME_CHAIN", "polygon"),
            "polygon"
        );
    }

    #[test]
    fn config_defaults_test() {
        let config = EnvConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();
        assert_eq!(config.chain, "ethereum");
        assert_eq!(config.collection, "0xcollection");
        assert_eq!(config.timezone, chrono_tz::Europe::Amsterdam);
        assert_eq!(config.unit_divisor, UnitDivisor::default());
        assert_eq!(config.notion_api_url, "https://api.notion.com");
        assert_eq!(config.magic_eden_api_url, "https://api-mainnet.magiceden.dev");
    }

    #[test]
    fn config_overrides_test() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("ME_CHAIN", "polygon"));
        pairs.push(("UNIT_DIVISOR", "1000000"));
        pairs.push(("SALES_TIMEZONE", "America/New_York"));
        let config = EnvConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.chain, "polygon");
        assert_eq!(config.unit_divisor, UnitDivisor(1_000_000));
        assert_eq!(config.timezone, chrono_tz::America::New_York);
    }

    #[test]
    fn config_missing_token_test() {
        let result = EnvConfig::from_lookup(lookup_from(&REQUIRED[1..]));
        assert_eq!(result.err(), Some(EnvConfigError::Missing("NOTION_TOKEN")));
    }

    #[test]
    fn config_empty_collection_test() {
        let mut pairs = REQUIRED[..3].to_vec();
        pairs.push(("ME_COLLECTION", ""));
        let result = EnvConfig::from_lookup(lookup_from(&pairs));
        assert_eq!(result.err(), Some(EnvConfigError::Missing("ME_COLLECTION")));
    }

    #[test]
    fn config_zero_divisor_test() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("UNIT_DIVISOR", "0"));
        let result = EnvConfig::from_lookup(lookup_from(&pairs));
        assert_eq!(
            result.err(),
            Some(EnvConfigError::InvalidUnitDivisor("0".to_string()))
        );
    }

    #[test]
    fn config_bad_timezone_test() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("SALES_TIMEZONE", "Mars/Olympus"));
        assert!(matches!(
            EnvConfig::from_lookup(lookup_from(&pairs)),
            Err(EnvConfigError::InvalidTimezone(_))
        ));
    }
}
