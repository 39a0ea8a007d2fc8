//! Configuration file management for keystore discovery.
//!
//! Settings live in a `keystore_discovery` section of either a JSON document
//! (`.json` extension) or a TOML document (anything else). Both formats are
//! normalized into the same tree before validation, so the rules below apply
//! to either.
//!
//! # Example Configuration File
//!
//! ```toml
//! [keystore_discovery]
//! zabbix_sender = "/usr/bin/zabbix_sender"
//! zabbix_confd = "/etc/zabbix/zabbix_agentd.conf"
//! keytool = "/usr/bin/keytool"
//! keystore_pass = "changeit"
//! zbx_key_discovery = "keystore.discovery"
//! zbx_key_startdate = "keystore.cert.startdate"
//! zbx_key_enddate = "keystore.cert.enddate"
//! post_discovery_delay = 2
//! ```
//!
//! `keystore_pass = "None"` means the keystore has an empty password.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Name of the section holding our settings.
pub const SECTION: &str = "keystore_discovery";

/// Keys that must be present in [`SECTION`].
pub const REQUIRED_KEYS: [&str; 7] = [
    "zabbix_sender",
    "zabbix_confd",
    "keytool",
    "keystore_pass",
    "zbx_key_discovery",
    "zbx_key_startdate",
    "zbx_key_enddate",
];

/// Seconds to wait between discovery and the first item update.
pub const DEFAULT_POST_DISCOVERY_DELAY: u64 = 2;

/// Validated settings for one discovery run.
///
/// Read once at startup and never mutated afterwards.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Path to the `zabbix_sender` executable
    pub zabbix_sender: String,
    /// Path to the Zabbix agent configuration passed to `zabbix_sender -c`
    pub zabbix_confd: String,
    /// Path to the `keytool` executable
    pub keytool: String,
    /// Keystore password, or the literal `"None"` for an empty one
    pub keystore_pass: String,
    /// Low-level discovery key
    pub zbx_key_discovery: String,
    /// Item key prototype for certificate start dates
    pub zbx_key_startdate: String,
    /// Item key prototype for certificate end dates
    pub zbx_key_enddate: String,
    /// Seconds to wait after discovery, defaults to [`DEFAULT_POST_DISCOVERY_DELAY`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_discovery_delay: Option<u64>,
}

impl DiscoveryConfig {
    /// Loads and validates configuration from a JSON or TOML file.
    ///
    /// # Returns
    ///
    /// * `Ok(DiscoveryConfig)` - Section found and all required keys present
    /// * `Err(ConfigError::Io)` - File could not be read
    /// * `Err(ConfigError::Parse)` - Invalid syntax or a wrongly typed value
    /// * `Err(ConfigError::MissingSection)` - No `keystore_discovery` section
    /// * `Err(ConfigError::MissingKeys)` - One or more required keys absent
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use keystore_discovery::config::DiscoveryConfig;
    /// let config = DiscoveryConfig::from_file("keystore_discovery.json")?;
    /// # Ok::<(), keystore_discovery::config::ConfigError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let document: Value = if is_json {
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?
        } else {
            let table: toml::Table =
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
            serde_json::to_value(table).map_err(|e| ConfigError::Parse(e.to_string()))?
        };

        let config = Self::from_document(document)?;
        debug!("Loaded config from \"{}\"", path.display());
        Ok(config)
    }

    /// Extracts and validates the `keystore_discovery` section of a parsed document.
    pub fn from_document(document: Value) -> Result<Self, ConfigError> {
        let section = match document {
            Value::Object(mut root) => root.remove(SECTION),
            _ => None,
        }
        .ok_or_else(|| ConfigError::MissingSection(SECTION.to_string()))?;

        let Value::Object(settings) = section else {
            return Err(ConfigError::Parse(format!(
                "section \"{}\" must be a table",
                SECTION
            )));
        };

        let missing = missing_keys(&settings);
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(
                missing.into_iter().map(String::from).collect(),
            ));
        }

        serde_json::from_value(Value::Object(settings)).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Delay between sending discovery and updating the discovered items.
    pub fn post_discovery_delay(&self) -> Duration {
        Duration::from_secs(
            self.post_discovery_delay
                .unwrap_or(DEFAULT_POST_DISCOVERY_DELAY),
        )
    }

    /// Generates an example configuration file in TOML format.
    pub fn example_toml() -> String {
        let example = DiscoveryConfig {
            zabbix_sender: "/usr/bin/zabbix_sender".to_string(),
            zabbix_confd: "/etc/zabbix/zabbix_agentd.conf".to_string(),
            keytool: "/usr/bin/keytool".to_string(),
            keystore_pass: "None".to_string(),
            zbx_key_discovery: "keystore.discovery".to_string(),
            zbx_key_startdate: "keystore.cert.startdate".to_string(),
            zbx_key_enddate: "keystore.cert.enddate".to_string(),
            post_discovery_delay: Some(DEFAULT_POST_DISCOVERY_DELAY),
        };

        toml::to_string_pretty(&ExampleDocument {
            keystore_discovery: &example,
        })
        .unwrap_or_else(|_| "# Error generating example".to_string())
    }
}

#[derive(Serialize)]
struct ExampleDocument<'a> {
    keystore_discovery: &'a DiscoveryConfig,
}

/// Required keys absent from `settings`, in [`REQUIRED_KEYS`] order.
pub fn missing_keys(settings: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !settings.contains_key(*key))
        .collect()
}

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("IO Error: {0}")]
    Io(String),
    /// Syntax error or a value of the wrong type
    #[error("Parse Error: {0}")]
    Parse(String),
    /// The document has no section with our settings
    #[error("Config section \"{0}\" not found")]
    MissingSection(String),
    /// Required settings are absent
    #[error(
        "Required config settings missing: {}. Required: {}",
        .0.join(", "),
        REQUIRED_KEYS.join(", ")
    )]
    MissingKeys(Vec<String>),
}
