//! Metrics export to Zabbix.
//!
//! Reporting happens in two phases: a low-level discovery payload announcing
//! every alias, then one item update per alias and date.
//!
//! # Submodules
//!
//! - `zabbix` - `zabbix_sender` backed [`MetricSink`]

pub mod zabbix;

use serde_json::{json, Value};
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::info;

use crate::config::DiscoveryConfig;
use crate::error::Result;

/// Discovery macro carrying the alias in the discovery payload.
pub const KEYALIAS_MACRO: &str = "{#KEYALIAS}";

/// Receives individual metric values.
pub trait MetricSink {
    fn send(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<T: MetricSink + ?Sized> MetricSink for &mut T {
    fn send(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).send(key, value)
    }
}

/// Which end of the validity period an item update carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum ItemType {
    Start,
    End,
}

/// Metric key names taken from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricKeys {
    pub discovery: String,
    pub start_date: String,
    pub end_date: String,
}

impl MetricKeys {
    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self {
            discovery: config.zbx_key_discovery.clone(),
            start_date: config.zbx_key_startdate.clone(),
            end_date: config.zbx_key_enddate.clone(),
        }
    }

    /// Item key prototype for `item_type`.
    pub fn template(&self, item_type: ItemType) -> &str {
        match item_type {
            ItemType::Start => &self.start_date,
            ItemType::End => &self.end_date,
        }
    }

    /// Concrete item key, e.g. `cert.start["tomcat"]`.
    pub fn item_key(&self, item_type: ItemType, alias: &str) -> String {
        format!("{}[\"{}\"]", self.template(item_type), alias)
    }
}

/// Builds `{"data":[{"{#KEYALIAS}":"<alias>"},...]}` preserving alias order.
pub fn discovery_payload<A: AsRef<str>>(aliases: &[A]) -> String {
    let data: Vec<Value> = aliases
        .iter()
        .map(|alias| json!({ KEYALIAS_MACRO: alias.as_ref() }))
        .collect();

    json!({ "data": data }).to_string()
}

/// Sends discovery and item updates through a [`MetricSink`].
pub struct Reporter<S> {
    keys: MetricKeys,
    sink: S,
}

impl<S: MetricSink> Reporter<S> {
    pub fn new(keys: MetricKeys, sink: S) -> Self {
        Self { keys, sink }
    }

    pub fn send(&mut self, key: &str, value: impl std::fmt::Display) -> Result<()> {
        self.sink.send(key, &value.to_string())
    }

    /// Announces the aliases so Zabbix can create their items.
    pub fn send_discovery<A: AsRef<str>>(&mut self, aliases: &[A]) -> Result<()> {
        info!(
            "Sending Zabbix discovery for key \"{}\"",
            self.keys.discovery
        );
        let payload = discovery_payload(aliases);
        let key = self.keys.discovery.clone();
        self.send(&key, payload)
    }

    /// Updates the start or end date item of one alias.
    pub fn send_item(&mut self, item_type: ItemType, alias: &str, date: i64) -> Result<()> {
        let key = self.keys.item_key(item_type, alias);
        info!("Updating Zabbix item key \"{}\"", key);
        self.send(&key, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[derive(Default)]
    struct RecordingSink {
        sent: Vec<(String, String)>,
    }

    impl MetricSink for RecordingSink {
        fn send(&mut self, key: &str, value: &str) -> Result<()> {
            self.sent.push((key.to_string(), value.to_string()));
            Ok(())
        }
    }

    fn keys() -> MetricKeys {
        MetricKeys {
            discovery: "jks.discovery".to_string(),
            start_date: "jks.startdate".to_string(),
            end_date: "jks.enddate".to_string(),
        }
    }

    #[test]
    fn test_discovery_payload() {
        assert_eq!(
            discovery_payload(&["a", "b"]),
            r#"{"data":[{"{#KEYALIAS}":"a"},{"{#KEYALIAS}":"b"}]}"#
        );
    }

    #[test]
    fn test_discovery_payload_empty_and_escaped() {
        let none: [&str; 0] = [];
        assert_eq!(discovery_payload(&none), r#"{"data":[]}"#);
        assert_eq!(
            discovery_payload(&["say \"hi\""]),
            r#"{"data":[{"{#KEYALIAS}":"say \"hi\""}]}"#
        );
    }

    #[test]
    fn test_item_type_strings() {
        assert_eq!(ItemType::from_str("start").unwrap(), ItemType::Start);
        assert_eq!(ItemType::from_str("end").unwrap(), ItemType::End);
        assert!(ItemType::from_str("middle").is_err());
        assert_eq!(ItemType::End.to_string(), "end");
    }

    #[test]
    fn test_send_item() {
        let mut sink = RecordingSink::default();
        let mut reporter = Reporter::new(keys(), &mut sink);

        reporter.send_item(ItemType::Start, "a", 1234567890).unwrap();
        reporter.send_item(ItemType::End, "a", 1266103890).unwrap();

        assert_eq!(
            sink.sent,
            vec![
                ("jks.startdate[\"a\"]".to_string(), "1234567890".to_string()),
                ("jks.enddate[\"a\"]".to_string(), "1266103890".to_string()),
            ]
        );
    }

    #[test]
    fn test_send_discovery() {
        let mut sink = RecordingSink::default();
        let mut reporter = Reporter::new(keys(), &mut sink);

        reporter
            .send_discovery(&["tomcat".to_string(), "root-ca".to_string()])
            .unwrap();

        assert_eq!(sink.sent.len(), 1);
        assert_eq!(sink.sent[0].0, "jks.discovery");
        assert_eq!(
            sink.sent[0].1,
            r#"{"data":[{"{#KEYALIAS}":"tomcat"},{"{#KEYALIAS}":"root-ca"}]}"#
        );
    }

    #[test]
    fn test_metric_keys_from_config() {
        let config = DiscoveryConfig {
            zabbix_sender: "zabbix_sender".to_string(),
            zabbix_confd: "agentd.conf".to_string(),
            keytool: "keytool".to_string(),
            keystore_pass: "None".to_string(),
            zbx_key_discovery: "d".to_string(),
            zbx_key_startdate: "s".to_string(),
            zbx_key_enddate: "e".to_string(),
            post_discovery_delay: None,
        };

        let keys = MetricKeys::from_config(&config);
        assert_eq!(keys.template(ItemType::Start), "s");
        assert_eq!(keys.item_key(ItemType::End, "x"), "e[\"x\"]");
    }
}
