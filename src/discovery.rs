//! The discovery run: scan, announce, wait, update.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use tracing::info;

use crate::config::DiscoveryConfig;
use crate::error::Result;
use crate::keystore::keytool::{CertificateSource, Keytool};
use crate::keystore::Keystore;
use crate::metrics::zabbix::ZabbixSender;
use crate::metrics::{ItemType, MetricKeys, MetricSink, Reporter};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Aliases announced in the discovery payload
    pub aliases: usize,
    /// Item updates sent after discovery
    pub items_sent: usize,
    /// Wall-clock duration of the whole run
    pub elapsed: Duration,
}

/// Wires a [`Keystore`] to a [`Reporter`].
pub struct Discovery<C, S> {
    keystore: Keystore<C>,
    reporter: Reporter<S>,
    post_discovery_delay: Duration,
}

impl Discovery<Keytool, ZabbixSender> {
    /// keytool and zabbix_sender as named in `config`.
    pub fn from_config(keystore: impl Into<PathBuf>, config: &DiscoveryConfig) -> Self {
        Discovery::new(
            Keystore::new(keystore, Keytool::from_config(config)),
            Reporter::new(
                MetricKeys::from_config(config),
                ZabbixSender::from_config(config),
            ),
            config.post_discovery_delay(),
        )
    }
}

impl<C: CertificateSource, S: MetricSink> Discovery<C, S> {
    pub fn new(
        keystore: Keystore<C>,
        reporter: Reporter<S>,
        post_discovery_delay: Duration,
    ) -> Self {
        Self {
            keystore,
            reporter,
            post_discovery_delay,
        }
    }

    pub fn keystore(&self) -> &Keystore<C> {
        &self.keystore
    }

    /// Runs one full discovery cycle.
    ///
    /// Nothing is sent unless the whole keystore scanned cleanly. The delay
    /// after discovery is a plain sleep: Zabbix creates discovered items
    /// asynchronously and drops values for items that do not exist yet.
    pub fn run(&mut self) -> Result<RunSummary> {
        let start_time = Instant::now();

        self.keystore.scan_keystore()?;

        let aliases = self.keystore.aliases();
        self.reporter.send_discovery(&aliases)?;

        info!(
            "Waiting delay between discovery and updating items for \"{}\" seconds..",
            self.post_discovery_delay.as_secs_f64()
        );
        thread::sleep(self.post_discovery_delay);

        let mut items_sent = 0;
        for (alias, record) in self.keystore.certs() {
            self.reporter
                .send_item(ItemType::Start, alias, record.start_date)?;
            self.reporter.send_item(ItemType::End, alias, record.end_date)?;
            items_sent += 2;
        }

        let elapsed = start_time.elapsed();
        info!("Script exec time: {:?}", elapsed);

        Ok(RunSummary {
            aliases: aliases.len(),
            items_sent,
            elapsed,
        })
    }
}
