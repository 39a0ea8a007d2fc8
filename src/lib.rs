//! Keystore certificate validity reporting for Zabbix.
//!
//! A run lists a Java keystore with `keytool`, extracts the validity period of
//! every alias, announces the aliases to Zabbix through low-level discovery and
//! then pushes each alias' start and end date with `zabbix_sender`.
//!
//! ```no_run
//! use keystore_discovery::{Discovery, DiscoveryConfig};
//!
//! let config = DiscoveryConfig::from_file("keystore_discovery.json")?;
//! let summary = Discovery::from_config("/opt/app/keystore.jks", &config).run()?;
//! println!("{} aliases reported", summary.aliases);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod command;
pub mod config;
pub mod discovery;
pub mod error;
pub mod keystore;
pub mod metrics;
pub mod table;

use std::fs::File;
use std::path::Path;

pub use config::{ConfigError, DiscoveryConfig};
pub use discovery::{Discovery, RunSummary};
pub use error::{DiscoveryError, Result};
pub use keystore::keytool::{CertificateSource, Keytool, StorePassword};
pub use keystore::{CertificateRecord, Keystore};
pub use metrics::zabbix::ZabbixSender;
pub use metrics::{discovery_payload, ItemType, MetricKeys, MetricSink, Reporter};

/// Fails unless `path` is a regular file the current user can open.
pub fn check_file(path: &Path) -> Result<()> {
    let readable = path.is_file() && File::open(path).is_ok();
    if readable {
        Ok(())
    } else {
        Err(DiscoveryError::UnreadableFile {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_check_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(check_file(file.path()).is_ok());

        let dir = tempdir().unwrap();
        assert!(matches!(
            check_file(dir.path()),
            Err(DiscoveryError::UnreadableFile { .. })
        ));
        assert!(check_file(&dir.path().join("missing.jks")).is_err());
    }
}
