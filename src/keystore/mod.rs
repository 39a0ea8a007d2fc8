//! Keystore scanning.
//!
//! A [`Keystore`] asks its [`CertificateSource`] for the alias list and then,
//! alias by alias, for the validity period of each entry.
//!
//! # Submodules
//!
//! - `date` - keytool date normalization and epoch conversion
//! - `keytool` - the keytool binary and its output parsers

pub mod date;
pub mod keytool;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{DiscoveryError, Result};
use keytool::{parse_aliases, parse_validity, CertificateSource};

/// Validity window of one keystore entry, in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CertificateRecord {
    pub start_date: i64,
    pub end_date: i64,
}

/// An on-disk keystore and the certificate records found in it.
pub struct Keystore<S> {
    path: PathBuf,
    source: S,
    certs: Vec<(String, CertificateRecord)>,
}

impl<S: CertificateSource> Keystore<S> {
    pub fn new(path: impl Into<PathBuf>, source: S) -> Self {
        Self {
            path: path.into(),
            source,
            certs: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records from the last successful scan, in discovery order.
    pub fn certs(&self) -> &[(String, CertificateRecord)] {
        &self.certs
    }

    pub fn get(&self, alias: &str) -> Option<&CertificateRecord> {
        self.certs
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, record)| record)
    }

    pub fn aliases(&self) -> Vec<&str> {
        self.certs.iter().map(|(alias, _)| alias.as_str()).collect()
    }

    /// Lists the keystore and returns every alias in listing order.
    pub fn find_aliases(&self) -> Result<Vec<String>> {
        let listing = self.source.list(&self.path, None)?;
        Ok(parse_aliases(&listing))
    }

    /// Start of the alias' validity period, as a canonical date string.
    pub fn find_start_date(&self, alias: &str) -> Result<String> {
        let (from, _) = self.find_validity(alias)?;
        format_date(&from)
    }

    /// End of the alias' validity period, as a canonical date string.
    pub fn find_end_date(&self, alias: &str) -> Result<String> {
        let (_, until) = self.find_validity(alias)?;
        format_date(&until)
    }

    /// Canonical date string to epoch seconds, local zone.
    pub fn convert_to_timestamp(&self, date: &str) -> Result<i64> {
        date::convert_to_timestamp(date)
    }

    /// Rebuilds the certificate records from the keystore.
    ///
    /// The first failure aborts the scan and leaves the previous records in place.
    pub fn scan_keystore(&mut self) -> Result<()> {
        info!("Keystore \"{}\" scan started!", self.path.display());

        let mut certs: Vec<(String, CertificateRecord)> = Vec::new();
        for alias in self.find_aliases()? {
            info!("\"{}\" cert found (alias)", alias);

            let start_date = self.find_start_date(&alias)?;
            let end_date = self.find_end_date(&alias)?;

            info!("\"{}\" cert begins: {}", alias, start_date);
            info!("\"{}\" cert ends: {}", alias, end_date);

            let record = CertificateRecord {
                start_date: self.convert_to_timestamp(&start_date)?,
                end_date: self.convert_to_timestamp(&end_date)?,
            };

            match certs.iter_mut().find(|(name, _)| *name == alias) {
                Some((_, existing)) => *existing = record,
                None => certs.push((alias, record)),
            }
        }

        self.certs = certs;
        info!("Keystore \"{}\" scan completed!", self.path.display());
        Ok(())
    }

    fn find_validity(&self, alias: &str) -> Result<(String, String)> {
        let listing = self.source.list(&self.path, Some(alias))?;
        parse_validity(&listing).ok_or_else(|| DiscoveryError::MissingValidity {
            alias: alias.to_string(),
        })
    }
}

fn format_date(raw: &str) -> Result<String> {
    debug!("date before format: {}", raw);
    let formatted = date::format_keytool_date(raw)?;
    debug!("date after format: {}", formatted);
    Ok(formatted)
}
