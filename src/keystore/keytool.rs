//! keytool integration.
//!
//! [`CertificateSource`] is the seam between the scan logic and the JDK
//! `keytool` binary; tests substitute canned listings for it.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::command::ToolCommand;
use crate::config::DiscoveryConfig;
use crate::error::Result;

lazy_static! {
    static ref ALIAS_NAME: Regex =
        Regex::new(r"(?im)^alias name:[ \t]*(.*?)[ \t]*\r?$").unwrap();
    static ref VALIDITY: Regex =
        Regex::new(r"(?im)^valid from:[ \t]*(.*?)[ \t]+until:[ \t]*(.*?)[ \t]*\r?$").unwrap();
}

/// Produces `keytool -v -list` style text for a keystore.
pub trait CertificateSource {
    /// Verbose listing of the whole keystore, or of a single alias.
    fn list(&self, keystore: &Path, alias: Option<&str>) -> Result<String>;
}

impl<T: CertificateSource + ?Sized> CertificateSource for &T {
    fn list(&self, keystore: &Path, alias: Option<&str>) -> Result<String> {
        (**self).list(keystore, alias)
    }
}

/// How the store password is handed to keytool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorePassword {
    /// `-storepass ""`, for keystores without a password
    Empty,
    /// No `-storepass` flag at all
    Omitted,
    /// `-storepass <password>`
    Password(String),
}

impl StorePassword {
    /// Interprets the `keystore_pass` setting; the literal `"None"` means empty.
    pub fn from_setting(value: &str) -> Self {
        match value {
            "None" => StorePassword::Empty,
            "" => StorePassword::Omitted,
            password => StorePassword::Password(password.to_string()),
        }
    }
}

/// The JDK `keytool` binary.
#[derive(Debug, Clone)]
pub struct Keytool {
    program: String,
    password: StorePassword,
}

impl Keytool {
    pub fn new(program: impl Into<String>, password: StorePassword) -> Self {
        Self {
            program: program.into(),
            password,
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(
            config.keytool.clone(),
            StorePassword::from_setting(&config.keystore_pass),
        )
    }

    /// Builds `keytool -v -list -keystore <path> [-storepass ..] [-alias ..]`.
    pub fn command(&self, keystore: &Path, alias: Option<&str>) -> ToolCommand {
        let mut cmd = ToolCommand::new(self.program.clone())
            .arg("-v")
            .arg("-list")
            .arg("-keystore")
            .arg(keystore);

        cmd = match &self.password {
            StorePassword::Empty => cmd.arg("-storepass").arg(""),
            StorePassword::Omitted => cmd,
            StorePassword::Password(password) => cmd.arg("-storepass").secret_arg(password.clone()),
        };

        if let Some(alias) = alias {
            cmd = cmd.arg("-alias").arg(alias);
        }

        cmd
    }
}

impl CertificateSource for Keytool {
    fn list(&self, keystore: &Path, alias: Option<&str>) -> Result<String> {
        self.command(keystore, alias).run()
    }
}

/// Aliases from `Alias name: <alias>` lines, in listing order.
pub fn parse_aliases(listing: &str) -> Vec<String> {
    ALIAS_NAME
        .captures_iter(listing)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|alias| !alias.is_empty())
        .collect()
}

/// Raw `(valid from, until)` texts of the first validity line.
///
/// Entries with a certificate chain print one line per certificate; the first
/// belongs to the entry itself.
pub fn parse_validity(listing: &str) -> Option<(String, String)> {
    VALIDITY.captures(listing).map(|caps| {
        (
            caps[1].trim().to_string(),
            caps[2].trim().to_string(),
        )
    })
}
