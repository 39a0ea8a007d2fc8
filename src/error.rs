//! Error types for keystore discovery.
//!
//! Every failure in a run is fatal: nothing is retried and no partial results
//! are reported. The variants below let the binary log a precise message
//! before exiting.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Error type for a keystore discovery run.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// An input file is missing, is not a regular file, or cannot be opened
    #[error("File \"{}\" does not exist or no read permissions!", .path.display())]
    UnreadableFile {
        /// The offending path
        path: PathBuf,
    },

    /// Configuration could not be loaded or validated
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An external tool could not be started at all
    #[error("Failed to exec cmd {command}: {source}")]
    CommandSpawn {
        /// Rendered command line
        command: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// An external tool ran but exited unsuccessfully
    #[error("Cmd {command} failed ({status}): {output}")]
    CommandFailed {
        /// Rendered command line
        command: String,
        /// Exit status as reported by the OS
        status: String,
        /// Combined stdout and stderr of the tool
        output: String,
    },

    /// Keytool printed a date we cannot interpret
    #[error("Unable to parse date \"{input}\": {reason}")]
    DateParse {
        /// The raw date text
        input: String,
        /// Why parsing failed
        reason: String,
    },

    /// Keytool printed no "Valid from ... until ..." line for an alias
    #[error("No validity period found for alias \"{alias}\"")]
    MissingValidity {
        /// Alias that was queried
        alias: String,
    },
}

impl DiscoveryError {
    pub(crate) fn date_parse(input: &str, reason: impl ToString) -> Self {
        Self::DateParse {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}
