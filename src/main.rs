#![deny(unsafe_code)]

use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::error;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::EnvFilter;

use keystore_discovery::{check_file, table, Discovery, DiscoveryConfig, Keystore, Keytool};

/// Report keystore certificate validity dates to Zabbix
#[derive(Parser)]
#[command(name = "keystore-discovery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Keystore file location
    #[arg(short, long, required_unless_present = "example_config")]
    keystore: Option<PathBuf>,

    /// Config file location (.json, otherwise TOML)
    #[arg(short, long, required_unless_present = "example_config")]
    config: Option<PathBuf>,

    /// Scan the keystore and print its certificates without sending anything
    #[arg(long)]
    dry_run: bool,

    /// Log executed commands and raw dates
    #[arg(short, long)]
    verbose: bool,

    /// Print an example configuration file and exit
    #[arg(long)]
    example_config: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.example_config {
        print!("{}", DiscoveryConfig::example_toml());
        exit(0);
    }

    init_tracing(cli.verbose);

    if let Err(err) = run(&cli) {
        error!("{:#}", err);
        exit(1);
    }

    exit(0);
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_writer(std::io::stdout)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let keystore = cli.keystore.as_deref().context("--keystore is required")?;
    let config_path = cli.config.as_deref().context("--config is required")?;

    check_file(keystore)?;
    check_file(config_path)?;

    let config = DiscoveryConfig::from_file(config_path)
        .with_context(|| format!("Failed to load config \"{}\"", config_path.display()))?;

    if cli.dry_run {
        let mut keystore = Keystore::new(keystore, Keytool::from_config(&config));
        keystore.scan_keystore()?;
        println!(
            "{}",
            table::certificate_table(keystore.certs(), Utc::now().timestamp())
        );
        return Ok(());
    }

    Discovery::from_config(keystore, &config).run()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_keystore_and_config() {
        assert!(Cli::try_parse_from(["keystore-discovery"]).is_err());
        assert!(Cli::try_parse_from(["keystore-discovery", "-k", "store.jks"]).is_err());
        assert!(Cli::try_parse_from(["keystore-discovery", "-c", "conf.json"]).is_err());
    }

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from([
            "keystore-discovery",
            "-k",
            "store.jks",
            "--config",
            "conf.json",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.keystore, Some(PathBuf::from("store.jks")));
        assert_eq!(cli.config, Some(PathBuf::from("conf.json")));
        assert!(cli.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_example_config_alone() {
        let cli = Cli::try_parse_from(["keystore-discovery", "--example-config"]).unwrap();
        assert!(cli.example_config);
        assert!(cli.keystore.is_none());
    }

    #[test]
    fn test_run_rejects_missing_keystore() {
        let cli = Cli::try_parse_from([
            "keystore-discovery",
            "-k",
            "/nonexistent/store.jks",
            "-c",
            "/nonexistent/conf.json",
        ])
        .unwrap();

        let err = run(&cli).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/store.jks"));
    }
}
