//! Command-line arguments and listen address resolution.

use std::path::PathBuf;

use clap::Parser;

use crate::config::schema::{AdapterConfig, DEFAULT_ADAPTER_PORT};

#[derive(Debug, Clone, Parser, Default)]
#[command(name = "telemetry-adapter")]
#[command(version, about = "Mesh telemetry adapter forwarding to a stream processor", long_about = None)]
pub struct Cli {
    /// Listen address: `host:port`, `:port` or a bare port [default: 38355]
    pub address: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Pick the listen address: positional argument, then config file, then the
/// default port. The value is not checked here; binding reports bad input.
pub fn resolve_listen_address(cli: &Cli, config: &AdapterConfig) -> String {
    match &cli.address {
        Some(address) => address.clone(),
        None if !config.listener.address.is_empty() => config.listener.address.clone(),
        None => DEFAULT_ADAPTER_PORT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn no_argument_uses_default_port() {
        let cli = parse(&["telemetry-adapter"]);
        let address = resolve_listen_address(&cli, &AdapterConfig::default());
        assert_eq!(address, DEFAULT_ADAPTER_PORT);
    }

    #[test]
    fn positional_argument_overrides() {
        let cli = parse(&["telemetry-adapter", "9999"]);
        assert_eq!(resolve_listen_address(&cli, &AdapterConfig::default()), "9999");
    }

    #[test]
    fn positional_argument_beats_config_file() {
        let mut config = AdapterConfig::default();
        config.listener.address = "127.0.0.1:7000".into();

        let cli = parse(&["telemetry-adapter", "0.0.0.0:9999"]);
        assert_eq!(resolve_listen_address(&cli, &config), "0.0.0.0:9999");

        let cli = parse(&["telemetry-adapter"]);
        assert_eq!(resolve_listen_address(&cli, &config), "127.0.0.1:7000");
    }

    #[test]
    fn empty_config_address_falls_back_to_default() {
        let mut config = AdapterConfig::default();
        config.listener.address.clear();
        assert_eq!(
            resolve_listen_address(&Cli::default(), &config),
            DEFAULT_ADAPTER_PORT
        );
    }

    #[test]
    fn address_is_not_validated() {
        let cli = parse(&["telemetry-adapter", "not an address"]);
        assert_eq!(
            resolve_listen_address(&cli, &AdapterConfig::default()),
            "not an address"
        );
    }

    #[test]
    fn config_flag_is_parsed() {
        let cli = parse(&["telemetry-adapter", "--config", "/etc/adapter.toml", "9000"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/adapter.toml")));
        assert_eq!(cli.address.as_deref(), Some("9000"));
    }
}
