//! # Config Subcommand
//!
//! Prints the effective configuration after every layer has been applied,
//! or checks a YAML file without starting anything.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use agrimart_core::MarketConfig;

/// Arguments for the `agrimart config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show {
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Keys)]
        format: Format,
    },

    /// Parse and validate a YAML configuration file.
    Check {
        /// File to check.
        file: PathBuf,
    },
}

/// Output formats for `config show`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `KEY = value` lines using the upper-case key names.
    Keys,
    /// The YAML document a configuration file would contain.
    Yaml,
}

/// Execute the config subcommand.
pub fn run_config(args: &ConfigArgs, config_path: Option<&Path>) -> Result<u8> {
    match &args.command {
        ConfigCommand::Show { format } => {
            let config = crate::load_config(config_path)?;
            print!("{}", render(&config, *format)?);
            Ok(0)
        }
        ConfigCommand::Check { file } => {
            let config = MarketConfig::from_yaml_file(file)
                .with_context(|| format!("invalid configuration file {}", file.display()))?;
            println!("OK: {} is valid", file.display());
            print!("{}", render(&config, Format::Keys)?);
            Ok(0)
        }
    }
}

fn render(config: &MarketConfig, format: Format) -> Result<String> {
    Ok(match format {
        Format::Keys => config
            .entries()
            .into_iter()
            .map(|(key, value)| format!("{key} = {value}\n"))
            .collect(),
        Format::Yaml => serde_yaml::to_string(config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_format_lists_every_key() {
        let out = render(&MarketConfig::default(), Format::Keys).unwrap();
        assert_eq!(out.lines().count(), 5);
        assert!(out.contains("SHIPPED_TO_DELIVERED_MINUTES = 10"));
        assert!(out.contains("DEFAULT_DELIVERY_ESTIMATE_DAYS = 7"));
    }

    #[test]
    fn yaml_format_loads_back() {
        let mut config = MarketConfig::default();
        config.dispute_response_minutes = 1_440;
        let yaml = render(&config, Format::Yaml).unwrap();
        assert_eq!(MarketConfig::from_yaml_str(&yaml, "test").unwrap(), config);
    }

    #[test]
    fn check_accepts_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("agrimart.yaml");
        std::fs::write(&file, "dispute_response_minutes: 30\n").unwrap();
        let args = ConfigArgs {
            command: ConfigCommand::Check { file },
        };
        assert_eq!(run_config(&args, None).unwrap(), 0);
    }

    #[test]
    fn check_rejects_zero_timer() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("agrimart.yaml");
        std::fs::write(&file, "sweep_interval_seconds: 0\n").unwrap();
        let args = ConfigArgs {
            command: ConfigCommand::Check { file },
        };
        let err = run_config(&args, None).unwrap_err();
        assert!(format!("{err:#}").contains("SWEEP_INTERVAL_SECONDS"), "{err:#}");
    }

    #[test]
    fn check_rejects_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("agrimart.yaml");
        std::fs::write(&file, "max_cart_size: 3\n").unwrap();
        let args = ConfigArgs {
            command: ConfigCommand::Check { file },
        };
        assert!(run_config(&args, None).is_err());
    }
}
