use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "brokerd")]
#[command(about = "OpenBrokerage - retail brokerage order and settlement engine")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the brokerage engine with the given configuration
    Start {
        /// Path to the configuration file
        #[arg(short, long, default_value = "brokerage.yaml")]
        config: PathBuf,

        /// Log output format (pretty, json, compact)
        #[arg(long, default_value = "pretty")]
        log_format: String,

        /// Expose Prometheus metrics on this port
        #[arg(long)]
        metrics_port: Option<u16>,
    },

    /// Validate configuration without starting the engine
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "brokerage.yaml")]
        config: PathBuf,
    },

    /// Initialize a new configuration file with all defaults
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "brokerage.yaml")]
        output: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_defaults() {
        let cli = Cli::parse_from(["brokerd", "start"]);
        match cli.command {
            Commands::Start {
                config,
                log_format,
                metrics_port,
            } => {
                assert_eq!(config, PathBuf::from("brokerage.yaml"));
                assert_eq!(log_format, "pretty");
                assert!(metrics_port.is_none());
            }
            _ => panic!("expected start command"),
        }
    }

    #[test]
    fn test_init_output_override() {
        let cli = Cli::parse_from(["brokerd", "init", "--output", "custom.yaml"]);
        match cli.command {
            Commands::Init { output } => assert_eq!(output, PathBuf::from("custom.yaml")),
            _ => panic!("expected init command"),
        }
    }
}
