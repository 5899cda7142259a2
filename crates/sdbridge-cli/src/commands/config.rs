//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use sdbridge_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate configuration file
    Validate,
    /// Generate a default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    url: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path, url)?;
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match super::load_config(config_path, url) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}' is valid", config_path));
                output::print_kv("Device", &config.device.base_url);
                output::print_kv(
                    "Poll interval",
                    &format!("{}s", config.polling.interval_seconds),
                );
                output::print_kv(
                    "Transfer timeout",
                    &config
                        .device
                        .transfer_timeout_seconds
                        .map(|s| format!("{}s", s))
                        .unwrap_or_else(|| "none".to_string()),
                );
                output::print_kv("Debug log lines", &config.debug_log.capacity.to_string());
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            let default_config = include_str!("../../../../config/default.toml");

            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(out_path, default_config).await?;

            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}
