use crate::config::{AppConfig, LogFormat};
use crate::domain::model::Environment;
use crate::utils::error::Result;
use clap::Parser;
use std::path::Path;

#[derive(Debug, Clone, Parser)]
#[command(name = "user-collector")]
#[command(about = "Fetches, validates and exports the user list once per scheduled run")]
pub struct CliArgs {
    /// Path to TOML configuration file; built-in defaults are used when it does not exist
    #[arg(short, long, default_value = "user-collector.toml")]
    pub config: String,

    /// Override the environment (development, staging, production)
    #[arg(long)]
    pub env: Option<Environment>,

    /// Skip the scheduled-time check (ignored in production)
    #[arg(long)]
    pub ignore_schedule: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Show the resolved configuration without fetching or writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// File (if present), then environment variables, then command-line flags.
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = if Path::new(&self.config).exists() {
            AppConfig::from_file(&self.config)?
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides()?;
        self.apply_to(&mut config);
        Ok(config)
    }

    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(env) = self.env {
            config.environment = env;
        }
        if self.ignore_schedule {
            config.schedule.bypass = true;
        }
        if self.json_logs {
            config.logging.format = LogFormat::Json;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = CliArgs::parse_from([
            "user-collector",
            "--env",
            "development",
            "--ignore-schedule",
            "--json-logs",
        ]);
        let mut config = AppConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.environment, Environment::Development);
        assert!(config.schedule.bypass);
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
