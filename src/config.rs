//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded by `main`),
//! with the defaults below.

/// Program line used to invoke the Azure CLI.
pub const DEFAULT_AZ_CLI: &str = "az";
/// Largest stdout accepted from a single `az` invocation.
pub const MAX_OUTPUT_BYTES: usize = 5_000_000;

pub const ENV_AZ_CLI: &str = "AZ_CLI";
pub const ENV_MAX_OUTPUT_BYTES: &str = "AZ_MAX_OUTPUT_BYTES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Program line for the Azure CLI, e.g. `az` or `python -m azure.cli`.
    pub az_cli: String,
    pub max_output_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            az_cli: DEFAULT_AZ_CLI.to_string(),
            max_output_bytes: MAX_OUTPUT_BYTES,
        }
    }
}

impl Config {
    /// Build a config from `AZ_CLI` and `AZ_MAX_OUTPUT_BYTES`.
    ///
    /// Unparsable values are logged and replaced by the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(az_cli) = lookup(ENV_AZ_CLI) {
            if az_cli.trim().is_empty() {
                log::warn!("{ENV_AZ_CLI} is empty, using '{DEFAULT_AZ_CLI}'");
            } else {
                config.az_cli = az_cli.trim().to_string();
            }
        }

        if let Some(max) = lookup(ENV_MAX_OUTPUT_BYTES) {
            match max.trim().parse::<usize>() {
                Ok(max) if max > 0 => config.max_output_bytes = max,
                _ => log::warn!(
                    "Ignoring {ENV_MAX_OUTPUT_BYTES}='{max}', using {MAX_OUTPUT_BYTES}"
                ),
            }
        }

        log::debug!("config={config:?}");
        config
    }

    /// Override the program line, e.g. from a command-line flag.
    pub fn with_az_cli(mut self, az_cli: Option<String>) -> Self {
        if let Some(az_cli) = az_cli {
            self.az_cli = az_cli;
        }
        self
    }
}
