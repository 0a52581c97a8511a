//! Runtime settings and logger setup for the `cidr-set` binary.
//!
//! Settings come from environment variables, after `dotenv` has loaded any `.env` file:
//! - `CIDR_SET_LOG_CONFIG` - log4rs YAML file, default `log4rs.yml`
//! - `CIDR_SET_ADDRESS_LIMIT` - how many addresses to print, default 0 (none)
//! - `CIDR_SET_VALIDATE` - check the set for broken invariants after loading, default false

use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

pub const LOG_CONFIG_VAR: &str = "CIDR_SET_LOG_CONFIG";
pub const ADDRESS_LIMIT_VAR: &str = "CIDR_SET_ADDRESS_LIMIT";
pub const VALIDATE_VAR: &str = "CIDR_SET_VALIDATE";

const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}={value} is not a number")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name}={value} is not true or false")]
    InvalidFlag { name: &'static str, value: String },
    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_config: PathBuf,
    /// Addresses to print after the blocks, 0 prints none.
    pub address_limit: usize,
    pub validate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_config: PathBuf::from(DEFAULT_LOG_CONFIG),
            address_limit: 0,
            validate: false,
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Settings, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, which returns the value of a variable if it is set.
    ///
    /// # Arguments
    /// * `lookup` - Maps a variable name to its value
    ///
    /// # Returns
    /// The settings, with defaults for unset or empty variables
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Settings::default();
        let value = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(path) = value(LOG_CONFIG_VAR) {
            settings.log_config = PathBuf::from(path);
        }
        if let Some(limit) = value(ADDRESS_LIMIT_VAR) {
            settings.address_limit = limit.parse().map_err(|_| ConfigError::InvalidNumber {
                name: ADDRESS_LIMIT_VAR,
                value: limit,
            })?;
        }
        if let Some(flag) = value(VALIDATE_VAR) {
            settings.validate = parse_flag(VALIDATE_VAR, flag)?;
        }
        Ok(settings)
    }
}

fn parse_flag(name: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag { name, value }),
    }
}

/// Start log4rs from the YAML file in `settings`, or log to stderr at info level when the
/// file does not exist.
pub fn init_logging(settings: &Settings) -> Result<(), ConfigError> {
    if settings.log_config.exists() {
        return log4rs::init_file(&settings.log_config, Default::default()).map_err(|e| {
            ConfigError::Logging(format!("{}: {e}", settings.log_config.display()))
        });
    }
    log4rs::init_config(console_config(&settings.log_config)?)
        .map_err(|e| ConfigError::Logging(e.to_string()))?;
    log::debug!(
        "{} not found, logging to stderr",
        settings.log_config.display()
    );
    Ok(())
}

fn console_config(missing: &Path) -> Result<Config, ConfigError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("{d(%H:%M:%S)} {h({l})} {t} - {m}{n}")))
        .build();
    Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info))
        .map_err(|e| ConfigError::Logging(format!("no {}, fallback: {e}", missing.display())))
}
