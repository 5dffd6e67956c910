//! calview configuration.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{CalViewError, CalViewResult};
use crate::recurrence::DEFAULT_RECURRENCE_LIMIT;

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_recurrence_limit() -> u16 {
    DEFAULT_RECURRENCE_LIMIT
}

fn default_log_filter() -> String {
    "warn".to_string()
}

/// Configuration at ~/.config/calview/config.toml, overridable with
/// `CALVIEW_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct CalViewConfig {
    /// Zone used to read dates given on the command line
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Maximum number of instances produced per series expansion
    #[serde(default = "default_recurrence_limit")]
    pub recurrence_limit: u16,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for CalViewConfig {
    fn default() -> Self {
        CalViewConfig {
            timezone: default_timezone(),
            recurrence_limit: default_recurrence_limit(),
            log_filter: default_log_filter(),
        }
    }
}

impl CalViewConfig {
    pub fn config_path() -> CalViewResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalViewError::Config("Could not determine config directory".into()))?
            .join("calview");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user config, writing a commented default file on first run.
    pub fn load() -> CalViewResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::from_path(&config_path)
    }

    pub fn from_path(path: &Path) -> CalViewResult<Self> {
        let config: CalViewConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("CALVIEW").try_parsing(true))
            .build()
            .map_err(|e| CalViewError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalViewError::Config(e.to_string()))?;

        config.tz()?;
        if config.recurrence_limit == 0 {
            return Err(CalViewError::Config(
                "recurrence_limit must be at least 1".into(),
            ));
        }

        Ok(config)
    }

    pub fn tz(&self) -> CalViewResult<Tz> {
        self.timezone
            .parse()
            .map_err(|_| CalViewError::Config(format!("Unknown timezone '{}'", self.timezone)))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalViewResult<()> {
        let contents = format!(
            "\
# calview configuration

# Zone used to read --from/--to dates:
# timezone = \"{}\"

# Maximum instances produced when expanding a recurring event:
# recurrence_limit = {}

# Log filter when RUST_LOG is not set:
# log_filter = \"{}\"
",
            default_timezone(),
            DEFAULT_RECURRENCE_LIMIT,
            default_log_filter()
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalViewError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalViewError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
