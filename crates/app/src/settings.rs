//! Settings of the admin binary.
//!
//! Read from `settings.toml` (optional) and from `BANK_` prefixed
//! environment variables, e.g. `BANK_APP__LEVEL=debug` or
//! `BANK_DATABASE__SQLITE=./bank.db`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("./bank.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Self::Memory => String::from("sqlite::memory:"),
            Self::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
}

/// `BANK_` followed by the key path joined with `__`.
fn environment() -> Environment {
    Environment::with_prefix("BANK")
        .prefix_separator("_")
        .separator("__")
}

impl Settings {
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        Self::load(path, environment())
    }

    fn load(path: Option<&str>, environment: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_SETTINGS_PATH)).required(false))
            .add_source(environment)
            .build()?;

        settings.try_deserialize()
    }
}
