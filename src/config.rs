use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::HotlineError;

/// Runtime settings, loaded once from the environment with `HOTLINE_`-prefixed
/// variables layered over the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub listen: String,
    pub loglevel: String,
    /// Shared API key required for write operations. Empty disables auth.
    pub api_key: String,
    /// Default country for numbers and hotlines created without one.
    pub country: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:hotline.db".to_string(),
            listen: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            api_key: String::new(),
            country: "US".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, HotlineError> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("HOTLINE_"))
            .extract()
            .map_err(|e| HotlineError::Config(e.to_string()))
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("invalid HOTLINE_* environment configuration"));
