//! Builds the `AppConfig` from layered sources, later sources override earlier ones:
//! `config/base.toml` -> `config/{APP_ENVIRONMENT}.toml` -> `APP_*` environment variables.
//! A `.env` file in the working directory is loaded into the environment first.
//! Gets initialized with `OnceLock` so it only needs to get initialized once.

mod error;
mod types;

use std::{path::Path, sync::OnceLock};

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::info;

pub use error::{ConfigError, ConfigResult};
pub use types::{AppConfig, DbConfig, DbUrl, Environment, NetConfig, SslRequire};

/// Allocates a static `OnceLock` containing `AppConfig`.
/// This ensures configuration only gets initialized the first time we call this function.
/// Every other caller gets a &'static ref to AppConfig.
/// Panics if anything goes wrong.
pub fn get_or_init_config() -> &'static AppConfig {
    static CONFIG_INIT: OnceLock<AppConfig> = OnceLock::new();
    CONFIG_INIT.get_or_init(|| {
        info!("{:<20} - Initializing the configuration", "get_or_init_config");
        let base_path = std::env::current_dir().expect("Failed to determine the current DIR.");
        AppConfig::load(base_path.join("config"))
            .unwrap_or_else(|er| panic!("Fatal Error: Building config: {er}"))
    })
}

impl AppConfig {
    /// Reads the configuration from `config_dir` and the process environment.
    pub fn load(config_dir: impl AsRef<Path>) -> ConfigResult<Self> {
        // A missing .env file is fine, the variables may already be set.
        let _ = dotenvy::dotenv();

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()?;

        let mut config = Self::figment(config_dir.as_ref(), environment).extract::<AppConfig>()?;

        // Production gets its database from the platform.
        if matches!(environment, Environment::Production) {
            let production_db = std::env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;
            config.db_config = config.db_config.with_url(&production_db)?;
        }

        Ok(config)
    }

    /// The layered figment, exposed so that tests can merge their own overrides on top.
    pub fn figment(config_dir: &Path, environment: Environment) -> Figment {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").split("__"))
    }
}
