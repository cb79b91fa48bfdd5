use anyhow::Context;
use serde::Deserialize;

use crate::books_repository::PostgresBooksRepositoryConfig;

const CONFIG_FILE_ENV: &str = "BOOKSERVICE_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "bookservice.toml";
const ENV_PREFIX: &str = "BOOKSERVICE";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    /// Keep books in process memory instead of postgres
    pub use_in_memory: bool,
    pub host: String,
    pub username: String,
    pub password: String,
    pub name: String,
}

impl Settings {
    /// Loads defaults, then the optional config file, then `BOOKSERVICE_*` environment variables,
    /// e.g. `BOOKSERVICE_DATABASE__HOST=db`
    pub fn load() -> anyhow::Result<Self> {
        let config_file =
            std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::builder()?
            .add_source(config::File::with_name(&config_file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    fn builder() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.use_in_memory", false)?
            .set_default("database.host", "127.0.0.1")?
            .set_default("database.username", "postgres")?
            .set_default("database.password", "postgres")?
            .set_default("database.name", "postgres")?)
    }
}

impl From<DatabaseSettings> for PostgresBooksRepositoryConfig {
    fn from(settings: DatabaseSettings) -> Self {
        Self {
            hostname: settings.host,
            username: settings.username,
            password: settings.password,
            dbname: settings.name,
        }
    }
}
