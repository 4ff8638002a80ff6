use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;
use std::env;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Loads the shared server settings.
    ///
    /// Sources, lowest precedence first: an optional `configuration.{toml,yaml,json}`
    /// file, `APP__*` environment variables, then the plain `PORT` variable.
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", env::var("PORT").ok())?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
