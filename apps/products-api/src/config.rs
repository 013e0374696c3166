//! Configuration for Products API

use core_config::{app_info, env_or_default, server::ServerConfig, AppInfo, FromEnv};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Collection holding product documents (`PRODUCTS_COLLECTION`)
    pub products_collection: String,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            products_collection: env_or_default(
                "PRODUCTS_COLLECTION",
                domain_products::PRODUCTS_COLLECTION,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://db:27017")),
                ("MONGODB_DATABASE", Some("store")),
                ("PRODUCTS_COLLECTION", None),
                ("APP_ENV", None),
                ("PORT", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "products_api");
                assert_eq!(config.mongodb.database(), "store");
                assert_eq!(config.products_collection, "products");
                assert_eq!(config.environment, Environment::Development);
                assert_eq!(config.server.port, 8080);
            },
        );
    }

    #[test]
    fn test_config_from_env_overrides() {
        temp_env::with_vars(
            [
                ("MONGO_URL", Some("mongodb://db:27017")),
                ("MONGODB_URL", None),
                ("MONGO_DATABASE", Some("store")),
                ("MONGODB_DATABASE", None),
                ("PRODUCTS_COLLECTION", Some("catalog")),
                ("APP_ENV", Some("production")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.products_collection, "catalog");
                assert!(config.environment.is_production());
            },
        );
    }

    #[test]
    fn test_config_requires_mongodb_url() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", None),
                ("MONGODB_DATABASE", Some("store")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
