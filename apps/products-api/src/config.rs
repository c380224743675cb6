//! Configuration for Products API

use core_config::{AppInfo, Environment, FromEnv, app_info, env_parse_or, server::ServerConfig};
use database::common::RetryConfig;
use database::mongodb::MongoConfig;
use std::time::Duration;

/// Application configuration
///
/// Besides the variables read by [`MongoConfig`] and [`ServerConfig`]:
/// - `APP_ENV`: `production` switches to JSON logs
/// - `MONGODB_CONNECT_RETRIES`: startup connection retries (default: 5)
/// - `SHUTDOWN_TIMEOUT_SECS`: time allowed for cleanup after a stop signal (default: 30)
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub mongo_retry: RetryConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub shutdown_timeout: Duration,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        let mongo_retry =
            RetryConfig::new().with_max_retries(env_parse_or("MONGODB_CONNECT_RETRIES", 5)?);
        let shutdown_timeout = Duration::from_secs(env_parse_or("SHUTDOWN_TIMEOUT_SECS", 30)?);

        Ok(Self {
            app: app_info!(),
            mongodb,
            mongo_retry,
            server,
            environment,
            shutdown_timeout,
        })
    }
}
