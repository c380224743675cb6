//! Database connectors and shared connection utilities
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector, config and health checks
//! - `config` - `core_config::FromEnv` support for connector configs
//! - `all` - everything above
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "store");
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult};
