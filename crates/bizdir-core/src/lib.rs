//! Canonical business types, keyword matching, record normalization, and
//! application configuration shared by every `bizdir` crate.

pub mod app_config;
pub mod config;
pub mod keywords;
pub mod normalize;
pub mod record;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, RemoteCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use keywords::{is_blank, KeywordForms};
pub use normalize::{normalize, normalize_value, FieldSource};
pub use record::{local_id_for_name, BusinessRecord, Keywords};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
