use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default; the store keys are optional and the
/// directory runs against the local dataset alone without them.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("BIZDIR_ENV", "development"))?;
    let log_level = or_default("BIZDIR_LOG_LEVEL", "info");

    let parse_server_url = or_default(
        "BIZDIR_PARSE_SERVER_URL",
        "https://parseapi.back4app.com/",
    );
    if !parse_server_url.starts_with("http://") && !parse_server_url.starts_with("https://") {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIZDIR_PARSE_SERVER_URL".to_string(),
            reason: format!("expected an http(s) URL, got '{parse_server_url}'"),
        });
    }
    let parse_app_id = optional("BIZDIR_PARSE_APP_ID");
    let parse_rest_key = optional("BIZDIR_PARSE_REST_KEY");

    let local_dataset = or_default("BIZDIR_LOCAL_DATASET", "./local_business_data.json");
    let pending_store_path = PathBuf::from(or_default(
        "BIZDIR_PENDING_STORE_PATH",
        "./.bizdir/local_storage.json",
    ));

    let query_limit = parse_u32("BIZDIR_QUERY_LIMIT", "1000")?;
    if query_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BIZDIR_QUERY_LIMIT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let request_timeout_secs = parse_u64("BIZDIR_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("BIZDIR_USER_AGENT", "bizdir/0.1 (local-directory)");
    let max_retries = parse_u32("BIZDIR_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("BIZDIR_RETRY_BACKOFF_BASE_MS", "500")?;

    Ok(AppConfig {
        env,
        log_level,
        parse_server_url,
        parse_app_id,
        parse_rest_key,
        local_dataset,
        pending_store_path,
        query_limit,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BIZDIR_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
