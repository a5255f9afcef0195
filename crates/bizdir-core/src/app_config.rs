use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Application id and REST key for the object store.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub app_id: String,
    pub rest_key: String,
}

impl std::fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("app_id", &mask(&self.app_id))
            .field("rest_key", &"[redacted]")
            .finish()
    }
}

/// First six characters followed by an ellipsis, enough to tell keys apart
/// in logs.
fn mask(value: &str) -> String {
    let prefix: String = value.chars().take(6).collect();
    format!("{prefix}...")
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub parse_server_url: String,
    pub parse_app_id: Option<String>,
    pub parse_rest_key: Option<String>,
    /// Filesystem path or `http(s)://` URL of the static fallback dataset.
    pub local_dataset: String,
    pub pending_store_path: PathBuf,
    pub query_limit: u32,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl AppConfig {
    /// Both store keys, or `None` when either is missing. Remote calls and
    /// the startup pending flush are skipped without them.
    #[must_use]
    pub fn remote_credentials(&self) -> Option<RemoteCredentials> {
        match (&self.parse_app_id, &self.parse_rest_key) {
            (Some(app_id), Some(rest_key)) => Some(RemoteCredentials {
                app_id: app_id.clone(),
                rest_key: rest_key.clone(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("parse_server_url", &self.parse_server_url)
            .field("parse_app_id", &self.parse_app_id.as_deref().map(mask))
            .field(
                "parse_rest_key",
                &self.parse_rest_key.as_ref().map(|_| "[redacted]"),
            )
            .field("local_dataset", &self.local_dataset)
            .field("pending_store_path", &self.pending_store_path)
            .field("query_limit", &self.query_limit)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}
