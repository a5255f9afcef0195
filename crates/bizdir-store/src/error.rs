use thiserror::Error;

/// Errors returned by the object store client.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-2xx status. `code` is the store's own
    /// error code from the `{"code": n, "error": "..."}` body, when present.
    #[error("object store error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid server URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid credentials header: {0}")]
    InvalidCredentials(String),

    #[error("missing object id")]
    MissingId,
}

impl StoreError {
    /// Store code for a lookup of an object that does not exist.
    pub const OBJECT_NOT_FOUND: i64 = 101;
    /// Store code for a write rejected by ACLs or class-level permissions.
    pub const OPERATION_FORBIDDEN: i64 = 119;

    /// `true` when the store refused the operation for permission reasons.
    ///
    /// Matches the forbidden code, HTTP 403, or an error message that talks
    /// about permissions, ACLs, or access.
    #[must_use]
    pub fn is_permission_denied(&self) -> bool {
        match self {
            StoreError::Api {
                status,
                code,
                message,
            } => {
                let message = message.to_lowercase();
                *code == Some(Self::OPERATION_FORBIDDEN)
                    || *status == 403
                    || ["permission", "acl", "access"]
                        .iter()
                        .any(|needle| message.contains(needle))
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            StoreError::Api { status, code, .. } => {
                *status == 404 || *code == Some(Self::OBJECT_NOT_FOUND)
            }
            _ => false,
        }
    }
}
