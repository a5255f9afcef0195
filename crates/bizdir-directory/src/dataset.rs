//! The static business list that ships with the directory.
//!
//! The document is an array whose first element is the record array
//! (`[[{...}, {...}]]`); a flat array of records is accepted too.

use std::path::PathBuf;
use std::time::Duration;

use bizdir_core::{normalize_value, BusinessRecord};
use serde_json::Value;

use crate::error::DirectoryError;

const FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    File(PathBuf),
    Url(String),
}

/// Where the fallback dataset lives: a file path or an `http(s)://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDataset {
    source: Source,
}

impl LocalDataset {
    #[must_use]
    pub fn new(location: &str) -> Self {
        let trimmed = location.trim();
        let source = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Source::Url(trimmed.to_owned())
        } else {
            Source::File(PathBuf::from(trimmed))
        };
        Self { source }
    }

    #[must_use]
    pub fn location(&self) -> String {
        match &self.source {
            Source::File(path) => path.display().to_string(),
            Source::Url(url) => url.clone(),
        }
    }

    /// Raw records, one level of nesting unwrapped.
    ///
    /// # Errors
    ///
    /// - [`DirectoryError::Io`] if the file cannot be read.
    /// - [`DirectoryError::Http`] if the URL cannot be fetched or returns a
    ///   non-2xx status.
    /// - [`DirectoryError::Json`] if the document is not JSON.
    /// - [`DirectoryError::Shape`] if the document is not an array.
    pub async fn load(&self) -> Result<Vec<Value>, DirectoryError> {
        let text = match &self.source {
            Source::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| DirectoryError::io(path, e))?,
            Source::Url(url) => {
                let client = reqwest::Client::builder()
                    .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                    .build()?;
                client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?
            }
        };
        let document: Value = serde_json::from_str(&text)
            .map_err(|e| DirectoryError::json(self.location(), e))?;
        unwrap_records(document).ok_or_else(|| DirectoryError::Shape {
            location: self.location(),
            reason: "expected an array of records".to_owned(),
        })
    }

    /// Loaded and normalized; entries that are not objects are dropped.
    ///
    /// # Errors
    ///
    /// As for [`Self::load`].
    pub async fn records(&self) -> Result<Vec<BusinessRecord>, DirectoryError> {
        let raw = self.load().await?;
        Ok(raw.iter().filter_map(normalize_value).collect())
    }
}

fn unwrap_records(document: Value) -> Option<Vec<Value>> {
    let Value::Array(mut outer) = document else {
        return None;
    };
    if matches!(outer.first(), Some(Value::Array(_))) {
        if let Value::Array(inner) = outer.swap_remove(0) {
            return Some(inner);
        }
    }
    Some(outer)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_document_is_unwrapped_once() {
        let records = unwrap_records(json!([[{"Name": "A"}, {"Name": "B"}]])).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Name"], "A");
    }

    #[test]
    fn flat_array_is_accepted() {
        let records = unwrap_records(json!([{"Name": "A"}])).unwrap();
        assert_eq!(records, vec![json!({"Name": "A"})]);
    }

    #[test]
    fn empty_array_is_empty() {
        assert_eq!(unwrap_records(json!([])), Some(Vec::new()));
    }

    #[test]
    fn non_array_document_is_rejected() {
        assert_eq!(unwrap_records(json!({"results": []})), None);
    }

    #[test]
    fn location_kind_follows_scheme() {
        assert_eq!(
            LocalDataset::new("https://cdn.example.com/data.json").source,
            Source::Url("https://cdn.example.com/data.json".to_owned())
        );
        assert_eq!(
            LocalDataset::new("./local_business_data.json").source,
            Source::File(PathBuf::from("./local_business_data.json"))
        );
    }
}
