use bizdir_core::FieldSource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One object as returned by the store's REST API.
///
/// File-valued fields come back as `{"__type": "File", "name": ..., "url": ...}`;
/// [`FieldSource::file_url`] resolves those through the store's own URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreObject(Map<String, Value>);

impl StoreObject {
    /// The store-assigned `objectId`.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("objectId").and_then(Value::as_str)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl FieldSource for StoreObject {
    fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    fn fields(&self) -> Map<String, Value> {
        self.0.clone()
    }

    fn file_url(&self, name: &str) -> Option<String> {
        let value = self.0.get(name)?;
        if value.get("__type").and_then(Value::as_str) == Some("File") {
            return value
                .get("url")
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
                .map(str::to_owned);
        }
        self.0.file_url(name)
    }
}
