//! String key-value storage persisted as one JSON object file.
//!
//! Values are opaque strings (callers store serialized JSON in them), the
//! same contract as browser `localStorage`. A missing file reads as empty.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::DirectoryError;

#[derive(Debug, Clone)]
pub struct LocalKv {
    path: PathBuf,
}

impl LocalKv {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    ///
    /// [`DirectoryError::Io`] or [`DirectoryError::Json`] if the file exists
    /// but cannot be read as a string map.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, DirectoryError> {
        Ok(self.read_all()?.remove(key))
    }

    /// # Errors
    ///
    /// Any read error, or [`DirectoryError::Io`] if the write fails.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), DirectoryError> {
        let mut items = self.read_all()?;
        items.insert(key.to_owned(), value.to_owned());
        self.write_all(&items)
    }

    /// Removing an absent key is a no-op and does not touch the file.
    ///
    /// # Errors
    ///
    /// Any read error, or [`DirectoryError::Io`] if the write fails.
    pub fn remove_item(&self, key: &str) -> Result<(), DirectoryError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&items)
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, DirectoryError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(DirectoryError::io(&self.path, e)),
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text)
            .map_err(|e| DirectoryError::json(self.path.display().to_string(), e))
    }

    /// Writes a sibling temp file, then renames it over the target.
    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), DirectoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DirectoryError::io(parent, e))?;
        }
        let body = serde_json::to_string_pretty(items)
            .map_err(|e| DirectoryError::json(self.path.display().to_string(), e))?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, body).map_err(|e| DirectoryError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| DirectoryError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> LocalKv {
        let dir = std::env::temp_dir().join("bizdir-kv-tests");
        let name = format!("store-{}.json", uuid::Uuid::new_v4());
        LocalKv::new(dir.join(name))
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let kv = scratch();
        assert_eq!(kv.get_item("anything").unwrap(), None);
    }

    #[test]
    fn set_get_remove_round_trip() {
        let kv = scratch();
        kv.set_item("pendingBusinesses", "[]").unwrap();
        kv.set_item("other", "\"x\"").unwrap();
        assert_eq!(kv.get_item("pendingBusinesses").unwrap().as_deref(), Some("[]"));

        kv.remove_item("pendingBusinesses").unwrap();
        assert_eq!(kv.get_item("pendingBusinesses").unwrap(), None);
        assert_eq!(kv.get_item("other").unwrap().as_deref(), Some("\"x\""));
        assert!(!kv.path().with_extension("json.tmp").exists());

        std::fs::remove_file(kv.path()).unwrap();
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let kv = scratch();
        std::fs::create_dir_all(kv.path().parent().unwrap()).unwrap();
        std::fs::write(kv.path(), "not json").unwrap();
        assert!(matches!(
            kv.get_item("k"),
            Err(DirectoryError::Json { .. })
        ));
        std::fs::remove_file(kv.path()).unwrap();
    }
}
