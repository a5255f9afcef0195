//! Applications the store refused, kept locally and replayed later.
//!
//! Entries live as one JSON array under [`PENDING_KEY`] in a [`LocalKv`].
//! An image upload cannot be persisted, so only its filename is kept and
//! the replayed object is created without an image.
//!
//! The stored list is handled as raw JSON objects. Entries written in an
//! older shape are listed when possible and always replayed and kept; an
//! unreadable list is reported and never written over.

use bizdir_store::{BusinessApplication, BusinessStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DirectoryError;
use crate::kv::LocalKv;

pub const PENDING_KEY: &str = "pendingBusinesses";

/// Stands in for an image file that could not be queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePlaceholder {
    #[serde(rename = "originalFilename", alias = "_localFileName")]
    pub original_filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSubmission {
    /// The application's store fields, as they would have been written.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
    #[serde(rename = "Image", default)]
    pub image: Option<ImagePlaceholder>,
    /// Missing on entries queued before timestamps were recorded.
    #[serde(rename = "queuedAt", default)]
    pub queued_at: Option<DateTime<Utc>>,
}

impl PendingSubmission {
    #[must_use]
    pub fn from_application(application: &BusinessApplication, queued_at: DateTime<Utc>) -> Self {
        Self {
            fields: application.to_fields(),
            image: application.image.as_ref().map(|upload| ImagePlaceholder {
                original_filename: upload.filename.clone(),
            }),
            queued_at: Some(queued_at),
        }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields.get("Name").and_then(Value::as_str)
    }
}

/// Fields for the replayed create of a stored entry: everything but the
/// queue bookkeeping, with `Image` forced to null. `None` for non-objects.
#[must_use]
pub fn replay_fields(entry: &Value) -> Option<Map<String, Value>> {
    let mut fields = entry.as_object()?.clone();
    fields.remove("queuedAt");
    fields.insert("Image".to_owned(), Value::Null);
    Some(fields)
}

fn entry_name(entry: &Value) -> &str {
    entry.get("Name").and_then(Value::as_str).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub flushed: usize,
    pub remaining: usize,
}

pub struct PendingQueue {
    kv: LocalKv,
}

impl PendingQueue {
    #[must_use]
    pub fn new(kv: LocalKv) -> Self {
        Self { kv }
    }

    /// Current entries for display. An unreadable list reads as empty and
    /// entries that do not fit [`PendingSubmission`] are skipped; neither
    /// case changes what is stored.
    #[must_use]
    pub fn list(&self) -> Vec<PendingSubmission> {
        let entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "could not read pending submissions");
                return Vec::new();
            }
        };
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(submission) => Some(submission),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unrecognised pending entry in listing");
                    None
                }
            })
            .collect()
    }

    /// Appends `application` to the queue, creating the list if needed.
    /// Existing entries are kept as stored.
    ///
    /// # Errors
    ///
    /// [`DirectoryError`] if the stored list cannot be read or parsed (it is
    /// left untouched), or if the new list cannot be written.
    pub fn enqueue(
        &self,
        application: &BusinessApplication,
    ) -> Result<PendingSubmission, DirectoryError> {
        let mut entries = self.read_entries()?;
        let submission = PendingSubmission::from_application(application, Utc::now());
        let value = serde_json::to_value(&submission)
            .map_err(|e| DirectoryError::json(PENDING_KEY, e))?;
        entries.push(value);
        self.save(&entries)?;
        tracing::info!(
            name = submission.name().unwrap_or_default(),
            queued = entries.len(),
            "application queued for later submission"
        );
        Ok(submission)
    }

    /// Replays every entry against `store`, one at a time. Successes are
    /// dropped; failures and entries that are not objects stay queued.
    ///
    /// # Errors
    ///
    /// [`DirectoryError`] if the stored list cannot be read or parsed, or
    /// the remaining list cannot be written back.
    pub async fn flush(&mut self, store: &BusinessStore) -> Result<FlushReport, DirectoryError> {
        let entries = self.read_entries()?;
        if entries.is_empty() {
            return Ok(FlushReport::default());
        }

        let mut remaining = Vec::new();
        let mut flushed = 0;
        for entry in entries {
            let Some(fields) = replay_fields(&entry) else {
                tracing::warn!("pending entry is not an object; keeping it");
                remaining.push(entry);
                continue;
            };
            match store.create_fields(fields).await {
                Ok(created) => {
                    flushed += 1;
                    tracing::info!(
                        object_id = %created.object_id,
                        name = entry_name(&entry),
                        "pending submission saved"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        name = entry_name(&entry),
                        "pending submission still failing; keeping it"
                    );
                    remaining.push(entry);
                }
            }
        }

        if remaining.is_empty() {
            self.kv.remove_item(PENDING_KEY)?;
        } else {
            self.save(&remaining)?;
        }
        Ok(FlushReport {
            flushed,
            remaining: remaining.len(),
        })
    }

    /// The stored list as raw values. An absent key is an empty list.
    fn read_entries(&self) -> Result<Vec<Value>, DirectoryError> {
        match self.kv.get_item(PENDING_KEY)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| DirectoryError::json(PENDING_KEY, e))
            }
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[Value]) -> Result<(), DirectoryError> {
        let raw = serde_json::to_string(entries)
            .map_err(|e| DirectoryError::json(PENDING_KEY, e))?;
        self.kv.set_item(PENDING_KEY, &raw)
    }
}
