//! Read operations with graceful degradation, and application submission.
//!
//! Every read tries the remote store first. A failed or empty remote answer
//! falls through to the full list (remote, then the local dataset) filtered
//! client-side, so callers always get a list and never an error.

use bizdir_core::{is_blank, local_id_for_name, normalize, BusinessRecord, KeywordForms};
use bizdir_store::{BusinessApplication, BusinessStore, StoreObject};
use percent_encoding::percent_decode_str;

use crate::dataset::LocalDataset;
use crate::error::DirectoryError;
use crate::pending::PendingQueue;

/// How a submitted application ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Saved { id: String },
    /// The store refused or was unreachable; the application is queued.
    Queued { error: String },
}

pub struct Directory {
    remote: Option<BusinessStore>,
    local: LocalDataset,
}

impl Directory {
    /// `remote = None` means the store is not configured and every remote
    /// step counts as failed.
    #[must_use]
    pub fn new(remote: Option<BusinessStore>, local: LocalDataset) -> Self {
        Self { remote, local }
    }

    #[must_use]
    pub fn remote(&self) -> Option<&BusinessStore> {
        self.remote.as_ref()
    }

    /// Businesses matching `term`. A blank term lists everything.
    pub async fn search(&self, term: &str) -> Vec<BusinessRecord> {
        let term = term.trim();
        if term.is_empty() {
            return self.fetch_all().await;
        }

        if let Some(store) = &self.remote {
            match store.find_by_keyword(term).await {
                Ok(found) if !found.is_empty() => return normalize_all(&found),
                Ok(_) => tracing::info!(term, "no remote matches; filtering the full list"),
                Err(e) => {
                    tracing::warn!(error = %e, term, "remote search failed; filtering the full list");
                }
            }
        }

        let forms = KeywordForms::expand(term);
        let matched: Vec<BusinessRecord> = self
            .fetch_all()
            .await
            .into_iter()
            .filter(|record| record.matches_keyword(&forms))
            .collect();
        tracing::debug!(term, count = matched.len(), "local keyword filter");
        matched
    }

    /// Every business: remote first, then the local dataset, then nothing.
    pub async fn fetch_all(&self) -> Vec<BusinessRecord> {
        match &self.remote {
            Some(store) => match store.fetch_all().await {
                Ok(all) => return normalize_all(&all),
                Err(e) => tracing::warn!(error = %e, "remote fetch failed; using local dataset"),
            },
            None => tracing::debug!("object store not configured; using local dataset"),
        }

        match self.local.records().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    location = %self.local.location(),
                    "local dataset unavailable; returning no businesses"
                );
                Vec::new()
            }
        }
    }

    /// One business by store id, or for local records by name or the
    /// name-derived link id.
    pub async fn get_by_id(&self, id: &str) -> Option<BusinessRecord> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }

        if let Some(store) = &self.remote {
            match store.find_by_id(id).await {
                Ok(object) => return Some(normalize(&object)),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(id, "not in the remote store; checking local dataset");
                }
                Err(e) => tracing::warn!(error = %e, id, "remote lookup failed; checking local dataset"),
            }
        }

        let records = match self.local.records().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, id, "local dataset unavailable");
                return None;
            }
        };
        let decoded = percent_decode_str(id).decode_utf8().ok();
        records
            .into_iter()
            .find(|record| matches_link_id(record, id, decoded.as_deref()))
    }

    /// Businesses whose category equals `category`, ignoring case. A blank
    /// category lists everything.
    pub async fn get_by_category(&self, category: &str) -> Vec<BusinessRecord> {
        if is_blank(category) {
            return self.fetch_all().await;
        }

        if let Some(store) = &self.remote {
            match store.find_by_category(category).await {
                Ok(found) if !found.is_empty() => return normalize_all(&found),
                Ok(_) => tracing::info!(category, "no remote matches; filtering the full list"),
                Err(e) => {
                    tracing::warn!(error = %e, category, "remote category query failed; filtering the full list");
                }
            }
        }

        self.fetch_all()
            .await
            .into_iter()
            .filter(|record| record.matches_category(category))
            .collect()
    }

    /// Saves `application` remotely, or queues it in `pending` when the
    /// store refuses or is not configured.
    ///
    /// # Errors
    ///
    /// [`DirectoryError`] only if the application could neither be saved
    /// nor queued.
    pub async fn submit_application(
        &self,
        application: &BusinessApplication,
        pending: &PendingQueue,
    ) -> Result<SubmitOutcome, DirectoryError> {
        let error = match &self.remote {
            Some(store) => match store.create(application).await {
                Ok(created) => {
                    return Ok(SubmitOutcome::Saved {
                        id: created.object_id,
                    })
                }
                Err(e) => e.to_string(),
            },
            None => "object store is not configured".to_owned(),
        };

        tracing::warn!(error = %error, name = %application.name, "application not saved; queueing it");
        pending.enqueue(application)?;
        Ok(SubmitOutcome::Queued { error })
    }
}

fn normalize_all(objects: &[StoreObject]) -> Vec<BusinessRecord> {
    objects.iter().map(normalize).collect()
}

fn matches_link_id(record: &BusinessRecord, id: &str, decoded: Option<&str>) -> bool {
    if record.id.as_deref() == Some(id) {
        return true;
    }
    let Some(name) = record.name.as_deref() else {
        return false;
    };
    name == id || decoded == Some(name) || local_id_for_name(name) == id
}
