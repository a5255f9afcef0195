//! Reviews left on a business, stored in the `Review` class.

use bizdir_core::is_blank;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::business::DEFAULT_LIMIT;
use crate::client::{CreatedObject, StoreClient};
use crate::error::StoreError;
use crate::object::StoreObject;
use crate::query::Query;

pub const REVIEW_CLASS: &str = "Review";

/// A review as submitted from the detail page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewDraft {
    pub business_id: String,
    /// Raw rating input; coerced to a number on write.
    pub rating: Option<String>,
    pub text: Option<String>,
    pub author_name: Option<String>,
}

impl ReviewDraft {
    /// Store fields with `rating` coerced to a number, or `null` when the
    /// input is not numeric.
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(
            "businessId".to_owned(),
            Value::String(self.business_id.clone()),
        );
        if let Some(raw) = &self.rating {
            fields.insert("rating".to_owned(), coerce_rating(raw));
        }
        if let Some(text) = &self.text {
            fields.insert("text".to_owned(), Value::String(text.clone()));
        }
        if let Some(author) = self.author_name.as_deref().filter(|a| !a.is_empty()) {
            fields.insert("authorName".to_owned(), Value::String(author.to_owned()));
        }
        fields
    }
}

fn coerce_rating(raw: &str) -> Value {
    let Ok(n) = raw.trim().parse::<f64>() else {
        return Value::Null;
    };
    if !n.is_finite() {
        return Value::Null;
    }
    // Whole numbers stay integers so "4" is stored as 4, not 4.0.
    #[allow(clippy::cast_possible_truncation)]
    let whole = n as i64;
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    let is_whole = whole as f64 == n;
    if is_whole {
        Value::Number(Number::from(whole))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "objectId")]
    pub id: String,
    #[serde(rename = "businessId", default)]
    pub business_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "authorName", default)]
    pub author_name: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
}

pub struct ReviewStore<'a> {
    client: &'a StoreClient,
    limit: u32,
}

impl<'a> ReviewStore<'a> {
    #[must_use]
    pub fn new(client: &'a StoreClient) -> Self {
        Self {
            client,
            limit: DEFAULT_LIMIT,
        }
    }

    /// # Errors
    ///
    /// Any [`StoreError`] from the create; review writes are not queued.
    pub async fn create_review(&self, draft: &ReviewDraft) -> Result<CreatedObject, StoreError> {
        if is_blank(&draft.business_id) {
            return Err(StoreError::MissingId);
        }
        self.client.create(REVIEW_CLASS, &draft.to_fields()).await
    }

    /// Reviews for one business, newest first. A blank id returns an empty
    /// list without touching the store.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the request.
    pub async fn find_reviews_by_business(
        &self,
        business_id: &str,
    ) -> Result<Vec<Review>, StoreError> {
        if is_blank(business_id) {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .equal_to("businessId", business_id)
            .descending("createdAt")
            .limit(self.limit);
        let objects = self.client.find(REVIEW_CLASS, &query).await?;
        Ok(objects.into_iter().filter_map(into_review).collect())
    }

    /// # Errors
    ///
    /// Any [`StoreError`] from the request.
    pub async fn fetch_all_reviews(&self) -> Result<Vec<Review>, StoreError> {
        let objects = self
            .client
            .find(REVIEW_CLASS, &Query::new().limit(self.limit))
            .await?;
        Ok(objects.into_iter().filter_map(into_review).collect())
    }
}

/// Skips rows that do not look like reviews instead of failing the list.
fn into_review(object: StoreObject) -> Option<Review> {
    match serde_json::from_value(Value::Object(object.into_map())) {
        Ok(review) => Some(review),
        Err(e) => {
            tracing::warn!(error = %e, "skipping malformed review");
            None
        }
    }
}
