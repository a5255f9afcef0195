//! Queries and writes against the `Business` class.
//!
//! The keyword search is one `$or` of four case-insensitive substring
//! matches: the singular and plural keyword forms against `Keywords`, and the
//! raw keyword against `Name` and `Category`. Errors are returned as-is;
//! deciding what to do about a failed or empty search is the caller's job.

use bizdir_core::{is_blank, KeywordForms};
use serde_json::{json, Map, Value};

use crate::client::{CreatedObject, StoreClient};
use crate::error::StoreError;
use crate::object::StoreObject;
use crate::query::Query;

pub const BUSINESS_CLASS: &str = "Business";

/// Result-count ceiling applied to every business query.
pub const DEFAULT_LIMIT: u32 = 1000;

/// An image file picked in the application form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUpload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// What a business owner submits to get listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessApplication {
    pub name: String,
    pub category: String,
    pub keywords: Vec<String>,
    /// Primary location.
    pub address: String,
    /// Locations beyond the primary one.
    pub additional_addresses: Vec<String>,
    pub description: Option<String>,
    /// Already-hosted CDN image.
    pub image_url: Option<String>,
    pub image: Option<ImageUpload>,
}

impl BusinessApplication {
    /// Splits a comma-separated keyword list, trimming and dropping blanks.
    #[must_use]
    pub fn parse_keywords(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Store fields for this application, without the image file.
    ///
    /// `Keywords` always leads with the category so a category word finds
    /// the business; `Addresses` leads with the primary address.
    #[must_use]
    pub fn to_fields(&self) -> Map<String, Value> {
        let keywords: Vec<&str> = std::iter::once(self.category.as_str())
            .chain(self.keywords.iter().map(String::as_str))
            .filter(|k| !k.trim().is_empty())
            .collect();
        let addresses: Vec<&str> = std::iter::once(self.address.as_str())
            .chain(self.additional_addresses.iter().map(String::as_str))
            .filter(|a| !a.trim().is_empty())
            .collect();

        let mut fields = Map::new();
        fields.insert("Name".to_owned(), json!(self.name));
        fields.insert("Category".to_owned(), json!(self.category));
        fields.insert("Address".to_owned(), json!(self.address));
        fields.insert("Addresses".to_owned(), json!(addresses));
        fields.insert("Keywords".to_owned(), json!(keywords));
        fields.insert("Description".to_owned(), json!(self.description));
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.is_empty()) {
            fields.insert("ImageURL".to_owned(), json!(url));
        }
        fields
    }
}

/// Disjunctive keyword query: keyword forms in `Keywords`, or the raw
/// keyword in `Name` or `Category`.
#[must_use]
pub fn keyword_query(keyword: &str, limit: u32) -> Query {
    let forms = KeywordForms::expand(keyword);
    Query::or([
        Query::new().contains("Keywords", &forms.singular),
        Query::new().contains("Keywords", &forms.plural),
        Query::new().contains("Name", keyword),
        Query::new().contains("Category", keyword),
    ])
    .limit(limit)
}

/// Exact, case-insensitive category match.
#[must_use]
pub fn category_query(category: &str, limit: u32) -> Query {
    Query::new()
        .matches_exactly("Category", category)
        .limit(limit)
}

/// Public read, no public write.
fn public_read_acl() -> Value {
    json!({"*": {"read": true}})
}

/// Logs a failed write and hands the error back. Refusals get a hint
/// pointing at the class-level permissions and ACLs.
fn log_write_failure(error: StoreError, operation: &str) -> StoreError {
    if error.is_permission_denied() {
        tracing::error!(
            error = %error,
            operation,
            "write was refused; check the class-level permissions allow clients \
             to create objects and files, or adjust ACLs"
        );
    } else {
        tracing::error!(error = %error, operation, "write failed");
    }
    error
}

/// The `Business` class behind the directory.
pub struct BusinessStore {
    client: StoreClient,
    limit: u32,
}

impl BusinessStore {
    #[must_use]
    pub fn new(client: StoreClient) -> Self {
        Self {
            client,
            limit: DEFAULT_LIMIT,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    /// Every business, up to the result ceiling.
    ///
    /// # Errors
    ///
    /// Propagates any [`StoreError`] from the request.
    pub async fn fetch_all(&self) -> Result<Vec<StoreObject>, StoreError> {
        self.client
            .find(BUSINESS_CLASS, &Query::new().limit(self.limit))
            .await
    }

    /// Businesses matching `keyword` by keywords, name, or category. A blank
    /// keyword fetches everything.
    ///
    /// # Errors
    ///
    /// Propagates any [`StoreError`] from the request.
    pub async fn find_by_keyword(&self, keyword: &str) -> Result<Vec<StoreObject>, StoreError> {
        if is_blank(keyword) {
            return self.fetch_all().await;
        }
        let query = keyword_query(keyword, self.limit);
        tracing::debug!(keyword, "searching businesses");
        self.client.find(BUSINESS_CLASS, &query).await
    }

    /// Businesses whose category equals `category`, ignoring case. A blank
    /// category fetches everything.
    ///
    /// # Errors
    ///
    /// Propagates any [`StoreError`] from the request.
    pub async fn find_by_category(&self, category: &str) -> Result<Vec<StoreObject>, StoreError> {
        if is_blank(category) {
            return self.fetch_all().await;
        }
        self.client
            .find(BUSINESS_CLASS, &category_query(category, self.limit))
            .await
    }

    /// One business by store id.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingId`] for a blank id; otherwise any [`StoreError`]
    /// from the request, including not-found.
    pub async fn find_by_id(&self, id: &str) -> Result<StoreObject, StoreError> {
        self.client.get(BUSINESS_CLASS, id).await
    }

    /// Submits an application: uploads the image file if there is one, then
    /// creates the business.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the upload or the create. Either failure is
    /// logged, with a permissions hint when the store refused the write.
    pub async fn create(&self, application: &BusinessApplication) -> Result<CreatedObject, StoreError> {
        let mut fields = application.to_fields();
        if let Some(upload) = &application.image {
            let stored = self
                .client
                .upload_file(&upload.filename, &upload.content_type, &upload.bytes)
                .await
                .map_err(|e| log_write_failure(e, "image upload"))?;
            fields.insert("Image".to_owned(), stored.as_field());
        }
        self.create_fields(fields).await
    }

    /// Creates a business from raw fields with a public-read ACL.
    ///
    /// # Errors
    ///
    /// Any [`StoreError`] from the create. Permission failures are logged
    /// with a hint about class-level permissions before being returned.
    pub async fn create_fields(
        &self,
        mut fields: Map<String, Value>,
    ) -> Result<CreatedObject, StoreError> {
        fields.insert("ACL".to_owned(), public_read_acl());
        let created = self
            .client
            .create(BUSINESS_CLASS, &fields)
            .await
            .map_err(|e| log_write_failure(e, "business create"))?;
        tracing::info!(object_id = %created.object_id, "business created");
        Ok(created)
    }

    /// # Errors
    ///
    /// [`StoreError::MissingId`] for a blank id, otherwise any request error.
    pub async fn update(&self, id: &str, fields: &Map<String, Value>) -> Result<(), StoreError> {
        self.client.update(BUSINESS_CLASS, id, fields).await
    }

    /// # Errors
    ///
    /// [`StoreError::MissingId`] for a blank id, otherwise any request error.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.client.delete(BUSINESS_CLASS, id).await
    }
}
