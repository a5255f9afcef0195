//! Client for a Parse-compatible object store, plus the business and review
//! query helpers built on top of it.

pub mod business;
pub mod client;
pub mod error;
pub mod object;
pub mod query;
pub mod reviews;
mod retry;

pub use business::{BusinessApplication, BusinessStore, ImageUpload, BUSINESS_CLASS, DEFAULT_LIMIT};
pub use client::{CreatedObject, StoreClient, StoredFile};
pub use error::StoreError;
pub use object::StoreObject;
pub use query::{exact_pattern, Query};
pub use reviews::{Review, ReviewDraft, ReviewStore, REVIEW_CLASS};
