//! The directory as users see it: remote search with local fallbacks, plus
//! the queue that holds applications the store refused.

pub mod dataset;
pub mod directory;
pub mod error;
pub mod kv;
pub mod pending;

pub use dataset::LocalDataset;
pub use directory::{Directory, SubmitOutcome};
pub use error::DirectoryError;
pub use kv::LocalKv;
pub use pending::{
    replay_fields, FlushReport, ImagePlaceholder, PendingQueue, PendingSubmission, PENDING_KEY,
};
