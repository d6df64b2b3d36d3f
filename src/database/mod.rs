pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoDB;

use crate::analytics::Pipeline;
use crate::config::AppConfig;
use crate::utils::AppError;
use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::sync::Arc;

/// Collections of the carequest database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Tests,
    Reviews,
    Doctors,
    Promotions,
    Bookings,
    Payments,
    Banners,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Tests => "tests",
            Collection::Reviews => "reviews",
            Collection::Doctors => "doctors",
            Collection::Promotions => "promotions",
            Collection::Bookings => "bookings",
            Collection::Payments => "payments",
            Collection::Banners => "banners",
        }
    }
}

/// Parses a path id; malformed ids are a client error.
pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::InvalidRequest(format!("Invalid id: {}", id)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Narrow document-store contract used by handlers, the access chain and
/// the analytics engine. Filters are equality matches on field paths;
/// updates are `$set` documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn find(&self, collection: Collection, filter: Document) -> Result<Vec<Document>, AppError>;

    async fn find_one(&self, collection: Collection, filter: Document) -> Result<Option<Document>, AppError>;

    /// Inserts a document and returns its `_id`.
    async fn insert_one(&self, collection: Collection, document: Document) -> Result<Bson, AppError>;

    /// Inserts `document` only if nothing matches `key`, atomically.
    /// Returns the new `_id`, or `None` when a match already existed.
    async fn insert_if_absent(
        &self,
        collection: Collection,
        key: Document,
        document: Document,
    ) -> Result<Option<Bson>, AppError>;

    async fn update_one(
        &self,
        collection: Collection,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, AppError>;

    async fn update_many(
        &self,
        collection: Collection,
        filter: Document,
        set: Document,
    ) -> Result<UpdateOutcome, AppError>;

    /// Returns the number of deleted documents (0 or 1).
    async fn delete_one(&self, collection: Collection, filter: Document) -> Result<u64, AppError>;

    /// Approximate document count, read from collection metadata where the
    /// backend supports it.
    async fn estimated_count(&self, collection: Collection) -> Result<u64, AppError>;

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Document>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Opens the store selected by `DATABASE_URL`; `memory://` picks the
/// in-process backend.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, AppError> {
    if config.database_url.starts_with("memory://") {
        log::warn!("⚠️  Using in-memory document store, data is lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let db = MongoDB::new(&config.database_url, &config.database_name).await?;
    Ok(Arc::new(db))
}
