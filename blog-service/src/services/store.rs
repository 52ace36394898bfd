use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use service_core::error::AppError;

use crate::models::{BlogPost, PostChanges};

/// Document access for blog posts.
///
/// Every operation touches at most one document, except `get_documents`.
#[async_trait]
pub trait PostStore: Send + Sync {
    fn database_name(&self) -> String;

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    /// Inserts `post` and returns its identifier.
    async fn create_document(&self, post: &BlogPost) -> Result<ObjectId, AppError>;

    /// Stored posts as raw documents, in natural store order, optionally
    /// restricted to those tagged `tag`, at most `limit`.
    async fn get_documents(&self, tag: Option<&str>, limit: i64)
        -> Result<Vec<Document>, AppError>;

    async fn find_post(&self, id: &ObjectId) -> Result<Option<Document>, AppError>;

    /// Returns whether a document matched `id`.
    async fn update_post(&self, id: &ObjectId, changes: &PostChanges) -> Result<bool, AppError>;

    /// Returns whether a document was removed.
    async fn delete_post(&self, id: &ObjectId) -> Result<bool, AppError>;
}
