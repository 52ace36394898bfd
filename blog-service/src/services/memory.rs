use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};
use service_core::error::AppError;
use std::sync::Mutex;

use crate::models::{has_tag, BlogPost, PostChanges, BLOG_POST_COLLECTION};
use crate::services::store::PostStore;

/// Process-local store keeping posts as documents in insertion order. Used by tests.
pub struct InMemoryPostStore {
    name: String,
    posts: Mutex<Vec<Document>>,
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl InMemoryPostStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            posts: Mutex::new(Vec::new()),
        }
    }

    /// Stores `document` as-is, the way another producer sharing the collection would.
    pub fn insert_document(&self, document: Document) -> Result<(), AppError> {
        self.lock()?.push(document);
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Document>>, AppError> {
        self.posts.lock().map_err(|e| {
            AppError::InternalError(anyhow::anyhow!("Post store mutex poisoned: {}", e))
        })
    }
}

fn id_matches(document: &Document, id: &ObjectId) -> bool {
    document.get_object_id("_id").map_or(false, |oid| &oid == id)
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    fn database_name(&self) -> String {
        self.name.clone()
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        // Collections come into existence on first insert.
        if self.lock()?.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![BLOG_POST_COLLECTION.to_string()])
        }
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }

    async fn create_document(&self, post: &BlogPost) -> Result<ObjectId, AppError> {
        let document = post.to_document().map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to encode post: {}", e))
        })?;

        let mut posts = self.lock()?;
        if posts.iter().any(|p| id_matches(p, &post.id)) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "Duplicate key: {}",
                post.id
            )));
        }
        posts.push(document);
        Ok(post.id)
    }

    async fn get_documents(
        &self,
        tag: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Document>, AppError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        let posts = self.lock()?;
        Ok(posts
            .iter()
            .filter(|p| tag.map_or(true, |t| has_tag(p, t)))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_post(&self, id: &ObjectId) -> Result<Option<Document>, AppError> {
        Ok(self.lock()?.iter().find(|p| id_matches(p, id)).cloned())
    }

    async fn update_post(&self, id: &ObjectId, changes: &PostChanges) -> Result<bool, AppError> {
        let mut posts = self.lock()?;
        match posts.iter_mut().find(|p| id_matches(p, id)) {
            Some(post) => {
                changes.apply(post);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_post(&self, id: &ObjectId) -> Result<bool, AppError> {
        let mut posts = self.lock()?;
        let before = posts.len();
        posts.retain(|p| !id_matches(p, id));
        Ok(posts.len() < before)
    }
}
