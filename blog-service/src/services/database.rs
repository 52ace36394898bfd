use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::{FindOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

use crate::models::{BlogPost, PostChanges, BLOG_POST_COLLECTION};
use crate::services::store::PostStore;

#[derive(Clone)]
pub struct BlogDb {
    client: MongoClient,
    db: Database,
}

impl BlogDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for blog-service");

        // Multikey index backing the tag filter
        let tags_index = IndexModel::builder()
            .keys(doc! { "tags": 1 })
            .options(IndexOptions::builder().name("tags_idx".to_string()).build())
            .build();

        let created_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(
                IndexOptions::builder()
                    .name("created_at_idx".to_string())
                    .build(),
            )
            .build();

        self.posts()
            .create_indexes([tags_index, created_index], None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create blogpost indexes: {}", e);
                AppError::from(e)
            })?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub fn posts(&self) -> Collection<BlogPost> {
        self.db.collection(BLOG_POST_COLLECTION)
    }

    /// Untyped view of the same collection, used for reads.
    pub fn documents(&self) -> Collection<Document> {
        self.db.collection(BLOG_POST_COLLECTION)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

#[async_trait]
impl PostStore for BlogDb {
    fn database_name(&self) -> String {
        self.db.name().to_string()
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, AppError> {
        self.db.list_collection_names(None).await.map_err(|e| {
            tracing::warn!("Failed to list collections: {}", e);
            AppError::from(e)
        })
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn create_document(&self, post: &BlogPost) -> Result<ObjectId, AppError> {
        let result = self.posts().insert_one(post, None).await.map_err(|e| {
            tracing::error!("Failed to insert blog post: {}", e);
            AppError::from(e)
        })?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Inserted id is not an ObjectId: {}",
                result.inserted_id
            ))
        })
    }

    async fn get_documents(
        &self,
        tag: Option<&str>,
        limit: i64,
    ) -> Result<Vec<Document>, AppError> {
        let filter = match tag {
            Some(tag) => doc! { "tags": { "$in": [tag] } },
            None => Document::new(),
        };

        let find_options = FindOptions::builder().limit(limit).build();

        let cursor = self.documents().find(filter, find_options).await.map_err(|e| {
            tracing::error!("Failed to list blog posts: {}", e);
            AppError::from(e)
        })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect blog posts: {}", e);
            AppError::from(e)
        })
    }

    async fn find_post(&self, id: &ObjectId) -> Result<Option<Document>, AppError> {
        self.documents()
            .find_one(doc! { "_id": *id }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to find blog post: {}", e);
                AppError::from(e)
            })
    }

    async fn update_post(&self, id: &ObjectId, changes: &PostChanges) -> Result<bool, AppError> {
        let result = self
            .posts()
            .update_one(doc! { "_id": *id }, changes.to_update_document(), None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update blog post: {}", e);
                AppError::from(e)
            })?;
        Ok(result.matched_count > 0)
    }

    async fn delete_post(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .posts()
            .delete_one(doc! { "_id": *id }, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete blog post: {}", e);
                AppError::from(e)
            })?;
        Ok(result.deleted_count > 0)
    }
}
