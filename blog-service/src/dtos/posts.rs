use chrono::{DateTime, SecondsFormat, Utc};
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use service_core::error::AppError;
use validator::Validate;

use crate::models::{BlogPost, PostChanges};

pub const DEFAULT_LIST_LIMIT: i64 = 20;
pub const MAX_LIST_LIMIT: i64 = 100;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    pub cover_image: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    pub author: Option<String>,
}

impl CreatePostRequest {
    pub fn into_post(self) -> BlogPost {
        BlogPost::new(
            self.title,
            self.content,
            self.cover_image,
            self.tags,
            self.author,
        )
    }
}

/// Partial update; absent and `null` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,

    pub cover_image: Option<String>,

    pub tags: Option<Vec<String>>,

    pub author: Option<String>,
}

impl UpdatePostRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.cover_image.is_none()
            && self.tags.is_none()
            && self.author.is_none()
    }

    /// `None` when there is nothing to apply.
    pub fn into_changes(self, updated_at: DateTime<Utc>) -> Option<PostChanges> {
        if self.is_empty() {
            return None;
        }
        Some(PostChanges {
            title: self.title,
            content: self.content,
            cover_image: self.cover_image,
            tags: self.tags,
            author: self.author,
            updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ListPostsQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: i64,

    pub tag: Option<String>,
}

fn default_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

impl ListPostsQuery {
    /// An empty tag is treated as no filter.
    pub fn tag_filter(&self) -> Option<&str> {
        self.tag.as_deref().filter(|t| !t.is_empty())
    }
}

/// Client-facing post: `_id` surfaces as a string `id`, every BSON datetime
/// (nested ones included) as RFC 3339 text, all other fields unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct PostResponse(pub Map<String, Value>);

impl PostResponse {
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    pub fn from_post(post: &BlogPost) -> Result<Self, AppError> {
        let document = post
            .to_document()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to encode post: {}", e)))?;
        Ok(Self::from(document))
    }
}

impl From<Document> for PostResponse {
    fn from(mut document: Document) -> Self {
        let mut fields = Map::new();
        if let Some(id) = document.remove("_id") {
            let id = match id {
                Bson::ObjectId(oid) => oid.to_hex(),
                Bson::String(s) => s,
                other => other.to_string(),
            };
            fields.insert("id".to_string(), Value::String(id));
        }
        for (key, value) in document {
            fields.insert(key, bson_to_json(value));
        }
        Self(fields)
    }
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::DateTime(dt) => Value::String(
            dt.to_chrono()
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(inner) => Value::Object(
            inner
                .into_iter()
                .map(|(k, v)| (k, bson_to_json(v)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePostResponse {
    pub id: String,
    pub post: PostResponse,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpdatePostResponse {
    Updated(PostResponse),
    NotUpdated { updated: bool },
}

impl UpdatePostResponse {
    pub fn not_updated() -> Self {
        UpdatePostResponse::NotUpdated { updated: false }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletePostResponse {
    pub deleted: bool,
}
