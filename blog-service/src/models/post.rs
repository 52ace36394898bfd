use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use serde::{Deserialize, Deserializer, Serialize};

/// Collection holding blog posts.
pub const BLOG_POST_COLLECTION: &str = "blogpost";

/// Shape of a post as written by this service.
///
/// Reads go through raw `Document`s so fields written by other producers survive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlogPost {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl BlogPost {
    /// Builds a post with a freshly assigned id and both timestamps set to now.
    pub fn new(
        title: String,
        content: String,
        cover_image: Option<String>,
        tags: Vec<String>,
        author: Option<String>,
    ) -> Self {
        let now = truncate_to_millis(Utc::now());
        Self {
            id: ObjectId::new(),
            title,
            content,
            cover_image,
            tags,
            author,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn to_document(&self) -> Result<Document, bson::ser::Error> {
        bson::to_document(self)
    }
}

/// Exact, case-sensitive tag membership on a stored post. Missing or null `tags` match nothing.
pub fn has_tag(post: &Document, tag: &str) -> bool {
    match post.get("tags") {
        Some(Bson::Array(tags)) => tags.iter().any(|t| t.as_str() == Some(tag)),
        _ => false,
    }
}

/// Field-level merge for an existing post. Only `Some` fields are applied;
/// `updated_at` is always written.
#[derive(Debug, Clone, PartialEq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
    pub author: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl PostChanges {
    /// The `$set` body for a MongoDB update.
    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(content) = &self.content {
            set.insert("content", content.as_str());
        }
        if let Some(cover_image) = &self.cover_image {
            set.insert("cover_image", cover_image.as_str());
        }
        if let Some(tags) = &self.tags {
            set.insert("tags", tags.clone());
        }
        if let Some(author) = &self.author {
            set.insert("author", author.as_str());
        }
        set.insert("updated_at", bson::DateTime::from_chrono(self.updated_at));
        set
    }

    pub fn to_update_document(&self) -> Document {
        doc! { "$set": self.to_set_document() }
    }

    /// Applies the `$set` semantics to a stored document.
    pub fn apply(&self, post: &mut Document) {
        for (key, value) in self.to_set_document() {
            post.insert(key, value);
        }
    }
}

/// BSON datetimes carry millisecond precision; align in-process values with what the store returns.
pub fn truncate_to_millis(dt: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(dt.timestamp_millis()).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BlogPost {
        BlogPost::new(
            "Wheel throwing".to_string(),
            "Centering is everything.".to_string(),
            None,
            vec!["pottery".to_string(), "wheel".to_string()],
            Some("Ana".to_string()),
        )
    }

    #[test]
    fn new_post_has_equal_timestamps() {
        let post = sample();
        assert_eq!(post.created_at, post.updated_at);
        assert_eq!(post.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn tag_membership_is_exact() {
        let post = sample().to_document().unwrap();
        assert!(has_tag(&post, "pottery"));
        assert!(!has_tag(&post, "Pottery"));
        assert!(!has_tag(&post, "pot"));

        assert!(!has_tag(&doc! { "tags": Bson::Null }, "pottery"));
        assert!(!has_tag(&doc! { "title": "no tags" }, "pottery"));
    }

    #[test]
    fn null_tags_decode_as_empty() {
        let mut document = sample().to_document().unwrap();
        document.insert("tags", Bson::Null);
        let post: BlogPost = bson::from_document(document).unwrap();
        assert!(post.tags.is_empty());

        let mut document = sample().to_document().unwrap();
        document.remove("tags");
        let post: BlogPost = bson::from_document(document).unwrap();
        assert!(post.tags.is_empty());
    }

    #[test]
    fn set_document_only_contains_supplied_fields() {
        let now = truncate_to_millis(Utc::now());
        let changes = PostChanges {
            title: Some("Glazing".to_string()),
            content: None,
            cover_image: None,
            tags: None,
            author: None,
            updated_at: now,
        };

        let set = changes.to_set_document();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("title").unwrap(), "Glazing");
        assert_eq!(set.get_datetime("updated_at").unwrap().to_chrono(), now);

        let update = changes.to_update_document();
        assert!(update.get_document("$set").is_ok());
    }

    #[test]
    fn apply_merges_without_touching_other_fields() {
        let original = sample();
        let mut post = original.to_document().unwrap();
        post.insert("series", "glazes");
        let later = original.updated_at + chrono::Duration::seconds(5);

        PostChanges {
            title: None,
            content: None,
            cover_image: Some("/img/bowl.jpg".to_string()),
            tags: Some(vec!["glaze".to_string()]),
            author: None,
            updated_at: later,
        }
        .apply(&mut post);

        assert_eq!(post.get_str("title").unwrap(), original.title);
        assert_eq!(post.get_str("content").unwrap(), original.content);
        assert_eq!(post.get_str("author").unwrap(), "Ana");
        assert_eq!(post.get_str("series").unwrap(), "glazes");
        assert_eq!(
            post.get_datetime("created_at").unwrap().to_chrono(),
            original.created_at
        );
        assert_eq!(post.get_str("cover_image").unwrap(), "/img/bowl.jpg");
        assert!(has_tag(&post, "glaze"));
        assert!(!has_tag(&post, "pottery"));
        assert_eq!(post.get_datetime("updated_at").unwrap().to_chrono(), later);
    }

    #[test]
    fn bson_round_trip_preserves_timestamps() {
        let post = sample();
        let document = post.to_document().unwrap();
        assert!(document.get_object_id("_id").is_ok());
        assert!(document.get_datetime("created_at").is_ok());

        let back: BlogPost = bson::from_document(document).unwrap();
        assert_eq!(back, post);
    }
}
