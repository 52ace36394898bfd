pub mod post;

pub use post::{has_tag, BlogPost, PostChanges, BLOG_POST_COLLECTION};
