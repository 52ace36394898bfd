pub mod health;
pub mod posts;

pub use health::{
    diagnostics, health_check, hello, metrics_endpoint, readiness_check, root,
};
pub use posts::{create_post, delete_post, get_post, list_posts, update_post};
