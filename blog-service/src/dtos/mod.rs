pub mod diagnostics;
pub mod posts;

pub use diagnostics::DiagnosticsResponse;
pub use posts::{
    CreatePostRequest, CreatePostResponse, DeletePostResponse, ListPostsQuery, PostResponse,
    UpdatePostRequest, UpdatePostResponse,
};
