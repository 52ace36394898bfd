use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use service_core::error::AppError;

use crate::dtos::{
    CreatePostRequest, CreatePostResponse, DeletePostResponse, ListPostsQuery, PostResponse,
    UpdatePostRequest, UpdatePostResponse,
};
use crate::models::post::truncate_to_millis;
use crate::startup::AppState;
use crate::utils::{ValidatedJson, ValidatedQuery};

fn parse_post_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::BadRequest(anyhow::anyhow!("Invalid post id")))
}

fn post_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Post not found"))
}

/// POST /api/posts
#[tracing::instrument(skip_all)]
pub async fn create_post(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> Result<Json<CreatePostResponse>, AppError> {
    let store = state.store()?;

    let post = req.into_post();
    let id = store.create_document(&post).await?;

    let response = match store.find_post(&id).await? {
        Some(stored) => PostResponse::from(stored),
        None => {
            tracing::warn!(post_id = %id, "Created post not readable yet, returning submitted document");
            PostResponse::from_post(&post)?
        }
    };

    tracing::info!(post_id = %id, "Blog post created");

    Ok(Json(CreatePostResponse {
        id: id.to_hex(),
        post: response,
    }))
}

/// GET /api/posts?limit=&tag=
#[tracing::instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListPostsQuery>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let store = state.store()?;

    let posts = store.get_documents(query.tag_filter(), query.limit).await?;

    Ok(Json(posts.into_iter().map(PostResponse::from).collect()))
}

/// GET /api/posts/:id
#[tracing::instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let store = state.store()?;
    let id = parse_post_id(&post_id)?;

    let post = store.find_post(&id).await?.ok_or_else(post_not_found)?;

    Ok(Json(PostResponse::from(post)))
}

/// PUT /api/posts/:id
#[tracing::instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdatePostRequest>,
) -> Result<Json<UpdatePostResponse>, AppError> {
    let store = state.store()?;
    let id = parse_post_id(&post_id)?;

    let Some(changes) = payload.into_changes(truncate_to_millis(Utc::now())) else {
        return Ok(Json(UpdatePostResponse::not_updated()));
    };

    if !store.update_post(&id, &changes).await? {
        return Err(post_not_found());
    }

    // The post may have been deleted between the update and this read.
    let post = store.find_post(&id).await?.ok_or_else(post_not_found)?;

    tracing::info!(post_id = %id, "Blog post updated");

    Ok(Json(UpdatePostResponse::Updated(PostResponse::from(post))))
}

/// DELETE /api/posts/:id
#[tracing::instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Json<DeletePostResponse>, AppError> {
    let store = state.store()?;
    let id = parse_post_id(&post_id)?;

    if !store.delete_post(&id).await? {
        return Err(post_not_found());
    }

    tracing::info!(post_id = %id, "Blog post deleted");

    Ok(Json(DeletePostResponse { deleted: true }))
}
