use axum::Json;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, Set};
use tracing::instrument;

use crate::entity::blog_post;
use crate::error::{AppError, ErrorBody, ValidationErrorBody};
use crate::extractors::post_form::PostForm;
use crate::models::post::{
    DeleteResponse, PostResponse, ValidatedPhoto, validate_create, validate_update,
};
use crate::state::AppState;

/// Body limit for post routes: two photos at 2048 KiB plus text fields.
pub fn post_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(8 * 1024 * 1024)
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Posts",
    operation_id = "listPosts",
    summary = "List all posts",
    description = "Returns every post in store order. An empty array is a valid result.",
    responses(
        (status = 200, description = "All posts", body = Vec<PostResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PostResponse>>, AppError> {
    let posts = blog_post::Entity::find().all(&state.db).await?;

    let base = &state.config.storage.public_base_url;
    Ok(Json(
        posts
            .into_iter()
            .map(|m| PostResponse::from_model(m, base))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Posts",
    operation_id = "getPost",
    summary = "Get a post by ID",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostResponse),
        (status = 404, description = "Post not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PostResponse>, AppError> {
    let model = find_post(&state.db, &id).await?;

    Ok(Json(PostResponse::from_model(
        model,
        &state.config.storage.public_base_url,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Posts",
    operation_id = "createPost",
    summary = "Create a new post",
    description = "Accepts JSON (`title`, `body`) or multipart/form-data (`title`, `body`, \
        `photo1`, `photo2`). Photos must be JPEG, PNG, or GIF and at most 2048 KiB each.",
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 422, description = "Validation failed", body = ValidationErrorBody),
    ),
)]
#[instrument(skip(state, form))]
pub async fn create_post(
    State(state): State<AppState>,
    form: PostForm,
) -> Result<impl IntoResponse, AppError> {
    let input = validate_create(form)?;

    // Photos land on disk before the insert; a failed insert leaves them
    // orphaned. No compensating cleanup.
    let photo1 = store_photo(&state, input.photo1).await?;
    let photo2 = store_photo(&state, input.photo2).await?;

    let now = chrono::Utc::now();
    let new_post = blog_post::ActiveModel {
        title: Set(input.title),
        body: Set(input.body),
        photo1: Set(photo1),
        photo2: Set(photo2),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_post.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse::from_model(
            model,
            &state.config.storage.public_base_url,
        )),
    ))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Posts",
    operation_id = "updatePost",
    summary = "Update an existing post",
    description = "Partial update: absent fields keep their stored values. Also registered \
        under PUT with the same semantics. Supplying a photo replaces the previous file.",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 404, description = "Post not found", body = ErrorBody),
        (status = 422, description = "Validation failed", body = ValidationErrorBody),
    ),
)]
#[instrument(skip(state, form), fields(id = %id))]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: PostForm,
) -> Result<Json<PostResponse>, AppError> {
    let existing = find_post(&state.db, &id).await?;
    let input = validate_update(form)?;

    let mut active: blog_post::ActiveModel = existing.clone().into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(body) = input.body {
        active.body = Set(body);
    }

    // Each replaced photo's old blob is removed before the new path is
    // committed to the record; a failure in between loses the photo.
    // Known gap.
    if let Some(photo) = input.photo1 {
        if let Some(old) = &existing.photo1 {
            state.blob_store.delete(old).await?;
        }
        active.photo1 = Set(store_photo(&state, Some(photo)).await?);
    }
    if let Some(photo) = input.photo2 {
        if let Some(old) = &existing.photo2 {
            state.blob_store.delete(old).await?;
        }
        active.photo2 = Set(store_photo(&state, Some(photo)).await?);
    }

    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(PostResponse::from_model(
        model,
        &state.config.storage.public_base_url,
    )))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Posts",
    operation_id = "deletePost",
    summary = "Delete a post",
    description = "Removes the post's photo blobs (best effort) and then the record. \
        A second delete of the same id returns 404.",
    params(("id" = String, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = DeleteResponse),
        (status = 404, description = "Post not found", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id = %id))]
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let post = find_post(&state.db, &id).await?;

    discard_photo(&state, post.photo1.as_deref()).await;
    discard_photo(&state, post.photo2.as_deref()).await;

    blog_post::Entity::delete_by_id(post.id)
        .exec(&state.db)
        .await?;

    Ok(Json(DeleteResponse {
        message: "Post deleted".into(),
    }))
}

/// Look up a post by its raw path segment. A token that does not parse as
/// an id reads the same as a missing record.
async fn find_post<C: ConnectionTrait>(db: &C, id: &str) -> Result<blog_post::Model, AppError> {
    let id: i32 = id
        .parse()
        .map_err(|_| AppError::NotFound("Post not found".into()))?;

    blog_post::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

async fn store_photo(
    state: &AppState,
    photo: Option<ValidatedPhoto>,
) -> Result<Option<String>, AppError> {
    match photo {
        Some(photo) => Ok(Some(
            state
                .blob_store
                .put(&photo.bytes, "photos", photo.format.extension())
                .await?,
        )),
        None => Ok(None),
    }
}

/// Best-effort blob removal; record deletion proceeds regardless.
async fn discard_photo(state: &AppState, path: Option<&str>) {
    if let Some(path) = path
        && let Err(e) = state.blob_store.delete(path).await
    {
        tracing::warn!("Failed to delete photo blob {path}: {e}");
    }
}
