use serde::Serialize;

use crate::entity::blog_post;
use crate::error::{AppError, FieldError};
use crate::extractors::post_form::{PostForm, UploadedFile};
use crate::utils::image::ImageFormat;

/// Maximum title length in Unicode characters.
pub const MAX_TITLE_CHARS: usize = 255;

/// Maximum photo upload size (2048 KiB).
pub const MAX_PHOTO_BYTES: usize = 2048 * 1024;

/// Public representation of a post. Photo fields carry derived URLs, never
/// the raw storage paths.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PostResponse {
    pub id: i32,
    #[schema(example = "Hello")]
    pub title: String,
    #[schema(example = "World")]
    pub body: String,
    /// Public URL of the first photo, or null.
    #[schema(example = "http://localhost:3000/storage/photos/0192f3a1.png")]
    pub photo1_url: Option<String>,
    /// Public URL of the second photo, or null.
    pub photo2_url: Option<String>,
}

impl PostResponse {
    pub fn from_model(model: blog_post::Model, public_base_url: &str) -> Self {
        let photo1_url = model
            .photo1
            .as_deref()
            .map(|p| photo_url(public_base_url, p));
        let photo2_url = model
            .photo2
            .as_deref()
            .map(|p| photo_url(public_base_url, p));
        Self {
            id: model.id,
            title: model.title,
            body: model.body,
            photo1_url,
            photo2_url,
        }
    }
}

/// Response DTO for a successful delete.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    /// Deletion acknowledgment.
    #[schema(example = "Post deleted")]
    pub message: String,
}

/// Derive the public URL for a stored relative path.
pub fn photo_url(base: &str, relative: &str) -> String {
    format!("{}/storage/{relative}", base.trim_end_matches('/'))
}

/// A photo upload that passed format and size validation.
#[derive(Debug)]
pub struct ValidatedPhoto {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

/// Validated input for the create operation.
#[derive(Debug)]
pub struct CreatePostInput {
    pub title: String,
    pub body: String,
    pub photo1: Option<ValidatedPhoto>,
    pub photo2: Option<ValidatedPhoto>,
}

/// Validated input for the update operation. `None` means "leave unchanged".
#[derive(Debug)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub photo1: Option<ValidatedPhoto>,
    pub photo2: Option<ValidatedPhoto>,
}

/// Validate a create request. All field violations are collected so the
/// client sees every failing field at once; nothing is stored on failure.
pub fn validate_create(form: PostForm) -> Result<CreatePostInput, AppError> {
    let mut errors = Vec::new();

    let title = form.title.unwrap_or_default();
    if title.is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    } else if title.chars().count() > MAX_TITLE_CHARS {
        errors.push(FieldError::new(
            "title",
            "Title must be at most 255 characters",
        ));
    }

    let body = form.body.unwrap_or_default();
    if body.is_empty() {
        errors.push(FieldError::new("body", "Body is required"));
    }

    let photo1 = validate_photo("photo1", form.photo1, &mut errors);
    let photo2 = validate_photo("photo2", form.photo2, &mut errors);

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(CreatePostInput {
        title,
        body,
        photo1,
        photo2,
    })
}

/// Validate an update request. Fields mirror the create rules but are all
/// optional; an absent field means "no change".
pub fn validate_update(form: PostForm) -> Result<UpdatePostInput, AppError> {
    let mut errors = Vec::new();

    if let Some(title) = &form.title {
        if title.is_empty() {
            errors.push(FieldError::new("title", "Title must not be empty"));
        } else if title.chars().count() > MAX_TITLE_CHARS {
            errors.push(FieldError::new(
                "title",
                "Title must be at most 255 characters",
            ));
        }
    }

    if let Some(body) = &form.body
        && body.is_empty()
    {
        errors.push(FieldError::new("body", "Body must not be empty"));
    }

    let photo1 = validate_photo("photo1", form.photo1, &mut errors);
    let photo2 = validate_photo("photo2", form.photo2, &mut errors);

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    Ok(UpdatePostInput {
        title: form.title,
        body: form.body,
        photo1,
        photo2,
    })
}

fn validate_photo(
    field: &'static str,
    file: Option<UploadedFile>,
    errors: &mut Vec<FieldError>,
) -> Option<ValidatedPhoto> {
    let file = file?;

    if file.bytes.len() > MAX_PHOTO_BYTES {
        errors.push(FieldError::new(
            field,
            "Photo must not be larger than 2048 kilobytes",
        ));
        return None;
    }

    match ImageFormat::sniff(&file.bytes) {
        Some(format) => Some(ValidatedPhoto {
            bytes: file.bytes,
            format,
        }),
        None => {
            errors.push(FieldError::new(
                field,
                "Photo must be a JPEG, PNG, or GIF image",
            ));
            None
        }
    }
}
