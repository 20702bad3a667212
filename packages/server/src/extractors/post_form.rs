use axum::Json;
use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use serde::Deserialize;

use crate::error::AppError;

/// An uploaded file field, before validation.
pub struct UploadedFile {
    pub bytes: Vec<u8>,
}

/// The decoded body of a create or update request.
///
/// Accepts `application/json` (text fields only) or `multipart/form-data`
/// (text fields plus photo uploads). Which fields are required is decided
/// by the handlers' validation step, so the same extractor serves both
/// create and update.
#[derive(Default)]
pub struct PostForm {
    pub title: Option<String>,
    pub body: Option<String>,
    pub photo1: Option<UploadedFile>,
    pub photo2: Option<UploadedFile>,
}

#[derive(Deserialize)]
struct JsonPostForm {
    title: Option<String>,
    body: Option<String>,
}

impl<S> FromRequest<S> for PostForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            let Json(json) = Json::<JsonPostForm>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            Ok(Self {
                title: json.title,
                body: json.body,
                ..Self::default()
            })
        }
    }
}

impl PostForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
        {
            match field.name() {
                Some("title") => form.title = Some(read_text(field).await?),
                Some("body") => form.body = Some(read_text(field).await?),
                Some("photo1") => form.photo1 = read_file(field).await?,
                Some("photo2") => form.photo2 = read_file(field).await?,
                _ => {} // Ignore unknown fields.
            }
        }

        Ok(form)
    }
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))
}

/// Read a file field. Browsers submit an empty part for a file input with
/// no file chosen, so zero bytes counts as "no upload".
async fn read_file(field: Field<'_>) -> Result<Option<UploadedFile>, AppError> {
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?;

    if bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(UploadedFile {
        bytes: bytes.to_vec(),
    }))
}
