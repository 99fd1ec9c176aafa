//! Image and barcode uploads. Files arrive as multipart forms with a `file` field.

use axum::extract::{Multipart, State};
use axum::response::Response;
use serde::Serialize;

use crate::backend::storage::Upload;
use crate::middleware::AuthUser;
use crate::repositories::AttractionRepo;
use crate::state::AppState;
use crate::utils::error::{AppError, AppResult};
use crate::utils::response::created;

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Image,
    Barcode,
}

/// Reads the `file` field; other fields are ignored.
pub async fn read_file(multipart: &mut Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(e.to_string()))?;

        if bytes.is_empty() {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::validation("Missing required 'file' field"))
}

/// Attraction images must be declared as `image/*`.
pub fn ensure_image(upload: &Upload) -> AppResult<()> {
    let is_image = upload
        .content_type
        .as_deref()
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.type_() == mime::IMAGE);

    if is_image {
        Ok(())
    } else {
        Err(AppError::validation("Only image files are allowed"))
    }
}

/// Validates the file for its kind and stores it, returning the public URL.
pub async fn store(
    state: &AppState,
    user: &AuthUser,
    kind: UploadKind,
    upload: &Upload,
) -> AppResult<String> {
    let storage = &state.backend.storage;
    let url = match kind {
        UploadKind::Image => {
            ensure_image(upload)?;
            AttractionRepo::upload_image(storage, &user.access_token, user.id, upload).await?
        }
        UploadKind::Barcode => {
            AttractionRepo::upload_barcode(storage, &user.access_token, user.id, upload).await?
        }
    };

    tracing::info!(user_id = %user.id, ?kind, "File uploaded");
    Ok(url)
}

/// POST /api/v1/uploads/image
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let upload = read_file(&mut multipart).await?;
    let url = store(&state, &user, UploadKind::Image, &upload).await?;
    Ok(created(UploadedFile { url }, "Image uploaded"))
}

/// POST /api/v1/uploads/barcode
pub async fn upload_barcode(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Response> {
    let upload = read_file(&mut multipart).await?;
    let url = store(&state, &user, UploadKind::Barcode, &upload).await?;
    Ok(created(UploadedFile { url }, "Barcode uploaded"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn upload(content_type: Option<&str>) -> Upload {
        Upload {
            file_name: "cover.png".to_string(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(&[0x89, 0x50, 0x4e, 0x47]),
        }
    }

    #[test]
    fn test_image_mime_types_are_accepted() {
        assert!(ensure_image(&upload(Some("image/png"))).is_ok());
        assert!(ensure_image(&upload(Some("image/jpeg"))).is_ok());
    }

    #[test]
    fn test_non_image_uploads_are_rejected() {
        assert!(ensure_image(&upload(Some("application/pdf"))).is_err());
        assert!(ensure_image(&upload(Some("not a mime"))).is_err());
        assert!(ensure_image(&upload(None)).is_err());
    }
}
