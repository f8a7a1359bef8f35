//! Multipart upload handling: validates the cover file (MIME, size, exactly
//! one file) and stores its raw bytes in the image directory under a
//! sanitized, collision-free name. The optional `book` text part carries the
//! stringified JSON payload that rides along with the file.

use axum::extract::Multipart;
use std::path::{Path, PathBuf};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::images;

/// Raw upload written to the image directory, not yet normalized.
#[derive(Debug)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub mime: String,
}

/// Parts extracted from a book create/update form.
#[derive(Debug, Default)]
pub struct BookUpload {
    pub file: Option<UploadedFile>,
    pub book_json: Option<String>,
}

fn malformed(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::InvalidUpload(format!("malformed multipart body: {err}"))
}

/// Drain a multipart form into a [`BookUpload`].
///
/// On error, any file already written to disk has been reclaimed; on
/// success the caller owns the temp file and must reclaim it on every
/// later failure path.
pub async fn read_multipart(
    multipart: &mut Multipart,
    config: &ServerConfig,
) -> Result<BookUpload, ApiError> {
    let mut upload = BookUpload::default();

    let result = read_parts(multipart, config, &mut upload).await;
    if result.is_err() {
        if let Some(file) = &upload.file {
            images::remove_file_quiet(&file.path);
        }
        result?;
    }
    Ok(upload)
}

async fn read_parts(
    multipart: &mut Multipart,
    config: &ServerConfig,
    upload: &mut BookUpload,
) -> Result<(), ApiError> {
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let part_name = field.name().map(str::to_owned);
        match part_name.as_deref() {
            Some("image") => {
                if upload.file.is_some() {
                    return Err(ApiError::InvalidUpload(
                        "exactly one image file is allowed".to_string(),
                    ));
                }

                let mime = field
                    .content_type()
                    .map(str::to_owned)
                    .ok_or_else(|| {
                        ApiError::InvalidUpload("image part is missing a content type".to_string())
                    })?;
                let ext = images::ext_for_mime(&mime).ok_or_else(|| {
                    ApiError::InvalidUpload(format!(
                        "unsupported image type {mime}: only JPEG, PNG and WEBP are accepted"
                    ))
                })?;

                let original = field.file_name().unwrap_or("image").to_owned();
                let data = field.bytes().await.map_err(malformed)?;
                if data.len() > config.max_upload_size() {
                    return Err(ApiError::PayloadTooLarge(config.max_upload_size_mb));
                }

                let name = images::unique_filename(&images::sanitize_stem(&original), ext);
                let path = Path::new(&config.image_dir).join(name);
                tokio::fs::write(&path, &data).await?;

                upload.file = Some(UploadedFile { path, mime });
            }
            Some("book") => {
                upload.book_json = Some(field.text().await.map_err(malformed)?);
            }
            // Unknown parts are ignored, matching lenient form clients.
            _ => {}
        }
    }
    Ok(())
}
