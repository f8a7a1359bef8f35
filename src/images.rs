//! Cover image lifecycle: normalization of uploads into bounded WebP files
//! and reclamation of superseded/orphaned files.
//!
//! Normalization is CPU- and disk-bound, so handlers run it under
//! `tokio::task::spawn_blocking`.

use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ApiError;

/// Neither cover dimension may exceed this after normalization.
pub const MAX_DIMENSION: u32 = 1200;

/// Lossy WebP quality. Fixed tradeoff; not configurable per request.
pub const WEBP_QUALITY: f32 = 80.0;

/// File extension for an accepted upload MIME type. The MIME decides the
/// extension of the temp file; the upload's own extension is not trusted.
pub fn ext_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Filename stem derived from the original upload name: lowercased,
/// whitespace turned into hyphens, everything outside [a-z0-9-_] dropped.
pub fn sanitize_stem(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");

    let cleaned: String = stem
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Unique filename for this process: sanitized stem plus a nanosecond
/// timestamp suffix. Concurrent uploads cannot collide, so the image
/// directory needs no locking.
pub fn unique_filename(stem: &str, ext: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!("{stem}-{nanos}.{ext}")
}

/// Normalize an uploaded cover into the stored form.
///
/// Already-WebP input is the normalized output: it is returned unchanged,
/// with no re-encode and no deletion. Anything else is decoded, rotated
/// according to its EXIF orientation, shrunk to fit within
/// [`MAX_DIMENSION`] (aspect preserved, never upscaled) and re-encoded as
/// lossy WebP next to the input. The input temp file is removed only after
/// the output has been flushed to disk.
///
/// Decode/resize/encode failures are [`ApiError::InvalidImage`]: malformed
/// bytes are the client's problem, not a server fault.
pub fn normalize(input: &Path) -> Result<PathBuf, ApiError> {
    let already_webp = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("webp"));
    if already_webp {
        return Ok(input.to_path_buf());
    }

    let reader = ImageReader::open(input)
        .map_err(|e| ApiError::Internal(format!("cannot open upload {}: {e}", input.display())))?
        .with_guessed_format()
        .map_err(|e| ApiError::Internal(format!("cannot probe upload {}: {e}", input.display())))?;

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| ApiError::InvalidImage(e.to_string()))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| ApiError::InvalidImage(e.to_string()))?;
    img.apply_orientation(orientation);

    if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img = img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3);
    }

    // libwebp only takes RGB8/RGBA8 input.
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let encoder = webp::Encoder::from_image(&rgba)
        .map_err(|e| ApiError::InvalidImage(format!("webp encoding failed: {e}")))?;
    let encoded = encoder.encode(WEBP_QUALITY);

    let output = input.with_extension("webp");
    write_durably(&output, &encoded)
        .map_err(|e| ApiError::Internal(format!("cannot write {}: {e}", output.display())))?;

    remove_file_quiet(input);
    Ok(output)
}

fn write_durably(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Best-effort file removal. Missing files are silent; anything else is
/// logged and swallowed so reclamation never fails a request.
pub fn remove_file_quiet(path: &Path) {
    if let Err(err) = std::fs::remove_file(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %err, "failed to remove image file");
        }
    }
}

/// Absolute URL for a stored cover.
pub fn public_url(base: &str, filename: &str) -> String {
    format!("{}/images/{filename}", base.trim_end_matches('/'))
}

/// Basename of a cover URL minted by [`public_url`]. Rejects anything that
/// could escape the image directory.
pub fn filename_from_url(url: &str) -> Option<&str> {
    let idx = url.find("/images/")?;
    let name = &url[idx + "/images/".len()..];
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return None;
    }
    Some(name)
}

/// Reclaim the stored file a book's image URL points at. Best-effort:
/// the record mutation that preceded this call is the authoritative
/// outcome and has already succeeded.
pub fn remove_by_url(image_dir: &str, url: &str) {
    match filename_from_url(url) {
        Some(name) => remove_file_quiet(&Path::new(image_dir).join(name)),
        None => {
            tracing::warn!(url, "image url does not reference the local image directory");
        }
    }
}
