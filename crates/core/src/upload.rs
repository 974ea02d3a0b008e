//! Upload policy: size ceilings, the image MIME allow-list, content
//! sniffing, and object-key generation.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::CoreError;
use crate::i18n::Message;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Size ceiling for multipart uploads (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Size ceiling for uploads fetched from a remote URL (5 MiB).
pub const MAX_REMOTE_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Size ceiling for profile avatars (5 MiB).
pub const MAX_AVATAR_BYTES: u64 = 5 * 1024 * 1024;

/// Default folder for generic uploads.
pub const DEFAULT_FOLDER: &str = "uploads";

/// Folder for profile avatars.
pub const AVATAR_FOLDER: &str = "avatars";

// ---------------------------------------------------------------------------
// Image types
// ---------------------------------------------------------------------------

/// Image formats accepted by every upload route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
    Webp,
    Gif,
}

/// The MIME allow-list, in the order reported to clients.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

impl ImageType {
    /// Parse a `Content-Type` value, ignoring parameters such as `charset`.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject empty payloads and payloads larger than `max_bytes`.
pub fn validate_size(len: u64, max_bytes: u64) -> Result<(), CoreError> {
    if len == 0 {
        return Err(CoreError::Validation(Message::EmptyFile));
    }
    if len > max_bytes {
        return Err(CoreError::Validation(Message::FileTooLarge { max_bytes }));
    }
    Ok(())
}

/// Check a declared `Content-Type` against the allow-list.
pub fn validate_image_type(content_type: &str) -> Result<ImageType, CoreError> {
    ImageType::from_mime(content_type).ok_or_else(|| {
        let shown = content_type.split(';').next().unwrap_or("").trim();
        let shown = if shown.is_empty() { "unknown" } else { shown };
        CoreError::Validation(Message::UnsupportedFileType(shown.to_string()))
    })
}

/// Detect the image format from the leading bytes of the payload.
pub fn sniff_image_type(bytes: &[u8]) -> Option<ImageType> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Jpeg => Some(ImageType::Jpeg),
        image::ImageFormat::Png => Some(ImageType::Png),
        image::ImageFormat::WebP => Some(ImageType::Webp),
        image::ImageFormat::Gif => Some(ImageType::Gif),
        _ => None,
    }
}

/// Full upload check: size ceiling, declared type, and sniffed contents.
///
/// The sniffed type wins when it disagrees with the declared type only in
/// the sense that both must be on the allow-list and must match.
pub fn validate_image_upload(
    bytes: &[u8],
    declared_type: &str,
    max_bytes: u64,
) -> Result<ImageType, CoreError> {
    validate_size(bytes.len() as u64, max_bytes)?;
    let declared = validate_image_type(declared_type)?;
    match sniff_image_type(bytes) {
        Some(actual) if actual == declared => Ok(declared),
        _ => Err(CoreError::Validation(Message::FileTypeMismatch)),
    }
}

// ---------------------------------------------------------------------------
// Object keys
// ---------------------------------------------------------------------------

fn folder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9_-]+").expect("static regex is valid"))
}

/// Reduce a client-supplied folder name to `[a-z0-9_-]`, falling back to
/// [`DEFAULT_FOLDER`] when nothing is left.
pub fn sanitize_folder(folder: &str) -> String {
    let lowered = folder.trim().to_ascii_lowercase();
    let cleaned = folder_pattern().replace_all(&lowered, "-");
    let cleaned = cleaned.trim_matches('-');
    if cleaned.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Build a collision-free storage key: `<folder>/<owner>/<uuid>.<ext>`.
pub fn object_key(folder: &str, owner: DbId, image_type: ImageType) -> String {
    format!(
        "{}/{}/{}.{}",
        sanitize_folder(folder),
        owner,
        uuid::Uuid::new_v4(),
        image_type.extension()
    )
}
