//! Handlers for `/uploads` and `/downloads`.
//!
//! Uploaded images are checked against the size ceiling, the MIME
//! allow-list and their sniffed contents before anything is written to
//! object storage.

use adstudio_cloud::StoredObject;
use adstudio_core::error::CoreError;
use adstudio_core::i18n::Message;
use adstudio_core::upload::{
    object_key, sniff_image_type, validate_image_upload, DEFAULT_FOLDER, MAX_REMOTE_UPLOAD_BYTES,
    MAX_UPLOAD_BYTES,
};
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

// ---------------------------------------------------------------------------
// Multipart reading
// ---------------------------------------------------------------------------

/// The parts of an upload form this API understands.
#[derive(Debug)]
pub struct UploadForm {
    pub bytes: Vec<u8>,
    /// Declared `Content-Type` of the `file` part.
    pub content_type: String,
    pub folder: Option<String>,
}

/// Read the `file` part (capped at `max_bytes`) and an optional `folder`.
/// Unknown parts are skipped.
pub async fn read_upload_form(
    multipart: &mut Multipart,
    max_bytes: u64,
) -> AppResult<UploadForm> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut folder = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();
                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?
                {
                    if (bytes.len() + chunk.len()) as u64 > max_bytes {
                        return Err(CoreError::Validation(Message::FileTooLarge { max_bytes }).into());
                    }
                    bytes.extend_from_slice(&chunk);
                }
                file = Some((bytes, content_type));
            }
            "folder" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_bytes))?;
                folder = Some(text);
            }
            _ => {}
        }
    }

    let (bytes, content_type) = file.ok_or_else(|| CoreError::missing_field("file"))?;
    Ok(UploadForm {
        bytes,
        content_type,
        folder,
    })
}

/// Bodies cut off by the router's body limit surface as oversized files.
fn multipart_error(err: MultipartError, max_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return CoreError::Validation(Message::FileTooLarge { max_bytes }).into();
    }
    tracing::debug!(error = %err.body_text(), "Malformed multipart body");
    AppError::BadRequest(Message::Detail(err.body_text()))
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// POST /api/v1/uploads
pub async fn upload(
    user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<StoredObject>>)> {
    let form = read_upload_form(&mut multipart, MAX_UPLOAD_BYTES).await?;
    let image_type = validate_image_upload(&form.bytes, &form.content_type, MAX_UPLOAD_BYTES)?;

    let folder = form.folder.as_deref().unwrap_or(DEFAULT_FOLDER);
    let key = object_key(folder, user.user_id, image_type);
    let stored = state.storage.put(&key, form.bytes, image_type.mime()).await?;

    tracing::info!(user_id = %user.user_id, key = %stored.key, size = stored.size, "File uploaded");
    Ok((StatusCode::CREATED, Json(DataResponse { data: stored })))
}

/// Request body for `POST /uploads/from-url`.
#[derive(Debug, Deserialize)]
pub struct UploadFromUrl {
    pub url: Option<String>,
    pub folder: Option<String>,
}

/// POST /api/v1/uploads/from-url
///
/// Copies a remote image into object storage. A missing or generic remote
/// `Content-Type` falls back to the sniffed format.
pub async fn upload_from_url(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UploadFromUrl>,
) -> AppResult<(StatusCode, Json<DataResponse<StoredObject>>)> {
    let url = input
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CoreError::missing_field("url"))?;

    let remote = state.fetcher.fetch(&url, MAX_REMOTE_UPLOAD_BYTES).await?;
    let declared = match remote.content_type.as_deref() {
        Some(ct) if !ct.starts_with(FALLBACK_CONTENT_TYPE) => ct.to_string(),
        _ => sniff_image_type(&remote.bytes)
            .map(|t| t.mime().to_string())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
    };
    let image_type = validate_image_upload(&remote.bytes, &declared, MAX_REMOTE_UPLOAD_BYTES)?;

    let folder = input.folder.as_deref().unwrap_or(DEFAULT_FOLDER);
    let key = object_key(folder, user.user_id, image_type);
    let stored = state.storage.put(&key, remote.bytes, image_type.mime()).await?;

    tracing::info!(user_id = %user.user_id, key = %stored.key, source = %url, "Remote file uploaded");
    Ok((StatusCode::CREATED, Json(DataResponse { data: stored })))
}

// ---------------------------------------------------------------------------
// Downloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub url: Option<String>,
    pub filename: Option<String>,
}

/// GET /api/v1/downloads
///
/// Proxies a remote media file back as an attachment so the browser saves
/// it instead of navigating to it.
pub async fn download(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> AppResult<impl IntoResponse> {
    let url = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| CoreError::missing_field("url"))?;

    let remote = state.fetcher.fetch(&url, state.config.download_max_bytes).await?;

    let filename = attachment_filename(params.filename.as_deref(), &url);
    let content_type = remote
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or(HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, content_type);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| AppError::InternalError(format!("Invalid Content-Disposition: {e}")))?;
    headers.insert(CONTENT_DISPOSITION, disposition);

    Ok((headers, remote.bytes))
}

/// Pick a header-safe file name: the requested one, else the last URL path
/// segment, else `download`.
pub fn attachment_filename(requested: Option<&str>, url: &str) -> String {
    let from_url = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .unwrap_or_default();

    let candidate = requested
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(from_url);

    let cleaned: String = candidate
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');

    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_prefers_request_then_url() {
        assert_eq!(
            attachment_filename(Some("my video.mp4"), "https://cdn.test/a/b.mp4"),
            "my_video.mp4"
        );
        assert_eq!(
            attachment_filename(None, "https://cdn.test/a/clip.mp4?token=1"),
            "clip.mp4"
        );
    }

    #[test]
    fn filename_strips_header_breaking_characters() {
        assert_eq!(
            attachment_filename(Some("a\"b\r\n.png"), "https://x.test/"),
            "a_b__.png"
        );
        assert_eq!(attachment_filename(None, "https://x.test/"), "download");
        assert_eq!(attachment_filename(Some(".."), "https://x.test/"), "download");
    }
}
