//! Re-render error bodies in the caller's language.
//!
//! [`crate::error::AppError`] always renders English and attaches a
//! [`LocalizedError`] to the response. This middleware negotiates a
//! [`Locale`] from `Accept-Language` and swaps the body when it differs.

use adstudio_core::i18n::Locale;
use axum::body::Body;
use axum::extract::Request;
use axum::http::header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE, CONTENT_LENGTH};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::LocalizedError;

/// Locale negotiated for the request.
pub fn request_locale(request: &Request) -> Locale {
    request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map(Locale::from_accept_language)
        .unwrap_or_default()
}

pub async fn localize_errors(request: Request, next: Next) -> Response {
    let locale = request_locale(&request);
    let response = next.run(request).await;

    let Some(error) = response.extensions().get::<LocalizedError>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    parts
        .headers
        .insert(CONTENT_LANGUAGE, HeaderValue::from_static(locale.code()));

    if locale == Locale::En {
        return Response::from_parts(parts, body);
    }

    parts.headers.remove(CONTENT_LENGTH);
    let bytes = serde_json::to_vec(&error.body(locale)).unwrap_or_default();
    Response::from_parts(parts, Body::from(bytes))
}
