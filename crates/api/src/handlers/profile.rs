//! Handlers for the `/profile` resource.

use adstudio_core::error::CoreError;
use adstudio_core::i18n::{Locale, Message};
use adstudio_core::upload::{object_key, validate_image_upload, AVATAR_FOLDER, MAX_AVATAR_BYTES};
use adstudio_db::models::profile::{Profile, UpdateProfile};
use axum::extract::{Multipart, State};
use axum::Json;

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::handlers::uploads::read_upload_form;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/profile
///
/// The profile is created on first access from the token's email.
pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Profile>>> {
    let profile = match state.db.find_profile(user.user_id).await? {
        Some(profile) => profile,
        None => state.db.upsert_profile(user.user_id, user.email).await?,
    };
    Ok(Json(DataResponse { data: profile }))
}

/// PATCH /api/v1/profile
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(mut input): JsonBody<UpdateProfile>,
) -> AppResult<Json<DataResponse<Profile>>> {
    if let Some(locale) = input.locale.as_deref() {
        let parsed: Locale = locale
            .parse()
            .map_err(|_| CoreError::Validation(Message::InvalidField("locale".into())))?;
        input.locale = Some(parsed.code().to_string());
    }
    input.full_name = input.full_name.map(|n| n.trim().to_string());
    input.company_name = input.company_name.map(|n| n.trim().to_string());

    state.db.upsert_profile(user.user_id, user.email.clone()).await?;
    let profile = state
        .db
        .update_profile(user.user_id, input)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", user.user_id))?;

    tracing::info!(user_id = %user.user_id, "Profile updated");
    Ok(Json(DataResponse { data: profile }))
}

/// POST /api/v1/profile/avatar
///
/// Stores the image under `avatars/<user>/` and points the profile at it.
pub async fn upload_avatar(
    user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<Profile>>> {
    let form = read_upload_form(&mut multipart, MAX_AVATAR_BYTES).await?;
    let image_type = validate_image_upload(&form.bytes, &form.content_type, MAX_AVATAR_BYTES)?;

    let key = object_key(AVATAR_FOLDER, user.user_id, image_type);
    let stored = state.storage.put(&key, form.bytes, image_type.mime()).await?;

    state.db.upsert_profile(user.user_id, user.email.clone()).await?;
    let profile = state
        .db
        .set_avatar(user.user_id, &stored.public_url)
        .await?
        .ok_or_else(|| CoreError::not_found("Profile", user.user_id))?;

    tracing::info!(user_id = %user.user_id, key = %stored.key, "Avatar updated");
    Ok(Json(DataResponse { data: profile }))
}
