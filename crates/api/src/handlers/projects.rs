//! Handlers for the `/projects` resource (the saved-content gallery).

use adstudio_core::error::CoreError;
use adstudio_core::gallery::{clamp_limit, clamp_offset, GalleryFilter, GallerySort};
use adstudio_core::i18n::Message;
use adstudio_core::product::ProductType;
use adstudio_core::site_url::is_http_url;
use adstudio_core::types::DbId;
use adstudio_db::models::project::{NewProject, SavedProject};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::JsonBody;
use crate::middleware::auth::AuthUser;
use crate::query::GalleryParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /projects`.
#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub business_id: Option<DbId>,
    pub product_type: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub media_urls: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub parameters: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct SetFavorite {
    pub is_favorite: Option<bool>,
}

/// GET /api/v1/projects
pub async fn list_projects(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<GalleryParams>,
) -> AppResult<Json<DataResponse<Vec<SavedProject>>>> {
    let filter = gallery_filter(&params)?;
    let projects = state
        .db
        .list_projects(
            user.user_id,
            filter,
            clamp_limit(params.limit),
            clamp_offset(params.offset),
        )
        .await?;
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
pub async fn create_project(
    user: AuthUser,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<SavedProject>>)> {
    let product_type = parse_product_type(
        input
            .product_type
            .as_deref()
            .ok_or_else(|| CoreError::missing_field("product_type"))?,
    )?;

    if input.media_urls.iter().any(|url| !is_http_url(url)) {
        return Err(CoreError::Validation(Message::InvalidField("media_urls".into())).into());
    }
    if input.thumbnail_url.as_deref().is_some_and(|url| !is_http_url(url)) {
        return Err(CoreError::Validation(Message::InvalidField("thumbnail_url".into())).into());
    }
    if let Some(business_id) = input.business_id {
        if !state.db.is_linked(business_id, user.user_id).await? {
            return Err(CoreError::not_found("Business", business_id).into());
        }
    }

    let project = state
        .db
        .create_project(
            user.user_id,
            NewProject {
                business_id: input.business_id,
                product_type,
                title: input.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
                media_urls: input.media_urls,
                thumbnail_url: input.thumbnail_url,
                parameters: input.parameters,
            },
        )
        .await?;

    tracing::info!(project_id = %project.id, user_id = %user.user_id, product_type = %product_type, "Project saved");
    Ok((StatusCode::CREATED, Json(DataResponse { data: project })))
}

/// GET /api/v1/projects/{id}
pub async fn get_project(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<SavedProject>>> {
    let project_id = parse_project_id(&id)?;
    let project = state
        .db
        .find_project(user.user_id, project_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", project_id))?;
    Ok(Json(DataResponse { data: project }))
}

/// PATCH /api/v1/projects/{id}/favorite
pub async fn set_favorite(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<SetFavorite>,
) -> AppResult<Json<DataResponse<SavedProject>>> {
    let project_id = parse_project_id(&id)?;
    let is_favorite = input
        .is_favorite
        .ok_or_else(|| CoreError::missing_field("is_favorite"))?;

    let project = state
        .db
        .set_favorite(user.user_id, project_id, is_favorite)
        .await?
        .ok_or_else(|| CoreError::not_found("Project", project_id))?;
    Ok(Json(DataResponse { data: project }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn gallery_filter(params: &GalleryParams) -> Result<GalleryFilter, CoreError> {
    let product_type = params
        .product_type
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .map(parse_product_type)
        .transpose()?;

    let sort = match params.sort.as_deref().map(str::trim) {
        None | Some("") | Some("newest") => GallerySort::Newest,
        Some("oldest") => GallerySort::Oldest,
        Some(_) => return Err(CoreError::Validation(Message::InvalidField("sort".into()))),
    };

    Ok(GalleryFilter {
        product_type,
        favorites_only: params.favorites,
        search: params.search.clone(),
        sort,
    })
}

fn parse_product_type(value: &str) -> Result<ProductType, CoreError> {
    value
        .parse()
        .map_err(|_| CoreError::Validation(Message::InvalidField("product_type".into())))
}

fn parse_project_id(id: &str) -> Result<DbId, CoreError> {
    id.parse().map_err(|_| CoreError::not_found("Project", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_mean_newest_unfiltered() {
        let filter = gallery_filter(&GalleryParams::default()).unwrap();
        assert_eq!(filter, GalleryFilter::default());
    }

    #[test]
    fn params_are_parsed() {
        let params = GalleryParams {
            product_type: Some("Video".into()),
            favorites: true,
            search: Some("launch".into()),
            sort: Some("oldest".into()),
            ..GalleryParams::default()
        };
        let filter = gallery_filter(&params).unwrap();
        assert_eq!(filter.product_type, Some(ProductType::Video));
        assert!(filter.favorites_only);
        assert_eq!(filter.sort, GallerySort::Oldest);
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let params = GalleryParams {
            sort: Some("random".into()),
            ..GalleryParams::default()
        };
        assert!(gallery_filter(&params).is_err());
    }
}
