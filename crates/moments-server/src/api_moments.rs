//! Public moment endpoints under `/apis/api.moment.halo.run/v1alpha1`.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use moments_finder::FinderError;
use moments_query::PublicMomentQuery;
use moments_types::{ListResult, MomentView, TagSummary};
use std::sync::Arc;
use thiserror::Error;

use crate::middleware::ViewerContext;
use crate::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<FinderError> for ApiError {
    fn from(e: FinderError) -> Self {
        match e {
            FinderError::InvalidArgument(err) => ApiError::BadRequest(err.to_string()),
            FinderError::NotFound(_) => ApiError::NotFound("Moment not found".to_string()),
            FinderError::CollaboratorUnavailable(err) => {
                tracing::error!(error = %err, "moment query failed");
                ApiError::InternalServerError("storage unavailable".to_string())
            }
        }
    }
}

/// Handler for `GET /moments`.
///
/// Query parameters are taken as raw pairs so that `sort`, `labelSelector`
/// and `fieldSelector` may repeat. A missing or zero `size` takes the
/// configured default.
pub async fn list_moments_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ViewerContext(viewer)): Extension<ViewerContext>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<ListResult<MomentView>>, ApiError> {
    let mut query = PublicMomentQuery::from_pairs(&pairs)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if matches!(query.size, None | Some(0)) {
        query.size = Some(state.default_page_size);
    }

    let page = state.finder.list_by_filters(viewer.as_ref(), &query).await?;
    Ok(Json(page))
}

/// Handler for `GET /moments/{name}`.
pub async fn get_moment_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ViewerContext(viewer)): Extension<ViewerContext>,
    Path(name): Path<String>,
) -> Result<Json<MomentView>, ApiError> {
    let view = state.finder.get_by_name(viewer.as_ref(), &name).await?;
    Ok(Json(view))
}

/// Handler for `GET /moments/-/tags`.
pub async fn list_tags_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(ViewerContext(viewer)): Extension<ViewerContext>,
) -> Result<Json<Vec<TagSummary>>, ApiError> {
    let tags = state.finder.list_tag_summaries(viewer.as_ref()).await?;
    Ok(Json(tags))
}
