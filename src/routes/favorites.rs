use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::favorites::{
        CheckFavoriteResponse, FavoriteList, FavoriteStatus, ToggleFavoriteRequest,
        ToggleFavoriteResponse,
    },
    error::AppResult,
    media::RequestOrigin,
    middleware::{auth::AuthUser, validation::ValidatedJson},
    response::ApiResponse,
    services::favorite_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites))
        .route("/toggle", post(toggle_favorite))
        .route("/check/{property_id}", get(check_favorite))
}

#[utoipa::path(
    post,
    path = "/api/favorites/toggle",
    request_body = ToggleFavoriteRequest,
    responses(
        (status = 201, description = "Ajouté aux favoris", body = ApiResponse<ToggleFavoriteResponse>),
        (status = 200, description = "Retiré des favoris", body = ApiResponse<ToggleFavoriteResponse>),
        (status = 400, description = "Malformed body"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Property not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(payload): ValidatedJson<ToggleFavoriteRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ToggleFavoriteResponse>>)> {
    let resp = favorite_service::toggle_favorite(&state, &user, payload).await?;
    let status = match resp.data.as_ref().map(|d| d.status) {
        Some(FavoriteStatus::Added) => StatusCode::CREATED,
        _ => StatusCode::OK,
    };
    Ok((status, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    responses(
        (status = 200, description = "Favorites of the caller, newest first", body = ApiResponse<FavoriteList>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn list_favorites(
    State(state): State<AppState>,
    user: AuthUser,
    origin: RequestOrigin,
) -> AppResult<Json<ApiResponse<FavoriteList>>> {
    let urls = state.media_urls(origin);
    let resp = favorite_service::list_favorites(&state, &user, &urls).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/favorites/check/{property_id}",
    params(
        ("property_id" = i64, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Favorite state", body = ApiResponse<CheckFavoriteResponse>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Favorites"
)]
pub async fn check_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(property_id): Path<i64>,
) -> AppResult<Json<ApiResponse<CheckFavoriteResponse>>> {
    let resp = favorite_service::check_favorite(&state, &user, property_id).await?;
    Ok(Json(resp))
}
