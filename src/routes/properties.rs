use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};

use crate::{
    dto::properties::{
        CreatePropertyRequest, ImageUploadForm, PropertyList, PropertyQuery,
        UpdatePropertyRequest, VideoUploadForm,
    },
    error::{AppError, AppResult},
    media::RequestOrigin,
    middleware::{auth::MaybeAuthUser, validation::ValidatedJson},
    models::{PropertyImageRecord, PropertyRecord},
    response::ApiResponse,
    services::property_service::{self, MediaUpload},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_properties).post(create_property))
        .route(
            "/{id}",
            get(get_property)
                .put(replace_property)
                .patch(update_property)
                .delete(delete_property),
        )
        .route(
            "/{id}/images",
            post(upload_image).layer(DefaultBodyLimit::disable()),
        )
        .route("/{id}/images/{image_id}", delete(delete_image))
        .route(
            "/{id}/video",
            post(upload_video).layer(DefaultBodyLimit::disable()),
        )
}

struct UploadForm {
    file: Option<MediaUpload>,
    is_main: bool,
}

async fn read_upload_form(mut multipart: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm {
        file: None,
        is_main: false,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {}", e)))?
                    .to_vec();
                form.file = Some(MediaUpload {
                    file_name,
                    content_type,
                    data,
                });
            }
            "is_main" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid is_main field: {}", e)))?;
                form.is_main = matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "on" | "yes"
                );
            }
            _ => {}
        }
    }

    Ok(form)
}

fn require_file(form: &mut UploadForm) -> AppResult<MediaUpload> {
    form.file
        .take()
        .filter(|file| !file.data.is_empty())
        .ok_or_else(|| AppError::Validation("file: this field is required".into()))
}

#[utoipa::path(
    get,
    path = "/api/properties",
    params(PropertyQuery),
    responses(
        (status = 200, description = "List properties, newest first", body = ApiResponse<PropertyList>)
    ),
    tag = "Properties"
)]
pub async fn list_properties(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Query(query): Query<PropertyQuery>,
) -> AppResult<Json<ApiResponse<PropertyList>>> {
    let urls = state.media_urls(origin);
    let resp = property_service::list_properties(&state, query, &urls).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/properties/{id}",
    params(
        ("id" = i64, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Property detail", body = ApiResponse<PropertyRecord>),
        (status = 404, description = "Not Found")
    ),
    tag = "Properties"
)]
pub async fn get_property(
    State(state): State<AppState>,
    origin: RequestOrigin,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<PropertyRecord>>> {
    let urls = state.media_urls(origin);
    let resp = property_service::get_property(&state, id, &urls).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/properties",
    request_body = CreatePropertyRequest,
    responses(
        (status = 201, description = "Property created", body = ApiResponse<PropertyRecord>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn create_property(
    State(state): State<AppState>,
    MaybeAuthUser(actor): MaybeAuthUser,
    origin: RequestOrigin,
    ValidatedJson(payload): ValidatedJson<CreatePropertyRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<PropertyRecord>>)> {
    let urls = state.media_urls(origin);
    let resp = property_service::create_property(&state, actor.as_ref(), payload, &urls).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/properties/{id}",
    params(
        ("id" = i64, Path, description = "Property ID")
    ),
    request_body = CreatePropertyRequest,
    responses(
        (status = 200, description = "Property replaced", body = ApiResponse<PropertyRecord>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Not Found")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn replace_property(
    State(state): State<AppState>,
    MaybeAuthUser(actor): MaybeAuthUser,
    origin: RequestOrigin,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<CreatePropertyRequest>,
) -> AppResult<Json<ApiResponse<PropertyRecord>>> {
    let urls = state.media_urls(origin);
    let resp =
        property_service::replace_property(&state, actor.as_ref(), id, payload, &urls).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/properties/{id}",
    params(
        ("id" = i64, Path, description = "Property ID")
    ),
    request_body = UpdatePropertyRequest,
    responses(
        (status = 200, description = "Property updated", body = ApiResponse<PropertyRecord>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Not Found")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn update_property(
    State(state): State<AppState>,
    MaybeAuthUser(actor): MaybeAuthUser,
    origin: RequestOrigin,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdatePropertyRequest>,
) -> AppResult<Json<ApiResponse<PropertyRecord>>> {
    let urls = state.media_urls(origin);
    let resp =
        property_service::update_property(&state, actor.as_ref(), id, payload, &urls).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}",
    params(
        ("id" = i64, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Property deleted with its images and favorites", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn delete_property(
    State(state): State<AppState>,
    MaybeAuthUser(actor): MaybeAuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = property_service::delete_property(&state, actor.as_ref(), id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/properties/{id}/images",
    params(
        ("id" = i64, Path, description = "Property ID")
    ),
    request_body(content = ImageUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image stored", body = ApiResponse<PropertyImageRecord>),
        (status = 400, description = "Missing or invalid file"),
        (status = 404, description = "Not Found")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    MaybeAuthUser(actor): MaybeAuthUser,
    origin: RequestOrigin,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<ApiResponse<PropertyImageRecord>>)> {
    let mut form = read_upload_form(multipart).await?;
    let file = require_file(&mut form)?;
    let urls = state.media_urls(origin);
    let resp =
        property_service::add_image(&state, actor.as_ref(), id, file, form.is_main, &urls).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/properties/{id}/images/{image_id}",
    params(
        ("id" = i64, Path, description = "Property ID"),
        ("image_id" = i64, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    MaybeAuthUser(actor): MaybeAuthUser,
    Path((id, image_id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = property_service::delete_image(&state, actor.as_ref(), id, image_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/properties/{id}/video",
    params(
        ("id" = i64, Path, description = "Property ID")
    ),
    request_body(content = VideoUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video stored", body = ApiResponse<PropertyRecord>),
        (status = 400, description = "Missing or invalid file"),
        (status = 404, description = "Not Found")
    ),
    security((), ("bearer_auth" = [])),
    tag = "Properties"
)]
pub async fn upload_video(
    State(state): State<AppState>,
    MaybeAuthUser(actor): MaybeAuthUser,
    origin: RequestOrigin,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<PropertyRecord>>> {
    let mut form = read_upload_form(multipart).await?;
    let file = require_file(&mut form)?;
    let urls = state.media_urls(origin);
    let resp = property_service::set_video(&state, actor.as_ref(), id, file, &urls).await?;
    Ok(Json(resp))
}
