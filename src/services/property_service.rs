use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait, TryIntoModel,
};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;

use crate::{
    dto::properties::{
        CreatePropertyRequest, PropertyImageInput, PropertyList, PropertyQuery,
        UpdatePropertyRequest,
    },
    entity::{
        favorites::{Column as FavoriteCol, Entity as Favorites},
        properties::{ActiveModel, Column, Entity as Properties, Model as PropertyModel},
        property_images::{
            ActiveModel as ImageActive, Column as ImageCol, Entity as PropertyImages,
            Model as ImageModel,
        },
    },
    error::{AppError, AppResult},
    media::{IMAGE_DIR, MediaUrls, VIDEO_DIR},
    middleware::auth::{AuthUser, ensure_admin},
    models::{PropertyImageRecord, PropertyRecord},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl MediaUpload {
    fn has_kind(&self, mime_prefix: &str, extensions: &[&str]) -> bool {
        if let Some(content_type) = self.content_type.as_deref() {
            if content_type.starts_with(mime_prefix) {
                return true;
            }
        }
        let lower = self.file_name.to_ascii_lowercase();
        extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{ext}")))
    }

    pub fn is_image(&self) -> bool {
        self.has_kind("image/", &["jpg", "jpeg", "png", "gif", "webp", "bmp"])
    }

    pub fn is_video(&self) -> bool {
        self.has_kind("video/", &["mp4", "mov", "webm", "mkv", "avi"])
    }
}

/// Property writes are open unless the deployment restricts them to admins.
pub fn ensure_can_write(state: &AppState, actor: Option<&AuthUser>) -> AppResult<()> {
    if !state.config.property_writes_require_admin {
        return Ok(());
    }
    match actor {
        Some(user) => ensure_admin(user),
        None => Err(AppError::Unauthorized("Authentication required".into())),
    }
}

pub async fn list_properties(
    state: &AppState,
    query: PropertyQuery,
    urls: &MediaUrls,
) -> AppResult<ApiResponse<PropertyList>> {
    let pagination = query.pagination();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col(Column::Title).ilike(pattern.clone()))
                .add(Expr::col(Column::Location).ilike(pattern.clone()))
                .add(Expr::col(Column::Description).ilike(pattern)),
        );
    }
    if let Some(kind) = query.kind {
        condition = condition.add(Column::Kind.eq(kind));
    }
    if let Some(location) = query.location.filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Location.eq(location));
    }
    if let Some(furnished) = query.furnished {
        condition = condition.add(Column::Furnished.eq(furnished));
    }
    if let Some(available) = query.available.filter(|s| !s.is_empty()) {
        condition = condition.add(Column::Available.eq(available));
    }
    if let Some(property_state) = query.state {
        condition = condition.add(Column::State.eq(property_state));
    }
    if let Some(duration) = query.contract_duration {
        condition = condition.add(Column::ContractDuration.eq(duration));
    }
    if let Some(min_price) = query.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }
    if let Some(max_price) = query.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    let finder = Properties::find()
        .filter(condition)
        .order_by_desc(Column::DateAdded)
        .order_by_desc(Column::Id);

    let (properties, meta) = match pagination {
        Some(pagination) => {
            let (page, limit, offset) = pagination.normalize();
            let total = finder.clone().count(state.orm.as_ref()).await? as i64;
            let items = finder
                .limit(limit as u64)
                .offset(offset as u64)
                .all(state.orm.as_ref())
                .await?;
            (items, Meta::new(page, limit, total))
        }
        None => {
            let items = finder.all(state.orm.as_ref()).await?;
            let total = items.len() as i64;
            (items, Meta::total(total))
        }
    };

    let items = attach_images(state.orm.as_ref(), properties, urls).await?;
    Ok(ApiResponse::success(
        "Properties",
        PropertyList { items },
        Some(meta),
    ))
}

pub async fn get_property(
    state: &AppState,
    id: i64,
    urls: &MediaUrls,
) -> AppResult<ApiResponse<PropertyRecord>> {
    let property = Properties::find_by_id(id)
        .one(state.orm.as_ref())
        .await?
        .ok_or(AppError::NotFound)?;
    let images = images_of(state.orm.as_ref(), id).await?;

    Ok(ApiResponse::success(
        "Property",
        PropertyRecord::from_model(property, images, urls),
        None,
    ))
}

pub async fn create_property(
    state: &AppState,
    actor: Option<&AuthUser>,
    payload: CreatePropertyRequest,
    urls: &MediaUrls,
) -> AppResult<ApiResponse<PropertyRecord>> {
    ensure_can_write(state, actor)?;
    if payload
        .images
        .as_ref()
        .is_some_and(|images| images.iter().any(|image| image.id.is_some()))
    {
        return Err(AppError::Validation(
            "images: new properties cannot reference existing image ids".into(),
        ));
    }

    let images = payload.images.clone().unwrap_or_default();
    let mut active = active_from_full(payload);
    active.id = NotSet;

    let txn = state.orm.begin().await?;
    let property = active.insert(&txn).await?;
    let images = sync_images(&txn, property.id, images, Vec::new()).await?;
    txn.commit().await?;

    tracing::info!(property_id = property.id, images = images.len(), "property created");

    Ok(ApiResponse::success(
        "Property created",
        PropertyRecord::from_model(property, images, urls),
        Some(Meta::empty()),
    ))
}

/// Full update (PUT): every field is taken from the payload.
pub async fn replace_property(
    state: &AppState,
    actor: Option<&AuthUser>,
    id: i64,
    payload: CreatePropertyRequest,
    urls: &MediaUrls,
) -> AppResult<ApiResponse<PropertyRecord>> {
    ensure_can_write(state, actor)?;

    let txn = state.orm.begin().await?;
    let existing = Properties::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let image_inputs = payload.images.clone();
    let keep_date = payload.date_added.is_none();
    let mut active = active_from_full(payload);
    active.id = Set(existing.id);
    if keep_date {
        active.date_added = Set(existing.date_added);
    }
    let property = active.update(&txn).await?;

    let images = match image_inputs {
        Some(inputs) => {
            let current = images_of(&txn, id).await?;
            sync_images(&txn, id, inputs, current).await?
        }
        None => images_of(&txn, id).await?,
    };
    txn.commit().await?;

    tracing::info!(property_id = id, "property replaced");

    Ok(ApiResponse::success(
        "Updated",
        PropertyRecord::from_model(property, images, urls),
        Some(Meta::empty()),
    ))
}

/// Partial update (PATCH): only the fields present in the payload change.
pub async fn update_property(
    state: &AppState,
    actor: Option<&AuthUser>,
    id: i64,
    payload: UpdatePropertyRequest,
    urls: &MediaUrls,
) -> AppResult<ApiResponse<PropertyRecord>> {
    ensure_can_write(state, actor)?;

    let txn = state.orm.begin().await?;
    let existing = Properties::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let image_inputs = payload.images.clone();
    let mut active: ActiveModel = existing.into();
    apply_patch(&mut active, payload);
    let property = if active.is_changed() {
        active.update(&txn).await?
    } else {
        active.try_into_model()?
    };

    let images = match image_inputs {
        Some(inputs) => {
            let current = images_of(&txn, id).await?;
            sync_images(&txn, id, inputs, current).await?
        }
        None => images_of(&txn, id).await?,
    };
    txn.commit().await?;

    tracing::info!(property_id = id, "property updated");

    Ok(ApiResponse::success(
        "Updated",
        PropertyRecord::from_model(property, images, urls),
        Some(Meta::empty()),
    ))
}

/// Delete a property together with its images and favorites.
pub async fn delete_property(
    state: &AppState,
    actor: Option<&AuthUser>,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_can_write(state, actor)?;

    let txn = state.orm.begin().await?;
    let favorites = Favorites::delete_many()
        .filter(FavoriteCol::PropertyId.eq(id))
        .exec(&txn)
        .await?;
    let images = PropertyImages::delete_many()
        .filter(ImageCol::PropertyId.eq(id))
        .exec(&txn)
        .await?;
    let result = Properties::delete_by_id(id).exec(&txn).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    txn.commit().await?;

    tracing::info!(
        property_id = id,
        images = images.rows_affected,
        favorites = favorites.rows_affected,
        "property deleted"
    );

    Ok(ApiResponse::deleted())
}

/// Store an uploaded image and attach it to the property.
pub async fn add_image(
    state: &AppState,
    actor: Option<&AuthUser>,
    property_id: i64,
    upload: MediaUpload,
    is_main: bool,
    urls: &MediaUrls,
) -> AppResult<ApiResponse<PropertyImageRecord>> {
    ensure_can_write(state, actor)?;
    if !upload.is_image() {
        return Err(AppError::Validation("file: expected an image".into()));
    }
    ensure_property_exists(state.orm.as_ref(), property_id).await?;

    let key = state
        .media
        .save(IMAGE_DIR, &upload.file_name, &upload.data)
        .await?;

    let result = async {
        let txn = state.orm.begin().await?;
        if is_main {
            clear_main_flag(&txn, property_id).await?;
        }
        let image = ImageActive {
            id: NotSet,
            property_id: Set(property_id),
            image: Set(key.clone()),
            is_main: Set(is_main),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok::<_, AppError>(image)
    }
    .await;

    let image = match result {
        Ok(image) => image,
        Err(err) => {
            if let Err(cleanup) = state.media.remove(&key).await {
                tracing::warn!(error = %cleanup, key = %key, "orphaned media file");
            }
            return Err(err);
        }
    };

    tracing::info!(property_id, image_id = image.id, is_main, "image uploaded");

    Ok(ApiResponse::success(
        "Image uploaded",
        PropertyImageRecord::from_model(image, urls),
        Some(Meta::empty()),
    ))
}

pub async fn delete_image(
    state: &AppState,
    actor: Option<&AuthUser>,
    property_id: i64,
    image_id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_can_write(state, actor)?;

    let image = PropertyImages::find_by_id(image_id)
        .filter(ImageCol::PropertyId.eq(property_id))
        .one(state.orm.as_ref())
        .await?
        .ok_or(AppError::NotFound)?;

    PropertyImages::delete_by_id(image.id)
        .exec(state.orm.as_ref())
        .await?;

    if let Err(err) = state.media.remove(&image.image).await {
        tracing::warn!(error = %err, key = %image.image, "media file not removed");
    }

    Ok(ApiResponse::deleted())
}

/// Store an uploaded video and make it the property's video.
pub async fn set_video(
    state: &AppState,
    actor: Option<&AuthUser>,
    property_id: i64,
    upload: MediaUpload,
    urls: &MediaUrls,
) -> AppResult<ApiResponse<PropertyRecord>> {
    ensure_can_write(state, actor)?;
    if !upload.is_video() {
        return Err(AppError::Validation("file: expected a video".into()));
    }
    let existing = ensure_property_exists(state.orm.as_ref(), property_id).await?;
    let previous = existing.video.clone();

    let key = state
        .media
        .save(VIDEO_DIR, &upload.file_name, &upload.data)
        .await?;

    let mut active: ActiveModel = existing.into();
    active.video = Set(Some(key.clone()));
    let property = match active.update(state.orm.as_ref()).await {
        Ok(property) => property,
        Err(err) => {
            if let Err(cleanup) = state.media.remove(&key).await {
                tracing::warn!(error = %cleanup, key = %key, "orphaned media file");
            }
            return Err(err.into());
        }
    };

    if let Some(previous) = previous.filter(|p| !p.is_empty() && *p != key) {
        if let Err(err) = state.media.remove(&previous).await {
            tracing::warn!(error = %err, key = %previous, "media file not removed");
        }
    }

    let images = images_of(state.orm.as_ref(), property_id).await?;
    tracing::info!(property_id, "video uploaded");

    Ok(ApiResponse::success(
        "Video uploaded",
        PropertyRecord::from_model(property, images, urls),
        Some(Meta::empty()),
    ))
}

/// Load the images of many properties in one query, grouped by property id.
pub(crate) async fn load_images<C: ConnectionTrait>(
    conn: &C,
    property_ids: &[i64],
) -> AppResult<HashMap<i64, Vec<ImageModel>>> {
    if property_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let images = PropertyImages::find()
        .filter(ImageCol::PropertyId.is_in(property_ids.iter().copied()))
        .order_by_asc(ImageCol::Id)
        .all(conn)
        .await?;

    let mut grouped: HashMap<i64, Vec<ImageModel>> = HashMap::new();
    for image in images {
        grouped.entry(image.property_id).or_default().push(image);
    }
    Ok(grouped)
}

pub(crate) async fn attach_images<C: ConnectionTrait>(
    conn: &C,
    properties: Vec<PropertyModel>,
    urls: &MediaUrls,
) -> AppResult<Vec<PropertyRecord>> {
    let ids: Vec<i64> = properties.iter().map(|p| p.id).collect();
    let mut images = load_images(conn, &ids).await?;

    Ok(properties
        .into_iter()
        .map(|property| {
            let property_images = images.remove(&property.id).unwrap_or_default();
            PropertyRecord::from_model(property, property_images, urls)
        })
        .collect())
}

async fn images_of<C: ConnectionTrait>(conn: &C, property_id: i64) -> AppResult<Vec<ImageModel>> {
    Ok(PropertyImages::find()
        .filter(ImageCol::PropertyId.eq(property_id))
        .order_by_asc(ImageCol::Id)
        .all(conn)
        .await?)
}

async fn ensure_property_exists<C: ConnectionTrait>(
    conn: &C,
    property_id: i64,
) -> AppResult<PropertyModel> {
    Properties::find_by_id(property_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn clear_main_flag<C: ConnectionTrait>(conn: &C, property_id: i64) -> AppResult<()> {
    PropertyImages::update_many()
        .col_expr(ImageCol::IsMain, Expr::value(false))
        .filter(ImageCol::PropertyId.eq(property_id))
        .filter(ImageCol::IsMain.eq(true))
        .exec(conn)
        .await?;
    Ok(())
}

/// Make the property's image set match `inputs`.
///
/// `current` holds the images stored before the call. Entries with an id update
/// the matching image, entries without one are inserted, and current images not
/// referenced by any entry are deleted.
async fn sync_images<C: ConnectionTrait>(
    conn: &C,
    property_id: i64,
    inputs: Vec<PropertyImageInput>,
    current: Vec<ImageModel>,
) -> AppResult<Vec<ImageModel>> {
    let mut current: HashMap<i64, ImageModel> =
        current.into_iter().map(|image| (image.id, image)).collect();

    let referenced: HashSet<i64> = inputs.iter().filter_map(|input| input.id).collect();
    for id in &referenced {
        if !current.contains_key(id) {
            return Err(AppError::Validation(format!(
                "images: image {id} does not belong to property {property_id}"
            )));
        }
    }

    let stale: Vec<i64> = current
        .keys()
        .filter(|id| !referenced.contains(id))
        .copied()
        .collect();
    if !stale.is_empty() {
        PropertyImages::delete_many()
            .filter(ImageCol::Id.is_in(stale))
            .exec(conn)
            .await?;
    }

    let mut saved = Vec::with_capacity(inputs.len());
    for input in inputs {
        let image = match input.id.and_then(|id| current.remove(&id)) {
            Some(existing) => {
                let mut active: ImageActive = existing.into();
                if let Some(path) = input.image {
                    active.image = Set(path);
                }
                active.is_main = Set(input.is_main);
                if active.is_changed() {
                    active.update(conn).await?
                } else {
                    active.try_into_model()?
                }
            }
            None => {
                let path = input.image.ok_or_else(|| {
                    AppError::Validation("images: new images need an `image` path".into())
                })?;
                ImageActive {
                    id: NotSet,
                    property_id: Set(property_id),
                    image: Set(path),
                    is_main: Set(input.is_main),
                }
                .insert(conn)
                .await?
            }
        };
        saved.push(image);
    }

    saved.sort_by_key(|image| image.id);
    Ok(saved)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn active_from_full(payload: CreatePropertyRequest) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        title: Set(payload.title),
        kind: Set(payload.kind),
        location: Set(payload.location),
        price: Set(payload.price),
        bedrooms: Set(payload.bedrooms),
        bathrooms: Set(payload.bathrooms),
        area: Set(payload.area),
        rating: Set(payload.rating),
        furnished: Set(payload.furnished),
        available: Set(payload.available),
        contract_duration: Set(payload.contract_duration),
        custom_contract_duration: Set(blank_to_none(payload.custom_contract_duration)),
        description: Set(blank_to_none(payload.description)),
        wifi: Set(payload.wifi),
        parking: Set(payload.parking),
        security: Set(payload.security),
        pet_friendly: Set(payload.pet_friendly),
        state: Set(payload.state),
        smoking_allowed: Set(payload.smoking_allowed),
        parties_allowed: Set(payload.parties_allowed),
        pets_allowed: Set(payload.pets_allowed),
        date_added: Set(payload
            .date_added
            .unwrap_or_else(|| Utc::now().date_naive())),
        owner_advance_months: Set(payload.owner_advance_months),
        agent_fee_months: Set(payload.agent_fee_months),
        electricity_deposit: Set(blank_to_none(payload.electricity_deposit)),
        water_deposit: Set(blank_to_none(payload.water_deposit)),
        other_charges: Set(blank_to_none(payload.other_charges)),
        video: Set(blank_to_none(payload.video)),
    }
}

// Nullable text fields are cleared by sending an empty string.
fn apply_patch(active: &mut ActiveModel, payload: UpdatePropertyRequest) {
    if let Some(title) = payload.title {
        active.title = Set(title);
    }
    if let Some(kind) = payload.kind {
        active.kind = Set(kind);
    }
    if let Some(location) = payload.location {
        active.location = Set(location);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(bedrooms) = payload.bedrooms {
        active.bedrooms = Set(bedrooms);
    }
    if let Some(bathrooms) = payload.bathrooms {
        active.bathrooms = Set(bathrooms);
    }
    if let Some(area) = payload.area {
        active.area = Set(area);
    }
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    if let Some(furnished) = payload.furnished {
        active.furnished = Set(furnished);
    }
    if let Some(available) = payload.available {
        active.available = Set(available);
    }
    if let Some(duration) = payload.contract_duration {
        active.contract_duration = Set(duration);
    }
    if payload.custom_contract_duration.is_some() {
        active.custom_contract_duration = Set(blank_to_none(payload.custom_contract_duration));
    }
    if payload.description.is_some() {
        active.description = Set(blank_to_none(payload.description));
    }
    if let Some(wifi) = payload.wifi {
        active.wifi = Set(wifi);
    }
    if let Some(parking) = payload.parking {
        active.parking = Set(parking);
    }
    if let Some(security) = payload.security {
        active.security = Set(security);
    }
    if let Some(pet_friendly) = payload.pet_friendly {
        active.pet_friendly = Set(pet_friendly);
    }
    if let Some(property_state) = payload.state {
        active.state = Set(property_state);
    }
    if let Some(smoking_allowed) = payload.smoking_allowed {
        active.smoking_allowed = Set(smoking_allowed);
    }
    if let Some(parties_allowed) = payload.parties_allowed {
        active.parties_allowed = Set(parties_allowed);
    }
    if let Some(pets_allowed) = payload.pets_allowed {
        active.pets_allowed = Set(pets_allowed);
    }
    if let Some(date_added) = payload.date_added {
        active.date_added = Set(date_added);
    }
    if let Some(months) = payload.owner_advance_months {
        active.owner_advance_months = Set(months);
    }
    if let Some(months) = payload.agent_fee_months {
        active.agent_fee_months = Set(months);
    }
    if payload.electricity_deposit.is_some() {
        active.electricity_deposit = Set(blank_to_none(payload.electricity_deposit));
    }
    if payload.water_deposit.is_some() {
        active.water_deposit = Set(blank_to_none(payload.water_deposit));
    }
    if payload.other_charges.is_some() {
        active.other_charges = Set(blank_to_none(payload.other_charges));
    }
    if payload.video.is_some() {
        active.video = Set(blank_to_none(payload.video));
    }
}
