use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::{
    entity::enums::{ContractDuration, PropertyKind, PropertyState},
    media::is_media_path,
    models::PropertyRecord,
    routes::params::Pagination,
};

fn default_location() -> String {
    "Inconnue".to_string()
}

fn default_available() -> String {
    "immédiate".to_string()
}

fn default_one() -> i32 {
    1
}

fn default_area() -> i32 {
    50
}

fn default_owner_advance_months() -> i32 {
    3
}

/// Nested image entry of a property payload.
///
/// Entries with an `id` refer to an existing image of the property; entries
/// without one create a new image and must carry `image`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PropertyImageInput {
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 255), custom(function = "validate_media_path"))]
    pub image: Option<String>,
    #[serde(default)]
    pub is_main: bool,
}

// Empty is allowed so that `video: ""` can clear the field.
fn validate_media_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() || is_media_path(path) {
        return Ok(());
    }
    let mut err = ValidationError::new("media_path");
    err.message = Some("must be a relative path inside the media root".into());
    Err(err)
}

fn validate_single_main(images: &[PropertyImageInput]) -> Result<(), ValidationError> {
    if images.iter().filter(|image| image.is_main).count() > 1 {
        let mut err = ValidationError::new("single_main_image");
        err.message = Some("at most one image may be marked as main".into());
        return Err(err);
    }
    Ok(())
}

/// Full property payload, used by create (POST) and replace (PUT).
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default = "default_location")]
    #[validate(length(max = 200))]
    pub location: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub price: i64,
    #[serde(default = "default_one")]
    #[validate(range(min = 0))]
    pub bedrooms: i32,
    #[serde(default = "default_one")]
    #[validate(range(min = 0))]
    pub bathrooms: i32,
    #[serde(default = "default_area")]
    #[validate(range(min = 0))]
    pub area: i32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub furnished: bool,
    #[serde(default = "default_available")]
    #[validate(length(max = 50))]
    pub available: String,
    #[serde(default)]
    pub contract_duration: ContractDuration,
    #[validate(length(max = 100))]
    pub custom_contract_duration: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub wifi: bool,
    #[serde(default)]
    pub parking: bool,
    #[serde(default)]
    pub security: bool,
    #[serde(default)]
    pub pet_friendly: bool,
    #[serde(default)]
    pub state: PropertyState,
    #[serde(default)]
    pub smoking_allowed: bool,
    #[serde(default)]
    pub parties_allowed: bool,
    #[serde(default)]
    pub pets_allowed: bool,
    /// Defaults to today.
    pub date_added: Option<NaiveDate>,
    #[serde(default = "default_owner_advance_months")]
    #[validate(range(min = 0))]
    pub owner_advance_months: i32,
    #[serde(default = "default_one")]
    #[validate(range(min = 0))]
    pub agent_fee_months: i32,
    #[validate(length(max = 200))]
    pub electricity_deposit: Option<String>,
    #[validate(length(max = 100))]
    pub water_deposit: Option<String>,
    #[validate(length(max = 100))]
    pub other_charges: Option<String>,
    /// Path of an already stored video, relative to the media root.
    #[validate(length(max = 255), custom(function = "validate_media_path"))]
    pub video: Option<String>,
    #[validate(nested, custom(function = "validate_single_main"))]
    pub images: Option<Vec<PropertyImageInput>>,
}

/// Partial property payload (PATCH). Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePropertyRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PropertyKind>,
    #[validate(length(max = 200))]
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    #[validate(range(min = 0))]
    pub bedrooms: Option<i32>,
    #[validate(range(min = 0))]
    pub bathrooms: Option<i32>,
    #[validate(range(min = 0))]
    pub area: Option<i32>,
    pub rating: Option<f64>,
    pub furnished: Option<bool>,
    #[validate(length(max = 50))]
    pub available: Option<String>,
    pub contract_duration: Option<ContractDuration>,
    #[validate(length(max = 100))]
    pub custom_contract_duration: Option<String>,
    pub description: Option<String>,
    pub wifi: Option<bool>,
    pub parking: Option<bool>,
    pub security: Option<bool>,
    pub pet_friendly: Option<bool>,
    pub state: Option<PropertyState>,
    pub smoking_allowed: Option<bool>,
    pub parties_allowed: Option<bool>,
    pub pets_allowed: Option<bool>,
    pub date_added: Option<NaiveDate>,
    #[validate(range(min = 0))]
    pub owner_advance_months: Option<i32>,
    #[validate(range(min = 0))]
    pub agent_fee_months: Option<i32>,
    #[validate(length(max = 200))]
    pub electricity_deposit: Option<String>,
    #[validate(length(max = 100))]
    pub water_deposit: Option<String>,
    #[validate(length(max = 100))]
    pub other_charges: Option<String>,
    #[validate(length(max = 255), custom(function = "validate_media_path"))]
    pub video: Option<String>,
    #[validate(nested, custom(function = "validate_single_main"))]
    pub images: Option<Vec<PropertyImageInput>>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PropertyQuery {
    /// Page number; omit both `page` and `per_page` to get every listing.
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    /// Case-insensitive search on title, location and description.
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PropertyKind>,
    pub location: Option<String>,
    pub furnished: Option<bool>,
    pub available: Option<String>,
    pub state: Option<PropertyState>,
    pub contract_duration: Option<ContractDuration>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

impl PropertyQuery {
    pub fn pagination(&self) -> Option<Pagination> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        Some(Pagination {
            page: self.page,
            per_page: self.per_page,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PropertyList {
    #[schema(value_type = Vec<PropertyRecord>)]
    pub items: Vec<PropertyRecord>,
}

/// Multipart form accepted by the image upload route.
#[derive(Debug, ToSchema)]
pub struct ImageUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub is_main: Option<bool>,
}

/// Multipart form accepted by the video upload route.
#[derive(Debug, ToSchema)]
pub struct VideoUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
