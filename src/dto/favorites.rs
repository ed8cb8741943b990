use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::FavoriteRecord;

pub const ADDED_MESSAGE: &str = "Ajouté aux favoris";
pub const REMOVED_MESSAGE: &str = "Retiré des favoris";

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct ToggleFavoriteRequest {
    #[validate(range(min = 1))]
    pub property_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteStatus {
    Added,
    Removed,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleFavoriteResponse {
    pub property_id: i64,
    pub status: FavoriteStatus,
    pub is_favorite: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckFavoriteResponse {
    pub is_favorite: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FavoriteList {
    #[schema(value_type = Vec<FavoriteRecord>)]
    pub items: Vec<FavoriteRecord>,
}
