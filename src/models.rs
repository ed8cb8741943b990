//! Transfer records returned over the API boundary.
//!
//! Every field is listed explicitly; adding a column to an entity does not
//! expose it until it is added here as well.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    entity::{
        enums::{ContractDuration, PropertyKind, PropertyState},
        favorites, properties, property_images, users,
    },
    media::MediaUrls,
};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PropertyImageRecord {
    pub id: i64,
    /// Stored path, relative to the media root.
    pub image: String,
    pub image_url: String,
    pub is_main: bool,
}

impl PropertyImageRecord {
    pub fn from_model(model: property_images::Model, urls: &MediaUrls) -> Self {
        Self {
            image_url: urls.resolve(&model.image),
            id: model.id,
            image: model.image,
            is_main: model.is_main,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PropertyRecord {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub type_display: String,
    pub location: String,
    pub price: i64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: i32,
    pub rating: f64,
    pub furnished: bool,
    pub available: String,
    pub contract_duration: ContractDuration,
    pub custom_contract_duration: Option<String>,
    pub contract_duration_display: String,
    pub description: Option<String>,
    pub wifi: bool,
    pub parking: bool,
    pub security: bool,
    pub pet_friendly: bool,
    pub state: PropertyState,
    pub state_display: String,
    pub smoking_allowed: bool,
    pub parties_allowed: bool,
    pub pets_allowed: bool,
    pub date_added: NaiveDate,
    pub owner_advance_months: i32,
    pub agent_fee_months: i32,
    pub electricity_deposit: Option<String>,
    pub water_deposit: Option<String>,
    pub other_charges: Option<String>,
    /// Absolute URL of the video, `null` when none is attached.
    pub video: Option<String>,
    pub images: Vec<PropertyImageRecord>,
}

impl PropertyRecord {
    pub fn from_model(
        model: properties::Model,
        images: Vec<property_images::Model>,
        urls: &MediaUrls,
    ) -> Self {
        let contract_duration_display = model.contract_duration_display();
        let video = model
            .video
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| urls.resolve(path));

        Self {
            id: model.id,
            title: model.title,
            type_display: model.kind.label().to_string(),
            kind: model.kind,
            location: model.location,
            price: model.price,
            bedrooms: model.bedrooms,
            bathrooms: model.bathrooms,
            area: model.area,
            rating: model.rating,
            furnished: model.furnished,
            available: model.available,
            contract_duration: model.contract_duration,
            custom_contract_duration: model.custom_contract_duration,
            contract_duration_display,
            description: model.description,
            wifi: model.wifi,
            parking: model.parking,
            security: model.security,
            pet_friendly: model.pet_friendly,
            state_display: model.state.label().to_string(),
            state: model.state,
            smoking_allowed: model.smoking_allowed,
            parties_allowed: model.parties_allowed,
            pets_allowed: model.pets_allowed,
            date_added: model.date_added,
            owner_advance_months: model.owner_advance_months,
            agent_fee_months: model.agent_fee_months,
            electricity_deposit: model.electricity_deposit,
            water_deposit: model.water_deposit,
            other_charges: model.other_charges,
            video,
            images: images
                .into_iter()
                .map(|image| PropertyImageRecord::from_model(image, urls))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FavoriteRecord {
    pub id: i64,
    pub property: PropertyRecord,
}

impl FavoriteRecord {
    pub fn from_parts(favorite: favorites::Model, property: PropertyRecord) -> Self {
        Self {
            id: favorite.id,
            property,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::NaiveDate;

    use crate::entity::{
        enums::{ContractDuration, PropertyKind, PropertyState},
        properties, property_images,
    };

    pub fn property(id: i64) -> properties::Model {
        properties::Model {
            id,
            title: "Appartement meublé Bastos".into(),
            kind: PropertyKind::Apartment,
            location: "Yaoundé".into(),
            price: 250_000,
            bedrooms: 2,
            bathrooms: 1,
            area: 80,
            rating: 4.5,
            furnished: true,
            available: "immédiate".into(),
            contract_duration: ContractDuration::OneYear,
            custom_contract_duration: None,
            description: Some("Proche du centre".into()),
            wifi: true,
            parking: false,
            security: true,
            pet_friendly: false,
            state: PropertyState::Excellent,
            smoking_allowed: false,
            parties_allowed: false,
            pets_allowed: false,
            date_added: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            owner_advance_months: 3,
            agent_fee_months: 1,
            electricity_deposit: Some("25 000 FCFA".into()),
            water_deposit: None,
            other_charges: None,
            video: None,
        }
    }

    pub fn image(id: i64, property_id: i64, is_main: bool) -> property_images::Model {
        property_images::Model {
            id,
            property_id,
            image: format!("properties/images/{id}.jpg"),
            is_main,
        }
    }
}
