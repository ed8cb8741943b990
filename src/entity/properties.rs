use sea_orm::entity::prelude::*;

use super::enums::{ContractDuration, PropertyKind, PropertyState};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_name = "type")]
    pub kind: PropertyKind,
    pub location: String,
    pub price: i64,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub area: i32,
    #[sea_orm(column_type = "Double")]
    pub rating: f64,
    pub furnished: bool,
    pub available: String,
    pub contract_duration: ContractDuration,
    pub custom_contract_duration: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub wifi: bool,
    pub parking: bool,
    pub security: bool,
    pub pet_friendly: bool,
    pub state: PropertyState,
    pub smoking_allowed: bool,
    pub parties_allowed: bool,
    pub pets_allowed: bool,
    pub date_added: Date,
    pub owner_advance_months: i32,
    pub agent_fee_months: i32,
    pub electricity_deposit: Option<String>,
    pub water_deposit: Option<String>,
    pub other_charges: Option<String>,
    pub video: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::property_images::Entity")]
    Images,
    #[sea_orm(has_many = "super::favorites::Entity")]
    Favorites,
}

impl Related<super::property_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::favorites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Favorites.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Label shown to users: the custom text wins for "other" durations.
    pub fn contract_duration_display(&self) -> String {
        match (&self.contract_duration, self.custom_contract_duration.as_deref()) {
            (ContractDuration::Other, Some(custom)) if !custom.trim().is_empty() => {
                custom.to_string()
            }
            (duration, _) => duration.label().to_string(),
        }
    }
}
