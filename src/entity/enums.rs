//! Choice columns of the `properties` table.
//!
//! Stored and serialized with the same short codes the listing frontend uses.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum PropertyKind {
    #[sea_orm(string_value = "studio")]
    #[serde(rename = "studio")]
    Studio,
    #[sea_orm(string_value = "appartement")]
    #[serde(rename = "appartement")]
    Apartment,
    #[sea_orm(string_value = "maison")]
    #[serde(rename = "maison")]
    House,
}

impl PropertyKind {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyKind::Studio => "Studio",
            PropertyKind::Apartment => "Appartement",
            PropertyKind::House => "Maison",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum PropertyState {
    #[sea_orm(string_value = "neuf")]
    #[serde(rename = "neuf")]
    New,
    #[sea_orm(string_value = "excellent")]
    #[serde(rename = "excellent")]
    Excellent,
    #[default]
    #[sea_orm(string_value = "bon")]
    #[serde(rename = "bon")]
    Good,
    #[sea_orm(string_value = "moyen")]
    #[serde(rename = "moyen")]
    Average,
}

impl PropertyState {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyState::New => "Neuf",
            PropertyState::Excellent => "Excellent",
            PropertyState::Good => "Bon",
            PropertyState::Average => "Moyen",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum ContractDuration {
    #[default]
    #[sea_orm(string_value = "1")]
    #[serde(rename = "1")]
    OneYear,
    #[sea_orm(string_value = "2")]
    #[serde(rename = "2")]
    TwoYears,
    #[sea_orm(string_value = "3")]
    #[serde(rename = "3")]
    ThreeYears,
    #[sea_orm(string_value = "indetermine")]
    #[serde(rename = "indetermine")]
    Indefinite,
    #[sea_orm(string_value = "autre")]
    #[serde(rename = "autre")]
    Other,
}

impl ContractDuration {
    pub fn label(&self) -> &'static str {
        match self {
            ContractDuration::OneYear => "1 an",
            ContractDuration::TwoYears => "2 ans",
            ContractDuration::ThreeYears => "3 ans",
            ContractDuration::Indefinite => "Durée indéterminée",
            ContractDuration::Other => "Autre durée",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_codes_match_stored_values() {
        assert_eq!(
            serde_json::to_value(PropertyKind::Apartment).unwrap(),
            serde_json::json!("appartement")
        );
        assert_eq!(PropertyKind::Apartment.to_value(), "appartement");
        assert_eq!(
            serde_json::from_value::<ContractDuration>(serde_json::json!("autre")).unwrap(),
            ContractDuration::Other
        );
        assert_eq!(ContractDuration::Indefinite.to_value(), "indetermine");
        assert_eq!(PropertyState::New.to_value(), "neuf");
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert!(serde_json::from_value::<PropertyKind>(serde_json::json!("castle")).is_err());
        assert!(serde_json::from_value::<PropertyState>(serde_json::json!("ruined")).is_err());
    }

    #[test]
    fn defaults_follow_listing_defaults() {
        assert_eq!(PropertyState::default(), PropertyState::Good);
        assert_eq!(ContractDuration::default(), ContractDuration::OneYear);
        assert_eq!(ContractDuration::default().label(), "1 an");
    }
}
