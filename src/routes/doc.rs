use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        favorites::{
            CheckFavoriteResponse, FavoriteList, FavoriteStatus, ToggleFavoriteRequest,
            ToggleFavoriteResponse,
        },
        properties::{
            CreatePropertyRequest, ImageUploadForm, PropertyImageInput, PropertyList,
            UpdatePropertyRequest, VideoUploadForm,
        },
    },
    entity::enums::{ContractDuration, PropertyKind, PropertyState},
    models::{FavoriteRecord, PropertyImageRecord, PropertyRecord, User},
    response::{ApiResponse, Meta},
    routes::{auth, favorites, health, params, properties},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness,
        auth::login,
        auth::register,
        properties::list_properties,
        properties::get_property,
        properties::create_property,
        properties::replace_property,
        properties::update_property,
        properties::delete_property,
        properties::upload_image,
        properties::delete_image,
        properties::upload_video,
        favorites::toggle_favorite,
        favorites::list_favorites,
        favorites::check_favorite
    ),
    components(
        schemas(
            User,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            PropertyKind,
            PropertyState,
            ContractDuration,
            PropertyRecord,
            PropertyImageRecord,
            PropertyImageInput,
            CreatePropertyRequest,
            UpdatePropertyRequest,
            ImageUploadForm,
            VideoUploadForm,
            PropertyList,
            FavoriteRecord,
            FavoriteList,
            FavoriteStatus,
            ToggleFavoriteRequest,
            ToggleFavoriteResponse,
            CheckFavoriteResponse,
            params::Pagination,
            Meta,
            ApiResponse<PropertyRecord>,
            ApiResponse<PropertyList>,
            ApiResponse<FavoriteList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Properties", description = "Property listings, images and videos"),
        (name = "Favorites", description = "Per-user favorite properties"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_listing_routes() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/properties"));
        assert!(paths.contains_key("/api/properties/{id}/images"));
        assert!(paths.contains_key("/api/favorites/toggle"));
        assert!(paths.contains_key("/api/favorites/check/{property_id}"));
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
