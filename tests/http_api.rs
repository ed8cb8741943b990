use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use property_listings_api::{
    app::build_app,
    config::AppConfig,
    entity::{
        enums::{ContractDuration, PropertyKind, PropertyState},
        favorites, properties, property_images,
    },
    middleware::auth::{ROLE_ADMIN, ROLE_USER},
    services::auth_service::issue_token,
    state::AppState,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn config(writes_require_admin: bool) -> AppConfig {
    AppConfig {
        database_url: "postgres://localhost/unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "http-test-secret".into(),
        jwt_ttl_hours: 1,
        media_root: std::env::temp_dir().join("property-listings-http-test"),
        media_url: "/media/".into(),
        cors_allowed_origins: vec!["http://localhost:5173".into()],
        max_upload_bytes: 1024 * 1024,
        property_writes_require_admin: writes_require_admin,
        trust_proxy_headers: false,
    }
}

fn bearer(config: &AppConfig, role: &str) -> String {
    let (token, _) = issue_token(config, Uuid::new_v4(), role).unwrap();
    format!("Bearer {token}")
}

fn property(id: i64) -> properties::Model {
    properties::Model {
        id,
        title: "Villa Odza".into(),
        kind: PropertyKind::House,
        location: "Yaoundé".into(),
        price: 500_000,
        bedrooms: 3,
        bathrooms: 2,
        area: 180,
        rating: 4.0,
        furnished: false,
        available: "immédiate".into(),
        contract_duration: ContractDuration::ThreeYears,
        custom_contract_duration: None,
        description: None,
        wifi: false,
        parking: true,
        security: true,
        pet_friendly: true,
        state: PropertyState::Good,
        smoking_allowed: false,
        parties_allowed: false,
        pets_allowed: true,
        date_added: chrono::NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
        owner_advance_months: 3,
        agent_fee_months: 1,
        electricity_deposit: None,
        water_deposit: None,
        other_charges: None,
        video: None,
    }
}

async fn send(
    orm: DatabaseConnection,
    config: AppConfig,
    request: Request<Body>,
) -> (StatusCode, Value) {
    let app = build_app(AppState::new(orm, config));
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

#[tokio::test]
async fn health_is_served_outside_api_prefix() {
    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(empty_db(), config(false), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn unknown_route_returns_envelope() {
    let request = Request::get("/api/nowhere").body(Body::empty()).unwrap();
    let (status, body) = send(empty_db(), config(false), request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/api/nowhere");
}

#[tokio::test]
async fn favorites_require_authentication() {
    let request = Request::get("/api/favorites").body(Body::empty()).unwrap();
    let (status, body) = send(empty_db(), config(false), request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["data"]["error"].as_str().unwrap().contains("Authorization"));
}

#[tokio::test]
async fn toggle_adds_favorite_with_created_status() {
    let config = config(false);
    let auth = bearer(&config, ROLE_USER);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[property(7)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let request = Request::post("/api/favorites/toggle/")
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "property_id": 7 }).to_string()))
        .unwrap();
    let (status, body) = send(db, config, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Ajouté aux favoris");
    assert_eq!(body["data"]["status"], "added");
    assert_eq!(body["data"]["is_favorite"], true);
}

#[tokio::test]
async fn toggle_with_malformed_body_is_bad_request() {
    let config = config(false);
    let auth = bearer(&config, ROLE_USER);

    let request = Request::post("/api/favorites/toggle")
        .header(header::AUTHORIZATION, auth)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"property_id":"seven"}"#))
        .unwrap();
    let (status, _) = send(empty_db(), config, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn check_favorite_for_unfavorited_property() {
    let config = config(false);
    let auth = bearer(&config, ROLE_USER);
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<favorites::Model>::new()])
        .into_connection();

    let request = Request::get("/api/favorites/check/12345")
        .header(header::AUTHORIZATION, auth)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(db, config, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "is_favorite": false }));
}

#[tokio::test]
async fn property_detail_accepts_trailing_slash() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[property(7)]])
        .append_query_results([[property_images::Model {
            id: 3,
            property_id: 7,
            image: "properties/images/facade.jpg".into(),
            is_main: true,
        }]])
        .into_connection();

    let request = Request::get("/api/properties/7/")
        .header(header::HOST, "listings.test")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(db, config(false), request).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["type"], "maison");
    assert_eq!(data["type_display"], "Maison");
    assert_eq!(data["contract_duration_display"], "3 ans");
    assert_eq!(
        data["images"][0]["image_url"],
        "http://listings.test/media/properties/images/facade.jpg"
    );
}

#[tokio::test]
async fn invalid_property_payload_is_rejected() {
    let request = Request::post("/api/properties")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "title": "Studio", "type": "studio", "price": -5 }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(empty_db(), config(false), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["data"]["error"].as_str().unwrap().contains("price"));
}

#[tokio::test]
async fn unknown_property_type_is_rejected() {
    let request = Request::post("/api/properties")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "title": "Loft", "type": "loft" }).to_string(),
        ))
        .unwrap();
    let (status, _) = send(empty_db(), config(false), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_only_writes_are_enforced() {
    let config = config(true);
    let payload = json!({ "title": "Studio", "type": "studio" }).to_string();

    let anonymous = Request::post("/api/properties")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.clone()))
        .unwrap();
    let (status, _) = send(empty_db(), config.clone(), anonymous).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let member = Request::post("/api/properties")
        .header(header::AUTHORIZATION, bearer(&config, ROLE_USER))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload))
        .unwrap();
    let (status, _) = send(empty_db(), config.clone(), member).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_delete = Request::delete("/api/properties/7")
        .header(header::AUTHORIZATION, bearer(&config, ROLE_ADMIN))
        .body(Body::empty())
        .unwrap();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();
    let (status, body) = send(db, config, admin_delete).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deleted");
}
