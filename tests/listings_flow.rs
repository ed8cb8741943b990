use property_listings_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        favorites::{FavoriteStatus, ToggleFavoriteRequest},
        properties::{CreatePropertyRequest, PropertyQuery, UpdatePropertyRequest},
    },
    entity::{
        Favorites, PropertyImages,
        enums::PropertyKind,
        favorites::ActiveModel as FavoriteActive,
        users::ActiveModel as UserActive,
    },
    error::AppError,
    media::MediaUrls,
    middleware::auth::AuthUser,
    services::{
        favorite_service,
        property_service::{self, MediaUpload},
    },
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, EntityTrait, PaginatorTrait, Set, SqlErr, Statement,
};
use serde_json::json;
use uuid::Uuid;

// Create -> read -> favorite -> unfavorite -> delete, against a real Postgres.
#[tokio::test]
async fn property_and_favorite_lifecycle() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let media_dir = tempfile::tempdir()?;
    let state = setup_state(&database_url, media_dir.path()).await?;
    let urls = MediaUrls::relative("/media/");
    let user = create_user(&state, "amina").await?;

    // Create with nested images, then read it back unchanged.
    let payload: CreatePropertyRequest = serde_json::from_value(json!({
        "title": "Appartement Bonamoussadi",
        "type": "appartement",
        "location": "Douala",
        "price": 275000,
        "bedrooms": 2,
        "contract_duration": "autre",
        "custom_contract_duration": "18 mois",
        "images": [
            { "image": "properties/images/salon.jpg", "is_main": true },
            { "image": "properties/images/cuisine.jpg" }
        ]
    }))?;
    let created = property_service::create_property(&state, None, payload, &urls)
        .await?
        .data
        .unwrap();
    assert_eq!(created.contract_duration_display, "18 mois");
    assert_eq!(created.images.len(), 2);

    let fetched = property_service::get_property(&state, created.id, &urls)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched, created);

    // Filtering by type and price.
    let listed = property_service::list_properties(
        &state,
        PropertyQuery {
            kind: Some(PropertyKind::Apartment),
            min_price: Some(200_000),
            ..Default::default()
        },
        &urls,
    )
    .await?;
    assert_eq!(listed.meta.unwrap().total, Some(1));
    let none = property_service::list_properties(
        &state,
        PropertyQuery {
            max_price: Some(1000),
            ..Default::default()
        },
        &urls,
    )
    .await?;
    assert!(none.data.unwrap().items.is_empty());

    // Listing is newest first; same-day listings fall back to the higher id.
    let older: CreatePropertyRequest = serde_json::from_value(json!({
        "title": "Studio Akwa",
        "type": "studio",
        "location": "Douala",
        "price": 90000,
        "date_added": "2020-01-15"
    }))?;
    let older = property_service::create_property(&state, None, older, &urls)
        .await?
        .data
        .unwrap();
    let same_day: CreatePropertyRequest = serde_json::from_value(json!({
        "title": "Maison Bastos",
        "type": "maison",
        "location": "Yaoundé",
        "price": 40000,
        "date_added": created.date_added
    }))?;
    let same_day = property_service::create_property(&state, None, same_day, &urls)
        .await?
        .data
        .unwrap();
    let ordered: Vec<i64> = property_service::list_properties(&state, PropertyQuery::default(), &urls)
        .await?
        .data
        .unwrap()
        .items
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ordered, vec![same_day.id, created.id, older.id]);
    property_service::delete_property(&state, None, older.id).await?;
    property_service::delete_property(&state, None, same_day.id).await?;

    // Replacing the image set keeps referenced images and drops the rest.
    let kept = created.images[1].id;
    let patched = property_service::update_property(
        &state,
        None,
        created.id,
        UpdatePropertyRequest {
            price: Some(260_000),
            images: Some(serde_json::from_value(json!([
                { "id": kept, "is_main": true },
                { "image": "properties/images/chambre.jpg" }
            ]))?),
            ..Default::default()
        },
        &urls,
    )
    .await?
    .data
    .unwrap();
    assert_eq!(patched.price, 260_000);
    assert_eq!(patched.images.len(), 2);
    assert_eq!(patched.images[0].id, kept);
    assert!(patched.images[0].is_main);

    // Uploading a new main image clears the previous main flag.
    let uploaded = property_service::add_image(
        &state,
        None,
        created.id,
        MediaUpload {
            file_name: "terrasse.png".into(),
            content_type: Some("image/png".into()),
            data: vec![0x89, b'P', b'N', b'G'],
        },
        true,
        &urls,
    )
    .await?
    .data
    .unwrap();
    assert!(state.media.root().join(&uploaded.image).exists());
    let after_upload = property_service::get_property(&state, created.id, &urls)
        .await?
        .data
        .unwrap();
    let mains: Vec<i64> = after_upload
        .images
        .iter()
        .filter(|image| image.is_main)
        .map(|image| image.id)
        .collect();
    assert_eq!(mains, vec![uploaded.id]);

    // Toggle twice returns to the starting state.
    let toggle = || ToggleFavoriteRequest {
        property_id: created.id,
    };
    let first = favorite_service::toggle_favorite(&state, &user, toggle()).await?;
    assert_eq!(first.data.unwrap().status, FavoriteStatus::Added);
    assert!(
        favorite_service::check_favorite(&state, &user, created.id)
            .await?
            .data
            .unwrap()
            .is_favorite
    );
    let favorites = favorite_service::list_favorites(&state, &user, &urls).await?;
    assert_eq!(favorites.data.unwrap().items[0].property.id, created.id);

    let second = favorite_service::toggle_favorite(&state, &user, toggle()).await?;
    assert_eq!(second.data.unwrap().status, FavoriteStatus::Removed);
    assert!(
        !favorite_service::check_favorite(&state, &user, created.id)
            .await?
            .data
            .unwrap()
            .is_favorite
    );

    // The (user, property) pair is unique at the storage level.
    let direct = || FavoriteActive {
        id: NotSet,
        user_id: Set(user.user_id),
        property_id: Set(created.id),
        created_at: NotSet,
    };
    direct().insert(state.orm.as_ref()).await?;
    let duplicate = direct().insert(state.orm.as_ref()).await.unwrap_err();
    assert!(matches!(
        duplicate.sql_err(),
        Some(SqlErr::UniqueConstraintViolation(_))
    ));

    // Deleting the property removes its images and favorites.
    property_service::delete_property(&state, None, created.id).await?;
    assert_eq!(Favorites::find().count(state.orm.as_ref()).await?, 0);
    assert_eq!(PropertyImages::find().count(state.orm.as_ref()).await?, 0);
    let missing = property_service::get_property(&state, created.id, &urls).await;
    assert!(matches!(missing, Err(AppError::NotFound)));

    let toggle_missing = favorite_service::toggle_favorite(&state, &user, toggle()).await;
    assert!(matches!(toggle_missing, Err(AppError::NotFound)));

    // A property gone between the existence check and the insert trips the foreign key.
    let raced =
        favorite_service::insert_favorite(state.orm.as_ref(), user.user_id, created.id).await;
    assert!(matches!(raced, Err(AppError::NotFound)));

    Ok(())
}

async fn setup_state(database_url: &str, media_root: &std::path::Path) -> anyhow::Result<AppState> {
    let orm = create_orm_conn(database_url).await?;
    run_migrations(&orm).await?;

    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE favorites, property_images, properties, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "flow-test-secret".into(),
        jwt_ttl_hours: 1,
        media_root: media_root.to_path_buf(),
        media_url: "/media/".into(),
        cors_allowed_origins: Vec::new(),
        max_upload_bytes: 1024 * 1024,
        property_writes_require_admin: false,
        trust_proxy_headers: false,
    };
    Ok(AppState::new(orm, config))
}

async fn create_user(state: &AppState, username: &str) -> anyhow::Result<AuthUser> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(None),
        password_hash: Set("dummy".into()),
        role: Set("user".into()),
        created_at: NotSet,
    }
    .insert(state.orm.as_ref())
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}
