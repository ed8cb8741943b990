use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    ActiveValue::{NotSet, Set},
};
use uuid::Uuid;

use property_listings_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        enums::{ContractDuration, PropertyKind, PropertyState},
        properties, property_images, users,
    },
    middleware::auth::{ROLE_ADMIN, ROLE_USER},
    services::auth_service::hash_password,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "admin", "admin12345", ROLE_ADMIN).await?;
    let user_id = ensure_user(&orm, "visiteur", "visiteur123", ROLE_USER).await?;
    let created = seed_properties(&orm).await?;

    tracing::info!(%admin_id, %user_id, properties = created, "seed completed");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    username: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(orm)
        .await?
    {
        if existing.role != role {
            let mut active: users::ActiveModel = existing.clone().into();
            active.role = Set(role.to_string());
            active.update(orm).await?;
        }
        return Ok(existing.id);
    }

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(None),
        password_hash: Set(hash_password(password)?),
        role: Set(role.to_string()),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;
    Ok(user.id)
}

struct SampleProperty {
    title: &'static str,
    kind: PropertyKind,
    location: &'static str,
    price: i64,
    bedrooms: i32,
    area: i32,
    furnished: bool,
    state: PropertyState,
    contract_duration: ContractDuration,
    images: &'static [&'static str],
}

const SAMPLES: &[SampleProperty] = &[
    SampleProperty {
        title: "Studio moderne à Bastos",
        kind: PropertyKind::Studio,
        location: "Yaoundé",
        price: 120_000,
        bedrooms: 1,
        area: 35,
        furnished: true,
        state: PropertyState::New,
        contract_duration: ContractDuration::OneYear,
        images: &["properties/images/sample-studio-1.jpg"],
    },
    SampleProperty {
        title: "Appartement 3 pièces Bonapriso",
        kind: PropertyKind::Apartment,
        location: "Douala",
        price: 350_000,
        bedrooms: 2,
        area: 90,
        furnished: false,
        state: PropertyState::Excellent,
        contract_duration: ContractDuration::TwoYears,
        images: &[
            "properties/images/sample-appartement-1.jpg",
            "properties/images/sample-appartement-2.jpg",
        ],
    },
    SampleProperty {
        title: "Maison familiale avec jardin",
        kind: PropertyKind::House,
        location: "Kribi",
        price: 600_000,
        bedrooms: 4,
        area: 220,
        furnished: false,
        state: PropertyState::Good,
        contract_duration: ContractDuration::Indefinite,
        images: &[],
    },
];

async fn seed_properties(orm: &DatabaseConnection) -> anyhow::Result<usize> {
    if properties::Entity::find().count(orm).await? > 0 {
        return Ok(0);
    }

    for sample in SAMPLES {
        let property = properties::ActiveModel {
            id: NotSet,
            title: Set(sample.title.to_string()),
            kind: Set(sample.kind),
            location: Set(sample.location.to_string()),
            price: Set(sample.price),
            bedrooms: Set(sample.bedrooms),
            bathrooms: Set(1),
            area: Set(sample.area),
            rating: Set(4.0),
            furnished: Set(sample.furnished),
            available: Set("immédiate".to_string()),
            contract_duration: Set(sample.contract_duration),
            custom_contract_duration: Set(None),
            description: Set(None),
            wifi: Set(true),
            parking: Set(sample.kind == PropertyKind::House),
            security: Set(true),
            pet_friendly: Set(false),
            state: Set(sample.state),
            smoking_allowed: Set(false),
            parties_allowed: Set(false),
            pets_allowed: Set(false),
            date_added: Set(Utc::now().date_naive()),
            owner_advance_months: Set(3),
            agent_fee_months: Set(1),
            electricity_deposit: Set(None),
            water_deposit: Set(None),
            other_charges: Set(None),
            video: Set(None),
        }
        .insert(orm)
        .await?;

        for (index, path) in sample.images.iter().enumerate() {
            property_images::ActiveModel {
                id: NotSet,
                property_id: Set(property.id),
                image: Set(path.to_string()),
                is_main: Set(index == 0),
            }
            .insert(orm)
            .await?;
        }
    }

    Ok(SAMPLES.len())
}
