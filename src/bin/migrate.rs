use sea_orm_migration::MigratorTrait;

use property_listings_api::{config::AppConfig, db::create_orm_conn, migration::Migrator};

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

    let command = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    match command.as_str() {
        "up" => Migrator::up(&orm, None).await?,
        "down" => Migrator::down(&orm, Some(1)).await?,
        "status" => Migrator::status(&orm).await?,
        "fresh" => Migrator::fresh(&orm).await?,
        other => anyhow::bail!("unknown command `{other}`; expected up, down, status or fresh"),
    }

    tracing::info!(command = %command, "migrations done");
    Ok(())
}
