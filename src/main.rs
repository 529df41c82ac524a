use category_catalog::{AppConfig, CategoryStore, build_router, migration::Migrator};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("category_catalog=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    let config = AppConfig::from_env()?;

    let db = Database::connect(&config.database_url).await?;
    Migrator::up(&db, None).await?;
    tracing::info!(database = %config.database_url, "Migrations applied");

    let store = CategoryStore::new(db).with_removal_policy(config.removal_policy);
    let app = build_router(store, &config)?.layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        removal_policy = %config.removal_policy,
        "Category catalog listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
