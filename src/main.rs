use house_access::{
    build_router,
    house::repository::{InMemoryHouseRepository, PostgresHouseRepository},
    user::repository::{InMemoryUserRepository, PostgresUserRepository},
    AppState, Config, HouseRepository, TokenConfig, UserRepository,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Repositories = (
    Arc<dyn UserRepository + Send + Sync>,
    Arc<dyn HouseRepository + Send + Sync>,
);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "house_access=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting house access server");

    let config = Config::from_env()?;
    info!(?config, "Configuration loaded");

    let (user_repository, house_repository) = open_repositories(&config).await?;

    let app_state = AppState::new(
        user_repository,
        house_repository,
        TokenConfig::from_config(&config),
        config.store_timeout,
    );
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Postgres when DATABASE_URL is set, otherwise process-local maps
async fn open_repositories(config: &Config) -> Result<Repositories, Box<dyn std::error::Error>> {
    match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Connected to PostgreSQL, migrations applied");

            let user_repository: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(PostgresUserRepository::new(pool.clone()));
            let house_repository: Arc<dyn HouseRepository + Send + Sync> =
                Arc::new(PostgresHouseRepository::new(pool));
            Ok((user_repository, house_repository))
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory store; data is lost on restart");
            let user_repository: Arc<dyn UserRepository + Send + Sync> =
                Arc::new(InMemoryUserRepository::new());
            let house_repository: Arc<dyn HouseRepository + Send + Sync> =
                Arc::new(InMemoryHouseRepository::new());
            Ok((user_repository, house_repository))
        }
    }
}
