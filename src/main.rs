use geo_registry::{
    build_router, AppConfig, AppError, AppState, InMemoryDatabase, PostgresDatabase,
    TokenIssuer, UnitOfWorkFactory,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geo_registry=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting geo registry server");

    let config = AppConfig::from_env().inspect_err(|e| error!("{}", e))?;
    let token_issuer = TokenIssuer::new(config.jwt.clone()).inspect_err(|e| error!("{}", e))?;

    let database: Arc<dyn UnitOfWorkFactory> = match &config.database_url {
        Some(database_url) => {
            let database = PostgresDatabase::connect(database_url).await?;
            database.ensure_schema().await?;
            Arc::new(database)
        }
        None => {
            info!("DATABASE_URL not set, using in-memory database");
            Arc::new(InMemoryDatabase::new())
        }
    };

    let app_state = AppState::new(database, Arc::new(token_issuer));
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .map_err(|e| {
            AppError::ConfigurationError(format!(
                "cannot bind {}: {}",
                config.bind_address, e
            ))
        })?;
    info!("Server running on http://{}", config.bind_address);

    axum::serve(listener, app).await.map_err(|e| {
        error!(error = %e, "Server terminated");
        AppError::Internal
    })
}
