use axum_helpers::{
    JwtAuth,
    server::{create_production_app, health_router},
};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{MongoUserRepository, UserService};
use email::Mailer;
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.url());

    // Connect to MongoDB with retry
    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;

    // Get the database
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    let jwt = JwtAuth::new(&config.jwt);

    // SMTP is optional; without it the API runs with email features disabled
    let mailer = Mailer::from_env().map_err(|e| eyre::eyre!("Mailer setup failed: {}", e))?;
    match &mailer {
        Some(m) => info!("Email sending enabled via {}", m.provider_name()),
        None => warn!("SMTP not configured, email sending disabled"),
    }

    // Ensure the bootstrap superuser exists before serving traffic
    if let Some(ref first) = config.first_superuser {
        let service = UserService::new(MongoUserRepository::new(db.clone()));
        match service
            .ensure_first_superuser(&first.email, &first.password)
            .await
        {
            Ok(Some(_)) => info!(email = %first.email, "Bootstrap superuser created"),
            Ok(None) => info!(email = %first.email, "Bootstrap superuser already present"),
            Err(e) => return Err(eyre::eyre!("Superuser bootstrap failed: {}", e)),
        }
    }

    // Initialize the application state
    let state = AppState {
        config,
        mongo_client,
        db,
        jwt,
        mailer,
    };

    // Build router with API routes
    let api_routes = api::routes(&state);

    // Create a router with OpenAPI docs
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Merge health endpoints
    let app = router.merge(health_router(state.config.app.clone()));

    info!("Starting Catalog API with production-ready shutdown (30s timeout)");

    // Production-ready server with graceful shutdown
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            // MongoDB client closes automatically on drop
            drop(state.mongo_client);
            info!("MongoDB connection closed successfully");
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
