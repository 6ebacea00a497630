//! EcoFarm advisor - backend server
//!
//! Loads the crop model artifact, connects the weather provider and serves
//! the recommendation API.

use std::{net::SocketAddr, sync::Arc};

use ecofarm_advisor_backend::{
    create_app,
    external::WeatherClient,
    models::{LoadOptions, ModelArtifact},
    AppState, Advisor, Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ecofarm_server=debug,ecofarm_advisor_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting EcoFarm Advisor Server");
    tracing::info!("Environment: {}", config.environment);

    // Load the model artifact; a bad artifact must stop startup
    tracing::info!("Loading model artifact from {}", config.model.artifact_path.display());
    let artifact = ModelArtifact::load(
        &config.model.artifact_path,
        LoadOptions {
            strict_features: config.model.strict_features,
            organic_mode: config.advisor.organic_mode,
        },
    )?;

    let weather = WeatherClient::from_config(&config.weather)?;

    // Create application state
    let advisor = Advisor::new(
        Arc::new(artifact),
        Arc::new(weather),
        config.advisor.organic_mode,
    );
    let state = AppState {
        advisor: Arc::new(advisor),
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = create_app(state);

    // Start server
    let ip: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
