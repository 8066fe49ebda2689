use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use genai::GeminiClient;
use tracing::{Level, info};

use studia_server::config::AppConfig;
use studia_server::database::init_db;
use studia_server::seed::ensure_indexes;
use studia_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    ensure_indexes(&db).await?;

    if config.genai.api_key.is_empty() {
        tracing::warn!("genai.api_key is empty; AI features will fail");
    }
    let genai = GeminiClient::new(&config.genai).context("Failed to build AI client")?;
    info!("Using model {}", genai.model());

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.genai.request_timeout_secs))
        .build()
        .context("Failed to build HTTP client")?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let state = AppState {
        db,
        config,
        genai: Arc::new(genai),
        http,
    };
    let app = studia_server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
