use std::sync::Arc;

use genai::GenerativeModel;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub genai: Arc<dyn GenerativeModel>,
    /// Client used to download remote PDFs.
    pub http: reqwest::Client,
}
