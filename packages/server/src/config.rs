use config::{Config, ConfigError, Environment, File};
use genai::GenAiConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec![],
            max_age: 3600,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider.
    pub jwt_secret: String,
    /// Expected `aud` claim. Not checked when unset.
    #[serde(default)]
    pub audience: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Largest accepted PDF, uploaded or downloaded, in bytes. Default: 20 MiB.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_max_file_size() -> u64 {
    20 * 1024 * 1024
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QuizConfig {
    /// Questions requested from the model per quiz. Default: 10.
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    /// Points granted per correct answer. Default: 10.
    #[serde(default = "default_point_per_question")]
    pub point_per_question: i32,
}

fn default_question_count() -> usize {
    10
}
fn default_point_per_question() -> i32 {
    10
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            point_per_question: default_point_per_question(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub genai: GenAiConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., STUDIA__GENAI__API_KEY)
            .add_source(Environment::with_prefix("STUDIA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
