pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod poll;
pub mod traits;

pub use client::GeminiClient;
pub use config::GenAiConfig;
pub use error::GenAiError;
pub use models::{Content, FileData, FileState, Part, RemoteFile, Role};
pub use poll::{PollPolicy, calculate_backoff, wait_until_processed};
pub use traits::GenerativeModel;
