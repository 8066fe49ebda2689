use async_trait::async_trait;

use crate::error::GenAiError;
use crate::models::{Content, RemoteFile};
use crate::poll::{PollPolicy, wait_until_processed};

/// A hosted model that stores files and generates text from them.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Upload raw bytes to the file store. The returned file may still be processing.
    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, GenAiError>;

    /// Fetch current metadata of an uploaded file.
    async fn get_file(&self, name: &str) -> Result<RemoteFile, GenAiError>;

    /// Run one generation over the given conversation and return its text.
    async fn generate(&self, contents: &[Content]) -> Result<String, GenAiError>;

    /// Upload bytes and wait until the file is usable in a prompt.
    async fn ingest(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: &str,
        policy: &PollPolicy,
    ) -> Result<RemoteFile, GenAiError> {
        let uploaded = self.upload_file(bytes, mime_type, display_name).await?;
        if uploaded.name.is_empty() {
            return Err(GenAiError::MissingField("name"));
        }
        wait_until_processed(self, &uploaded.name, policy).await
    }
}
