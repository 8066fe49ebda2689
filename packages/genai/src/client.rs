use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};

use crate::config::GenAiConfig;
use crate::error::GenAiError;
use crate::models::{Content, FileEnvelope, GenerateRequest, GenerateResponse, RemoteFile};
use crate::traits::GenerativeModel;

/// REST client for the Gemini API.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &GenAiConfig) -> Result<Self, GenAiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, GenAiError> {
        // Resumable protocol: open a session, then send all bytes and finalize.
        let start = self
            .http
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .ok_or(GenAiError::MissingField("x-goog-upload-url"))?
            .to_string();

        let res = self
            .http
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let envelope: FileEnvelope = decode(res).await?;

        if envelope.file.name.is_empty() {
            return Err(GenAiError::MissingField("name"));
        }
        debug!(file = %envelope.file.name, "Uploaded file");
        Ok(envelope.file)
    }

    async fn get_file(&self, name: &str) -> Result<RemoteFile, GenAiError> {
        let res = self
            .http
            .get(format!("{}/v1beta/{}", self.base_url, name))
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await?;

        decode(res).await
    }

    #[instrument(skip(self, contents), fields(model = %self.model, turns = contents.len()))]
    async fn generate(&self, contents: &[Content]) -> Result<String, GenAiError> {
        let res = self
            .http
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest { contents })
            .send()
            .await?;

        let body: GenerateResponse = decode(res).await?;
        body.text().ok_or(GenAiError::EmptyResponse)
    }
}

async fn check_status(res: Response) -> Result<Response, GenAiError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().await.unwrap_or_default();
    Err(GenAiError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Check the status, then decode the JSON body.
async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, GenAiError> {
    let body = check_status(res).await?.text().await?;
    parse_body(&body)
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, GenAiError> {
    serde_json::from_str(body).map_err(|e| GenAiError::Malformed(e.to_string()))
}
