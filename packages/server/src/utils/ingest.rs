use axum::extract::multipart::Field;
use genai::RemoteFile;
use tracing::{info, instrument};
use url::Url;

use crate::error::AppError;
use crate::state::AppState;

const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Where the bytes of a PDF come from.
pub enum PdfSource {
    Url(Url),
    Upload { file_name: String, bytes: Vec<u8> },
}

impl PdfSource {
    pub fn describe(&self) -> &str {
        match self {
            PdfSource::Url(url) => url.as_str(),
            PdfSource::Upload { file_name, .. } => file_name,
        }
    }
}

/// Parse an absolute `http`/`https` URL.
pub fn parse_http_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Validation(format!("Invalid URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Validation(format!(
            "Unsupported URL scheme '{other}' in '{raw}'"
        ))),
    }
}

/// Accept the file when its bytes, declared content type or file name says PDF.
pub fn ensure_pdf(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> Result<(), AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation(format!("File '{file_name}' is empty")));
    }

    let declared = is_pdf_type(content_type);
    let guessed = mime_guess::from_path(file_name).first_raw() == Some(PDF_MIME);

    if bytes.starts_with(PDF_MAGIC) || declared || guessed {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "File '{file_name}' is not a PDF"
        )))
    }
}

/// Accept a downloaded body on its bytes or the server's declared type. The URL path is ignored.
pub fn ensure_downloaded_pdf(url: &Url, content_type: Option<&str>, bytes: &[u8]) -> Result<(), AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation(format!("File at {url} is empty")));
    }
    if bytes.starts_with(PDF_MAGIC) || is_pdf_type(content_type) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("File at {url} is not a PDF")))
    }
}

fn is_pdf_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
        .is_some_and(|ct| ct.eq_ignore_ascii_case(PDF_MIME))
}

/// Read one multipart file field into memory, enforcing `max_size`.
pub async fn read_pdf_field(
    mut field: Field<'_>,
    max_size: u64,
) -> Result<(String, Vec<u8>), AppError> {
    let file_name = field
        .file_name()
        .map(str::to_owned)
        .ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;
    let content_type = field.content_type().map(str::to_owned);

    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        if (bytes.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::Validation(format!(
                "File exceeds maximum size of {max_size} bytes"
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    ensure_pdf(&file_name, content_type.as_deref(), &bytes)?;
    Ok((file_name, bytes))
}

/// Download a remote PDF, enforcing `max_size`.
#[instrument(skip(http), fields(url = %url))]
pub async fn download_pdf(
    http: &reqwest::Client,
    url: &Url,
    max_size: u64,
) -> Result<Vec<u8>, AppError> {
    let mut response = http
        .get(url.clone())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::upstream("Failed to download file", e))?;

    if response.content_length().is_some_and(|len| len > max_size) {
        return Err(AppError::Validation(format!(
            "File at {url} exceeds maximum size of {max_size} bytes"
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut bytes = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| AppError::upstream("Failed to download file", e))?
    {
        if (bytes.len() + chunk.len()) as u64 > max_size {
            return Err(AppError::Validation(format!(
                "File at {url} exceeds maximum size of {max_size} bytes"
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    ensure_downloaded_pdf(url, content_type.as_deref(), &bytes)?;
    Ok(bytes)
}

/// Fetch the PDF if needed, upload it to the model's file store and wait until it is processed.
#[instrument(skip(state, source), fields(source = source.describe()))]
pub async fn ingest_pdf(
    state: &AppState,
    source: PdfSource,
    display_name: &str,
) -> Result<RemoteFile, AppError> {
    let bytes = match source {
        PdfSource::Url(url) => {
            download_pdf(&state.http, &url, state.config.upload.max_file_size).await?
        }
        PdfSource::Upload { bytes, .. } => bytes,
    };

    let policy = state.config.genai.poll_policy();
    let file = state
        .genai
        .ingest(bytes, PDF_MIME, display_name, &policy)
        .await?;

    info!(name = %file.name, "File ready for generation");
    Ok(file)
}
