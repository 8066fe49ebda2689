use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("request to generative AI API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generative AI API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("response is missing `{0}`")]
    MissingField(&'static str),

    #[error("file {0} processing failed")]
    ProcessingFailed(String),

    /// The file never left `PROCESSING` within the poll budget.
    #[error("file {name} still processing after {attempts} attempts")]
    ProcessingTimeout { name: String, attempts: u32 },

    #[error("response text is empty")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    Malformed(String),
}
