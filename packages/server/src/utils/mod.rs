pub mod history;
pub mod ingest;
pub mod jwt;
pub mod prompt;
pub mod quiz_content;
pub mod scoring;
