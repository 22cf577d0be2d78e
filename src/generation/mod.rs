// src/generation/mod.rs

pub mod content;
pub mod gemini;
pub mod pptx;

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use crate::config::Config;

pub use gemini::{GeneratedOption, GeneratedQuestion, McqResponse};

/// Errors emitted by the generation pipeline.
///
/// All of these are fatal to an invocation: input problems abort before
/// any network call, and a bad model response is never partially accepted.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("at least one file path must be provided")]
    NoInputFiles,
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a readable slide deck", path.display())]
    SlideDeck {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("model request failed with status {0}")]
    HttpStatus(StatusCode),
    #[error("no response received from the model")]
    EmptyResponse,
    #[error("model response failed schema validation: {0}")]
    InvalidResponse(String),
}

/// Runs the whole pipeline short of persistence: read and normalize every
/// input document, then ask the model for `num_questions` validated
/// questions. One blocking call, no retry; any failure aborts.
pub async fn generate_from_files(
    config: &Config,
    file_paths: &[PathBuf],
    num_questions: u32,
) -> Result<McqResponse, GenerationError> {
    if file_paths.is_empty() {
        return Err(GenerationError::NoInputFiles);
    }
    let api_key = config
        .gemini_api_key
        .clone()
        .ok_or(GenerationError::MissingApiKey)?;

    let mut parts = Vec::with_capacity(file_paths.len());
    for path in file_paths {
        parts.push(content::prepare_file_content(path)?);
    }

    let client = gemini::GeminiClient::new(api_key, config.gemini_model.clone());
    client.generate_questions(&parts, num_questions).await
}
