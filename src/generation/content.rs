// src/generation/content.rs

use std::fs;
use std::path::Path;

use super::{GenerationError, pptx};

/// One input document, normalized and ready to ship to the model.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

/// Determine the MIME type based on file extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("csv") => "text/csv",
        Some("py") => "text/x-python",
        Some("js") => "text/javascript",
        Some("ts") => "text/typescript",
        Some("pptx") => {
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        }
        _ => "text/plain",
    }
}

/// Reads one document into a [`FilePart`].
///
/// Slide decks become extracted plain text (the model has no native pptx
/// support); every other type is passed through as raw bytes.
pub fn prepare_file_content(path: &Path) -> Result<FilePart, GenerationError> {
    if !path.exists() {
        return Err(GenerationError::FileNotFound(path.to_path_buf()));
    }

    let is_pptx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pptx"));

    if is_pptx {
        let text = pptx::extract_text(path)?;
        return Ok(FilePart {
            mime_type: "text/plain",
            data: text.into_bytes(),
        });
    }

    let data = fs::read(path).map_err(|source| GenerationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FilePart {
        mime_type: mime_type_for(path),
        data,
    })
}
