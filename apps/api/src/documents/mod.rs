//! Plain-text extraction from uploaded PDF and DOCX files.
//!
//! The declared content type picks the extractor. When a client sends no type or
//! the generic `application/octet-stream`, the file extension decides instead.
//! Parsing is CPU-bound and runs via `tokio::task::spawn_blocking`; panics inside
//! the PDF parser are caught and reported as unreadable documents.

pub mod handlers;

use std::panic;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MSWORD_MIME: &str = "application/msword";
const OCTET_STREAM_MIME: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Legacy .doc files are not supported. Please upload a PDF or DOCX file.")]
    LegacyWord,

    #[error("Unsupported file type '{0}'. Please upload a PDF or DOCX file.")]
    UnsupportedType(String),

    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),

    #[error("No text could be extracted from the document.")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Resolves the extractor for an upload.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Result<Self, ExtractError> {
        let mime = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != OCTET_STREAM_MIME);

        match mime.as_deref() {
            Some(PDF_MIME) => Ok(DocumentKind::Pdf),
            Some(DOCX_MIME) => Ok(DocumentKind::Docx),
            Some(MSWORD_MIME) => Err(ExtractError::LegacyWord),
            Some(other) => Err(ExtractError::UnsupportedType(other.to_string())),
            None => Self::from_extension(file_name),
        }
    }

    fn from_extension(file_name: Option<&str>) -> Result<Self, ExtractError> {
        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("docx") => Ok(DocumentKind::Docx),
            Some("doc") => Err(ExtractError::LegacyWord),
            _ => Err(ExtractError::UnsupportedType(
                file_name.unwrap_or("unknown").to_string(),
            )),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Docx => DOCX_MIME,
        }
    }
}

/// Text pulled out of one uploaded file.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub file_name: String,
    pub content_type: String,
    pub text: String,
    pub characters: usize,
}

/// Synchronous extraction. Call through `extract_document` from async code.
pub fn extract_text(kind: DocumentKind, data: &[u8]) -> Result<String, ExtractError> {
    let text = match kind {
        DocumentKind::Pdf => extract_pdf(data)?,
        DocumentKind::Docx => extract_docx(data)?,
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text.to_string())
}

/// Detects the document kind and extracts its text on the blocking pool.
pub async fn extract_document(
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
) -> Result<ExtractedDocument, AppError> {
    let kind = DocumentKind::detect(content_type.as_deref(), file_name.as_deref())?;
    let file_name = file_name.unwrap_or_else(|| "upload".to_string());
    debug!("Extracting {} ({} bytes) as {:?}", file_name, data.len(), kind);

    let text = tokio::task::spawn_blocking(move || extract_text(kind, &data))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}")))??;

    Ok(ExtractedDocument {
        file_name,
        content_type: kind.mime().to_string(),
        characters: text.chars().count(),
        text,
    })
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractError> {
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(data))
        .map_err(|_| ExtractError::Pdf("the file is damaged or uses unsupported features".to_string()))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    Ok(pages
        .iter()
        .map(|page| page.trim())
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n"))
}

fn extract_docx(data: &[u8]) -> Result<String, ExtractError> {
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    let docx = docx_rs::read_docx(data).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut paragraphs = Vec::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut line = String::new();
            for paragraph_child in paragraph.children {
                if let ParagraphChild::Run(run) = paragraph_child {
                    for run_child in run.children {
                        if let RunChild::Text(t) = run_child {
                            line.push_str(&t.text);
                        }
                    }
                }
            }
            paragraphs.push(line);
        }
    }
    Ok(paragraphs.join("\n"))
}
