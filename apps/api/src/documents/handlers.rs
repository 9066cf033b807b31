//! Axum route handlers for document extraction, plus the multipart reader shared
//! with the session upload endpoints.

use axum::{extract::Multipart, Json};
use bytes::Bytes;
use tracing::info;

use crate::documents::{extract_document, ExtractedDocument};
use crate::errors::AppError;

/// Multipart field name carrying uploaded files.
pub const FILE_FIELD: &str = "file";

/// One file part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn display_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("upload")
    }
}

/// Reads every part named `field` from the request. Other parts are ignored.
pub async fn read_files(multipart: &mut Multipart, field: &str) -> Result<Vec<UploadedFile>, AppError> {
    let mut files = Vec::new();
    while let Some(part) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if part.name() != Some(field) {
            continue;
        }
        let file_name = part.file_name().map(str::to_string);
        let content_type = part.content_type().map(str::to_string);
        let data = part
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
        files.push(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }
    Ok(files)
}

/// POST /api/v1/documents/extract
///
/// Extracts the text of a single PDF or DOCX upload sent as the `file` part.
pub async fn handle_extract(mut multipart: Multipart) -> Result<Json<ExtractedDocument>, AppError> {
    let file = read_files(&mut multipart, FILE_FIELD)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Validation(format!("Missing multipart field '{FILE_FIELD}'")))?;

    let document = extract_document(file.file_name, file.content_type, file.data).await?;
    info!(
        "Extracted {} characters from '{}'",
        document.characters, document.file_name
    );
    Ok(Json(document))
}
