//! Load/save plumbing shared by the PDF tools.
//!
//! All binary PDF handling is delegated to `lopdf`; this module only maps its
//! failures onto per-file errors and packages the saved bytes.

use lopdf::Document;
use serde::{Deserialize, Serialize};

use super::queue::{validate_pdf, SourceFile};
use crate::error::CalcKitError;
use crate::CalcKitResult;

/// A finished output document ready to be downloaded or written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfArtifact {
    pub file_name: String,
    pub page_count: usize,
    pub size_bytes: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

pub(crate) fn processing_error(file: &str, reason: impl ToString) -> CalcKitError {
    CalcKitError::DocumentProcessing {
        file: file.to_string(),
        reason: reason.to_string(),
    }
}

/// Validate and open a source file.
pub(crate) fn load(file: &SourceFile) -> CalcKitResult<Document> {
    validate_pdf(file)?;
    let doc = Document::load_mem(&file.bytes).map_err(|e| processing_error(&file.name, e))?;
    if doc.is_encrypted() {
        return Err(processing_error(
            &file.name,
            "Password-protected PDFs are not supported",
        ));
    }
    if doc.get_pages().is_empty() {
        return Err(processing_error(&file.name, "Document has no pages"));
    }
    log::debug!("loaded {} ({} pages)", file.name, doc.get_pages().len());
    Ok(doc)
}

/// Serialise a document into an artifact with the given output name.
pub(crate) fn save(mut doc: Document, file_name: String) -> CalcKitResult<PdfArtifact> {
    let page_count = doc.get_pages().len();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| processing_error(&file_name, e))?;
    log::debug!("saved {file_name}: {page_count} pages, {} bytes", bytes.len());
    Ok(PdfArtifact {
        file_name,
        page_count,
        size_bytes: bytes.len(),
        bytes,
    })
}
