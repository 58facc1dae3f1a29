//! PDF text extraction for uploaded resumes.

use std::io::Read;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read PDF stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to extract text from PDF: {0}")]
    Pdf(String),
}

/// Reads `reader` to the end and extracts its text, page by page.
pub fn extract_text_from_pdf<R: Read>(mut reader: R) -> Result<String, ExtractError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    extract_text_from_bytes(&bytes)
}

/// Text of every page concatenated in page order.
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<String, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;
    debug!("Extracted text from {} PDF pages", pages.len());
    Ok(join_pages(pages))
}

fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = String>,
{
    pages.into_iter().collect()
}
