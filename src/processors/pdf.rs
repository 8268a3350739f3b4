//! PDF text extraction

use std::panic;

use crate::core::errors::ExtractionError;

/// Page texts in page order, joined with newlines
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    // the parser panics on some damaged files instead of returning an error
    let pages = panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| ExtractionError::MalformedPdf {
            message: "parser panicked".to_string(),
        })?
        .map_err(|e| ExtractionError::MalformedPdf {
            message: e.to_string(),
        })?;

    Ok(pages.join("\n"))
}


#[cfg(test)]
mod tests {
    use super::fixtures::build_pdf;
    use super::*;

    #[test]
    fn test_empty_pdf_yields_blank_text() {
        let text = extract_pdf(&build_pdf(&[""])).unwrap();
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_pages_joined_in_order() {
        let text = extract_pdf(&build_pdf(&["First page", "Second page"])).unwrap();
        let first = text.find("First page").expect("first page text");
        let second = text.find("Second page").expect("second page text");
        assert!(first < second);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            extract_pdf(b"this is not a pdf"),
            Err(ExtractionError::MalformedPdf { .. })
        ));
    }
}
