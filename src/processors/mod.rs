//! Text extraction from uploaded documents
//!
//! Dispatch is by filename suffix, case-insensitive. The whole file is held
//! in memory and never modified.

pub mod docx;
pub mod pdf;

use tracing::debug;

use crate::core::errors::ExtractionError;
use crate::core::text::normalize;

/// Document formats recognised by suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Text,
    Pdf,
    Docx,
    /// Legacy Word binary, always rejected
    Doc,
}

impl DocumentFormat {
    /// Map a filename to its format
    pub fn from_filename(filename: &str) -> Result<Self, ExtractionError> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".txt") {
            Ok(DocumentFormat::Text)
        } else if lower.ends_with(".pdf") {
            Ok(DocumentFormat::Pdf)
        } else if lower.ends_with(".docx") {
            Ok(DocumentFormat::Docx)
        } else if lower.ends_with(".doc") {
            Ok(DocumentFormat::Doc)
        } else {
            Err(ExtractionError::UnsupportedFormat {
                filename: filename.to_string(),
            })
        }
    }
}

/// Extract normalized plain text from `bytes`
pub fn extract(bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
    let format = DocumentFormat::from_filename(filename)?;
    debug!("Extracting {} as {:?} ({} bytes)", filename, format, bytes.len());

    let text = match format {
        DocumentFormat::Text => extract_text(bytes)?,
        DocumentFormat::Pdf => pdf::extract_pdf(bytes)?,
        DocumentFormat::Docx => docx::extract_docx(bytes)?,
        DocumentFormat::Doc => return Err(ExtractionError::LegacyFormatUnsupported),
    };

    Ok(normalize(&text))
}

/// Strict UTF-8 decode
fn extract_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| ExtractionError::InvalidText {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dispatch_is_case_insensitive() {
        assert_eq!(DocumentFormat::from_filename("notes.TXT").unwrap(), DocumentFormat::Text);
        assert_eq!(DocumentFormat::from_filename("Report.Pdf").unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_filename("a.b.DOCX").unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_filename("old.doc").unwrap(), DocumentFormat::Doc);
    }

    #[test]
    fn test_unsupported_suffix() {
        for name in ["image.png", "archive.docx.zip", "noextension", "slides.pptx"] {
            assert!(matches!(
                extract(b"data", name),
                Err(ExtractionError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn test_doc_always_rejected() {
        assert_eq!(extract(b"", "legacy.doc"), Err(ExtractionError::LegacyFormatUnsupported));
        assert_eq!(
            extract(b"plain text pretending", "LEGACY.DOC"),
            Err(ExtractionError::LegacyFormatUnsupported)
        );
        assert_eq!(
            extract(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1], "word97.doc"),
            Err(ExtractionError::LegacyFormatUnsupported)
        );
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(extract(b"", "empty.txt").unwrap(), "");
        assert_eq!(
            extract("Acme Corp develops software.".as_bytes(), "acme.txt").unwrap(),
            "Acme Corp develops software."
        );
    }

    #[test]
    fn test_plain_text_is_normalized() {
        let text = extract("ＡＣＭＥ ｿﾌﾄ".as_bytes(), "fullwidth.txt").unwrap();
        assert_eq!(text, "ACME ソフト");
    }

    #[test]
    fn test_invalid_utf8_text() {
        assert!(matches!(
            extract(&[0x66, 0x6f, 0xff, 0xfe], "broken.txt"),
            Err(ExtractionError::InvalidText { .. })
        ));
    }

    #[test]
    fn test_input_bytes_untouched() {
        let bytes = "ｶﾀｶﾅ text".as_bytes().to_vec();
        let before = bytes.clone();
        extract(&bytes, "k.txt").unwrap();
        assert_eq!(bytes, before);
    }
}
