//! DOCX text extraction
//!
//! Reads `word/document.xml` out of the zip container and collects the text
//! of each paragraph directly under `w:body`. Table cells, content controls
//! and text boxes are skipped. Tabs and line breaks inside runs are kept as
//! `\t` and `\n`.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fmt::Display;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::core::errors::ExtractionError;

/// Main document part inside the package
const DOCUMENT_PART: &str = "word/document.xml";

fn malformed<E: Display>(err: E) -> ExtractionError {
    ExtractionError::MalformedDocx {
        message: err.to_string(),
    }
}

/// Paragraph texts in document order, joined with newlines
pub fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(malformed)?;

    let mut xml = Vec::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(malformed)?
        .read_to_end(&mut xml)
        .map_err(malformed)?;

    Ok(paragraphs(&xml)?.join("\n"))
}

/// Walk the document XML and return one string per direct `w:body` paragraph
fn paragraphs(xml: &[u8]) -> Result<Vec<String>, ExtractionError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    // elements open above the next event
    let mut depth = 0usize;
    let mut body_depth: Option<usize> = None;
    // open paragraphs, counted from a collected body paragraph down
    let mut paragraph_depth = 0usize;
    let mut run_depth = 0usize;
    let mut in_text = false;

    loop {
        let body_child = body_depth.map_or(false, |body| depth == body + 1);
        let collecting = paragraph_depth == 1;

        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                match e.local_name().as_ref() {
                    b"body" => body_depth = Some(depth),
                    b"p" if paragraph_depth > 0 || body_child => paragraph_depth += 1,
                    b"r" => run_depth += 1,
                    b"t" => in_text = true,
                    _ => {}
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" if paragraph_depth == 0 && body_child => paragraphs.push(String::new()),
                b"tab" if collecting && run_depth > 0 => current.push('\t'),
                b"br" | b"cr" if collecting && run_depth > 0 => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"body" => body_depth = None,
                    b"r" => run_depth = run_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    b"p" if paragraph_depth > 0 => {
                        if paragraph_depth == 1 {
                            paragraphs.push(std::mem::take(&mut current));
                        }
                        paragraph_depth -= 1;
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) if in_text && collecting => {
                current.push_str(&e.unescape().map_err(malformed)?);
            }
            Ok(Event::CData(e)) if in_text && collecting => {
                current.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(malformed(e)),
        }
        buf.clear();
    }

    Ok(paragraphs)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    /// Wrap body XML in a minimal document part
    pub fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        )
    }

    /// One paragraph with a single run per entry
    pub fn paragraphs_xml(paragraphs: &[&str]) -> String {
        paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
            .collect()
    }

    /// Zip a document part into a DOCX package
    pub fn build_docx(document: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        writer
            .start_file("[Content_Types].xml", options)
            .unwrap();
        writer
            .write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(document.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }
}
