//! Document text extraction.
//!
//! Pulls raw text out of uploaded PDF and DOCX files with statically-linked
//! parsers, then normalizes it for the extraction prompt: whitespace
//! collapsed, glyphs outside the resume-relevant set dropped, spacing around
//! `.` and `@` tightened so emails survive tokenization. A result under
//! `MIN_TEXT_CHARS` is an extraction failure, not a parse candidate.

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Anything shorter than this after cleanup is likely an image-based scan
/// or an extraction miss; the model would only hallucinate from it.
pub const MIN_TEXT_CHARS: usize = 50;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static JUNK_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s@.\-+()]").unwrap());
static SPACE_BEFORE_SEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.@])").unwrap());
static SPACE_AFTER_SEP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.@])\s+").unwrap());

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type '{0}'. Please upload a PDF or DOCX resume")]
    UnsupportedType(String),

    #[error("Could not read the document: {0}")]
    Unreadable(String),

    #[error("Insufficient text extracted from resume ({0} chars). The file may be image-based, empty, or encrypted")]
    InsufficientText(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
        }
    }
}

/// Picks the parser for an upload. The declared content type wins; the
/// file extension is the fallback for clients that send octet-stream.
pub fn detect_kind(
    file_name: &str,
    content_type: Option<&str>,
) -> Result<DocumentKind, ExtractError> {
    if let Some(ct) = content_type {
        if ct.eq_ignore_ascii_case(PDF_MIME) {
            return Ok(DocumentKind::Pdf);
        }
        if ct.eq_ignore_ascii_case(DOCX_MIME) {
            return Ok(DocumentKind::Docx);
        }
    }

    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|v| v.to_str())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => Ok(DocumentKind::Pdf),
        "docx" => Ok(DocumentKind::Docx),
        _ => Err(ExtractError::UnsupportedType(file_name.to_string())),
    }
}

/// Full extraction: dispatch, parse, clean, minimum-length check.
pub fn extract_document(
    file_name: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Result<String, ExtractError> {
    let kind = detect_kind(file_name, content_type)?;

    let raw = match kind {
        DocumentKind::Pdf => extract_pdf_text(data)?,
        DocumentKind::Docx => extract_docx_text(data)?,
    };

    let cleaned = clean_extracted_text(&raw);
    if cleaned.len() < MIN_TEXT_CHARS {
        return Err(ExtractError::InsufficientText(cleaned.len()));
    }

    Ok(cleaned)
}

fn extract_pdf_text(data: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractError::Unreadable(e.to_string()))
}

/// DOCX is a zip; the document body lives in `word/document.xml` with one
/// `<w:p>` element per paragraph.
fn extract_docx_text(data: &[u8]) -> Result<String, ExtractError> {
    let cursor = Cursor::new(data);
    let mut archive =
        zip::ZipArchive::new(cursor).map_err(|e| ExtractError::Unreadable(e.to_string()))?;

    let mut document_file = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Unreadable(e.to_string()))?;
    let mut xml = String::new();
    document_file
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Unreadable(e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut lines = Vec::new();
    let mut in_paragraph = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"w:p" {
                    in_paragraph = true;
                    current.clear();
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"w:p" {
                    if !current.trim().is_empty() {
                        lines.push(current.trim().to_string());
                    }
                    current.clear();
                    in_paragraph = false;
                }
            }
            Ok(Event::Text(e)) => {
                if in_paragraph {
                    let value = e
                        .xml_content()
                        .map_err(|err| ExtractError::Unreadable(err.to_string()))?
                        .into_owned();
                    current.push_str(&value);
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(ExtractError::Unreadable(err.to_string())),
            _ => {}
        }

        buf.clear();
    }

    Ok(lines.join("\n"))
}

/// Normalizes extracted text for the prompt. Keeps letters, digits, and the
/// characters emails/phones need; everything else becomes a space.
pub fn clean_extracted_text(text: &str) -> String {
    let cleaned = WHITESPACE_RE.replace_all(text, " ");
    let cleaned = JUNK_CHARS_RE.replace_all(&cleaned, " ");
    let cleaned = WHITESPACE_RE.replace_all(&cleaned, " ");
    let cleaned = SPACE_BEFORE_SEP_RE.replace_all(&cleaned, "$1");
    let cleaned = SPACE_AFTER_SEP_RE.replace_all(&cleaned, "$1");
    cleaned.trim().to_string()
}
