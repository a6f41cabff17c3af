//! Document loading.
//!
//! Loading happens in two passes so the parsed trees can borrow their text:
//! [`read_sources`] pulls every collected file into memory, then
//! [`parse_documents`] parses each one into a [`DocumentRecord`] that lives as
//! long as the source list.
//!
//! roxmltree only reads UTF-8, so each file is decoded first. The encoding
//! comes from a byte order mark, a UTF-16 signature or the XML declaration;
//! without any of those the file is taken as UTF-8. The raw bytes are kept
//! for libxml2, which does its own decoding.

use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use roxmltree::{Document, ParsingOptions};

use crate::diagnostics::Diagnostics;
use crate::error::CorpusError;
use crate::file_discovery::CorpusFile;

const COMPONENT: &str = "loader";

/// File contents read from disk, not yet parsed
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub title: String,
    pub path: PathBuf,
    /// Bytes as stored on disk
    pub bytes: Vec<u8>,
    /// The same content decoded to UTF-8
    pub text: String,
}

impl SourceFile {
    /// Decode `bytes` in the encoding the document itself announces
    pub fn decode(title: String, path: PathBuf, bytes: Vec<u8>) -> Result<Self, CorpusError> {
        let (encoding, bom_len) = sniff_encoding(&bytes)?;
        let text = encoding
            .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            .ok_or(CorpusError::Decoding {
                encoding: encoding.name(),
            })?
            .into_owned();

        Ok(Self {
            title,
            path,
            bytes,
            text,
        })
    }
}

/// Encoding of an XML document and the length of its byte order mark
fn sniff_encoding(bytes: &[u8]) -> Result<(&'static Encoding, usize), CorpusError> {
    if let Some(found) = Encoding::for_bom(bytes) {
        return Ok(found);
    }
    if bytes.starts_with(b"<\0?\0") {
        return Ok((UTF_16LE, 0));
    }
    if bytes.starts_with(b"\0<\0?") {
        return Ok((UTF_16BE, 0));
    }

    match declared_encoding(bytes) {
        // A declaration readable as ASCII rules out UTF-16, whatever it says
        Some(label) => Encoding::for_label(label)
            .map(|encoding| (encoding.output_encoding(), 0))
            .ok_or_else(|| CorpusError::UnknownEncoding {
                label: String::from_utf8_lossy(label).into_owned(),
            }),
        None => Ok((UTF_8, 0)),
    }
}

/// The `encoding` pseudo-attribute of a leading XML declaration
fn declared_encoding(bytes: &[u8]) -> Option<&[u8]> {
    let decl = bytes.strip_prefix(b"<?xml")?;
    let end = decl.windows(2).position(|w| w == b"?>")?;
    let decl = &decl[..end];

    let at = decl.windows(8).position(|w| w == b"encoding")?;
    let value = decl[at + 8..]
        .trim_ascii_start()
        .strip_prefix(b"=")?
        .trim_ascii_start();
    let (&quote, value) = value.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let len = value.iter().position(|&b| b == quote)?;
    Some(&value[..len])
}

/// A well-formed document and the metrics extraction attached to it
#[derive(Debug)]
pub struct DocumentRecord<'input> {
    pub title: &'input str,
    pub path: &'input Path,
    pub doc: Document<'input>,
    raw: &'input [u8],
    /// Token count of the edition text, once extracted
    pub words: Option<usize>,
    /// Case-insensitive distinct token count, once extracted
    pub words_unique: Option<usize>,
}

impl<'input> DocumentRecord<'input> {
    /// The raw text this document was parsed from
    pub fn source_text(&self) -> &'input str {
        self.doc.input_text()
    }

    /// The file's bytes before decoding
    pub fn source_bytes(&self) -> &'input [u8] {
        self.raw
    }
}

/// Read and decode every collected file. Unreadable files are reported with
/// their title and left out.
pub fn read_sources(files: &[CorpusFile], diagnostics: &mut Diagnostics) -> Vec<SourceFile> {
    diagnostics.debug(COMPONENT, format!("called with {} files", files.len()));

    files
        .iter()
        .filter_map(|file| match read_source(file) {
            Ok(source) => Some(source),
            Err(e) => {
                diagnostics.document_error(COMPONENT, &file.title, &e.to_string());
                None
            }
        })
        .collect()
}

fn read_source(file: &CorpusFile) -> Result<SourceFile, CorpusError> {
    let bytes = std::fs::read(&file.path)?;
    SourceFile::decode(file.title.clone(), file.path.clone(), bytes)
}

/// Parse one source file
pub fn parse_document(source: &SourceFile) -> Result<DocumentRecord<'_>, CorpusError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };

    let doc = Document::parse_with_options(&source.text, options).map_err(|e| {
        CorpusError::MalformedXml {
            title: source.title.clone(),
            details: e.to_string(),
        }
    })?;

    Ok(DocumentRecord {
        title: &source.title,
        path: &source.path,
        doc,
        raw: &source.bytes,
        words: None,
        words_unique: None,
    })
}

/// Parse every source; malformed documents are reported with the parser's
/// message and dropped.
pub fn parse_documents<'input>(
    sources: &'input [SourceFile],
    diagnostics: &mut Diagnostics,
) -> Vec<DocumentRecord<'input>> {
    sources
        .iter()
        .filter_map(|source| match parse_document(source) {
            Ok(record) => Some(record),
            Err(CorpusError::MalformedXml { title, details }) => {
                diagnostics.document_error(COMPONENT, &title, &details);
                None
            }
            Err(e) => {
                diagnostics.document_error(COMPONENT, &source.title, &e.to_string());
                None
            }
        })
        .collect()
}
