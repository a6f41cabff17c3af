use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema loading error: {} - {details}", path.display())]
    SchemaLoad { path: PathBuf, details: String },

    #[error("LibXML2 internal error: {details}")]
    LibXml2Internal { details: String },

    #[error("File system traversal error: {} - {reason}", path.display())]
    FileSystemTraversal { path: PathBuf, reason: String },

    #[error("Content is not valid {encoding}")]
    Decoding { encoding: &'static str },

    #[error("Unknown encoding declared: {label}")]
    UnknownEncoding { label: String },

    #[error("Malformed XML: {title} - {details}")]
    MalformedXml { title: String, details: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// LibXML2-specific error types
#[derive(Error, Debug)]
pub enum LibXml2Error {
    #[error("RelaxNG schema parsing failed: {details}")]
    SchemaParseFailed { details: String },

    #[error("RelaxNG parser context creation failed")]
    ParserContextFailed,

    #[error("Validation context creation failed")]
    ValidationContextCreationFailed,

    #[error("libxml2 could not read document: {name}")]
    DocumentReadFailed { name: String },

    #[error("Input of {len} bytes exceeds the libxml2 buffer limit")]
    InputTooLarge { len: usize },

    #[error("Path is not representable as a C string: {}", path.display())]
    InvalidPath { path: PathBuf },
}

impl From<LibXml2Error> for CorpusError {
    fn from(err: LibXml2Error) -> Self {
        CorpusError::LibXml2Internal {
            details: err.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CorpusError>;

/// LibXML2 result type alias
pub type LibXml2Result<T> = std::result::Result<T, LibXml2Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_error_display() {
        let schema_error = CorpusError::SchemaLoad {
            path: PathBuf::from("tei-epidoc.rng"),
            details: "No such file or directory".to_string(),
        };
        assert!(schema_error.to_string().contains("Schema loading error"));
        assert!(schema_error.to_string().contains("tei-epidoc.rng"));

        let malformed = CorpusError::MalformedXml {
            title: "inscriptions: 001.xml".to_string(),
            details: "unexpected end of stream".to_string(),
        };
        assert!(malformed.to_string().contains("inscriptions: 001.xml"));
        assert!(malformed.to_string().contains("unexpected end of stream"));

        let decoding = CorpusError::Decoding {
            encoding: "ISO-8859-2",
        };
        assert_eq!(decoding.to_string(), "Content is not valid ISO-8859-2");
    }

    #[test]
    fn test_libxml2_error_display() {
        let parse_failed = LibXml2Error::SchemaParseFailed {
            details: "Element grammar has extra content".to_string(),
        };
        assert!(
            parse_failed
                .to_string()
                .contains("RelaxNG schema parsing failed")
        );

        let too_large = LibXml2Error::InputTooLarge { len: 42 };
        assert!(too_large.to_string().contains("42 bytes"));
    }

    #[test]
    fn test_libxml2_error_conversion() {
        let libxml2_error = LibXml2Error::ValidationContextCreationFailed;
        let corpus_error: CorpusError = libxml2_error.into();

        match corpus_error {
            CorpusError::LibXml2Internal { details } => {
                assert!(details.contains("Validation context"));
            }
            _ => panic!("Expected CorpusError::LibXml2Internal"),
        }
    }

    #[test]
    fn test_io_error_conversion() {
        use std::error::Error;

        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let corpus_error: CorpusError = io_error.into();

        assert!(matches!(corpus_error, CorpusError::Io(_)));
        let source = corpus_error.source().unwrap();
        assert_eq!(source.to_string(), "File not found");
    }
}
