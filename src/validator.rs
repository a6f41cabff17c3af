//! RelaxNG validation of loaded documents.
//!
//! The grammar is compiled once; each document is then checked in turn.
//! Validation only feeds the valid-file count and diagnostics. Invalid
//! documents still take part in word statistics.

use std::path::{Path, PathBuf};

use crate::diagnostics::Diagnostics;
use crate::error::{CorpusError, Result};
use crate::libxml2::{LibXml2Wrapper, RelaxNgSchema, ValidationResult};
use crate::loader::DocumentRecord;

const COMPONENT: &str = "validator";

/// Status of a single document validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationStatus {
    Valid,
    /// Schema violations; messages as reported by libxml2
    Invalid {
        error_count: i32,
        errors: Vec<String>,
    },
    /// libxml2 could not run the validation at all
    Error { message: String },
}

impl ValidationStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationStatus::Valid)
    }
}

impl From<ValidationResult> for ValidationStatus {
    fn from(result: ValidationResult) -> Self {
        match result {
            ValidationResult::Valid => ValidationStatus::Valid,
            ValidationResult::Invalid {
                error_count,
                errors,
            } => ValidationStatus::Invalid {
                error_count,
                errors,
            },
            ValidationResult::InternalError { code } => ValidationStatus::Error {
                message: format!("LibXML2 internal error: {}", code),
            },
        }
    }
}

/// Compiled RelaxNG grammar plus the libxml2 handle used to apply it
pub struct SchemaValidator {
    wrapper: LibXml2Wrapper,
    schema: RelaxNgSchema,
    schema_path: PathBuf,
}

impl SchemaValidator {
    /// Compile the grammar at `schema_path`. Failure here aborts the run.
    pub fn load(schema_path: &Path) -> Result<Self> {
        let wrapper = LibXml2Wrapper::new();

        if !schema_path.is_file() {
            return Err(CorpusError::SchemaLoad {
                path: schema_path.to_path_buf(),
                details: "file not found".to_string(),
            });
        }

        let schema =
            wrapper
                .parse_relaxng_from_file(schema_path)
                .map_err(|e| CorpusError::SchemaLoad {
                    path: schema_path.to_path_buf(),
                    details: e.to_string(),
                })?;

        Ok(Self {
            wrapper,
            schema,
            schema_path: schema_path.to_path_buf(),
        })
    }

    /// Compile a grammar held in memory
    pub fn from_memory(schema_data: &[u8]) -> Result<Self> {
        let wrapper = LibXml2Wrapper::new();
        let schema = wrapper.parse_relaxng_from_memory(schema_data)?;

        Ok(Self {
            wrapper,
            schema,
            schema_path: PathBuf::from("<memory>"),
        })
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    /// Validate one document
    pub fn validate(&self, record: &DocumentRecord<'_>) -> ValidationStatus {
        let name = record.path.to_string_lossy();

        match self
            .wrapper
            .validate_memory(&self.schema, record.source_bytes(), &name)
        {
            Ok(result) => result.into(),
            Err(e) => ValidationStatus::Error {
                message: CorpusError::from(e).to_string(),
            },
        }
    }

    /// Validate every document and return how many passed. Each failure is
    /// reported under the title of the document that failed.
    pub fn count_valid(
        &self,
        records: &[DocumentRecord<'_>],
        diagnostics: &mut Diagnostics,
    ) -> usize {
        diagnostics.debug(
            COMPONENT,
            format!(
                "called with {} documents, schema {}",
                records.len(),
                self.schema_path.display()
            ),
        );

        let mut valid = 0;
        for record in records {
            match self.validate(record) {
                ValidationStatus::Valid => valid += 1,
                ValidationStatus::Invalid {
                    error_count,
                    errors,
                } => {
                    diagnostics.document_error(COMPONENT, record.title, "invalid");
                    diagnostics.debug_with(COMPONENT, || {
                        format!(
                            "{}: {} schema error(s)\n{}",
                            record.title,
                            error_count,
                            errors.join("\n")
                        )
                    });
                }
                ValidationStatus::Error { message } => {
                    diagnostics.document_error(COMPONENT, record.title, "invalid");
                    diagnostics.debug(COMPONENT, format!("{}: {}", record.title, message));
                }
            }
        }

        valid
    }
}
