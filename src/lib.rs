//! # epidoc-stats Library
//!
//! Collects the TEI-epidoc files below a directory, validates them against a
//! RelaxNG grammar and reports word and tag statistics over their edition
//! divisions.

pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod file_discovery;
pub mod libxml2;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod stats;
pub mod validator;

pub use cli::{Cli, Config, DEFAULT_SCHEMA_PATH, LogLevel};
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{CorpusError, LibXml2Error};
pub use extractor::{EditionContent, extract_edition};
pub use file_discovery::{CorpusFile, FileDiscovery};
pub use libxml2::{LibXml2Wrapper, RelaxNgSchema, ValidationResult};
pub use loader::{DocumentRecord, SourceFile};
pub use output::Output;
pub use pipeline::{CorpusReport, run, run_with_validator};
pub use stats::{CorpusAggregate, CorpusSummary};
pub use validator::{SchemaValidator, ValidationStatus};
