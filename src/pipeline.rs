//! One report run, start to finish.

use std::path::Path;

use crate::cli::Config;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::extractor::extract_edition;
use crate::file_discovery::FileDiscovery;
use crate::loader::{DocumentRecord, parse_documents, read_sources};
use crate::stats::{CorpusAggregate, CorpusSummary};
use crate::validator::SchemaValidator;

const COMPONENT: &str = "pipeline";

/// Everything the report prints
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusReport {
    /// Files selected by the collector
    pub collected: usize,
    pub well_formed: usize,
    pub valid: usize,
    pub summary: CorpusSummary,
}

/// Load the grammar named in `config` and report on the corpus below its root.
/// A grammar that cannot be loaded is an error; everything after that is
/// reported through `diagnostics` and the run carries on.
pub fn run(config: &Config, diagnostics: &mut Diagnostics) -> Result<CorpusReport> {
    diagnostics.debug(
        COMPONENT,
        format!(
            "called with root: {}, schema: {}",
            config.root.display(),
            config.schema_path.display()
        ),
    );

    let validator = SchemaValidator::load(&config.schema_path)?;
    Ok(run_with_validator(&config.root, &validator, diagnostics))
}

pub fn run_with_validator(
    root: &Path,
    validator: &SchemaValidator,
    diagnostics: &mut Diagnostics,
) -> CorpusReport {
    let files = FileDiscovery::new().discover_files(root, diagnostics);
    let sources = read_sources(&files, diagnostics);
    let mut records = parse_documents(&sources, diagnostics);

    let valid = validator.count_valid(&records, diagnostics);
    let aggregate = aggregate_editions(&mut records, diagnostics);

    CorpusReport {
        collected: files.len(),
        well_formed: records.len(),
        valid,
        summary: aggregate.summarize(),
    }
}

/// Extract every document's edition, record its word counts on the
/// document, and fold it into a fresh aggregate.
pub fn aggregate_editions(
    records: &mut [DocumentRecord<'_>],
    diagnostics: &mut Diagnostics,
) -> CorpusAggregate {
    diagnostics.debug(
        COMPONENT,
        format!("aggregating {} documents", records.len()),
    );

    let mut aggregate = CorpusAggregate::new();
    for record in records.iter_mut() {
        let Some(content) = extract_edition(record.title, &record.doc, diagnostics) else {
            continue;
        };

        record.words = Some(content.words.len());
        record.words_unique = Some(content.unique_words.len());
        diagnostics.debug_with(COMPONENT, || {
            format!(
                "{}: {} words, {} unique",
                record.title,
                content.words.len(),
                content.unique_words.len()
            )
        });
        aggregate.add(content);
    }

    aggregate
}
