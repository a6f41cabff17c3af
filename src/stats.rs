//! Corpus-wide accumulation and descriptive statistics.

use std::collections::BTreeSet;

use crate::extractor::EditionContent;

/// Running corpus totals, built up one edition at a time
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusAggregate {
    /// Every token of every edition, case preserved
    pub all_words: Vec<String>,
    /// Per-document unique lower-cased tokens, concatenated. A word that
    /// appears in two documents is present twice.
    pub unique_words: Vec<String>,
    pub word_counts: Vec<usize>,
    pub unique_word_counts: Vec<usize>,
    pub tags: BTreeSet<String>,
}

impl CorpusAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one edition into the totals
    pub fn add(&mut self, content: EditionContent) {
        self.word_counts.push(content.words.len());
        self.unique_word_counts.push(content.unique_words.len());
        self.all_words.extend(content.words);
        self.unique_words.extend(content.unique_words);
        self.tags.extend(content.tags);
    }

    /// Number of editions that contributed
    pub fn editions(&self) -> usize {
        self.word_counts.len()
    }

    pub fn summarize(&self) -> CorpusSummary {
        CorpusSummary {
            total_words: self.all_words.len(),
            mean_words: mean(&self.word_counts),
            stdev_words: sample_stdev(&self.word_counts),
            total_unique_words: self.unique_words.len(),
            mean_unique_words: mean(&self.unique_word_counts),
            stdev_unique_words: sample_stdev(&self.unique_word_counts),
            tags: self.tags.iter().cloned().collect(),
        }
    }
}

/// Final statistics. `None` marks a value that is undefined for the corpus
/// size (mean of nothing, spread of fewer than two editions).
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusSummary {
    pub total_words: usize,
    pub mean_words: Option<f64>,
    pub stdev_words: Option<f64>,
    pub total_unique_words: usize,
    pub mean_unique_words: Option<f64>,
    pub stdev_unique_words: Option<f64>,
    /// Distinct tag names, sorted
    pub tags: Vec<String>,
}

/// Arithmetic mean
pub fn mean(values: &[usize]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    Some(sum / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_stdev(values: &[usize]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let squares: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum();
    Some((squares / (values.len() - 1) as f64).sqrt())
}
