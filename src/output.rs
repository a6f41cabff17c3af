//! Report formatting.

use std::io::{self, Write};

use crate::pipeline::CorpusReport;

const SEPARATOR_WIDTH: usize = 80;
const NOT_APPLICABLE: &str = "n/a";

/// Plain-text report writer
pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn format_report(&self, report: &CorpusReport) -> String {
        let summary = &report.summary;
        let mut output = String::new();

        output.push('\n');
        output.push_str(&"-".repeat(SEPARATOR_WIDTH));
        output.push('\n');
        output.push_str(&format!(
            "number of well-formed files: {}\n",
            report.well_formed
        ));
        output.push_str(&format!("number of valid files: {}\n", report.valid));
        output.push_str(&format!(
            "total word count across all files: {}\n",
            summary.total_words
        ));
        output.push_str(&format!(
            "mean words per edition: {}\n",
            format_statistic(summary.mean_words)
        ));
        output.push_str(&format!(
            "standard deviation in words per edition: {}\n",
            format_statistic(summary.stdev_words)
        ));
        output.push_str(&format!(
            "total unique words across all files: {}\n",
            summary.total_unique_words
        ));
        output.push_str(&format!(
            "mean unique words per edition: {}\n",
            format_statistic(summary.mean_unique_words)
        ));
        output.push_str(&format!(
            "standard deviation in unique words per edition: {}\n",
            format_statistic(summary.stdev_unique_words)
        ));
        output.push_str(&format!(
            "tags used in editions: {}\n",
            summary.tags.join(", ")
        ));

        output
    }

    pub fn write_report<W: Write>(&self, writer: &mut W, report: &CorpusReport) -> io::Result<()> {
        writer.write_all(self.format_report(report).as_bytes())?;
        writer.flush()
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

fn format_statistic(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NOT_APPLICABLE.to_string(),
    }
}
