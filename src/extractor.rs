//! Edition text extraction.
//!
//! Finds the `<div type="edition">` of a TEI document, flattens its text and
//! derives the per-document word metrics.

use std::collections::{BTreeSet, HashSet};

use roxmltree::{Document, Node};

use crate::diagnostics::Diagnostics;

const COMPONENT: &str = "extractor";

pub const TEI_NAMESPACE: &str = "http://www.tei-c.org/ns/1.0";

/// Value of the `type` attribute that marks the edition division
pub const EDITION_TYPE: &str = "edition";

/// What one edition division contributes to the corpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditionContent {
    /// Whitespace-separated tokens, case preserved, in document order
    pub words: Vec<String>,
    /// Lower-cased tokens, each once, sorted
    pub unique_words: Vec<String>,
    /// Local names of the TEI elements below the division
    pub tags: BTreeSet<String>,
}

/// All `div` elements of the TEI namespace typed as the edition
pub fn edition_divisions<'a, 'input>(doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
    doc.descendants()
        .filter(|n| n.has_tag_name((TEI_NAMESPACE, "div")) && n.attribute("type") == Some(EDITION_TYPE))
        .collect()
}

/// Locate the edition division and extract its content.
///
/// Exactly one division is expected. Any other count is reported under
/// `title`; with several the first one is used, with none the document has no
/// edition content and `None` is returned.
pub fn extract_edition(
    title: &str,
    doc: &Document<'_>,
    diagnostics: &mut Diagnostics,
) -> Option<EditionContent> {
    let divisions = edition_divisions(doc);

    if divisions.len() != 1 {
        diagnostics.document_error(COMPONENT, title, "wrong number of divs");
        diagnostics.debug(
            COMPONENT,
            format!("{}: found {} edition divisions", title, divisions.len()),
        );
    }

    let division = divisions.first()?;
    let text = text_content(*division);
    let words = tokenize(&text);
    let unique_words = unique_lowercase(&words);

    Some(EditionContent {
        unique_words,
        tags: descendant_tags(*division),
        words,
    })
}

/// Concatenate every text node below `node` in document order, without
/// separators. Markup, comments and processing instructions contribute nothing.
pub fn text_content(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

/// Split on runs of whitespace. Punctuation stays attached to its word.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Lower-case and deduplicate the tokens of one document
pub fn unique_lowercase(words: &[String]) -> Vec<String> {
    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let mut unique: Vec<String> = unique.into_iter().collect();
    unique.sort();
    unique
}

/// Local names of the TEI elements strictly below `node`. Elements from
/// other vocabularies (MathML, SVG) are left out.
pub fn descendant_tags(node: Node<'_, '_>) -> BTreeSet<String> {
    node.descendants()
        .skip(1)
        .filter(|n| n.is_element() && n.tag_name().namespace() == Some(TEI_NAMESPACE))
        .map(|n| n.tag_name().name().to_string())
        .collect()
}
