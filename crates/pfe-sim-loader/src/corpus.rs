//! Reading page view sequences from disk.
//!
//! Two JSON shapes are accepted:
//!
//! * structured: a serialized [`DataSet`], sequences of page views of per
//!   font contents;
//! * simplified: an array of `{"URL": .., "Contents": ..}` records forming a
//!   single sequence, every page rendered in the default font.

use std::fs;
use std::path::Path;

use pfe_sim_abstract::{DataSet, PageContent, PageView, PageViewSequence};
use serde::Deserialize;
use serde::de::IgnoredAny;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("failed to read corpus: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse corpus: {0}")]
    Parse(#[from] serde_json::Error),

    /// Simplified corpora render everything in the default font.
    #[error("the simplified input format requires a default font id")]
    MissingDefaultFont,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorpusFormat {
    #[default]
    Structured,
    Simplified,
}

#[derive(Debug, Deserialize)]
struct SimplifiedRecord {
    /// Required but unused.
    #[serde(rename = "URL")]
    _url: IgnoredAny,
    #[serde(rename = "Contents")]
    contents: String,
}

pub fn load_corpus(
    path: &Path,
    format: CorpusFormat,
    default_font_id: Option<&str>,
) -> Result<Vec<PageViewSequence>, CorpusError> {
    let text = fs::read_to_string(path)?;
    let sequences = match format {
        CorpusFormat::Structured => parse_structured(&text)?,
        CorpusFormat::Simplified => {
            let font_id = default_font_id.ok_or(CorpusError::MissingDefaultFont)?;
            parse_simplified(&text, font_id)?
        }
    };
    info!(
        "Loaded {} sequence(s) from {}",
        sequences.len(),
        path.display()
    );
    Ok(sequences)
}

pub fn parse_structured(text: &str) -> Result<Vec<PageViewSequence>, CorpusError> {
    let data_set: DataSet = serde_json::from_str(text)?;
    Ok(data_set.sequences)
}

/// One sequence, one page view per record, codepoints are the distinct
/// characters of `Contents` in order of first appearance.
pub fn parse_simplified(
    text: &str,
    default_font_id: &str,
) -> Result<Vec<PageViewSequence>, CorpusError> {
    let records: Vec<SimplifiedRecord> = serde_json::from_str(text)?;
    let page_views = records
        .iter()
        .map(|record| {
            let mut seen = std::collections::BTreeSet::new();
            let codepoints = record
                .contents
                .chars()
                .map(u32::from)
                .filter(|cp| seen.insert(*cp));
            PageView {
                contents: vec![PageContent::new(default_font_id, codepoints)],
            }
        })
        .collect();
    Ok(vec![PageViewSequence::new(page_views)])
}
