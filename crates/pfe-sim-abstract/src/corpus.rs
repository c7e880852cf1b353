use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// An ordered collection of page view sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSet {
    pub sequences: Vec<PageViewSequence>,
}

/// One browsing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageViewSequence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub page_views: Vec<PageView>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageView {
    pub contents: Vec<PageContent>,
}

/// Text rendered in one font on a page view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub font_name: String,
    pub codepoints: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub glyph_ids: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontUsage {
    pub codepoints: BTreeSet<u32>,
    pub glyph_ids: BTreeSet<u32>,
}

pub type UsageByFont = BTreeMap<String, FontUsage>;

impl PageView {
    /// Merge all contents of this page view per font.
    pub fn usage_by_font(&self) -> UsageByFont {
        let mut result = UsageByFont::new();
        for content in &self.contents {
            let usage = result.entry(content.font_name.clone()).or_default();
            usage.codepoints.extend(&content.codepoints);
            usage.glyph_ids.extend(&content.glyph_ids);
        }
        result
    }
}

impl PageViewSequence {
    pub fn new(page_views: Vec<PageView>) -> Self {
        Self {
            language: None,
            page_views,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl PageContent {
    pub fn new(font_name: impl Into<String>, codepoints: impl IntoIterator<Item = u32>) -> Self {
        Self {
            font_name: font_name.into(),
            codepoints: codepoints.into_iter().collect(),
            glyph_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_by_font_merges_contents() {
        let page_view = PageView {
            contents: vec![
                PageContent::new("roboto", [1, 2, 3]),
                PageContent::new("open_sans", [4]),
                PageContent {
                    font_name: "roboto".into(),
                    codepoints: vec![3, 7],
                    glyph_ids: vec![42],
                },
            ],
        };

        let usage = page_view.usage_by_font();
        assert_eq!(usage.len(), 2);
        assert_eq!(
            usage["roboto"].codepoints,
            BTreeSet::from([1, 2, 3, 7])
        );
        assert_eq!(usage["roboto"].glyph_ids, BTreeSet::from([42]));
        assert_eq!(usage["open_sans"].codepoints, BTreeSet::from([4]));
    }
}
