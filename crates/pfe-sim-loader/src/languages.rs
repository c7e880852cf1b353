use std::collections::BTreeSet;

use anyhow::Result;
use pfe_sim_abstract::PageViewSequence;
use tracing::info;

/// Language tags covered by each script category.
pub const SCRIPT_CATEGORIES: [(&str, &[&str]); 3] = [
    (
        "latin",
        &[
            "en", "vi", "es", "ru", "pt-PT", "fr", "id", "tr", "th", "pl", "de", "it", "nl", "cs",
            "sk", "da", "el", "sv", "sr", "fi", "ro", "hu", "no", "fil", "bg", "hr", "uk", "iw",
            "ms", "lt", "sl", "la", "az", "lv", "mk", "is", "ka", "et",
        ],
    ),
    (
        "arabic_indic",
        &["ar", "hi", "fa", "ml", "bn", "ta", "km", "te", "mr", "my", "ur"],
    ),
    ("cjk", &["ja", "zh", "ko", "zh-Hant"]),
];

pub fn script_category(name: &str) -> Option<&'static [&'static str]> {
    SCRIPT_CATEGORIES
        .iter()
        .find(|(category, _)| *category == name)
        .map(|(_, tags)| *tags)
}

/// Keeps only sequences tagged with one of a set of languages.
///
/// An empty filter keeps everything, including untagged sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageFilter {
    languages: BTreeSet<String>,
}

impl LanguageFilter {
    /// A script category, when given, replaces the explicit language list.
    pub fn new(languages: &[String], script: Option<&str>) -> Result<Self> {
        let languages = match script {
            Some(name) => match script_category(name) {
                Some(tags) => tags.iter().map(|t| t.to_string()).collect(),
                None => anyhow::bail!(
                    "Unknown script category '{name}'. Try 'latin', 'arabic_indic' or 'cjk'."
                ),
            },
            None => languages.iter().cloned().collect(),
        };
        Ok(Self { languages })
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn should_keep(&self, language: Option<&str>) -> bool {
        self.is_empty() || language.is_some_and(|lang| self.languages.contains(lang))
    }

    pub fn apply(&self, sequences: Vec<PageViewSequence>) -> Vec<PageViewSequence> {
        if self.is_empty() {
            return sequences;
        }
        let before = sequences.len();
        let kept: Vec<_> = sequences
            .into_iter()
            .filter(|s| self.should_keep(s.language.as_deref()))
            .collect();
        info!(
            "Language filter kept {} of {} sequence(s)",
            kept.len(),
            before
        );
        kept
    }
}
