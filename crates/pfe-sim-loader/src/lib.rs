mod builtin;
pub mod corpus;
pub mod fonts;
pub mod languages;
pub mod spec;

use anyhow::Result;
use std::sync::Arc;

use pfe_sim_abstract::{MethodEntry, PfeMethod};
use tracing::debug;

pub use builtin::{FakeMethod, WholeFontMethod};
pub use corpus::{CorpusError, CorpusFormat, load_corpus};
pub use fonts::FontLoader;
pub use languages::LanguageFilter;

/// Methods implemented in this crate that can be selected by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltinMethod {
    WholeFont,
    Fake,
}

/// Describes how to obtain a PFE method implementation.
pub enum MethodDescriptor {
    BuiltIn(BuiltinMethod),
    Custom(Arc<dyn PfeMethod>),
}

/// Instantiates methods and registers them with their resolved sensitivity.
#[derive(Debug, Default)]
pub struct MethodLoader;

impl MethodLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, descriptor: MethodDescriptor) -> Result<MethodEntry> {
        let method: Arc<dyn PfeMethod> = match descriptor {
            MethodDescriptor::BuiltIn(builtin) => match builtin {
                BuiltinMethod::WholeFont => Arc::new(WholeFontMethod),
                BuiltinMethod::Fake => Arc::new(FakeMethod),
            },
            MethodDescriptor::Custom(method) => method,
        };
        let entry = MethodEntry::new(method);
        debug!(
            "Registered method {} ({:?})",
            entry.name(),
            entry.sensitivity()
        );
        Ok(entry)
    }

    /// Load every descriptor, rejecting duplicate method names.
    pub fn load_all(
        &self,
        descriptors: impl IntoIterator<Item = MethodDescriptor>,
    ) -> Result<Vec<MethodEntry>> {
        let mut entries: Vec<MethodEntry> = Vec::new();
        for descriptor in descriptors {
            let entry = self.load(descriptor)?;
            if entries.iter().any(|e| e.name() == entry.name()) {
                anyhow::bail!("Method '{}' requested more than once", entry.name());
            }
            entries.push(entry);
        }
        if entries.is_empty() {
            anyhow::bail!("No methods requested");
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pfe_sim_abstract::NetworkSensitivity;

    #[test]
    fn test_load_builtins() {
        let loader = MethodLoader::new();
        let entries = loader
            .load_all([
                MethodDescriptor::BuiltIn(BuiltinMethod::WholeFont),
                MethodDescriptor::BuiltIn(BuiltinMethod::Fake),
            ])
            .unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["WholeFont", "Fake"]);
        assert!(
            entries
                .iter()
                .all(|e| e.sensitivity() == NetworkSensitivity::Insensitive)
        );
    }

    #[test]
    fn test_duplicates_and_empty_are_rejected() {
        let loader = MethodLoader::new();
        assert!(
            loader
                .load_all([
                    MethodDescriptor::BuiltIn(BuiltinMethod::Fake),
                    MethodDescriptor::Custom(Arc::new(FakeMethod)),
                ])
                .is_err()
        );
        assert!(loader.load_all([]).is_err());
    }
}
