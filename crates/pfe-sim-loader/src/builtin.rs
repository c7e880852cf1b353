use std::collections::BTreeSet;

use pfe_sim_abstract::network::{
    ESTIMATED_HTTP_REQUEST_HEADER_SIZE, ESTIMATED_HTTP_RESPONSE_HEADER_SIZE,
};
use pfe_sim_abstract::{
    NetworkModel, PfeMethod, PfeSession, RequestGraph, Result, SessionResources, UsageByFont,
};
use tracing::debug;

const FAKE_REQUEST_SIZE: u64 = 1000;
const FAKE_RESPONSE_SIZE: u64 = 1000;

/// Traditional font hosting: the whole file is fetched the first time a font
/// is used and served from cache afterwards.
#[derive(Debug, Default, Clone, Copy)]
pub struct WholeFontMethod;

impl PfeMethod for WholeFontMethod {
    fn name(&self) -> &str {
        "WholeFont"
    }

    fn start_session<'a>(
        &self,
        _network_model: Option<&NetworkModel>,
        resources: SessionResources<'a>,
    ) -> Result<Box<dyn PfeSession + 'a>> {
        Ok(Box::new(WholeFontSession {
            resources,
            loaded_fonts: BTreeSet::new(),
            request_graphs: Vec::new(),
        }))
    }
}

struct WholeFontSession<'a> {
    resources: SessionResources<'a>,
    loaded_fonts: BTreeSet<String>,
    request_graphs: Vec<RequestGraph>,
}

impl WholeFontSession<'_> {
    fn font_size(&self, font_id: &str) -> Result<u64> {
        let fonts = self.resources.fonts;
        self.resources
            .sizes
            .get_or_try_insert_with(&format!("whole_font:{font_id}"), || {
                Ok(fonts.load(font_id)?.len() as u64)
            })
    }
}

impl PfeSession for WholeFontSession<'_> {
    fn page_view(&mut self, usage_by_font: &UsageByFont) -> Result<()> {
        let mut builder = RequestGraph::builder();
        for (font_id, usage) in usage_by_font {
            if usage.codepoints.is_empty() || self.loaded_fonts.contains(font_id) {
                continue;
            }
            let size = self.font_size(font_id)?;
            debug!("WholeFont fetching {} ({} bytes)", font_id, size);
            builder.request(
                ESTIMATED_HTTP_REQUEST_HEADER_SIZE,
                ESTIMATED_HTTP_RESPONSE_HEADER_SIZE + size,
            );
            self.loaded_fonts.insert(font_id.clone());
        }
        self.request_graphs.push(builder.build());
        Ok(())
    }

    fn request_graphs(&self) -> &[RequestGraph] {
        &self.request_graphs
    }
}

/// Demonstration method: one fixed size request per page view.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeMethod;

impl PfeMethod for FakeMethod {
    fn name(&self) -> &str {
        "Fake"
    }

    fn start_session<'a>(
        &self,
        _network_model: Option<&NetworkModel>,
        _resources: SessionResources<'a>,
    ) -> Result<Box<dyn PfeSession + 'a>> {
        Ok(Box::new(FakeSession::default()))
    }
}

#[derive(Default)]
struct FakeSession {
    request_graphs: Vec<RequestGraph>,
}

impl PfeSession for FakeSession {
    fn page_view(&mut self, _usage_by_font: &UsageByFont) -> Result<()> {
        let mut builder = RequestGraph::builder();
        builder.request(FAKE_REQUEST_SIZE, FAKE_RESPONSE_SIZE);
        self.request_graphs.push(builder.build());
        Ok(())
    }

    fn request_graphs(&self) -> &[RequestGraph] {
        &self.request_graphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pfe_sim_abstract::{FontStore, FontUsage, SimError, SizeCache};
    use std::cell::Cell;

    struct CountingStore {
        loads: Cell<usize>,
    }

    impl FontStore for CountingStore {
        fn load(&self, font_id: &str) -> Result<Bytes> {
            self.loads.set(self.loads.get() + 1);
            match font_id {
                "Roboto.ttf" => Ok(Bytes::from(vec![0u8; 1000])),
                "Lato.ttf" => Ok(Bytes::from(vec![0u8; 500])),
                _ => Err(SimError::FontNotFound {
                    font_id: font_id.to_string(),
                }),
            }
        }
    }

    fn usage(entries: &[(&str, &[u32])]) -> UsageByFont {
        entries
            .iter()
            .map(|(font, codepoints)| {
                (
                    font.to_string(),
                    FontUsage {
                        codepoints: codepoints.iter().copied().collect(),
                        glyph_ids: BTreeSet::new(),
                    },
                )
            })
            .collect()
    }

    fn sizes(graph: &RequestGraph) -> Vec<(u64, u64)> {
        graph
            .requests()
            .iter()
            .map(|r| (r.request_size(), r.response_size()))
            .collect()
    }

    #[test]
    fn test_whole_font_fetches_each_font_once() {
        let store = CountingStore {
            loads: Cell::new(0),
        };
        let cache = SizeCache::new();
        let mut session = WholeFontMethod
            .start_session(None, SessionResources::new(&store, &cache))
            .unwrap();

        session
            .page_view(&usage(&[("Roboto.ttf", &[0x61, 0x62]), ("Lato.ttf", &[])]))
            .unwrap();
        session
            .page_view(&usage(&[("Roboto.ttf", &[0x63]), ("Lato.ttf", &[0x41])]))
            .unwrap();
        session.page_view(&usage(&[("Lato.ttf", &[0x42])])).unwrap();

        let graphs = session.request_graphs();
        assert_eq!(graphs.len(), 3);
        assert_eq!(sizes(&graphs[0]), vec![(35, 1035)]);
        assert_eq!(sizes(&graphs[1]), vec![(35, 535)]);
        assert!(graphs[2].is_empty());
    }

    #[test]
    fn test_whole_font_sizes_are_cached_across_sessions() {
        let store = CountingStore {
            loads: Cell::new(0),
        };
        let cache = SizeCache::new();
        for _ in 0..3 {
            let mut session = WholeFontMethod
                .start_session(None, SessionResources::new(&store, &cache))
                .unwrap();
            session
                .page_view(&usage(&[("Roboto.ttf", &[0x61])]))
                .unwrap();
        }
        assert_eq!(store.loads.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_whole_font_missing_font_fails_page_view() {
        let store = CountingStore {
            loads: Cell::new(0),
        };
        let cache = SizeCache::new();
        let mut session = WholeFontMethod
            .start_session(None, SessionResources::new(&store, &cache))
            .unwrap();
        assert!(matches!(
            session.page_view(&usage(&[("Missing.ttf", &[0x61])])),
            Err(SimError::FontNotFound { .. })
        ));
    }

    #[test]
    fn test_fake_emits_one_request_per_page_view() {
        let store = CountingStore {
            loads: Cell::new(0),
        };
        let cache = SizeCache::new();
        let mut session = FakeMethod
            .start_session(None, SessionResources::new(&store, &cache))
            .unwrap();
        for _ in 0..4 {
            session.page_view(&UsageByFont::new()).unwrap();
        }
        let graphs = session.request_graphs();
        assert_eq!(graphs.len(), 4);
        assert!(graphs.iter().all(|g| sizes(g) == vec![(1000, 1000)]));
        assert_eq!(store.loads.get(), 0);
    }
}
