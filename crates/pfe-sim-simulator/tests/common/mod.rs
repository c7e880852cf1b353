//! Test methods and fixtures shared by the integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use pfe_sim_abstract::{
    FontStore, MethodEntry, NetworkModel, NetworkSensitivity, PageContent, PageView,
    PageViewSequence, PfeMethod, PfeSession, RequestGraph, Result, SessionResources, SimError,
    UsageByFont, WorkerConfig,
};

/// Codepoint that makes [`CountingMethod::fragile`] sessions fail.
pub const POISON: u32 = 0xFFFF;

/// Store with no fonts; the test methods never load any.
pub struct EmptyStore;

impl FontStore for EmptyStore {
    fn load(&self, font_id: &str) -> Result<Bytes> {
        Err(SimError::FontNotFound {
            font_id: font_id.to_string(),
        })
    }
}

pub fn open_empty_store(_config: &WorkerConfig) -> EmptyStore {
    EmptyStore
}

pub fn worker_config() -> WorkerConfig {
    WorkerConfig {
        font_directory: PathBuf::from("fonts"),
        default_font_id: None,
    }
}

#[derive(Clone, Copy)]
pub enum Behaviour {
    /// One request per page view: 10 bytes up, 100 bytes per codepoint down.
    Steady,
    /// Like `Steady` but fails on [`POISON`].
    Fragile,
    /// Never produces a graph.
    Silent,
    /// Emits a two request cycle on every page view.
    Cyclic,
    /// Like `Steady` but panics on [`POISON`].
    Panicky,
    /// Like `Steady` but its second session fails to start.
    Unready,
}

/// Records how sessions are started so tests can check the driver.
pub struct CountingMethod {
    name: String,
    behaviour: Behaviour,
    sensitivity: NetworkSensitivity,
    pub sessions: AtomicUsize,
    pub sessions_with_model: AtomicUsize,
}

impl CountingMethod {
    pub fn new(name: &str, behaviour: Behaviour, sensitivity: NetworkSensitivity) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            behaviour,
            sensitivity,
            sessions: AtomicUsize::new(0),
            sessions_with_model: AtomicUsize::new(0),
        })
    }

    pub fn steady() -> Arc<Self> {
        Self::new("Steady", Behaviour::Steady, NetworkSensitivity::Insensitive)
    }

    pub fn fragile() -> Arc<Self> {
        Self::new("Fragile", Behaviour::Fragile, NetworkSensitivity::Insensitive)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

impl PfeMethod for CountingMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn sensitivity(&self) -> NetworkSensitivity {
        self.sensitivity
    }

    fn start_session<'a>(
        &self,
        network_model: Option<&NetworkModel>,
        _resources: SessionResources<'a>,
    ) -> Result<Box<dyn PfeSession + 'a>> {
        let started = self.sessions.fetch_add(1, Ordering::SeqCst);
        if network_model.is_some() {
            self.sessions_with_model.fetch_add(1, Ordering::SeqCst);
        }
        if matches!(self.behaviour, Behaviour::Unready) && started == 1 {
            return Err(SimError::Session {
                method: self.name.clone(),
                message: "not ready".into(),
            });
        }
        Ok(Box::new(CountingSession {
            method: self.name.clone(),
            behaviour: self.behaviour,
            graphs: Vec::new(),
        }))
    }
}

struct CountingSession {
    method: String,
    behaviour: Behaviour,
    graphs: Vec<RequestGraph>,
}

impl PfeSession for CountingSession {
    fn page_view(&mut self, usage_by_font: &UsageByFont) -> Result<()> {
        let codepoints: usize = usage_by_font.values().map(|u| u.codepoints.len()).sum();
        let mut builder = RequestGraph::builder();
        match self.behaviour {
            Behaviour::Silent => return Ok(()),
            Behaviour::Fragile
                if usage_by_font
                    .values()
                    .any(|u| u.codepoints.contains(&POISON)) =>
            {
                return Err(SimError::Session {
                    method: self.method.clone(),
                    message: "unsupported codepoint".into(),
                });
            }
            Behaviour::Panicky
                if usage_by_font
                    .values()
                    .any(|u| u.codepoints.contains(&POISON)) =>
            {
                let sizes: Vec<u64> = Vec::new();
                builder.request(10, sizes[codepoints]);
            }
            Behaviour::Cyclic => {
                let a = builder.request(1, 1);
                let b = builder.request_after(1, 1, &[a]);
                builder.happens_after(a, b)?;
            }
            Behaviour::Steady | Behaviour::Fragile | Behaviour::Panicky | Behaviour::Unready => {
                builder.request(10, 100 * codepoints as u64);
            }
        }
        self.graphs.push(builder.build());
        Ok(())
    }

    fn request_graphs(&self) -> &[RequestGraph] {
        &self.graphs
    }
}

pub fn entries(methods: &[Arc<CountingMethod>]) -> Vec<MethodEntry> {
    methods
        .iter()
        .map(|m| MethodEntry::new(m.clone() as Arc<dyn PfeMethod>))
        .collect()
}

/// Two models sharing the "test" category with equal weight.
pub fn models() -> Vec<NetworkModel> {
    vec![
        NetworkModel::new("fast", 10.0, 100.0, 100.0).with_category("test", 0.5),
        NetworkModel::new("slow", 100.0, 10.0, 10.0).with_category("test", 0.5),
    ]
}

pub fn page(codepoints: &[u32]) -> PageView {
    PageView {
        contents: vec![PageContent::new("Roboto-Regular.ttf", codepoints.iter().copied())],
    }
}

pub fn sequence(pages: &[&[u32]]) -> PageViewSequence {
    PageViewSequence::new(pages.iter().map(|p| page(p)).collect())
}

/// `count` sequences whose page sizes vary with their index.
pub fn corpus(count: usize) -> Vec<PageViewSequence> {
    (0..count as u32)
        .map(|i| {
            let first: Vec<u32> = (0x41..0x41 + i + 1).collect();
            let second: Vec<u32> = (0x61..0x61 + 2 * i + 1).collect();
            sequence(&[&first, &second])
        })
        .collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}
