use bytes::Bytes;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::corpus::UsageByFont;
use crate::error::Result;
use crate::network::NetworkModel;
use crate::request::RequestGraph;

/// Read-only source of font binaries.
pub trait FontStore {
    /// Load the bytes of `font_id`. Implementations memoize for their lifetime.
    fn load(&self, font_id: &str) -> Result<Bytes>;
}

/// Memo of derived sizes (e.g. encoded font sizes) owned by one worker.
///
/// Never shared across workers; each worker builds its own.
#[derive(Debug, Default)]
pub struct SizeCache {
    sizes: RefCell<HashMap<String, u64>>,
}

impl SizeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_try_insert_with<F>(&self, key: &str, compute: F) -> Result<u64>
    where
        F: FnOnce() -> Result<u64>,
    {
        if let Some(size) = self.sizes.borrow().get(key) {
            return Ok(*size);
        }
        let size = compute()?;
        self.sizes.borrow_mut().insert(key.to_string(), size);
        Ok(size)
    }

    pub fn len(&self) -> usize {
        self.sizes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.borrow().is_empty()
    }
}

/// Worker-local collaborators handed to every session.
#[derive(Clone, Copy)]
pub struct SessionResources<'a> {
    pub fonts: &'a dyn FontStore,
    pub sizes: &'a SizeCache,
}

impl<'a> SessionResources<'a> {
    pub fn new(fonts: &'a dyn FontStore, sizes: &'a SizeCache) -> Self {
        Self { fonts, sizes }
    }
}

/// Whether a method plans its downloads differently per network model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkSensitivity {
    #[default]
    Insensitive,
    Sensitive,
}

/// A progressive font enrichment strategy.
pub trait PfeMethod: Send + Sync {
    fn name(&self) -> &str;

    /// Insensitive methods are simulated once and the graphs reused for every model.
    fn sensitivity(&self) -> NetworkSensitivity {
        NetworkSensitivity::Insensitive
    }

    /// `network_model` is `None` for insensitive methods. A failure here drops
    /// the sequence the session was started for.
    fn start_session<'a>(
        &self,
        network_model: Option<&NetworkModel>,
        resources: SessionResources<'a>,
    ) -> Result<Box<dyn PfeSession + 'a>>;
}

/// Tracks the enrichment of fonts across the page views of one sequence.
pub trait PfeSession {
    /// Called once per page view, in order. State carries over between calls.
    fn page_view(&mut self, usage_by_font: &UsageByFont) -> Result<()>;

    /// One graph per page view processed so far, in page view order.
    fn request_graphs(&self) -> &[RequestGraph];
}

/// A registered method with its sensitivity resolved once.
#[derive(Clone)]
pub struct MethodEntry {
    method: Arc<dyn PfeMethod>,
    sensitivity: NetworkSensitivity,
}

impl MethodEntry {
    pub fn new(method: Arc<dyn PfeMethod>) -> Self {
        let sensitivity = method.sensitivity();
        Self {
            method,
            sensitivity,
        }
    }

    pub fn name(&self) -> &str {
        self.method.name()
    }

    pub fn sensitivity(&self) -> NetworkSensitivity {
        self.sensitivity
    }

    pub fn method(&self) -> &dyn PfeMethod {
        self.method.as_ref()
    }
}

impl std::fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodEntry")
            .field("name", &self.name())
            .field("sensitivity", &self.sensitivity)
            .finish()
    }
}
