use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, SimError};

/// Tag 0 is reserved for graphs built without a builder, which hold no requests.
static NEXT_GRAPH_TAG: AtomicU64 = AtomicU64::new(1);

/// Handle to a request inside the graph that owns it.
///
/// Requests are compared by handle, never by content: two requests with the
/// same sizes are still two separate downloads. The handle remembers which
/// builder issued it, so a handle from another graph never aliases a local
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId {
    graph: u64,
    index: usize,
}

impl RequestId {
    pub fn index(self) -> usize {
        self.index
    }
}

/// A single download: bytes sent, bytes received, and the requests that must
/// finish before it may start.
#[derive(Debug, Clone)]
pub struct Request {
    request_size: u64,
    response_size: u64,
    happens_after: BTreeSet<RequestId>,
}

impl Request {
    pub fn request_size(&self) -> u64 {
        self.request_size
    }

    pub fn response_size(&self) -> u64 {
        self.response_size
    }

    pub fn happens_after(&self) -> &BTreeSet<RequestId> {
        &self.happens_after
    }
}

/// Everything that has to be downloaded to satisfy one page view.
///
/// Built once through [`GraphBuilder`] and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct RequestGraph {
    tag: u64,
    requests: Vec<Request>,
}

impl RequestGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    /// A graph for a page view that needed nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn contains(&self, id: RequestId) -> bool {
        id.graph == self.tag && id.index < self.requests.len()
    }

    pub fn get(&self, id: RequestId) -> Option<&Request> {
        if id.graph != self.tag {
            return None;
        }
        self.requests.get(id.index)
    }

    pub fn ids(&self) -> impl Iterator<Item = RequestId> + '_ {
        let graph = self.tag;
        (0..self.requests.len()).map(move |index| RequestId { graph, index })
    }

    pub fn total_request_bytes(&self) -> u64 {
        self.requests.iter().map(Request::request_size).sum()
    }

    pub fn total_response_bytes(&self) -> u64 {
        self.requests.iter().map(Request::response_size).sum()
    }

    /// True when every predecessor of `id` is marked in `completed`.
    ///
    /// A predecessor from another graph can never complete.
    pub fn can_run(&self, id: RequestId, completed: &[bool]) -> bool {
        self.get(id).is_some_and(|request| {
            request
                .happens_after
                .iter()
                .all(|dep| {
                    self.contains(*dep) && completed.get(dep.index).copied().unwrap_or(false)
                })
        })
    }

    /// Requests not yet completed whose predecessors all are.
    ///
    /// `completed` is indexed by [`RequestId::index`] and must be as long as the graph.
    pub fn requests_that_can_run(&self, completed: &[bool]) -> Vec<RequestId> {
        self.ids()
            .filter(|id| !completed[id.index] && self.can_run(*id, completed))
            .collect()
    }

    pub fn all_requests_completed(&self, completed: &[bool]) -> bool {
        completed.len() >= self.requests.len()
            && completed[..self.requests.len()].iter().all(|done| *done)
    }
}

#[derive(Debug)]
pub struct GraphBuilder {
    tag: u64,
    requests: Vec<Request>,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self {
            tag: NEXT_GRAPH_TAG.fetch_add(1, Ordering::Relaxed),
            requests: Vec::new(),
        }
    }
}

impl GraphBuilder {
    /// Add a request with no predecessors.
    pub fn request(&mut self, request_size: u64, response_size: u64) -> RequestId {
        self.request_after(request_size, response_size, &[])
    }

    /// Predecessors issued by another builder are kept and never satisfied,
    /// so the scheduler reports the graph instead of running it.
    pub fn request_after(
        &mut self,
        request_size: u64,
        response_size: u64,
        happens_after: &[RequestId],
    ) -> RequestId {
        let id = RequestId {
            graph: self.tag,
            index: self.requests.len(),
        };
        self.requests.push(Request {
            request_size,
            response_size,
            happens_after: happens_after.iter().copied().collect(),
        });
        id
    }

    /// Record that `id` must wait for `dependency`.
    ///
    /// Nothing stops this from closing a cycle; the scheduler reports it.
    /// Fails if `id` was not issued by this builder.
    pub fn happens_after(&mut self, id: RequestId, dependency: RequestId) -> Result<&mut Self> {
        if id.graph != self.tag {
            return Err(SimError::ForeignRequest { index: id.index });
        }
        let request = self
            .requests
            .get_mut(id.index)
            .ok_or(SimError::ForeignRequest { index: id.index })?;
        request.happens_after.insert(dependency);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn build(self) -> RequestGraph {
        RequestGraph {
            tag: self.tag,
            requests: self.requests,
        }
    }
}
