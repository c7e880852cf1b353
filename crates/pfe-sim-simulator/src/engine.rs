//! Layered request graph scheduler.
//!
//! Every request whose predecessors have finished runs in the same round.
//! A round costs one RTT plus the round's bytes pushed through the link
//! bandwidth; rounds repeat until the graph is complete.

use pfe_sim_abstract::{GraphTotal, NetworkModel, RequestGraph, RequestId, Result, SimError};
use tracing::debug;

/// Total elapsed time and byte counts to satisfy `graph` under `network_model`.
///
/// Fails with [`SimError::GraphHasCycles`] if some requests can never run.
pub fn schedule(graph: &RequestGraph, network_model: &NetworkModel) -> Result<GraphTotal> {
    let mut completed = vec![false; graph.len()];
    let mut remaining = graph.len();
    let mut total_time = 0.0;
    let mut round = 0usize;

    while remaining > 0 {
        let frontier = graph.requests_that_can_run(&completed);
        if frontier.is_empty() {
            return Err(SimError::GraphHasCycles { remaining });
        }

        let round_time = network_time_for(graph, &frontier, network_model);
        debug!(
            "[{}] round {} runs {} request(s) in {:.2} ms",
            network_model.name,
            round,
            frontier.len(),
            round_time
        );
        total_time += round_time;

        for id in &frontier {
            completed[id.index()] = true;
        }
        remaining -= frontier.len();
        round += 1;
    }

    Ok(GraphTotal {
        total_time,
        request_bytes: graph.total_request_bytes(),
        response_bytes: graph.total_response_bytes(),
        num_requests: graph.len() as u64,
    })
}

/// Time to run a set of requests concurrently in one round.
pub fn network_time_for(
    graph: &RequestGraph,
    frontier: &[RequestId],
    network_model: &NetworkModel,
) -> f64 {
    let (request_bytes, response_bytes) = frontier
        .iter()
        .filter_map(|id| graph.get(*id))
        .fold((0u64, 0u64), |(up, down), r| {
            (up + r.request_size(), down + r.response_size())
        });
    network_model.round_time(request_bytes, response_bytes)
}

/// Schedule each graph of a sequence against one model.
pub fn totals_for_network(
    graphs: &[RequestGraph],
    network_model: &NetworkModel,
) -> Result<Vec<GraphTotal>> {
    graphs
        .iter()
        .map(|graph| schedule(graph, network_model))
        .collect()
}
