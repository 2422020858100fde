use crate::domain::{GraphStore, Routes};

/// `|deliveries| / (1 + 0.01 * sum(route lengths) + |blocked_edges|)`, rounded to
/// 4 decimals (§4.9). A peripheral scalar health proxy, not fed back into any optimiser.
pub fn score(graph: &GraphStore, deliveries_count: usize, routes: &Routes) -> f64 {
    let route_len_sum: usize = routes.values().map(|r| r.len()).sum();
    let blocked = graph.blocked_edges().len();
    let denom = 1.0 + 0.01 * route_len_sum as f64 + blocked as f64;
    let raw = deliveries_count as f64 / denom;
    (raw * 10_000.0).round() / 10_000.0
}
