use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Delivery, GraphStore, Vehicle};

/// Tagged event variant (§9 redesign flag) instead of a free-form `{type, payload}` bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Event {
    RoadBlock { u: usize, v: usize },
    FuelShortage { vehicle_id: String, reduction: f64 },
    NewOrder(Delivery),
}

/// Applies a single event to the graph/fleet/delivery state. Unknown vehicle ids in
/// a `fuel_shortage` payload or a `road_block` against a non-existent edge are
/// no-ops, never errors, per §4.6/§7. `graph` is `None` when no graph has been
/// loaded yet; `road_block` then has nothing to apply to and no-ops rather than
/// erroring, since `post_event` itself never reports `GraphNotLoaded` (§6).
/// Vehicles/deliveries are kept in registration order (a `Vec`, not a map) so GA
/// index sampling stays reproducible; `new_order` overwrites in place when the id
/// already exists rather than reordering.
pub fn ingest(
    event: Event,
    graph: Option<&mut GraphStore>,
    vehicles: &mut [Vehicle],
    deliveries: &mut Vec<Delivery>,
) {
    match event {
        Event::RoadBlock { u, v } => match graph {
            Some(graph) if graph.block_edge(u, v) => info!(u, v, "road block applied"),
            Some(_) => debug!(u, v, "road block ignored: edge does not exist"),
            None => debug!(u, v, "road block ignored: no graph loaded"),
        },
        Event::FuelShortage {
            vehicle_id,
            reduction,
        } => match vehicles.iter_mut().find(|v| v.id == vehicle_id) {
            Some(vehicle) => {
                vehicle.fuel_capacity = (vehicle.fuel_capacity - reduction).max(0.0);
                debug!(vehicle_id, reduction, "fuel shortage applied");
            }
            None => debug!(vehicle_id, "fuel shortage ignored: unknown vehicle"),
        },
        Event::NewOrder(delivery) => {
            debug!(id = %delivery.id, "new order ingested");
            match deliveries.iter_mut().find(|d| d.id == delivery.id) {
                Some(existing) => *existing = delivery,
                None => deliveries.push(delivery),
            }
        }
    }
}
