use std::collections::HashMap;

use rayon::prelude::*;
use tracing::debug;

use crate::domain::{Delivery, GraphStore, Routes, Vehicle};

/// Greedy nearest-by-shortest-path initial assignment (§4.5). Deliveries are handled
/// demand-descending; each goes to the cheapest-reachable vehicle with spare
/// capacity, or — failing that — the vehicle with the most remaining capacity,
/// letting it go negative (a deliberate, observable overflow per §9).
pub fn initial_plan(
    graph: &GraphStore,
    vehicles: &[Vehicle],
    deliveries: &[Delivery],
) -> (Routes, f64) {
    if vehicles.is_empty() {
        return (Routes::new(), 0.0);
    }

    let mut sorted: Vec<&Delivery> = deliveries.iter().collect();
    sorted.sort_by(|a, b| b.demand.total_cmp(&a.demand));

    // Every (vehicle, delivery) shortest path is independent of the others, so the
    // cache is built in parallel; only the resulting map's contents matter, not the
    // order pairs complete in (mirrors the teacher's candidate-evaluation pattern).
    let pairs: Vec<(usize, &Vehicle, &Delivery)> = vehicles
        .iter()
        .enumerate()
        .flat_map(|(vi, vehicle)| deliveries.iter().map(move |d| (vi, vehicle, d)))
        .collect();
    let sp_cache: HashMap<(usize, &str), (Vec<usize>, f64)> = pairs
        .par_iter()
        .filter_map(|&(vi, vehicle, d)| {
            graph
                .dijkstra(vehicle.start_node, d.node)
                .map(|sp| ((vi, d.id.as_str()), sp))
        })
        .collect();

    let mut remaining_capacity: Vec<f64> = vehicles.iter().map(|v| v.load_capacity).collect();
    let mut routes: Routes = vehicles
        .iter()
        .map(|v| (v.id.clone(), vec![v.start_node]))
        .collect();
    let mut total_cost = 0.0;

    for delivery in sorted {
        let mut best: Option<(f64, usize)> = None;
        for vi in 0..vehicles.len() {
            if remaining_capacity[vi] < delivery.demand {
                continue;
            }
            if let Some((_, weight)) = sp_cache.get(&(vi, delivery.id.as_str())) {
                if best.map(|(d, _)| *weight < d).unwrap_or(true) {
                    best = Some((*weight, vi));
                }
            }
        }

        let vi = match best {
            Some((_, vi)) => vi,
            None => remaining_capacity
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
                .map(|(i, _)| i)
                .expect("non-empty fleet"),
        };

        if let Some((path, weight)) = sp_cache.get(&(vi, delivery.id.as_str())) {
            let route = routes.get_mut(&vehicles[vi].id).expect("route preallocated");
            route.extend(path[1..].iter().copied());
            remaining_capacity[vi] -= delivery.demand;
            total_cost += weight;
        } else {
            debug!(delivery = %delivery.id, "no reachable path for delivery, skipped");
        }
    }

    (routes, total_cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::load_graph;

    fn vehicle(id: &str, start: usize, cap: f64) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            start_node: start,
            fuel_capacity: 100.0,
            load_capacity: cap,
        }
    }

    fn delivery(id: &str, node: usize, demand: f64) -> Delivery {
        Delivery {
            id: id.to_string(),
            node,
            demand,
            deadline: None,
        }
    }

    #[test]
    fn routes_start_at_vehicle_start_and_cost_matches_segments() {
        let graph = load_graph("synthetic", 30, 42).unwrap();
        let vehicles = vec![vehicle("v1", 0, 10.0), vehicle("v2", 1, 10.0)];
        let deliveries = vec![
            delivery("d1", 5, 2.0),
            delivery("d2", 10, 2.0),
            delivery("d3", 15, 2.0),
        ];
        let (routes, total_cost) = initial_plan(&graph, &vehicles, &deliveries);

        assert_eq!(routes.len(), 2);
        for vehicle in &vehicles {
            let route = &routes[&vehicle.id];
            assert_eq!(route[0], vehicle.start_node);
            for pair in route.windows(2) {
                assert!(graph.edge_exists(pair[0], pair[1]));
            }
        }

        let recomputed: f64 = routes
            .values()
            .map(|route| graph.path_weight(route))
            .sum();
        assert!((recomputed - total_cost).abs() < 1e-9);
        assert!(total_cost >= 0.0);
    }

    #[test]
    fn empty_fleet_yields_empty_routes() {
        let graph = load_graph("synthetic", 10, 1).unwrap();
        let (routes, cost) = initial_plan(&graph, &[], &[delivery("d1", 2, 1.0)]);
        assert!(routes.is_empty());
        assert_eq!(cost, 0.0);
    }
}
