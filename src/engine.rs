use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::config::EngineConfig;
use crate::domain::graph::load_graph;
use crate::domain::{Delivery, GraphStore, Routes, Segment, Vehicle};
use crate::errors::{EngineError, EngineResult};
use crate::events::{self, Event};
use crate::resilience;
use crate::solver::aco::AcoParams;
use crate::solver::adaptive;
use crate::solver::rl::{QLearner, QParams};
use crate::solver::vrp;

use std::collections::HashMap;

/// Owns every piece of mutable state the routing subsystems share: the graph, the
/// registered fleet and demand, the Q-table, and the single seeded PRNG threaded
/// through every stochastic call site (§6, explicit `Engine` value rather than a
/// process-global record).
pub struct Engine {
    config: EngineConfig,
    graph: Option<GraphStore>,
    vehicles: Vec<Vehicle>,
    deliveries: Vec<Delivery>,
    last_routes: Routes,
    ql: QLearner,
    rng: ChaCha8Rng,
}

impl Engine {
    pub fn new(config: EngineConfig, seed: u64) -> Self {
        let ql_params = QParams {
            alpha: config.rl_alpha,
            gamma: config.rl_gamma,
            epsilon: config.rl_epsilon,
        };
        Self {
            config,
            graph: None,
            vehicles: Vec::new(),
            deliveries: Vec::new(),
            last_routes: Routes::new(),
            ql: QLearner::new(ql_params),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    fn aco_params(&self) -> AcoParams {
        AcoParams {
            ants: self.config.aco_ants,
            iterations: self.config.aco_iters,
            ..AcoParams::default()
        }
    }

    #[instrument(level = "info", skip(self))]
    pub fn load_graph(&mut self, mode: &str, n_nodes: usize, seed: u64) -> EngineResult<()> {
        let graph = load_graph(mode, n_nodes, seed)?;
        self.graph = Some(graph);
        Ok(())
    }

    pub fn register_vehicles(&mut self, vehicles: Vec<Vehicle>) {
        self.vehicles = vehicles;
    }

    pub fn register_deliveries(&mut self, deliveries: Vec<Delivery>) {
        self.deliveries = deliveries;
    }

    /// Greedy VRP seed assignment. Requires both a loaded graph and a non-empty
    /// fleet and demand list.
    pub fn initial_route(&mut self) -> EngineResult<(Routes, f64)> {
        let graph = self.graph.as_ref().ok_or(EngineError::GraphNotLoaded)?;
        if self.vehicles.is_empty() || self.deliveries.is_empty() {
            return Err(EngineError::FleetEmpty);
        }
        let (routes, cost) = vrp::initial_plan(graph, &self.vehicles, &self.deliveries);
        self.last_routes = routes.clone();
        info!(cost, "initial route computed");
        Ok((routes, cost))
    }

    /// Applies a single event to the graph/fleet/delivery state in place. Never
    /// requires a loaded graph (§6: `post_event`'s Errors column is empty): a
    /// `road_block` against a missing graph simply has nothing to block and
    /// no-ops, while `fuel_shortage`/`new_order` never touched the graph anyway.
    pub fn post_event(&mut self, event: Event) -> EngineResult<()> {
        events::ingest(
            event,
            self.graph.as_mut(),
            &mut self.vehicles,
            &mut self.deliveries,
        );
        Ok(())
    }

    /// One GA + ACO-chained-routing + Q-learning-update cycle. Only requires a
    /// loaded graph: an empty fleet yields empty routes rather than an error,
    /// matching §6's table (unlike `initial_route`, this never reports `FleetEmpty`).
    #[instrument(level = "info", skip(self))]
    pub fn adaptive_route(
        &mut self,
    ) -> EngineResult<(Routes, f64, HashMap<String, Vec<Segment>>)> {
        let graph = self.graph.as_ref().ok_or(EngineError::GraphNotLoaded)?;
        let aco_params = self.aco_params();
        let (routes, cost, segments) = adaptive::recompute(
            graph,
            &self.vehicles,
            &self.deliveries,
            &mut self.rng,
            &mut self.ql,
            &aco_params,
        );
        self.last_routes = routes.clone();
        Ok((routes, cost, segments))
    }

    /// Peripheral health scalar over the most recently computed routes. Tolerates
    /// a missing graph (returns 0.0) rather than erroring, per §6.
    pub fn resilience_score(&self) -> f64 {
        match &self.graph {
            Some(graph) => resilience::score(graph, self.deliveries.len(), &self.last_routes),
            None => 0.0,
        }
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    pub fn graph(&self) -> Option<&GraphStore> {
        self.graph.as_ref()
    }

    pub fn q_table_size(&self) -> usize {
        self.ql.len()
    }
}
