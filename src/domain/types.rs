use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A node's deterministic 2-D placement in the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn euclidean(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub start_node: usize,
    #[serde(default = "default_capacity")]
    pub fuel_capacity: f64,
    #[serde(default = "default_capacity")]
    pub load_capacity: f64,
}

fn default_capacity() -> f64 {
    100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    pub id: String,
    pub node: usize,
    #[serde(default = "default_demand")]
    pub demand: f64,
    #[serde(default)]
    pub deadline: Option<f64>,
}

fn default_demand() -> f64 {
    1.0
}

/// Unordered edge identity. Canonicalises `(u, v)` so that pheromone/weight/blocked
/// lookups never depend on discovery orientation (§4.3's "try both orientations").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey(pub usize, pub usize);

impl EdgeKey {
    pub fn new(u: usize, v: usize) -> Self {
        if u <= v {
            EdgeKey(u, v)
        } else {
            EdgeKey(v, u)
        }
    }
}

/// vehicle-id -> ordered sequence of node ids, route[0] == vehicle.start_node.
pub type Routes = HashMap<String, Vec<usize>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
    pub len: usize,
}
