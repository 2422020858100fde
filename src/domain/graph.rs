use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::domain::types::{EdgeKey, Position};
use crate::errors::{EngineError, EngineResult};

const CONNECT_RADIUS: f64 = 0.25;
const BLOCK_PENALTY: f64 = 10.0;

/// Undirected weighted graph plus the blocked-edge set. Owns positions and adjacency
/// directly instead of leaning on a general graph library (§9 redesign flag): both
/// Dijkstra and connected-components are small enough to keep in-house.
#[derive(Debug, Clone)]
pub struct GraphStore {
    positions: Vec<Position>,
    adjacency: Vec<Vec<usize>>,
    weights: HashMap<EdgeKey, f64>,
    blocked_edges: HashSet<EdgeKey>,
}

impl GraphStore {
    pub fn empty() -> Self {
        Self {
            positions: Vec::new(),
            adjacency: Vec::new(),
            weights: HashMap::new(),
            blocked_edges: HashSet::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub fn position(&self, node: usize) -> Position {
        self.positions[node]
    }

    pub fn neighbours(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }

    pub fn edge_exists(&self, u: usize, v: usize) -> bool {
        self.weights.contains_key(&EdgeKey::new(u, v))
    }

    pub fn edge_weight(&self, u: usize, v: usize) -> Option<f64> {
        self.weights.get(&EdgeKey::new(u, v)).copied()
    }

    pub fn blocked_edges(&self) -> &HashSet<EdgeKey> {
        &self.blocked_edges
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.weights.keys().copied()
    }

    /// Adds an undirected edge. No-op (besides the weight overwrite) if it already
    /// exists — the builder only ever calls this once per pair.
    fn add_edge(&mut self, u: usize, v: usize, weight: f64) {
        let key = EdgeKey::new(u, v);
        if self.weights.insert(key, weight).is_none() {
            self.adjacency[u].push(v);
            self.adjacency[v].push(u);
        }
    }

    /// Applies a `road_block` event: multiplies the edge's current weight by 10.
    /// Per the recorded open-question decision, re-blocking an already-blocked edge
    /// compounds the penalty again (matches the source's unconditional `*= 10.0`);
    /// only set membership in `blocked_edges` is idempotent.
    pub fn block_edge(&mut self, u: usize, v: usize) -> bool {
        let key = EdgeKey::new(u, v);
        if let Some(w) = self.weights.get_mut(&key) {
            *w *= BLOCK_PENALTY;
            self.blocked_edges.insert(key);
            true
        } else {
            false
        }
    }

    /// Connected components in BFS discovery order, scanning unvisited nodes 0..n.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let n = self.node_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(start);
            visited[start] = true;
            while let Some(node) = queue.pop_front() {
                component.push(node);
                for &nbr in &self.adjacency[node] {
                    if !visited[nbr] {
                        visited[nbr] = true;
                        queue.push_back(nbr);
                    }
                }
            }
            components.push(component);
        }
        components
    }

    pub fn is_connected(&self) -> bool {
        self.node_count() == 0 || self.connected_components().len() == 1
    }

    /// Dijkstra shortest path on current (possibly block-penalised) weights.
    /// Returns `None` if `dst` is unreachable from `src`.
    pub fn dijkstra(&self, src: usize, dst: usize) -> Option<(Vec<usize>, f64)> {
        if src == dst {
            return Some((vec![src], 0.0));
        }
        let n = self.node_count();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev = vec![usize::MAX; n];
        let mut heap = BinaryHeap::new();

        dist[src] = 0.0;
        heap.push(HeapEntry {
            cost: 0.0,
            node: src,
        });

        while let Some(HeapEntry { cost, node }) = heap.pop() {
            if node == dst {
                break;
            }
            if cost > dist[node] {
                continue;
            }
            for &nbr in &self.adjacency[node] {
                let w = self.edge_weight(node, nbr).unwrap_or(f64::INFINITY);
                let next_cost = cost + w;
                if next_cost < dist[nbr] {
                    dist[nbr] = next_cost;
                    prev[nbr] = node;
                    heap.push(HeapEntry {
                        cost: next_cost,
                        node: nbr,
                    });
                }
            }
        }

        if dist[dst].is_infinite() {
            return None;
        }

        let mut path = vec![dst];
        let mut curr = dst;
        while curr != src {
            curr = prev[curr];
            path.push(curr);
        }
        path.reverse();
        Some((path, dist[dst]))
    }

    /// Total weight of consecutive edges along `path` on current weights.
    pub fn path_weight(&self, path: &[usize]) -> f64 {
        path.windows(2)
            .map(|pair| self.edge_weight(pair[0], pair[1]).unwrap_or(0.0))
            .sum()
    }
}

#[derive(PartialEq)]
struct HeapEntry {
    cost: f64,
    node: usize,
}
impl Eq for HeapEntry {}
impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) behaves as a min-heap on cost.
        other.cost.total_cmp(&self.cost)
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Builds the deterministic synthetic random-geometric graph described in §4.2.
/// Only `mode == "synthetic"` is supported; anything else is `UnsupportedMode`,
/// since graph construction from real map sources is out of scope (§1).
pub fn load_graph(mode: &str, n_nodes: usize, seed: u64) -> EngineResult<GraphStore> {
    if mode != "synthetic" {
        return Err(EngineError::UnsupportedMode(mode.to_string()));
    }

    info!(n_nodes, seed, "building synthetic graph");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut store = GraphStore::empty();
    store.positions = (0..n_nodes)
        .map(|_| Position {
            x: rng.gen::<f64>(),
            y: rng.gen::<f64>(),
        })
        .collect();
    store.adjacency = vec![Vec::new(); n_nodes];

    for u in 0..n_nodes {
        for v in (u + 1)..n_nodes {
            let dist = store.positions[u].euclidean(&store.positions[v]);
            if dist <= CONNECT_RADIUS {
                store.add_edge(u, v, dist);
            }
        }
    }

    if !store.is_connected() {
        let components = store.connected_components();
        debug!(
            count = components.len(),
            "synthetic graph disconnected, repairing"
        );
        for pair in components.windows(2) {
            let a = pair[0][0];
            let b = pair[1][0];
            let w = store.positions[a].euclidean(&store.positions[b]);
            store.add_edge(a, b, w);
        }
    }

    info!(
        nodes = store.node_count(),
        edges = store.edge_count(),
        "synthetic graph ready"
    );
    Ok(store)
}
