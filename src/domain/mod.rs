pub mod graph;
pub mod types;

pub use graph::GraphStore;
pub use types::{Delivery, EdgeKey, Position, Routes, Segment, Vehicle};
