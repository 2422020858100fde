use std::error::Error;
use std::fmt;

/// Errors surfaced by [`crate::Engine`] operations.
///
/// `PathNotFound` from the ACO/Dijkstra layer is deliberately absent here: callers
/// never see it because the orchestrator and the VRP planner fall back to Dijkstra
/// internally whenever the stochastic search comes up empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    GraphNotLoaded,
    FleetEmpty,
    UnsupportedMode(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::GraphNotLoaded => write!(f, "graph not loaded"),
            EngineError::FleetEmpty => write!(f, "vehicles and deliveries are required"),
            EngineError::UnsupportedMode(mode) => write!(f, "unsupported graph mode: {mode}"),
        }
    }
}

impl Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
