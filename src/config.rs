//! Environment-driven tunables for the optimisers, read the way the teacher reads
//! `DATABASE_URL` in its database layer: `std::env::var`, parsed, falling back to a
//! hard-coded default on absence or parse failure.

use tracing::warn;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{key} set but not parseable, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Process-wide tunables. GA population/generations here are the *configurable*
/// values (`GA_POP`/`GA_GENS`); the adaptive orchestrator's internal GA call keeps
/// its own hard-coded 20/20 regardless (see `solver::adaptive`), preserving the
/// split the original service exhibited between its settings object and the
/// orchestrator's literal constructor arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub default_graph_n: usize,
    pub aco_ants: usize,
    pub aco_iters: usize,
    pub ga_pop: usize,
    pub ga_gens: usize,
    pub rl_alpha: f64,
    pub rl_gamma: f64,
    pub rl_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_graph_n: 50,
            aco_ants: 20,
            aco_iters: 20,
            ga_pop: 30,
            ga_gens: 25,
            rl_alpha: 0.1,
            rl_gamma: 0.9,
            rl_epsilon: 0.2,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            default_graph_n: env_or("DEFAULT_GRAPH_N", default.default_graph_n),
            aco_ants: env_or("ACO_ANTS", default.aco_ants),
            aco_iters: env_or("ACO_ITERS", default.aco_iters),
            ga_pop: env_or("GA_POP", default.ga_pop),
            ga_gens: env_or("GA_GENS", default.ga_gens),
            rl_alpha: env_or("RL_ALPHA", default.rl_alpha),
            rl_gamma: env_or("RL_GAMMA", default.rl_gamma),
            rl_epsilon: env_or("RL_EPSILON", default.rl_epsilon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.default_graph_n, 50);
        assert_eq!(cfg.aco_ants, 20);
        assert_eq!(cfg.aco_iters, 20);
        assert_eq!(cfg.ga_pop, 30);
        assert_eq!(cfg.ga_gens, 25);
        assert!((cfg.rl_alpha - 0.1).abs() < 1e-9);
        assert!((cfg.rl_gamma - 0.9).abs() < 1e-9);
        assert!((cfg.rl_epsilon - 0.2).abs() < 1e-9);
    }
}
