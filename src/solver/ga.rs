use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::domain::{Delivery, Vehicle};

/// One candidate solution: `chromosome[i]` is the ordered job-id list for `vehicles[i]`.
/// Kept parallel to the vehicles slice (rather than keyed by id in a `HashMap`) so that
/// mutation/crossover index sampling stays reproducible under a fixed seed (§4.4 note
/// on stable vehicle iteration order).
pub type Chromosome = Vec<Vec<String>>;

#[derive(Debug, Clone, Copy)]
pub struct GaParams {
    pub pop: usize,
    pub gens: usize,
    pub mutation_rate: f64,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            pop: 20,
            gens: 20,
            mutation_rate: 0.2,
        }
    }
}

/// Evolves a job-to-vehicle assignment minimising stop count and capacity overflow.
pub fn plan(
    vehicles: &[Vehicle],
    jobs: &[Delivery],
    rng: &mut ChaCha8Rng,
    params: &GaParams,
) -> Chromosome {
    if vehicles.is_empty() {
        return Vec::new();
    }

    let demand_by_id: HashMap<&str, f64> =
        jobs.iter().map(|j| (j.id.as_str(), j.demand)).collect();

    let mut population: Vec<Chromosome> = (0..params.pop)
        .map(|_| random_chromosome(vehicles, jobs, rng))
        .collect();

    for gen in 0..params.gens {
        population.sort_by(|a, b| {
            fitness(b, vehicles, &demand_by_id)
                .total_cmp(&fitness(a, vehicles, &demand_by_id))
        });
        let elite_n = std::cmp::max(2, params.pop / 5).min(population.len());
        let elite = population[..elite_n].to_vec();

        let mut children = elite.clone();
        while children.len() < params.pop {
            let (p1, p2) = if elite.len() >= 2 {
                let idx = rand::seq::index::sample(rng, elite.len(), 2);
                (&elite[idx.index(0)], &elite[idx.index(1)])
            } else {
                (&elite[0], &elite[0])
            };
            let mut child = crossover(p1, p2, vehicles, jobs, rng);
            mutate(&mut child, rng, params.mutation_rate);
            children.push(child);
        }
        population = children;
        debug!(gen, "ga generation complete");
    }

    population.sort_by(|a, b| {
        fitness(b, vehicles, &demand_by_id).total_cmp(&fitness(a, vehicles, &demand_by_id))
    });
    population.into_iter().next().unwrap_or_default()
}

fn random_chromosome(vehicles: &[Vehicle], jobs: &[Delivery], rng: &mut ChaCha8Rng) -> Chromosome {
    let mut ids: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
    ids.shuffle(rng);

    let mut chrom: Chromosome = vec![Vec::new(); vehicles.len()];
    for (i, id) in ids.into_iter().enumerate() {
        chrom[i % vehicles.len()].push(id);
    }
    chrom
}

fn fitness(chrom: &Chromosome, vehicles: &[Vehicle], demand_by_id: &HashMap<&str, f64>) -> f64 {
    let mut stops = 0usize;
    let mut penalty = 0.0;
    for (vi, arr) in chrom.iter().enumerate() {
        stops += arr.len();
        let demand: f64 = arr
            .iter()
            .map(|id| demand_by_id.get(id.as_str()).copied().unwrap_or(0.0))
            .sum();
        let capacity = vehicles[vi].load_capacity;
        if demand > capacity {
            penalty += (demand - capacity) * 100.0;
        }
    }
    -(stops as f64 + penalty)
}

/// Child inherits `arr(a) ∩ arr(b)` per vehicle (order preserved from `a`), then
/// redistributes the jobs missing from that intersection uniformly at random.
fn crossover(
    p1: &Chromosome,
    p2: &Chromosome,
    vehicles: &[Vehicle],
    jobs: &[Delivery],
    rng: &mut ChaCha8Rng,
) -> Chromosome {
    let n = vehicles.len();
    let mut child: Chromosome = vec![Vec::new(); n];
    for vi in 0..n {
        let set2: HashSet<&String> = p2[vi].iter().collect();
        child[vi] = p1[vi]
            .iter()
            .filter(|id| set2.contains(id))
            .cloned()
            .collect();
    }

    let assigned: HashSet<&String> = child.iter().flatten().collect();
    let mut missing: Vec<String> = jobs
        .iter()
        .map(|j| &j.id)
        .filter(|id| !assigned.contains(id))
        .cloned()
        .collect();
    missing.shuffle(rng);

    for jid in missing {
        let vi = rng.gen_range(0..n);
        child[vi].push(jid);
    }
    child
}

/// With probability `rate`, move one uniformly-chosen job from a random vehicle `a`
/// to the end of a distinct random vehicle `b`.
fn mutate(chrom: &mut Chromosome, rng: &mut ChaCha8Rng, rate: f64) {
    if chrom.len() < 2 || rng.gen::<f64>() >= rate {
        return;
    }
    let idx = rand::seq::index::sample(rng, chrom.len(), 2);
    let (a, b) = (idx.index(0), idx.index(1));
    if !chrom[a].is_empty() {
        let pick = rng.gen_range(0..chrom[a].len());
        let job = chrom[a].remove(pick);
        chrom[b].push(job);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn vehicle(id: &str, cap: f64) -> Vehicle {
        Vehicle {
            id: id.to_string(),
            start_node: 0,
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
    fn partitions_every_job_exactly_once() {
        let vehicles = vec![vehicle("v1", 10.0), vehicle("v2", 10.0)];
        let jobs: Vec<Delivery> = (0..9)
            .map(|i| delivery(&format!("d{i}"), i, 1.0))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chrom = plan(&vehicles, &jobs, &mut rng, &GaParams::default());

        let mut seen: Vec<&String> = chrom.iter().flatten().collect();
        seen.sort();
        let mut expected: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
        expected.sort();
        assert_eq!(seen.into_iter().cloned().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn empty_fleet_returns_empty_chromosome() {
        let jobs = vec![delivery("d0", 0, 1.0)];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let chrom = plan(&[], &jobs, &mut rng, &GaParams::default());
        assert!(chrom.is_empty());
    }

    #[test]
    fn deterministic_under_fixed_seed() {
        let vehicles = vec![vehicle("v1", 5.0), vehicle("v2", 5.0)];
        let jobs: Vec<Delivery> = (0..6).map(|i| delivery(&format!("d{i}"), i, 2.0)).collect();
        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);
        let a = plan(&vehicles, &jobs, &mut rng_a, &GaParams::default());
        let b = plan(&vehicles, &jobs, &mut rng_b, &GaParams::default());
        assert_eq!(a, b);
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_fleet_and_job_list_partitions_every_job_exactly_once(
            n_vehicles in 1usize..6,
            n_jobs in 0usize..20,
            seed in 0u64..10_000,
        ) {
            let vehicles: Vec<Vehicle> = (0..n_vehicles)
                .map(|i| vehicle(&format!("v{i}"), 10.0))
                .collect();
            let jobs: Vec<Delivery> = (0..n_jobs)
                .map(|i| delivery(&format!("d{i}"), i, 1.0))
                .collect();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let chrom = plan(&vehicles, &jobs, &mut rng, &GaParams::default());

            let mut seen: Vec<&String> = chrom.iter().flatten().collect();
            seen.sort();
            let mut expected: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
            expected.sort();
            prop_assert_eq!(seen.into_iter().cloned().collect::<Vec<_>>(), expected);
        }
    }
}
