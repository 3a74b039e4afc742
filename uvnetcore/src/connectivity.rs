//! Whole-network m-connectivity probabilities.
//!
//! The region-average probability Q that a node has at least m neighbours
//! is a positional double integral; it is estimated here on an interior
//! sampling grid (the published figures were produced with exactly this
//! discretisation, so the sample count stays caller-visible rather than
//! being replaced with an exact quadrature). The whole-network probability
//! treats the n node-level events as independent and raises Q to the n-th
//! power, which is the approximation the model was validated under.

use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};

use crate::adjacency::{self, PolarPosition};
use crate::units::{Area, Length};

/// Grid samples used when a caller has no reason to pick otherwise.
pub const DEFAULT_SAMPLE_POINTS: usize = 20;

/// Integer tolerance for [`find_required_nodes`].
pub const NODE_SEARCH_TOLERANCE: usize = 5;

/// Q_{n,≥m}: region-average probability that a node has at least m
/// neighbours, sampled on a ⌈√samples⌉ × ⌈√samples⌉ interior grid.
pub fn q_probability(l: Length, n: usize, m: usize, region: Area, sample_points: usize) -> f64 {
    let side = region.side();
    let grid = ((sample_points as f64).sqrt().ceil() as usize).max(1);
    let spacing = side / (grid as f64 + 1.0);

    let mut total = 0.0;
    for i in 1..=grid {
        for j in 1..=grid {
            let x = spacing * i as f64;
            let y = spacing * j as f64;
            let position = PolarPosition::from_cartesian(x, y);
            total += adjacency::probability_at_least_m(position, l, n, m, region);
        }
    }

    (total / (grid * grid) as f64).clamp(0.0, 1.0)
}

/// P(the whole n-node network is m-connected) ≈ Q_{n,≥m}^n.
pub fn network_connectivity_probability(
    l: Length,
    n: usize,
    m: usize,
    region: Area,
    sample_points: usize,
) -> f64 {
    q_probability(l, n, m, region, sample_points)
        .powi(n as i32)
        .clamp(0.0, 1.0)
}

/// Monte-Carlo estimate of the same region average, from uniformly random
/// positions. A cross-check for the grid discretisation; seeded, so
/// repeatable.
pub fn monte_carlo_q(
    l: Length,
    n: usize,
    m: usize,
    region: Area,
    samples: usize,
    seed: u64,
) -> f64 {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    let coordinate =
        Uniform::new(0.0, region.side().metres()).expect("region side must be positive");

    let samples = samples.max(1);
    let mut total = 0.0;
    for _ in 0..samples {
        let x = Length::from_metres(coordinate.sample(&mut rng));
        let y = Length::from_metres(coordinate.sample(&mut rng));
        let position = PolarPosition::from_cartesian(x, y);
        total += adjacency::probability_at_least_m(position, l, n, m, region);
    }

    (total / samples as f64).clamp(0.0, 1.0)
}

/// Q and the network probability for each m in 1..=max_m.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectivityLevel {
    pub m: usize,
    pub q: f64,
    pub network_probability: f64,
}

pub fn connectivity_levels(
    l: Length,
    n: usize,
    region: Area,
    max_m: usize,
    sample_points: usize,
) -> Vec<ConnectivityLevel> {
    (1..=max_m)
        .map(|m| {
            let q = q_probability(l, n, m, region, sample_points);
            ConnectivityLevel {
                m,
                q,
                network_probability: q.powi(n as i32).clamp(0.0, 1.0),
            }
        })
        .collect()
}

/// Average number of neighbours of a node far from the boundary:
/// (n−1)/area · πl².
pub fn expected_neighbors(n: usize, region: Area, l: Length) -> f64 {
    if n < 2 {
        return 0.0;
    }
    (n - 1) as f64 / region.square_metres() * std::f64::consts::PI * l.metres() * l.metres()
}

/// Probability that a node has no neighbour at all, under the Poisson
/// approximation: exp(−E[neighbours]).
pub fn isolation_probability(n: usize, region: Area, l: Length) -> f64 {
    (-expected_neighbors(n, region, l)).exp()
}

/// Result of the integer node-count search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSearchResult {
    pub feasible: bool,
    pub required_nodes: usize,
    pub achieved_probability: f64,
    pub target_probability: f64,
    pub message: Option<String>,
}

/// Smallest node count (within `bounds`, to `tolerance` nodes) whose
/// m-connectivity probability reaches `target_probability`. The achieved
/// probability is returned alongside n because an integer search cannot
/// always land on the target exactly.
pub fn find_required_nodes(
    l: Length,
    region: Area,
    m: usize,
    target_probability: f64,
    bounds: (usize, usize),
    tolerance: usize,
    sample_points: usize,
) -> NodeSearchResult {
    let probability_at =
        |n: usize| network_connectivity_probability(l, n, m, region, sample_points);

    let (mut low, mut high) = bounds;
    let tolerance = tolerance.max(1);

    let best = probability_at(high);
    if best < target_probability {
        return NodeSearchResult {
            feasible: false,
            required_nodes: high,
            achieved_probability: best,
            target_probability,
            message: Some(format!(
                "{m}-connectivity target {:.0}% not reached even with {high} nodes (best {:.1}%)",
                target_probability * 100.0,
                best * 100.0
            )),
        };
    }

    while high - low > tolerance {
        let mid = (low + high) / 2;
        if probability_at(mid) < target_probability {
            low = mid;
        } else {
            high = mid;
        }
    }

    NodeSearchResult {
        feasible: true,
        required_nodes: high,
        achieved_probability: probability_at(high),
        target_probability,
        message: None,
    }
}
