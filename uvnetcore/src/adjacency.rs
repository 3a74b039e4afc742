//! Position-dependent neighbour probabilities inside a square region.
//!
//! For a node somewhere in the region, the chance that one particular other
//! node lands inside its coverage circle is (node density) × (circle area),
//! truncated near the region edge. Neighbour counts then follow a binomial
//! over the n−1 other nodes.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use statrs::distribution::{Binomial, Discrete, DiscreteCDF};

use crate::units::{Area, Length};

/// Truncation floor for the coverage circle near the region edge. The
/// linear distance-to-edge factor is a calibrated stand-in for the exact
/// circle–square intersection; both the floor and the linear form are part
/// of the published calibration and must not be sharpened.
const BOUNDARY_FACTOR_FLOOR: f64 = 0.5;

/// Polar position measured from the region's corner origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarPosition {
    pub radial: Length,
    pub angle_rad: f64,
}

impl PolarPosition {
    pub fn new(radial: Length, angle_rad: f64) -> Self {
        Self { radial, angle_rad }
    }

    pub fn from_cartesian(x: Length, y: Length) -> Self {
        Self {
            radial: (x.powi(2) + y.powi(2)).sqrt(),
            angle_rad: y.metres().atan2(x.metres()),
        }
    }

    pub fn cartesian(self) -> (Length, Length) {
        (
            self.radial * self.angle_rad.cos(),
            self.radial * self.angle_rad.sin(),
        )
    }
}

/// Probability that one particular other node is adjacent to a node at
/// `position`, for an n-node population over `region`.
///
/// Clamped to [0, 1]; dense configurations saturate at certainty.
pub fn base_adjacency_probability(
    position: PolarPosition,
    l: Length,
    n: usize,
    region: Area,
) -> f64 {
    if n < 2 {
        return 0.0;
    }

    let (x, y) = position.cartesian();
    let side = region.side();
    let edge_distance = x.min(y).min(side - x).min(side - y);

    let density = (n - 1) as f64 / region.square_metres();
    let mut coverage = PI * l.metres() * l.metres();

    if edge_distance < l {
        coverage *= (edge_distance / l).max(BOUNDARY_FACTOR_FLOOR);
    }

    (density * coverage).min(1.0)
}

fn binomial(trials: usize, p: f64) -> Binomial {
    let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
    Binomial::new(p, trials as u64).expect("probability clamped to [0, 1]")
}

/// Binomial P(X = k) over `trials` draws, clamped to [0, 1].
pub fn binomial_pmf(trials: usize, k: usize, p: f64) -> f64 {
    if k > trials {
        return 0.0;
    }
    binomial(trials, p).pmf(k as u64).clamp(0.0, 1.0)
}

/// Binomial P(X ≥ m) over `trials` draws, clamped to [0, 1].
pub fn binomial_at_least(trials: usize, m: usize, p: f64) -> f64 {
    if m == 0 {
        return 1.0;
    }
    if m > trials {
        return 0.0;
    }
    (1.0 - binomial(trials, p).cdf((m - 1) as u64)).clamp(0.0, 1.0)
}

/// Probability of exactly m adjacent nodes. m ≥ n cannot happen and yields 0.
pub fn probability_exactly_m(
    position: PolarPosition,
    l: Length,
    n: usize,
    m: usize,
    region: Area,
) -> f64 {
    if m >= n {
        return 0.0;
    }
    let p = base_adjacency_probability(position, l, n, region);
    binomial_pmf(n - 1, m, p)
}

/// Probability of at least m adjacent nodes. m ≥ n yields 0, m = 0 yields 1.
pub fn probability_at_least_m(
    position: PolarPosition,
    l: Length,
    n: usize,
    m: usize,
    region: Area,
) -> f64 {
    if m >= n {
        return 0.0;
    }
    if m == 0 {
        return 1.0;
    }
    let p = base_adjacency_probability(position, l, n, region);
    binomial_at_least(n - 1, m, p)
}

/// Neighbour statistics for one position: the base probability, the
/// expected neighbour count, and the exactly-/at-least-m tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionAnalysis {
    pub position: PolarPosition,
    pub base_probability: f64,
    pub expected_neighbors: f64,

    /// (m, P(exactly m)) for m = 1 up to min(n−1, 5).
    pub exactly: Vec<(usize, f64)>,

    /// (m, P(at least m)) for the same m range.
    pub at_least: Vec<(usize, f64)>,
}

pub fn analyze_position(
    position: PolarPosition,
    l: Length,
    n: usize,
    region: Area,
) -> PositionAnalysis {
    let base_probability = base_adjacency_probability(position, l, n, region);
    let expected_neighbors = base_probability * n.saturating_sub(1) as f64;

    let ms = 1..n.min(6);

    PositionAnalysis {
        position,
        base_probability,
        expected_neighbors,
        exactly: ms
            .clone()
            .map(|m| (m, probability_exactly_m(position, l, n, m, region)))
            .collect(),
        at_least: ms
            .map(|m| (m, probability_at_least_m(position, l, n, m, region)))
            .collect(),
    }
}
