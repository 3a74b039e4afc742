//! Concrete node placements for a square region: the reference four-node
//! square, centred grids, and seeded uniform-random scatters. These back
//! the analytical figures with positions that can actually be staked out,
//! and let the expected-neighbour numbers be checked empirically.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

use crate::coverage;
use crate::units::{Area, Length};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: Length,
    pub y: Length,
}

impl Point {
    pub fn distance_to(self, other: Point) -> Length {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A node placement inside the square `[0, region_side]²`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    pub positions: Vec<Point>,
    pub region_side: Length,
}

impl Deployment {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn region_area(&self) -> Area {
        self.region_side * self.region_side
    }
}

/// The reference four-node deployment: corners of a 3l × 3l square.
pub fn four_node_square(l: Length) -> Deployment {
    let side = l * 3.0;
    let zero = Length::from_metres(0.0);

    Deployment {
        positions: vec![
            Point { x: zero, y: zero },
            Point { x: side, y: zero },
            Point { x: zero, y: side },
            Point { x: side, y: side },
        ],
        region_side: side,
    }
}

/// `n` nodes on a centred ⌈√n⌉-per-side grid over `region`.
pub fn grid(n: usize, region: Area) -> Deployment {
    let side = region.side();
    let per_side = (n as f64).sqrt().ceil() as usize;
    let spacing = side / per_side.max(1) as f64;

    let mut positions = Vec::with_capacity(n);
    'outer: for i in 0..per_side {
        for j in 0..per_side {
            if positions.len() >= n {
                break 'outer;
            }
            positions.push(Point {
                x: spacing * (i as f64 + 0.5),
                y: spacing * (j as f64 + 0.5),
            });
        }
    }

    Deployment {
        positions,
        region_side: side,
    }
}

/// Grid of the minimum node count that tiles `region` at distance `l`.
pub fn minimum_node_grid(region: Area, l: Length) -> Deployment {
    grid(coverage::minimum_nodes(region, l), region)
}

/// `n` nodes placed uniformly at random, reproducible from `seed`.
pub fn uniform_random(n: usize, region: Area, seed: u64) -> Deployment {
    let side = region.side();
    let mut rng = ChaCha12Rng::seed_from_u64(seed);

    let positions = (0..n)
        .map(|_| Point {
            x: rng.random::<f64>() * side,
            y: rng.random::<f64>() * side,
        })
        .collect();

    Deployment {
        positions,
        region_side: side,
    }
}

/// Number of other nodes within communication distance of each node.
pub fn neighbor_counts(deployment: &Deployment, l: Length) -> Vec<usize> {
    deployment
        .positions
        .iter()
        .enumerate()
        .map(|(i, &point)| {
            deployment
                .positions
                .iter()
                .enumerate()
                .filter(|&(j, &other)| i != j && point.distance_to(other) < l)
                .count()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_close;
    use crate::connectivity;

    const REGION: Area = Area::from_square_metres(1e6);

    fn in_region(deployment: &Deployment) -> bool {
        deployment.positions.iter().all(|p| {
            p.x.metres() >= 0.0
                && p.y.metres() >= 0.0
                && p.x <= deployment.region_side
                && p.y <= deployment.region_side
        })
    }

    #[test]
    fn four_node_square_spans_three_lengths() {
        let l = Length::from_metres(75.1);
        let deployment = four_node_square(l);

        assert_eq!(deployment.len(), 4);
        assert_close(deployment.region_side, l * 3.0);

        let diagonal = deployment.positions[0].distance_to(deployment.positions[3]);
        assert_close(diagonal, l * 3.0 * 2f64.sqrt());
    }

    #[test]
    fn grid_places_exactly_n_nodes_inside() {
        for n in [1, 4, 10, 58, 230] {
            let deployment = grid(n, REGION);
            assert_eq!(deployment.len(), n);
            assert!(in_region(&deployment));
        }
    }

    #[test]
    fn minimum_grid_matches_coverage_count() {
        let l = Length::from_metres(100.0);
        let deployment = minimum_node_grid(REGION, l);
        assert_eq!(deployment.len(), coverage::minimum_nodes(REGION, l));
    }

    #[test]
    fn random_deployment_is_seed_deterministic() {
        let a = uniform_random(50, REGION, 7);
        let b = uniform_random(50, REGION, 7);
        let c = uniform_random(50, REGION, 8);

        assert_eq!(a.len(), 50);
        assert!(in_region(&a));
        assert_eq!(a.positions, b.positions);
        assert_ne!(a.positions, c.positions);
    }

    #[test]
    fn neighbor_counts_on_a_known_layout() {
        let deployment = Deployment {
            positions: vec![
                Point {
                    x: Length::from_metres(0.0),
                    y: Length::from_metres(0.0),
                },
                Point {
                    x: Length::from_metres(30.0),
                    y: Length::from_metres(0.0),
                },
                Point {
                    x: Length::from_metres(200.0),
                    y: Length::from_metres(0.0),
                },
            ],
            region_side: Length::from_metres(1000.0),
        };

        assert_eq!(
            neighbor_counts(&deployment, Length::from_metres(50.0)),
            vec![1, 1, 0]
        );
    }

    #[test]
    fn empirical_neighbors_track_the_analytical_figure() {
        let l = Length::from_metres(95.0);
        let deployment = uniform_random(200, REGION, 42);

        let counts = neighbor_counts(&deployment, l);
        let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;

        // Boundary truncation pulls the empirical mean below the interior
        // figure, but not by more than the worst-case corner factor.
        let analytical = connectivity::expected_neighbors(200, REGION, l);
        assert!(mean < analytical * 1.05, "mean {mean} vs {analytical}");
        assert!(mean > analytical * 0.6, "mean {mean} vs {analytical}");
    }
}
