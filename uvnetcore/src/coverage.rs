//! Effective ground coverage of deployed nodes.
//!
//! A node's raw footprint is the circle of its communication distance, but
//! tiled nodes overlap and square tilings leave corner gaps. The closed
//! forms here account for both; all of them are scale invariant in l².

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::units::{Area, Length};

/// Fraction of the raw circular footprint that a node contributes as new
/// coverage once steady-state overlap is accounted for.
pub const COVERAGE_EFFICIENCY: f64 = 0.5545;

/// Raw circular footprint πl².
pub fn circular_coverage(l: Length) -> Area {
    (l * l) * PI
}

/// S1, the uncovered corner region of a square tiling: l²(1 − π/4).
pub fn corner_region_area(l: Length) -> Area {
    (l * l) * (1.0 - PI / 4.0)
}

/// S2, the lens-shaped overlap between edge-adjacent nodes:
/// (1 − π/6 − √3/4)·l².
pub fn edge_overlap_area(l: Length) -> Area {
    (l * l) * (1.0 - PI / 6.0 - 3f64.sqrt() / 4.0)
}

/// New area contributed by one more node in a tiled deployment:
/// a half-circle sector plus the corner term minus the edge overlap.
pub fn single_node_effective_coverage(l: Length) -> Area {
    let sector = (l * l) * (0.5 * PI);
    sector + corner_region_area(l) - edge_overlap_area(l)
}

/// Effective coverage of four nodes on the corners of a 3l × 3l square:
/// the square minus four corner gaps and four edge overlaps.
pub fn four_node_effective_coverage(l: Length) -> Area {
    let square = (l * 3.0) * (l * 3.0);
    square - corner_region_area(l) * 4.0 - edge_overlap_area(l) * 4.0
}

/// Minimum node count whose combined effective coverage tiles `region`.
pub fn minimum_nodes(region: Area, l: Length) -> usize {
    (region / single_node_effective_coverage(l)).ceil() as usize
}

/// One row of a coverage-vs-distance sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CoveragePoint {
    pub distance: Length,
    pub single_node: Area,
    pub four_node: Area,
    pub minimum_nodes: usize,
}

pub fn coverage_profile(region: Area, distances: &[Length]) -> Vec<CoveragePoint> {
    distances
        .iter()
        .map(|&l| CoveragePoint {
            distance: l,
            single_node: single_node_effective_coverage(l),
            four_node: four_node_effective_coverage(l),
            minimum_nodes: minimum_nodes(region, l),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::METRES;

    #[test]
    fn efficiency_is_scale_invariant() {
        for &metres in &[1.0, 50.0, 75.1, 100.0, 500.0] {
            let l = Length::from_metres(metres);
            let ratio = single_node_effective_coverage(l) / circular_coverage(l);
            assert!(
                (ratio - COVERAGE_EFFICIENCY).abs() < 0.001,
                "efficiency {ratio} at l = {metres} m"
            );
        }
    }

    #[test]
    fn four_node_matches_field_measurement() {
        // 44,800 m² measured for the 75.1 m four-node deployment.
        let computed = four_node_effective_coverage(Length::from_metres(75.1));
        let error = (computed.square_metres() - 44_800.0).abs() / 44_800.0;
        assert!(error < 0.10, "four-node coverage off by {:.1}%", error * 100.0);
    }

    #[test]
    fn effective_coverage_below_raw() {
        for &metres in &[10.0, 75.1, 300.0] {
            let l = Length::from_metres(metres);
            assert!(single_node_effective_coverage(l) < circular_coverage(l));
        }
    }

    #[test]
    fn minimum_nodes_shrink_with_range() {
        let region = Area::from_square_metres(1e6);

        let counts: Vec<usize> = [50.0, 75.0, 100.0, 150.0]
            .iter()
            .map(|&m| minimum_nodes(region, Length::from_metres(m)))
            .collect();

        assert_eq!(counts, vec![230, 103, 58, 26]);

        for (count, &metres) in counts.iter().zip(&[50.0, 75.0, 100.0, 150.0]) {
            let covered =
                single_node_effective_coverage(Length::from_metres(metres)) * (*count as f64);
            assert!(covered.square_metres() >= region.square_metres());
        }
    }

    #[test]
    fn profile_follows_the_closed_forms() {
        let region = Area::from_square_metres(1e6);
        let profile = coverage_profile(region, &[50.0 * METRES, 100.0 * METRES]);

        assert_eq!(profile.len(), 2);
        assert_eq!(profile[0].minimum_nodes, 230);
        assert_eq!(profile[1].minimum_nodes, 58);
        assert!(profile[0].four_node < profile[1].four_node);
    }
}
