//! Invariant checks to run against a computed configuration, to make sure
//! the model chain is behaving. Each public function, other than
//! [`verify_all`], represents one property that should hold for every
//! valid configuration; failures print the offending values.

use crate::adjacency::{self, PolarPosition};
use crate::connectivity::{self, DEFAULT_SAMPLE_POINTS};
use crate::coverage;
use crate::units::{Area, Length};

pub fn verify_all(l: Length, n: usize, region: Area) -> bool {
    probability_bounds(l, n, region)
        && connectivity_ordering(l, n, region)
        && coverage_efficiency(l)
}

/// Every probability the chain produces lies in [0, 1]: the base adjacency
/// probability, the binomial tables, the grid average and the network
/// power, at representative positions across the region.
pub fn probability_bounds(l: Length, n: usize, region: Area) -> bool {
    let side = region.side().metres();
    let positions = [
        (side / 2.0, side / 2.0),
        (side / 4.0, side / 4.0),
        (l.metres().min(side), side / 2.0),
        (side * 0.05, side * 0.05),
    ];

    for &(x, y) in &positions {
        let position =
            PolarPosition::from_cartesian(Length::from_metres(x), Length::from_metres(y));

        let base = adjacency::base_adjacency_probability(position, l, n, region);
        if !(0.0..=1.0).contains(&base) {
            eprintln!("base adjacency probability {base} out of bounds at ({x}, {y})");
            return false;
        }

        for m in 0..4 {
            let exact = adjacency::probability_exactly_m(position, l, n, m, region);
            let at_least = adjacency::probability_at_least_m(position, l, n, m, region);
            if !(0.0..=1.0).contains(&exact) || !(0.0..=1.0).contains(&at_least) {
                eprintln!("binomial probability out of bounds at ({x}, {y}), m = {m}");
                eprintln!("= exactly = {exact} ; = at least = {at_least}");
                return false;
            }
        }
    }

    for m in 1..4 {
        let q = connectivity::q_probability(l, n, m, region, DEFAULT_SAMPLE_POINTS);
        let network =
            connectivity::network_connectivity_probability(l, n, m, region, DEFAULT_SAMPLE_POINTS);
        if !(0.0..=1.0).contains(&q) || !(0.0..=1.0).contains(&network) {
            eprintln!("connectivity out of bounds for m = {m}: Q = {q}, network = {network}");
            return false;
        }
    }

    let isolation = connectivity::isolation_probability(n, region, l);
    if !(0.0..=1.0).contains(&isolation) {
        eprintln!("isolation probability {isolation} out of bounds");
        return false;
    }

    true
}

/// Looser connectivity requirements are never harder to meet:
/// P(≥1) ≥ P(≥2) ≥ P(≥3), both for Q and for the network power.
pub fn connectivity_ordering(l: Length, n: usize, region: Area) -> bool {
    let levels = connectivity::connectivity_levels(l, n, region, 3, DEFAULT_SAMPLE_POINTS);

    for pair in levels.windows(2) {
        if pair[0].q < pair[1].q || pair[0].network_probability < pair[1].network_probability {
            eprintln!("connectivity ordering violated between m = {} and m = {}", pair[0].m, pair[1].m);
            eprintln!("= first = {:#?} \n = second = \n {:#?}", pair[0], pair[1]);
            return false;
        }
    }

    true
}

/// The effective-coverage ratio is a constant of the geometry, independent
/// of the communication distance.
pub fn coverage_efficiency(l: Length) -> bool {
    for scale in [0.1, 1.0, 10.0] {
        let scaled = l * scale;
        if scaled.metres() <= 0.0 {
            continue;
        }

        let ratio =
            coverage::single_node_effective_coverage(scaled) / coverage::circular_coverage(scaled);
        if (ratio - coverage::COVERAGE_EFFICIENCY).abs() > 0.001 {
            eprintln!("coverage efficiency {ratio} drifted at l = {scaled} m");
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: Area = Area::from_square_metres(1e6);

    #[test]
    fn reference_configurations_verify() {
        for (metres, n) in [(50.0, 20), (75.1, 103), (95.0, 100), (150.0, 300)] {
            assert!(
                verify_all(Length::from_metres(metres), n, REGION),
                "l = {metres} m, n = {n} failed verification"
            );
        }
    }

    #[test]
    fn degenerate_populations_still_verify() {
        assert!(verify_all(Length::from_metres(75.1), 1, REGION));
        assert!(verify_all(Length::from_metres(75.1), 2, REGION));
    }
}
