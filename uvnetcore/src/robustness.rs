//! Deployment health scoring: connectivity probabilities at m = 1..3 plus
//! neighbour/isolation statistics folded into a weighted 0–100 score, a
//! failure-tolerance analysis, and threshold-driven recommendations.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::connectivity::{self, DEFAULT_SAMPLE_POINTS};
use crate::units::{Area, Length};

/// Score weights: basic connectivity 20%, robust (2-)connectivity 40%,
/// high redundancy 20%, non-isolation 10%, neighbour headroom 10%.
const WEIGHT_ONE_CONNECTIVITY: f64 = 20.0;
const WEIGHT_TWO_CONNECTIVITY: f64 = 40.0;
const WEIGHT_THREE_CONNECTIVITY: f64 = 20.0;
const WEIGHT_NO_ISOLATION: f64 = 10.0;
const WEIGHT_NEIGHBOR_COUNT: f64 = 10.0;

/// Neighbour count at which the headroom term saturates.
const NEIGHBOR_SATURATION: f64 = 5.0;

/// The practical per-level connectivity standard.
const CONNECTIVITY_STANDARD: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobustnessLevel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl RobustnessLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            RobustnessLevel::Excellent
        } else if score >= 70.0 {
            RobustnessLevel::Good
        } else if score >= 50.0 {
            RobustnessLevel::Fair
        } else {
            RobustnessLevel::Poor
        }
    }
}

impl Display for RobustnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RobustnessLevel::Poor => "Poor",
            RobustnessLevel::Fair => "Fair",
            RobustnessLevel::Good => "Good",
            RobustnessLevel::Excellent => "Excellent",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConnectivityMetrics {
    pub one_connectivity: f64,
    pub two_connectivity: f64,
    pub three_connectivity: f64,
    pub expected_neighbors: f64,
    pub isolation_probability: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeetsStandards {
    pub basic_connectivity: bool,
    pub robust_connectivity: bool,
    pub high_redundancy: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobustnessReport {
    pub score: f64,
    pub level: RobustnessLevel,
    pub metrics: ConnectivityMetrics,
    pub meets_standards: MeetsStandards,
}

fn metrics(l: Length, n: usize, region: Area) -> ConnectivityMetrics {
    let probability =
        |m| connectivity::network_connectivity_probability(l, n, m, region, DEFAULT_SAMPLE_POINTS);

    ConnectivityMetrics {
        one_connectivity: probability(1),
        two_connectivity: probability(2),
        three_connectivity: probability(3),
        expected_neighbors: connectivity::expected_neighbors(n, region, l),
        isolation_probability: connectivity::isolation_probability(n, region, l),
    }
}

pub fn evaluate(l: Length, n: usize, region: Area) -> RobustnessReport {
    let metrics = metrics(l, n, region);

    let score = metrics.one_connectivity * WEIGHT_ONE_CONNECTIVITY
        + metrics.two_connectivity * WEIGHT_TWO_CONNECTIVITY
        + metrics.three_connectivity * WEIGHT_THREE_CONNECTIVITY
        + (1.0 - metrics.isolation_probability) * WEIGHT_NO_ISOLATION
        + (metrics.expected_neighbors / NEIGHBOR_SATURATION).min(1.0) * WEIGHT_NEIGHBOR_COUNT;

    RobustnessReport {
        score,
        level: RobustnessLevel::from_score(score),
        metrics,
        meets_standards: MeetsStandards {
            basic_connectivity: metrics.one_connectivity >= CONNECTIVITY_STANDARD,
            robust_connectivity: metrics.two_connectivity >= CONNECTIVITY_STANDARD,
            high_redundancy: metrics.three_connectivity >= CONNECTIVITY_STANDARD,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resilience {
    Low,
    Medium,
    High,
}

impl Display for Resilience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resilience::Low => "Low",
            Resilience::Medium => "Medium",
            Resilience::High => "High",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureTolerance {
    pub failure_rate: f64,
    pub expected_failures: usize,
    pub remaining_nodes: usize,

    /// 1-, 2- and 3-connectivity of the surviving population.
    pub connectivity_after_failure: [f64; 3],

    pub network_survives: bool,
    pub resilience: Resilience,
}

/// Connectivity of the expected survivor population under a node failure
/// rate. Survival means the remainder still reaches 80% basic
/// connectivity; High resilience additionally asks 70% 2-connectivity.
pub fn analyze_failure_tolerance(
    l: Length,
    n: usize,
    region: Area,
    failure_rate: f64,
) -> FailureTolerance {
    let expected_failures = (n as f64 * failure_rate) as usize;
    let remaining_nodes = n.saturating_sub(expected_failures);

    let probability = |m| {
        connectivity::network_connectivity_probability(
            l,
            remaining_nodes,
            m,
            region,
            DEFAULT_SAMPLE_POINTS,
        )
    };
    let connectivity_after_failure = [probability(1), probability(2), probability(3)];

    let network_survives = connectivity_after_failure[0] >= 0.8;
    let resilience = if network_survives && connectivity_after_failure[1] >= 0.7 {
        Resilience::High
    } else if network_survives {
        Resilience::Medium
    } else {
        Resilience::Low
    };

    FailureTolerance {
        failure_rate,
        expected_failures,
        remaining_nodes,
        connectivity_after_failure,
        network_survives,
        resilience,
    }
}

/// Threshold-driven advice for an under-performing configuration. Empty
/// thresholds collapse to a single all-clear line.
pub fn recommend_improvements(l: Length, n: usize, region: Area) -> Vec<String> {
    let report = evaluate(l, n, region);
    let metrics = &report.metrics;

    let mut recommendations = Vec::new();

    if metrics.one_connectivity < CONNECTIVITY_STANDARD {
        recommendations.push(format!(
            "Basic connectivity is {:.1}% (target: 90%). Add {} more nodes or increase \
             transmission power.",
            metrics.one_connectivity * 100.0,
            (n as f64 * 0.2) as usize
        ));
    }

    if metrics.two_connectivity < CONNECTIVITY_STANDARD {
        recommendations.push(format!(
            "2-connectivity is {:.1}% (target: 90% for a robust network). Add {} more nodes \
             for redundancy.",
            metrics.two_connectivity * 100.0,
            (n as f64 * 0.3) as usize
        ));
    }

    if metrics.expected_neighbors < 3.0 {
        recommendations.push(format!(
            "Low neighbour count ({:.1}); the network is sparse. Increase power to extend \
             range, add {} more nodes, or reduce the covered area.",
            metrics.expected_neighbors,
            (n as f64 * 0.5) as usize
        ));
    }

    if metrics.isolation_probability > 0.05 {
        recommendations.push(format!(
            "High isolation risk ({:.2}%): some nodes may be unreachable. Add nodes or \
             extend the communication distance.",
            metrics.isolation_probability * 100.0
        ));
    }

    if recommendations.is_empty() {
        recommendations.push(format!(
            "Network configuration meets all connectivity targets (score {:.0}/100).",
            report.score
        ));
    }

    if report.score < 85.0 && metrics.two_connectivity >= 0.8 {
        recommendations.push(format!(
            "Score {:.0}/100 is close to the next level; small adjustments could reach \
             an Excellent rating.",
            report.score
        ));
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: Area = Area::from_square_metres(1e6);

    #[test]
    fn dense_reference_network_scores_excellent() {
        let report = evaluate(Length::from_metres(95.0), 100, REGION);

        // All three connectivity levels saturate; the score is carried by
        // the isolation and neighbour terms.
        assert!((report.score - 95.0).abs() < 0.5, "score {}", report.score);
        assert_eq!(report.level, RobustnessLevel::Excellent);
        assert!(report.meets_standards.basic_connectivity);
        assert!(report.meets_standards.robust_connectivity);
        assert!(report.meets_standards.high_redundancy);
    }

    #[test]
    fn sparse_network_scores_poor() {
        let report = evaluate(Length::from_metres(50.0), 12, REGION);

        assert!(report.score < 10.0, "score {}", report.score);
        assert_eq!(report.level, RobustnessLevel::Poor);
        assert!(!report.meets_standards.basic_connectivity);
    }

    #[test]
    fn score_stays_on_the_percent_scale() {
        for (metres, n) in [(50.0, 12), (50.0, 32), (95.0, 100), (150.0, 300)] {
            let report = evaluate(Length::from_metres(metres), n, REGION);
            assert!((0.0..=100.0).contains(&report.score));
        }
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(RobustnessLevel::from_score(92.0), RobustnessLevel::Excellent);
        assert_eq!(RobustnessLevel::from_score(85.0), RobustnessLevel::Excellent);
        assert_eq!(RobustnessLevel::from_score(84.9), RobustnessLevel::Good);
        assert_eq!(RobustnessLevel::from_score(70.0), RobustnessLevel::Good);
        assert_eq!(RobustnessLevel::from_score(69.9), RobustnessLevel::Fair);
        assert_eq!(RobustnessLevel::from_score(50.0), RobustnessLevel::Fair);
        assert_eq!(RobustnessLevel::from_score(49.9), RobustnessLevel::Poor);
    }

    #[test]
    fn failure_tolerance_of_a_dense_network() {
        let tolerance = analyze_failure_tolerance(Length::from_metres(95.0), 100, REGION, 0.1);

        assert_eq!(tolerance.expected_failures, 10);
        assert_eq!(tolerance.remaining_nodes, 90);
        assert!(tolerance.network_survives);
        assert_eq!(tolerance.resilience, Resilience::High);
    }

    #[test]
    fn failure_tolerance_of_a_fragile_network() {
        let tolerance = analyze_failure_tolerance(Length::from_metres(50.0), 20, REGION, 0.25);

        assert_eq!(tolerance.expected_failures, 5);
        assert_eq!(tolerance.remaining_nodes, 15);
        assert!(!tolerance.network_survives);
        assert_eq!(tolerance.resilience, Resilience::Low);
    }

    #[test]
    fn recommendations_flag_each_weak_metric() {
        let sparse = recommend_improvements(Length::from_metres(50.0), 12, REGION);
        let combined = sparse.join(" ");

        assert!(combined.contains("Basic connectivity"));
        assert!(combined.contains("2-connectivity"));
        assert!(combined.contains("sparse"));
        assert!(combined.contains("isolation"));
    }

    #[test]
    fn healthy_network_gets_the_all_clear() {
        // 200 nodes at 95 m: every metric clears its threshold.
        let healthy = recommend_improvements(Length::from_metres(95.0), 200, REGION);

        assert_eq!(healthy.len(), 1);
        assert!(healthy[0].contains("meets all connectivity targets"));
    }

    #[test]
    fn borderline_neighbour_count_is_still_flagged() {
        // The reference 100-node network saturates connectivity but sits
        // just under the 3-neighbour comfort threshold.
        let advice = recommend_improvements(Length::from_metres(95.0), 100, REGION);
        assert!(advice.iter().any(|line| line.contains("sparse")));
    }
}
