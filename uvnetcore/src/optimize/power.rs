//! Transmission-power searches: the minimum power that reaches a distance,
//! covers a region within a node budget, or hits a connectivity target,
//! plus the power-impact table behind the published power figures.

use serde::{Deserialize, Serialize};

use crate::channel::{self, LinkParameters};
use crate::connectivity;
use crate::coverage;
use crate::optimize::{OPTIMIZER_SAMPLE_POINTS, REFERENCE_POPULATION};
use crate::params::{ChannelConstants, LinkLimits};
use crate::units::{Area, DataRate, Length, Power};

/// Engineering-grade power resolution.
const POWER_TOLERANCE_W: f64 = 0.01;

const MAX_SEARCH_ITERATIONS: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerSolution {
    pub feasible: bool,
    pub required_power: Power,
    pub achieved_distance: Length,
    pub target_distance: Length,
    pub message: Option<String>,
}

/// Minimum power within the engineering bounds that reaches `target`.
pub fn minimum_power_for_distance(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    target: Length,
    data_rate: DataRate,
    theta1_deg: f64,
    theta2_deg: f64,
) -> PowerSolution {
    let distance_at = |watts: f64| {
        channel::ook_distance(
            constants,
            &LinkParameters::new(Power::from_watts(watts), data_rate, theta1_deg, theta2_deg),
        )
    };

    let mut low = limits.power_min.watts();
    let mut high = limits.power_max.watts();

    let Some(reach) = distance_at(high) else {
        return PowerSolution {
            feasible: false,
            required_power: limits.power_max,
            achieved_distance: Length::from_metres(0.0),
            target_distance: target,
            message: Some("channel is degenerate for these parameters".to_string()),
        };
    };

    if reach < target {
        return PowerSolution {
            feasible: false,
            required_power: limits.power_max,
            achieved_distance: reach,
            target_distance: target,
            message: Some(format!(
                "target {:.0} m not achievable with max power {:.1} W (reaches {:.1} m)",
                target.metres(),
                limits.power_max.watts(),
                reach.metres()
            )),
        };
    }

    for _ in 0..MAX_SEARCH_ITERATIONS {
        if high - low <= POWER_TOLERANCE_W {
            break;
        }
        let mid = (low + high) / 2.0;
        match distance_at(mid) {
            Some(distance) if distance >= target => high = mid,
            _ => low = mid,
        }
    }

    PowerSolution {
        feasible: true,
        required_power: Power::from_watts(high),
        achieved_distance: distance_at(high).unwrap_or(Length::from_metres(0.0)),
        target_distance: target,
        message: None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveragePowerSolution {
    pub power: PowerSolution,

    /// Per-node distance a `max_nodes` tiling of the region demands.
    pub required_distance: Length,

    /// Node count the achieved distance actually needs.
    pub actual_nodes: usize,
    pub max_nodes: usize,
    pub meets_node_budget: bool,
}

/// Minimum power whose range lets `max_nodes` nodes tile `region`.
pub fn minimum_power_for_coverage(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    region: Area,
    max_nodes: usize,
    data_rate: DataRate,
    theta1_deg: f64,
    theta2_deg: f64,
) -> CoveragePowerSolution {
    // Invert n = area / (η_eff · πl²) for the distance each node must cover.
    let required_distance = Length::from_metres(
        (region.square_metres()
            / (max_nodes as f64 * coverage::COVERAGE_EFFICIENCY * std::f64::consts::PI))
            .sqrt(),
    );

    let power = minimum_power_for_distance(
        constants,
        limits,
        required_distance,
        data_rate,
        theta1_deg,
        theta2_deg,
    );

    let actual_nodes = if power.achieved_distance.metres() > 0.0 {
        coverage::minimum_nodes(region, power.achieved_distance)
    } else {
        0
    };

    CoveragePowerSolution {
        meets_node_budget: power.feasible && actual_nodes <= max_nodes,
        power,
        required_distance,
        actual_nodes,
        max_nodes,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityPowerSolution {
    pub required_power: Power,
    pub achieved_connectivity: f64,
    pub target_connectivity: f64,
    pub distance: Length,
    pub nodes: usize,
    pub connectivity_level: usize,
    pub meets_target: bool,
    pub message: Option<String>,
}

/// Minimum power at which `n` nodes reach the m-connectivity target.
pub fn minimum_power_for_connectivity(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    region: Area,
    n: usize,
    m: usize,
    target_probability: f64,
    data_rate: DataRate,
    theta1_deg: f64,
    theta2_deg: f64,
) -> ConnectivityPowerSolution {
    let connectivity_at = |watts: f64| {
        channel::ook_distance(
            constants,
            &LinkParameters::new(Power::from_watts(watts), data_rate, theta1_deg, theta2_deg),
        )
        .map(|distance| {
            connectivity::network_connectivity_probability(
                distance,
                n,
                m,
                region,
                OPTIMIZER_SAMPLE_POINTS,
            )
        })
        .unwrap_or(0.0)
    };

    let mut low = limits.power_min.watts();
    let mut high = limits.power_max.watts();

    for _ in 0..MAX_SEARCH_ITERATIONS {
        if high - low <= POWER_TOLERANCE_W {
            break;
        }
        let mid = (low + high) / 2.0;
        if connectivity_at(mid) < target_probability {
            low = mid;
        } else {
            high = mid;
        }
    }

    let required_power = Power::from_watts(high);
    let distance = channel::ook_distance(
        constants,
        &LinkParameters::new(required_power, data_rate, theta1_deg, theta2_deg),
    )
    .unwrap_or(Length::from_metres(0.0));
    let achieved_connectivity = connectivity_at(high);
    let meets_target = achieved_connectivity >= target_probability;

    ConnectivityPowerSolution {
        required_power,
        achieved_connectivity,
        target_connectivity: target_probability,
        distance,
        nodes: n,
        connectivity_level: m,
        meets_target,
        message: (!meets_target).then(|| {
            format!(
                "{m}-connectivity target {:.0}% not reached within the {:.1} W limit \
                 (best {:.1}%)",
                target_probability * 100.0,
                limits.power_max.watts(),
                achieved_connectivity * 100.0
            )
        }),
    }
}

/// One row of the power-impact analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerImpactRow {
    pub power: Power,
    pub distance: Length,
    pub minimum_nodes: usize,
    pub single_node_coverage: Area,
    pub four_node_coverage: Area,

    /// 1-, 2- and 3-connectivity of the 300-node reference population.
    pub connectivity: [f64; 3],
}

/// Distance, coverage and connectivity across a power range. Degenerate
/// configurations are excluded rather than reported as zero rows.
pub fn power_impact(
    constants: &ChannelConstants,
    powers: &[Power],
    data_rate: DataRate,
    theta1_deg: f64,
    theta2_deg: f64,
    region: Area,
) -> Vec<PowerImpactRow> {
    powers
        .iter()
        .filter_map(|&power| {
            let distance = channel::ook_distance(
                constants,
                &LinkParameters::new(power, data_rate, theta1_deg, theta2_deg),
            )?;

            let probability = |m| {
                connectivity::network_connectivity_probability(
                    distance,
                    REFERENCE_POPULATION,
                    m,
                    region,
                    OPTIMIZER_SAMPLE_POINTS,
                )
            };

            Some(PowerImpactRow {
                power,
                distance,
                minimum_nodes: coverage::minimum_nodes(region, distance),
                single_node_coverage: coverage::single_node_effective_coverage(distance),
                four_node_coverage: coverage::four_node_effective_coverage(distance),
                connectivity: [probability(1), probability(2), probability(3)],
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: Area = Area::from_square_metres(1e6);

    fn setup() -> (ChannelConstants, LinkLimits) {
        (ChannelConstants::default(), LinkLimits::default())
    }

    #[test]
    fn finds_power_for_a_reachable_distance() {
        let (constants, limits) = setup();

        let solution = minimum_power_for_distance(
            &constants,
            &limits,
            Length::from_metres(70.0),
            DataRate::from_kbps(50.0),
            30.0,
            50.0,
        );

        assert!(solution.feasible);
        assert!(solution.achieved_distance >= Length::from_metres(70.0));
        assert!(solution.required_power.watts() <= limits.power_max.watts());
        // 0.4 W already reaches ~70 m, so the search should land below max.
        assert!(solution.required_power.watts() < 0.45);
    }

    #[test]
    fn reports_unreachable_distance_with_explanation() {
        let (constants, limits) = setup();

        let solution = minimum_power_for_distance(
            &constants,
            &limits,
            Length::from_metres(100.0),
            DataRate::from_kbps(50.0),
            30.0,
            50.0,
        );

        assert!(!solution.feasible);
        assert_eq!(solution.required_power, limits.power_max);
        assert!(solution.achieved_distance < Length::from_metres(100.0));
        assert!(
            solution
                .message
                .as_ref()
                .unwrap()
                .contains("not achievable with max power")
        );
    }

    #[test]
    fn coverage_budget_round_trip() {
        let (constants, limits) = setup();

        // 300 nodes is loose for 1 km²; the required distance is modest.
        let solution = minimum_power_for_coverage(
            &constants,
            &limits,
            REGION,
            300,
            DataRate::from_kbps(50.0),
            30.0,
            50.0,
        );

        assert!(solution.power.feasible);
        assert!(solution.meets_node_budget);
        assert!(solution.actual_nodes <= 300);
        assert!(solution.power.achieved_distance >= solution.required_distance);
    }

    #[test]
    fn impossible_node_budget_is_infeasible() {
        let (constants, limits) = setup();

        // 10 nodes would each need to cover ~240 m; far beyond 0.5 W.
        let solution = minimum_power_for_coverage(
            &constants,
            &limits,
            REGION,
            10,
            DataRate::from_kbps(50.0),
            30.0,
            50.0,
        );

        assert!(!solution.power.feasible);
        assert!(!solution.meets_node_budget);
    }

    #[test]
    fn connectivity_target_within_power_limit() {
        let (constants, limits) = setup();

        let solution = minimum_power_for_connectivity(
            &constants,
            &limits,
            REGION,
            300,
            2,
            0.9,
            DataRate::from_kbps(50.0),
            30.0,
            50.0,
        );

        assert!(solution.meets_target);
        assert!(solution.achieved_connectivity >= 0.9);
        assert!(solution.message.is_none());
        assert!(solution.distance.metres() > 0.0);
    }

    #[test]
    fn connectivity_target_beyond_power_limit() {
        let (constants, limits) = setup();

        // 10 nodes cannot 3-connect 1 km² at any admissible power.
        let solution = minimum_power_for_connectivity(
            &constants,
            &limits,
            REGION,
            10,
            3,
            0.9,
            DataRate::from_kbps(50.0),
            30.0,
            50.0,
        );

        assert!(!solution.meets_target);
        assert!(solution.message.as_ref().unwrap().contains("not reached"));
    }

    #[test]
    fn impact_table_is_monotone_in_power() {
        let (constants, _) = setup();

        let powers: Vec<Power> = [0.1, 0.2, 0.3, 0.4, 0.5]
            .iter()
            .map(|&w| Power::from_watts(w))
            .collect();
        let rows = power_impact(
            &constants,
            &powers,
            DataRate::from_kbps(50.0),
            30.0,
            50.0,
            REGION,
        );

        assert_eq!(rows.len(), 5);
        for pair in rows.windows(2) {
            assert!(pair[0].distance < pair[1].distance);
            assert!(pair[0].minimum_nodes >= pair[1].minimum_nodes);
            assert!(pair[0].single_node_coverage < pair[1].single_node_coverage);
        }
    }
}
