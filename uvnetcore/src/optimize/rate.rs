//! Data-rate searches: the fastest rate that still reaches a distance or
//! holds a connectivity target, and the rate-impact table. Rate trades
//! directly against range, so these are the mirror image of the power
//! searches with the bracket directions flipped.

use serde::{Deserialize, Serialize};

use crate::channel::{self, LinkParameters};
use crate::connectivity;
use crate::coverage;
use crate::optimize::{OPTIMIZER_SAMPLE_POINTS, REFERENCE_POPULATION};
use crate::params::{ChannelConstants, LinkLimits};
use crate::units::{Area, DataRate, Length, Power};

/// 1 kbps resolution.
const RATE_TOLERANCE_BPS: f64 = 1e3;

const MAX_SEARCH_ITERATIONS: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSolution {
    pub feasible: bool,
    pub maximum_rate: DataRate,
    pub achieved_distance: Length,
    pub target_distance: Length,
    pub message: Option<String>,
}

/// Fastest rate within the engineering bounds that still reaches `target`.
/// Feasibility is judged at the minimum rate, which carries furthest.
pub fn maximum_rate_for_distance(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    target: Length,
    power: Power,
    theta1_deg: f64,
    theta2_deg: f64,
) -> RateSolution {
    let distance_at = |bps: f64| {
        channel::ook_distance(
            constants,
            &LinkParameters::new(power, DataRate::from_bps(bps), theta1_deg, theta2_deg),
        )
    };

    let mut low = limits.rate_min.bps();
    let mut high = limits.rate_max.bps();

    let Some(reach) = distance_at(low) else {
        return RateSolution {
            feasible: false,
            maximum_rate: limits.rate_min,
            achieved_distance: Length::from_metres(0.0),
            target_distance: target,
            message: Some("channel is degenerate for these parameters".to_string()),
        };
    };

    if reach < target {
        return RateSolution {
            feasible: false,
            maximum_rate: limits.rate_min,
            achieved_distance: reach,
            target_distance: target,
            message: Some(format!(
                "target {:.0} m not achievable even at the minimum rate {:.0} kbps \
                 (reaches {:.1} m)",
                target.metres(),
                limits.rate_min.kbps(),
                reach.metres()
            )),
        };
    }

    for _ in 0..MAX_SEARCH_ITERATIONS {
        if high - low <= RATE_TOLERANCE_BPS {
            break;
        }
        let mid = (low + high) / 2.0;
        match distance_at(mid) {
            Some(distance) if distance >= target => low = mid,
            _ => high = mid,
        }
    }

    RateSolution {
        feasible: true,
        maximum_rate: DataRate::from_bps(low),
        achieved_distance: distance_at(low).unwrap_or(Length::from_metres(0.0)),
        target_distance: target,
        message: None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityRateSolution {
    pub maximum_rate: DataRate,
    pub achieved_connectivity: f64,
    pub target_connectivity: f64,
    pub distance: Length,
    pub nodes: usize,
    pub connectivity_level: usize,
    pub meets_target: bool,
    pub message: Option<String>,
}

/// Fastest rate at which `n` nodes still hold the m-connectivity target.
pub fn rate_for_connectivity(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    region: Area,
    n: usize,
    m: usize,
    target_probability: f64,
    power: Power,
    theta1_deg: f64,
    theta2_deg: f64,
) -> ConnectivityRateSolution {
    let connectivity_at = |bps: f64| {
        channel::ook_distance(
            constants,
            &LinkParameters::new(power, DataRate::from_bps(bps), theta1_deg, theta2_deg),
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

    let mut low = limits.rate_min.bps();
    let mut high = limits.rate_max.bps();

    for _ in 0..MAX_SEARCH_ITERATIONS {
        if high - low <= RATE_TOLERANCE_BPS {
            break;
        }
        let mid = (low + high) / 2.0;
        if connectivity_at(mid) < target_probability {
            high = mid;
        } else {
            low = mid;
        }
    }

    let maximum_rate = DataRate::from_bps(low);
    let distance = channel::ook_distance(
        constants,
        &LinkParameters::new(power, maximum_rate, theta1_deg, theta2_deg),
    )
    .unwrap_or(Length::from_metres(0.0));
    let achieved_connectivity = connectivity_at(low);
    let meets_target = achieved_connectivity >= target_probability;

    ConnectivityRateSolution {
        maximum_rate,
        achieved_connectivity,
        target_connectivity: target_probability,
        distance,
        nodes: n,
        connectivity_level: m,
        meets_target,
        message: (!meets_target).then(|| {
            format!(
                "{m}-connectivity target {:.0}% not reached even at the minimum rate \
                 {:.0} kbps (best {:.1}%)",
                target_probability * 100.0,
                limits.rate_min.kbps(),
                achieved_connectivity * 100.0
            )
        }),
    }
}

/// One row of the rate-impact analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateImpactRow {
    pub data_rate: DataRate,
    pub distance: Length,
    pub minimum_nodes: usize,
    pub single_node_coverage: Area,
    pub four_node_coverage: Area,

    /// 1-, 2- and 3-connectivity of the 300-node reference population.
    pub connectivity: [f64; 3],
}

/// Distance, coverage and connectivity across a rate range. Degenerate
/// configurations are excluded.
pub fn rate_impact(
    constants: &ChannelConstants,
    rates: &[DataRate],
    power: Power,
    theta1_deg: f64,
    theta2_deg: f64,
    region: Area,
) -> Vec<RateImpactRow> {
    rates
        .iter()
        .filter_map(|&data_rate| {
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

            Some(RateImpactRow {
                data_rate,
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
    fn finds_fastest_rate_for_a_reachable_distance() {
        let (constants, limits) = setup();

        let solution = maximum_rate_for_distance(
            &constants,
            &limits,
            Length::from_metres(75.1),
            Power::from_watts(0.5),
            30.0,
            50.0,
        );

        assert!(solution.feasible);
        // The anchor link carries ~50 kbps at 75.1 m.
        assert!(solution.maximum_rate.kbps() > 45.0 && solution.maximum_rate.kbps() < 52.0);
        assert!(solution.achieved_distance >= Length::from_metres(75.1));
    }

    #[test]
    fn near_targets_saturate_at_the_rate_ceiling() {
        let (constants, limits) = setup();

        // 40 m is reachable even at 120 kbps, so the ceiling binds.
        let solution = maximum_rate_for_distance(
            &constants,
            &limits,
            Length::from_metres(40.0),
            Power::from_watts(0.5),
            30.0,
            50.0,
        );

        assert!(solution.feasible);
        assert!(solution.maximum_rate.bps() > limits.rate_max.bps() - 2.0 * RATE_TOLERANCE_BPS);
    }

    #[test]
    fn reports_unreachable_distance_at_minimum_rate() {
        let (constants, limits) = setup();

        // Even 10 kbps only reaches ~124 m at 0.5 W.
        let solution = maximum_rate_for_distance(
            &constants,
            &limits,
            Length::from_metres(150.0),
            Power::from_watts(0.5),
            30.0,
            50.0,
        );

        assert!(!solution.feasible);
        assert_eq!(solution.maximum_rate, limits.rate_min);
        assert!(
            solution
                .message
                .as_ref()
                .unwrap()
                .contains("minimum rate")
        );
    }

    #[test]
    fn connectivity_bound_rate() {
        let (constants, limits) = setup();

        let solution = rate_for_connectivity(
            &constants,
            &limits,
            REGION,
            300,
            2,
            0.9,
            Power::from_watts(0.5),
            30.0,
            50.0,
        );

        assert!(solution.meets_target);
        assert!(solution.achieved_connectivity >= 0.9);
        assert!(solution.maximum_rate.bps() >= limits.rate_min.bps());
        assert!(solution.maximum_rate.bps() <= limits.rate_max.bps());
    }

    #[test]
    fn unreachable_connectivity_is_reported() {
        let (constants, limits) = setup();

        let solution = rate_for_connectivity(
            &constants,
            &limits,
            REGION,
            10,
            3,
            0.9,
            Power::from_watts(0.5),
            30.0,
            50.0,
        );

        assert!(!solution.meets_target);
        assert!(solution.message.is_some());
    }

    #[test]
    fn impact_table_shrinks_with_rate() {
        let (constants, _) = setup();

        let rates: Vec<DataRate> = [10.0, 30.0, 50.0, 70.0, 100.0, 120.0]
            .iter()
            .map(|&k| DataRate::from_kbps(k))
            .collect();
        let rows = rate_impact(
            &constants,
            &rates,
            Power::from_watts(0.5),
            30.0,
            50.0,
            REGION,
        );

        assert_eq!(rows.len(), 6);
        for pair in rows.windows(2) {
            assert!(pair[0].distance > pair[1].distance);
            assert!(pair[0].minimum_nodes <= pair[1].minimum_nodes);
        }
    }
}
