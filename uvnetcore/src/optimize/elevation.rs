//! Elevation-pair selection. The field campaign analyzed a small fixed set
//! of transceiver pairings rather than a continuous angle space, so this
//! layer enumerates and ranks those pairs instead of searching.

use serde::{Deserialize, Serialize};

use crate::channel::{self, LinkParameters};
use crate::connectivity;
use crate::coverage;
use crate::optimize::{OPTIMIZER_SAMPLE_POINTS, Priority, REFERENCE_POPULATION};
use crate::params::{ChannelConstants, LinkLimits};
use crate::units::{Area, DataRate, Length, Power};

/// The balanced recommendation defaults to the experimental pairing.
const EXPERIMENTAL_PAIR_DEG: (f64, f64) = (30.0, 50.0);

/// One evaluated elevation pairing, ranked 1 = fewest nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationRanking {
    pub tx_elevation_deg: f64,
    pub rx_elevation_deg: f64,
    pub distance: Length,
    pub minimum_nodes: usize,
    pub single_node_coverage: Area,

    /// 2-connectivity of the 300-node reference population.
    pub two_connectivity: f64,

    pub rank: usize,
}

/// Evaluate every configured elevation pairing and rank by node count.
/// Degenerate pairings (no finite distance) are left out.
pub fn compare_elevation_combinations(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    power: Power,
    data_rate: DataRate,
    region: Area,
) -> Vec<ElevationRanking> {
    let mut rankings: Vec<ElevationRanking> = limits
        .elevation_combinations_deg
        .iter()
        .filter_map(|&(theta1, theta2)| {
            let distance = channel::ook_distance(
                constants,
                &LinkParameters::new(power, data_rate, theta1, theta2),
            )?;

            Some(ElevationRanking {
                tx_elevation_deg: theta1,
                rx_elevation_deg: theta2,
                distance,
                minimum_nodes: coverage::minimum_nodes(region, distance),
                single_node_coverage: coverage::single_node_effective_coverage(distance),
                two_connectivity: connectivity::network_connectivity_probability(
                    distance,
                    REFERENCE_POPULATION,
                    2,
                    region,
                    OPTIMIZER_SAMPLE_POINTS,
                ),
                rank: 0,
            })
        })
        .collect();

    rankings.sort_by_key(|ranking| ranking.minimum_nodes);
    for (index, ranking) in rankings.iter_mut().enumerate() {
        ranking.rank = index + 1;
    }

    rankings
}

/// An elevation pairing that satisfies a distance target, least excess first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationChoice {
    pub tx_elevation_deg: f64,
    pub rx_elevation_deg: f64,
    pub distance: Length,
    pub excess: Length,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationSolution {
    pub feasible: bool,
    pub options: Vec<ElevationChoice>,
    pub message: Option<String>,
}

impl ElevationSolution {
    pub fn best(&self) -> Option<&ElevationChoice> {
        self.options.first()
    }
}

/// Pairings reaching `target`, ordered by least over-provisioned distance.
pub fn best_angles_for_distance(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    target: Length,
    power: Power,
    data_rate: DataRate,
) -> ElevationSolution {
    let mut options: Vec<ElevationChoice> = limits
        .elevation_combinations_deg
        .iter()
        .filter_map(|&(theta1, theta2)| {
            let distance = channel::ook_distance(
                constants,
                &LinkParameters::new(power, data_rate, theta1, theta2),
            )?;

            (distance >= target).then(|| ElevationChoice {
                tx_elevation_deg: theta1,
                rx_elevation_deg: theta2,
                distance,
                excess: distance - target,
            })
        })
        .collect();

    options.sort_by(|a, b| a.excess.metres().total_cmp(&b.excess.metres()));

    if options.is_empty() {
        ElevationSolution {
            feasible: false,
            options,
            message: Some(format!(
                "no elevation pairing reaches {:.0} m at {:.1} W and {:.0} kbps",
                target.metres(),
                power.watts(),
                data_rate.kbps()
            )),
        }
    } else {
        ElevationSolution {
            feasible: true,
            options,
            message: None,
        }
    }
}

/// A pairing that covers the region within a node budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationNodeChoice {
    pub tx_elevation_deg: f64,
    pub rx_elevation_deg: f64,
    pub distance: Length,
    pub required_nodes: usize,
    pub spare_nodes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationNodeSolution {
    pub feasible: bool,
    pub options: Vec<ElevationNodeChoice>,
    pub message: Option<String>,
}

impl ElevationNodeSolution {
    pub fn best(&self) -> Option<&ElevationNodeChoice> {
        self.options.first()
    }
}

/// Pairings whose minimum node count fits the budget, widest margin first.
pub fn best_angles_for_nodes(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    max_nodes: usize,
    region: Area,
    power: Power,
    data_rate: DataRate,
) -> ElevationNodeSolution {
    let mut options: Vec<ElevationNodeChoice> = limits
        .elevation_combinations_deg
        .iter()
        .filter_map(|&(theta1, theta2)| {
            let distance = channel::ook_distance(
                constants,
                &LinkParameters::new(power, data_rate, theta1, theta2),
            )?;

            let required_nodes = coverage::minimum_nodes(region, distance);
            (required_nodes <= max_nodes).then(|| ElevationNodeChoice {
                tx_elevation_deg: theta1,
                rx_elevation_deg: theta2,
                distance,
                required_nodes,
                spare_nodes: max_nodes - required_nodes,
            })
        })
        .collect();

    options.sort_by(|a, b| b.spare_nodes.cmp(&a.spare_nodes));

    if options.is_empty() {
        ElevationNodeSolution {
            feasible: false,
            options,
            message: Some(format!(
                "no elevation pairing covers {:.1e} m² with {max_nodes} nodes",
                region.square_metres()
            )),
        }
    } else {
        ElevationNodeSolution {
            feasible: true,
            options,
            message: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElevationRecommendation {
    pub tx_elevation_deg: f64,
    pub rx_elevation_deg: f64,
    pub reason: String,
    pub ranked: Vec<ElevationRanking>,
}

/// Pick a pairing by stakeholder priority: cost takes the fewest nodes,
/// reliability the best reference-population connectivity, balanced the
/// experimental pairing.
pub fn recommend(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    power: Power,
    data_rate: DataRate,
    region: Area,
    priority: Priority,
) -> Option<ElevationRecommendation> {
    let ranked = compare_elevation_combinations(constants, limits, power, data_rate, region);
    if ranked.is_empty() {
        return None;
    }

    let (choice, reason) = match priority {
        Priority::Cost => (
            ranked.iter().min_by_key(|r| r.minimum_nodes)?,
            "fewest nodes for full coverage".to_string(),
        ),
        Priority::Reliability => (
            ranked
                .iter()
                .max_by(|a, b| a.two_connectivity.total_cmp(&b.two_connectivity))?,
            "highest 2-connectivity".to_string(),
        ),
        Priority::Balanced => {
            let experimental = ranked.iter().find(|r| {
                (r.tx_elevation_deg, r.rx_elevation_deg) == EXPERIMENTAL_PAIR_DEG
            });
            match experimental {
                Some(choice) => (
                    choice,
                    "balanced performance (the field-validated pairing)".to_string(),
                ),
                None => (&ranked[0], "best overall ranking".to_string()),
            }
        }
    };

    Some(ElevationRecommendation {
        tx_elevation_deg: choice.tx_elevation_deg,
        rx_elevation_deg: choice.rx_elevation_deg,
        reason,
        ranked: ranked.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: Area = Area::from_square_metres(1e6);

    fn setup() -> (ChannelConstants, LinkLimits) {
        (ChannelConstants::default(), LinkLimits::default())
    }

    fn anchor() -> (Power, DataRate) {
        (Power::from_watts(0.5), DataRate::from_kbps(50.0))
    }

    #[test]
    fn shallow_angles_rank_first() {
        let (constants, limits) = setup();
        let (power, rate) = anchor();

        let rankings = compare_elevation_combinations(&constants, &limits, power, rate, REGION);

        assert_eq!(rankings.len(), 4);
        assert_eq!(rankings[0].rank, 1);
        // 30°/30° carries furthest, so it needs the fewest nodes.
        assert_eq!(
            (rankings[0].tx_elevation_deg, rankings[0].rx_elevation_deg),
            (30.0, 30.0)
        );
        for pair in rankings.windows(2) {
            assert!(pair[0].minimum_nodes <= pair[1].minimum_nodes);
        }
    }

    #[test]
    fn distance_target_picks_least_excess() {
        let (constants, limits) = setup();
        let (power, rate) = anchor();

        let solution =
            best_angles_for_distance(&constants, &limits, Length::from_metres(72.0), power, rate);

        assert!(solution.feasible);
        // 50°/50° reaches ~71.8 m and drops out; the symmetric 30/50 pair
        // beats 30/30 on excess.
        assert_eq!(solution.options.len(), 3);
        let best = solution.best().unwrap();
        assert_eq!(
            (best.tx_elevation_deg, best.rx_elevation_deg),
            (30.0, 50.0)
        );
        for pair in solution.options.windows(2) {
            assert!(pair[0].excess <= pair[1].excess);
        }
    }

    #[test]
    fn unreachable_distance_target_is_explained() {
        let (constants, limits) = setup();
        let (power, rate) = anchor();

        let solution =
            best_angles_for_distance(&constants, &limits, Length::from_metres(120.0), power, rate);

        assert!(!solution.feasible);
        assert!(solution.best().is_none());
        assert!(solution.message.as_ref().unwrap().contains("no elevation"));
    }

    #[test]
    fn node_budget_prefers_widest_margin() {
        let (constants, limits) = setup();
        let (power, rate) = anchor();

        let solution =
            best_angles_for_nodes(&constants, &limits, 120, REGION, power, rate);

        assert!(solution.feasible);
        let best = solution.best().unwrap();
        assert!(best.required_nodes <= 120);
        for pair in solution.options.windows(2) {
            assert!(pair[0].spare_nodes >= pair[1].spare_nodes);
        }
    }

    #[test]
    fn impossible_node_budget_is_explained() {
        let (constants, limits) = setup();
        let (power, rate) = anchor();

        let solution = best_angles_for_nodes(&constants, &limits, 20, REGION, power, rate);

        assert!(!solution.feasible);
        assert!(solution.message.is_some());
    }

    #[test]
    fn priorities_select_sensibly() {
        let (constants, limits) = setup();
        let (power, rate) = anchor();

        let cost = recommend(&constants, &limits, power, rate, REGION, Priority::Cost).unwrap();
        assert_eq!(
            (cost.tx_elevation_deg, cost.rx_elevation_deg),
            (30.0, 30.0)
        );

        let balanced =
            recommend(&constants, &limits, power, rate, REGION, Priority::Balanced).unwrap();
        assert_eq!(
            (balanced.tx_elevation_deg, balanced.rx_elevation_deg),
            (30.0, 50.0)
        );
        assert!(balanced.reason.contains("field-validated"));

        let reliability =
            recommend(&constants, &limits, power, rate, REGION, Priority::Reliability).unwrap();
        assert_eq!(reliability.ranked.len(), 4);
    }
}
