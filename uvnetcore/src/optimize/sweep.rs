//! Cartesian-product search over {power, rate, θ1, θ2}. Each combination
//! is scored through the full model chain (distance → minimum nodes →
//! 2-connectivity); the per-combination evaluation is public so callers
//! can fan the product out over worker threads.

use serde::{Deserialize, Serialize};

use crate::channel::{self, LinkParameters};
use crate::connectivity;
use crate::coverage;
use crate::optimize::{OPTIMIZER_SAMPLE_POINTS, Objective};
use crate::params::{ChannelConstants, LinkLimits};
use crate::units::{Area, DataRate, Length, Power};

/// Links shorter than this are not worth deploying; they would demand an
/// absurd node count and mostly indicate a degenerate corner of the grid.
const MIN_USEFUL_DISTANCE: Length = Length::from_metres(1.0);

/// Connectivity shortfall penalty weight for the balanced objective.
const BALANCED_PENALTY_OFFSET: f64 = 1.1;

/// The parameter grid to sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub powers: Vec<Power>,
    pub rates: Vec<DataRate>,
    pub tx_elevations_deg: Vec<f64>,
    pub rx_elevations_deg: Vec<f64>,
    pub region: Area,
}

impl SweepConfig {
    /// The grid the reference analysis swept: five powers, six rates and
    /// the analyzed elevation options.
    pub fn from_limits(limits: &LinkLimits, region: Area) -> Self {
        Self {
            powers: [0.1, 0.2, 0.3, 0.4, 0.5]
                .iter()
                .map(|&w| Power::from_watts(w))
                .collect(),
            rates: [10.0, 30.0, 50.0, 70.0, 100.0, 120.0]
                .iter()
                .map(|&k| DataRate::from_kbps(k))
                .collect(),
            tx_elevations_deg: limits.tx_elevation_options_deg.clone(),
            rx_elevations_deg: limits.rx_elevation_options_deg.clone(),
            region,
        }
    }

    /// All (power, rate, θ1, θ2) combinations in grid order.
    pub fn combinations(&self) -> Vec<(Power, DataRate, f64, f64)> {
        let mut combinations =
            Vec::with_capacity(self.powers.len() * self.rates.len() * self.tx_elevations_deg.len());
        for &power in &self.powers {
            for &rate in &self.rates {
                for &theta1 in &self.tx_elevations_deg {
                    for &theta2 in &self.rx_elevations_deg {
                        combinations.push((power, rate, theta1, theta2));
                    }
                }
            }
        }
        combinations
    }
}

/// Admissibility constraints applied to every combination.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SweepConstraints {
    pub min_two_connectivity: Option<f64>,
    pub max_nodes: Option<usize>,
}

/// One admissible configuration and its figures of merit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRow {
    pub power: Power,
    pub data_rate: DataRate,
    pub tx_elevation_deg: f64,
    pub rx_elevation_deg: f64,
    pub distance: Length,
    pub minimum_nodes: usize,
    pub two_connectivity: f64,

    /// Objective score; lower is better for every objective.
    pub score: f64,
}

/// Run one combination through the model chain. Returns `None` for
/// degenerate or constraint-violating configurations.
pub fn evaluate_combination(
    constants: &ChannelConstants,
    region: Area,
    power: Power,
    data_rate: DataRate,
    theta1_deg: f64,
    theta2_deg: f64,
    constraints: SweepConstraints,
    objective: Objective,
) -> Option<SweepRow> {
    let distance = channel::ook_distance(
        constants,
        &LinkParameters::new(power, data_rate, theta1_deg, theta2_deg),
    )?;
    if distance < MIN_USEFUL_DISTANCE {
        return None;
    }

    let minimum_nodes = coverage::minimum_nodes(region, distance);
    let two_connectivity = connectivity::network_connectivity_probability(
        distance,
        minimum_nodes,
        2,
        region,
        OPTIMIZER_SAMPLE_POINTS,
    );

    if let Some(floor) = constraints.min_two_connectivity {
        if two_connectivity < floor {
            return None;
        }
    }
    if let Some(budget) = constraints.max_nodes {
        if minimum_nodes > budget {
            return None;
        }
    }

    let score = match objective {
        Objective::MinimumNodes => minimum_nodes as f64,
        Objective::MaximumConnectivity => -two_connectivity,
        Objective::Balanced => {
            minimum_nodes as f64 * (BALANCED_PENALTY_OFFSET - two_connectivity)
        }
    };

    Some(SweepRow {
        power,
        data_rate,
        tx_elevation_deg: theta1_deg,
        rx_elevation_deg: theta2_deg,
        distance,
        minimum_nodes,
        two_connectivity,
        score,
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    /// The best-scoring admissible row, if any combination is admissible.
    pub optimal: Option<SweepRow>,

    /// Every admissible row, in grid order.
    pub rows: Vec<SweepRow>,

    pub objective: Objective,
    pub constraints: SweepConstraints,
}

/// Evaluate the whole grid serially.
pub fn run_sweep(
    constants: &ChannelConstants,
    config: &SweepConfig,
    constraints: SweepConstraints,
    objective: Objective,
) -> SweepOutcome {
    let rows: Vec<SweepRow> = config
        .combinations()
        .into_iter()
        .filter_map(|(power, rate, theta1, theta2)| {
            evaluate_combination(
                constants,
                config.region,
                power,
                rate,
                theta1,
                theta2,
                constraints,
                objective,
            )
        })
        .collect();

    let optimal = rows
        .iter()
        .min_by(|a, b| a.score.total_cmp(&b.score))
        .cloned();

    SweepOutcome {
        optimal,
        rows,
        objective,
        constraints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: Area = Area::from_square_metres(1e6);

    fn setup() -> (ChannelConstants, SweepConfig) {
        let constants = ChannelConstants::default();
        let config = SweepConfig::from_limits(&LinkLimits::default(), REGION);
        (constants, config)
    }

    #[test]
    fn grid_has_the_reference_shape() {
        let (_, config) = setup();
        // 5 powers × 6 rates × 3 tx × 2 rx
        assert_eq!(config.combinations().len(), 180);
    }

    #[test]
    fn sweep_finds_an_optimum_under_constraints() {
        let (constants, config) = setup();

        let outcome = run_sweep(
            &constants,
            &config,
            SweepConstraints {
                min_two_connectivity: Some(0.9),
                ..Default::default()
            },
            Objective::MinimumNodes,
        );

        let optimal = outcome.optimal.expect("the reference grid is satisfiable");
        assert!(optimal.two_connectivity >= 0.9);
        assert!(!outcome.rows.is_empty());

        // Nothing admissible scores better than the reported optimum.
        for row in &outcome.rows {
            assert!(row.minimum_nodes >= optimal.minimum_nodes);
        }

        // The slowest rate at full power carries furthest; with the
        // connectivity floor satisfied everywhere admissible, the fewest
        // nodes come from the longest link.
        assert_eq!(optimal.data_rate, DataRate::from_kbps(10.0));
        assert_eq!(optimal.power, Power::from_watts(0.5));
    }

    #[test]
    fn constraints_prune_rows() {
        let (constants, config) = setup();

        let unconstrained = run_sweep(
            &constants,
            &config,
            SweepConstraints::default(),
            Objective::MinimumNodes,
        );
        let constrained = run_sweep(
            &constants,
            &config,
            SweepConstraints {
                max_nodes: Some(100),
                min_two_connectivity: Some(0.9),
            },
            Objective::MinimumNodes,
        );

        assert!(constrained.rows.len() < unconstrained.rows.len());
        for row in &constrained.rows {
            assert!(row.minimum_nodes <= 100);
            assert!(row.two_connectivity >= 0.9);
        }
    }

    #[test]
    fn balanced_objective_penalises_connectivity_shortfall() {
        let (constants, _) = setup();

        let row = evaluate_combination(
            &constants,
            REGION,
            Power::from_watts(0.5),
            DataRate::from_kbps(50.0),
            30.0,
            50.0,
            SweepConstraints::default(),
            Objective::Balanced,
        )
        .unwrap();

        let expected = row.minimum_nodes as f64 * (1.1 - row.two_connectivity);
        assert!((row.score - expected).abs() < 1e-12);
    }

    #[test]
    fn maximise_connectivity_flips_the_score_sign() {
        let (constants, _) = setup();

        let row = evaluate_combination(
            &constants,
            REGION,
            Power::from_watts(0.5),
            DataRate::from_kbps(10.0),
            30.0,
            30.0,
            SweepConstraints::default(),
            Objective::MaximumConnectivity,
        )
        .unwrap();

        assert!((row.score + row.two_connectivity).abs() < 1e-12);
    }

    #[test]
    fn degenerate_combinations_are_skipped() {
        let (constants, _) = setup();

        let row = evaluate_combination(
            &constants,
            REGION,
            Power::from_watts(0.0),
            DataRate::from_kbps(50.0),
            30.0,
            50.0,
            SweepConstraints::default(),
            Objective::MinimumNodes,
        );

        assert!(row.is_none());
    }
}
