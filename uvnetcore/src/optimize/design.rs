//! End-to-end network design: sweep the parameter grid for the optimal
//! admissible configuration, then attach the robustness assessment and
//! improvement advice. The one layer that refuses outright when nothing
//! satisfies the requirements, with the constraint summary in the error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimize::sweep::{self, SweepConfig, SweepConstraints, SweepRow};
use crate::optimize::{Objective, Priority};
use crate::params::{ChannelConstants, LinkLimits, NetworkDefaults};
use crate::robustness::{self, RobustnessReport};
use crate::units::{Area, DataRate, Length, Power};

#[derive(Debug, Error)]
pub enum DesignError {
    #[error("no parameter combination meets the requirements: {0}")]
    NoFeasibleConfiguration(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignRequirements {
    pub region: Area,
    pub target_connectivity: f64,
    pub budget_nodes: Option<usize>,
    pub priority: Priority,
}

impl Default for DesignRequirements {
    fn default() -> Self {
        let defaults = NetworkDefaults::default();
        Self {
            region: defaults.region_area,
            target_connectivity: defaults.connectivity_target,
            budget_nodes: None,
            priority: Priority::Balanced,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RequirementsMet {
    pub connectivity_target: bool,
    pub node_budget: bool,
}

/// A complete deployable design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkDesign {
    pub power: Power,
    pub data_rate: DataRate,
    pub tx_elevation_deg: f64,
    pub rx_elevation_deg: f64,
    pub communication_distance: Length,
    pub required_nodes: usize,
    pub two_connectivity: f64,
    pub region: Area,

    pub robustness: RobustnessReport,
    pub recommendations: Vec<String>,
    pub requirements_met: RequirementsMet,
}

fn objective_and_constraints(
    requirements: &DesignRequirements,
) -> (Objective, SweepConstraints) {
    match requirements.priority {
        Priority::Cost => (
            Objective::MinimumNodes,
            SweepConstraints {
                min_two_connectivity: Some(requirements.target_connectivity),
                max_nodes: requirements.budget_nodes,
            },
        ),
        Priority::Reliability => (
            Objective::MaximumConnectivity,
            SweepConstraints {
                min_two_connectivity: None,
                max_nodes: requirements.budget_nodes,
            },
        ),
        Priority::Balanced => (
            Objective::Balanced,
            SweepConstraints {
                min_two_connectivity: Some(requirements.target_connectivity),
                max_nodes: requirements.budget_nodes,
            },
        ),
    }
}

pub fn design_network(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    requirements: &DesignRequirements,
) -> Result<NetworkDesign, DesignError> {
    let (objective, constraints) = objective_and_constraints(requirements);
    let config = SweepConfig::from_limits(limits, requirements.region);

    let outcome = sweep::run_sweep(constants, &config, constraints, objective);

    let Some(optimal) = outcome.optimal else {
        return Err(DesignError::NoFeasibleConfiguration(format!(
            "region {:.1e} m², 2-connectivity ≥ {:.0}%{}",
            requirements.region.square_metres(),
            requirements.target_connectivity * 100.0,
            requirements
                .budget_nodes
                .map(|budget| format!(", node budget {budget}"))
                .unwrap_or_default()
        )));
    };

    Ok(complete_design(requirements, optimal))
}

fn complete_design(requirements: &DesignRequirements, optimal: SweepRow) -> NetworkDesign {
    let robustness = robustness::evaluate(
        optimal.distance,
        optimal.minimum_nodes,
        requirements.region,
    );
    let recommendations = robustness::recommend_improvements(
        optimal.distance,
        optimal.minimum_nodes,
        requirements.region,
    );

    NetworkDesign {
        power: optimal.power,
        data_rate: optimal.data_rate,
        tx_elevation_deg: optimal.tx_elevation_deg,
        rx_elevation_deg: optimal.rx_elevation_deg,
        communication_distance: optimal.distance,
        required_nodes: optimal.minimum_nodes,
        two_connectivity: optimal.two_connectivity,
        region: requirements.region,
        requirements_met: RequirementsMet {
            connectivity_target: optimal.two_connectivity >= requirements.target_connectivity,
            node_budget: requirements
                .budget_nodes
                .map(|budget| optimal.minimum_nodes <= budget)
                .unwrap_or(true),
        },
        robustness,
        recommendations,
    }
}

/// Fewest nodes meeting the connectivity target.
pub fn optimize_for_cost(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    region: Area,
    target_connectivity: f64,
) -> Result<NetworkDesign, DesignError> {
    design_network(
        constants,
        limits,
        &DesignRequirements {
            region,
            target_connectivity,
            budget_nodes: None,
            priority: Priority::Cost,
        },
    )
}

/// Best connectivity within a node budget.
pub fn optimize_for_reliability(
    constants: &ChannelConstants,
    limits: &LinkLimits,
    region: Area,
    budget_nodes: usize,
) -> Result<NetworkDesign, DesignError> {
    design_network(
        constants,
        limits,
        &DesignRequirements {
            region,
            target_connectivity: 0.0,
            budget_nodes: Some(budget_nodes),
            priority: Priority::Reliability,
        },
    )
}
