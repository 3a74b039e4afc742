//! Inverse design searches over the channel, coverage and connectivity
//! models: single-scalar binary searches (power, rate), the fixed
//! elevation-pair enumeration, the full Cartesian sweep, and the
//! end-to-end design composer.

pub mod design;
pub mod elevation;
pub mod power;
pub mod rate;
pub mod sweep;

use serde::{Deserialize, Serialize};

/// What a configuration search should favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Objective {
    /// Fewest nodes that still satisfy the constraints (cost).
    MinimumNodes,
    /// Highest 2-connectivity within the constraints (reliability).
    MaximumConnectivity,
    /// Node count penalised by the connectivity shortfall.
    Balanced,
}

/// High-level stakeholder priority, mapped onto [`Objective`]s by the
/// elevation and design layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Cost,
    Reliability,
    Balanced,
}

/// Sample count the optimizer layers use for connectivity evaluations.
/// Coarser than [`crate::connectivity::DEFAULT_SAMPLE_POINTS`]: sweeps
/// evaluate hundreds of configurations and the published optimizer figures
/// were produced at this density.
pub(crate) const OPTIMIZER_SAMPLE_POINTS: usize = 10;

/// Node population the impact/ranking tables evaluate connectivity at,
/// following the reference analysis' 300-node scenario.
pub(crate) const REFERENCE_POPULATION: usize = 300;
