//! UV NLOS scattering channel: angle-dependent path loss and the OOK
//! communication distance equation, plus the inverse searches over it.
//!
//! The forward model is
//! `l = [−ηλPt / (hcξRd · ln 2Pe)]^(1/α)`
//! with the loss exponent α and loss factor ξ both empirical functions of
//! the transceiver elevation angles.

use serde::{Deserialize, Serialize};

use crate::params::ChannelConstants;
use crate::units::{DataRate, Length, Power};

/// UV NLOS loss is steeper than free space; the exponent scales linearly
/// with the summed elevation, normalised against 45° per side.
const ALPHA_BASE: f64 = 3.0;

/// Observed NLOS range of the loss exponent.
const ALPHA_MIN: f64 = 2.5;
const ALPHA_MAX: f64 = 4.0;

/// Rayleigh scattering goes as 1/λ⁴; the factor is normalised to 280 nm.
const RAYLEIGH_REFERENCE_NM: f64 = 280.0;

/// Floor for sin θ1 · sin θ2. Keeps ξ finite for near-horizontal beams.
const GEOMETRIC_FACTOR_FLOOR: f64 = 0.1;

/// Bracket and tolerance for [`find_required_power`].
const POWER_BRACKET_W: (f64, f64) = (0.01, 2.0);
const POWER_TOLERANCE_W: f64 = 0.001;

/// Bracket and tolerance for [`find_supported_rate`].
const RATE_BRACKET_BPS: (f64, f64) = (1e3, 200e3);
const RATE_TOLERANCE_BPS: f64 = 1000.0;

/// Bisection over these brackets converges in well under 32 halvings; the
/// guard only matters if floating point noise stalls the bracket.
const MAX_SEARCH_ITERATIONS: usize = 64;

/// A complete set of link parameters for one transmitter/receiver pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkParameters {
    pub power: Power,
    pub data_rate: DataRate,
    pub tx_elevation_deg: f64,
    pub rx_elevation_deg: f64,
}

impl LinkParameters {
    pub fn new(power: Power, data_rate: DataRate, tx_elevation_deg: f64, rx_elevation_deg: f64) -> Self {
        Self {
            power,
            data_rate,
            tx_elevation_deg,
            rx_elevation_deg,
        }
    }
}

/// Empirical path loss parameters for one elevation pairing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLossParameters {
    /// Loss exponent α ∈ [2.5, 4.0].
    pub exponent: f64,

    /// Loss factor ξ. Always positive.
    pub factor: f64,
}

pub fn loss_exponent(theta1_deg: f64, theta2_deg: f64) -> f64 {
    let angle_factor =
        (theta1_deg.to_radians() + theta2_deg.to_radians()) / (2.0 * 45f64.to_radians());

    (ALPHA_BASE * (0.9 + 0.2 * angle_factor)).clamp(ALPHA_MIN, ALPHA_MAX)
}

pub fn loss_factor(theta1_deg: f64, theta2_deg: f64, constants: &ChannelConstants) -> f64 {
    let wavelength_nm = constants.wavelength * 1e9;
    let wavelength_factor = (RAYLEIGH_REFERENCE_NM / wavelength_nm).powi(4);

    let geometric_factor = (theta1_deg.to_radians().sin() * theta2_deg.to_radians().sin())
        .max(GEOMETRIC_FACTOR_FLOOR);

    constants.xi_base * wavelength_factor * constants.scattering_coefficient / geometric_factor
}

pub fn path_loss_parameters(
    theta1_deg: f64,
    theta2_deg: f64,
    constants: &ChannelConstants,
) -> PathLossParameters {
    PathLossParameters {
        exponent: loss_exponent(theta1_deg, theta2_deg),
        factor: loss_factor(theta1_deg, theta2_deg, constants),
    }
}

/// Maximum OOK communication distance for the given link.
///
/// Returns `None` when the parameter combination is degenerate (the inner
/// ratio non-positive or non-finite, e.g. zero power). Callers treat `None`
/// as "link infeasible" and skip the configuration; it must never be turned
/// into a NaN distance further down the chain.
pub fn ook_distance(constants: &ChannelConstants, link: &LinkParameters) -> Option<Length> {
    let PathLossParameters { exponent, factor } =
        path_loss_parameters(link.tx_elevation_deg, link.rx_elevation_deg, constants);

    let numerator = -constants.quantum_efficiency * constants.wavelength * link.power.watts();
    let denominator = constants.planck_constant
        * constants.speed_of_light
        * factor
        * link.data_rate.bps()
        * (2.0 * constants.error_probability).ln();

    let ratio = numerator / denominator;
    if !ratio.is_finite() || ratio <= 0.0 {
        return None;
    }

    let metres = ratio.powf(1.0 / exponent);
    metres.is_finite().then(|| Length::from_metres(metres))
}

pub fn distance_vs_power(
    constants: &ChannelConstants,
    powers: &[Power],
    data_rate: DataRate,
    theta1_deg: f64,
    theta2_deg: f64,
) -> Vec<Option<Length>> {
    powers
        .iter()
        .map(|&power| {
            ook_distance(
                constants,
                &LinkParameters::new(power, data_rate, theta1_deg, theta2_deg),
            )
        })
        .collect()
}

pub fn distance_vs_rate(
    constants: &ChannelConstants,
    power: Power,
    rates: &[DataRate],
    theta1_deg: f64,
    theta2_deg: f64,
) -> Vec<Option<Length>> {
    rates
        .iter()
        .map(|&rate| {
            ook_distance(
                constants,
                &LinkParameters::new(power, rate, theta1_deg, theta2_deg),
            )
        })
        .collect()
}

pub fn distance_vs_tx_elevation(
    constants: &ChannelConstants,
    power: Power,
    data_rate: DataRate,
    theta1_degs: &[f64],
    theta2_deg: f64,
) -> Vec<Option<Length>> {
    theta1_degs
        .iter()
        .map(|&theta1| {
            ook_distance(
                constants,
                &LinkParameters::new(power, data_rate, theta1, theta2_deg),
            )
        })
        .collect()
}

/// Distance over the Cartesian product of elevation grids.
/// Outer index follows `theta1_degs`, inner follows `theta2_degs`.
pub fn distance_matrix(
    constants: &ChannelConstants,
    power: Power,
    data_rate: DataRate,
    theta1_degs: &[f64],
    theta2_degs: &[f64],
) -> Vec<Vec<Option<Length>>> {
    theta1_degs
        .iter()
        .map(|&theta1| {
            theta2_degs
                .iter()
                .map(|&theta2| {
                    ook_distance(
                        constants,
                        &LinkParameters::new(power, data_rate, theta1, theta2),
                    )
                })
                .collect()
        })
        .collect()
}

/// Outcome of a bracketed inverse search. An unreachable target is reported
/// with `feasible: false` and the closest achievable figures, never as a
/// bare sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult<T> {
    pub feasible: bool,
    pub value: T,
    pub achieved_distance: Length,
    pub message: Option<String>,
}

/// Minimum transmission power reaching `target`, to 0.001 W.
pub fn find_required_power(
    constants: &ChannelConstants,
    target: Length,
    data_rate: DataRate,
    theta1_deg: f64,
    theta2_deg: f64,
) -> SearchResult<Power> {
    let distance_at = |watts: f64| {
        ook_distance(
            constants,
            &LinkParameters::new(Power::from_watts(watts), data_rate, theta1_deg, theta2_deg),
        )
    };

    let (mut low, mut high) = POWER_BRACKET_W;

    let Some(reach) = distance_at(high) else {
        return SearchResult {
            feasible: false,
            value: Power::from_watts(high),
            achieved_distance: Length::from_metres(0.0),
            message: Some("channel is degenerate for these parameters".to_string()),
        };
    };

    if reach < target {
        return SearchResult {
            feasible: false,
            value: Power::from_watts(high),
            achieved_distance: reach,
            message: Some(format!(
                "target {:.1} m unreachable even at {:.2} W (best {:.1} m)",
                target.metres(),
                high,
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

    SearchResult {
        feasible: true,
        value: Power::from_watts(high),
        achieved_distance: distance_at(high).unwrap_or(Length::from_metres(0.0)),
        message: None,
    }
}

/// Maximum data rate still reaching `target` at the given power, to 1 kbps.
pub fn find_supported_rate(
    constants: &ChannelConstants,
    target: Length,
    power: Power,
    theta1_deg: f64,
    theta2_deg: f64,
) -> SearchResult<DataRate> {
    let distance_at = |bps: f64| {
        ook_distance(
            constants,
            &LinkParameters::new(power, DataRate::from_bps(bps), theta1_deg, theta2_deg),
        )
    };

    let (mut low, mut high) = RATE_BRACKET_BPS;

    // The slowest rate carries furthest; if even it falls short, no rate works.
    let Some(reach) = distance_at(low) else {
        return SearchResult {
            feasible: false,
            value: DataRate::from_bps(low),
            achieved_distance: Length::from_metres(0.0),
            message: Some("channel is degenerate for these parameters".to_string()),
        };
    };

    if reach < target {
        return SearchResult {
            feasible: false,
            value: DataRate::from_bps(low),
            achieved_distance: reach,
            message: Some(format!(
                "target {:.1} m unreachable even at {:.1} kbps (best {:.1} m)",
                target.metres(),
                low / 1000.0,
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

    SearchResult {
        feasible: true,
        value: DataRate::from_bps(low),
        achieved_distance: distance_at(low).unwrap_or(Length::from_metres(0.0)),
        message: None,
    }
}
