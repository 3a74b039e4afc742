//! Constant tables and validity ranges for the UV link and the deployment
//! region. The models themselves do not re-validate on every call; callers
//! that accept external input run [`LinkLimits::validate`] once up front.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::channel::LinkParameters;
use crate::units::{Area, DataRate, Power};

/// Physical and calibration constants of the UV scattering channel.
///
/// The physical values follow the measurement campaign's Table I. `xi_base`
/// is the one calibrated quantity: it is chosen so that the experimental
/// anchor link (0.5 W, 50 kbps, 30° up / 50° up) reproduces the measured
/// 75.1 m range. Override it to recalibrate against different field data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConstants {
    /// Planck constant (J·s).
    pub planck_constant: f64,

    /// Speed of light (m/s).
    pub speed_of_light: f64,

    /// Carrier wavelength (m). 265 nm sits in the solar-blind band.
    pub wavelength: f64,

    /// Detector quantum efficiency η.
    pub quantum_efficiency: f64,

    /// Target bit error probability Pe for OOK demodulation.
    pub error_probability: f64,

    /// Atmospheric scattering strength relative to the calibration day.
    pub scattering_coefficient: f64,

    /// Base path-loss factor, calibrated against the 75.1 m anchor.
    pub xi_base: f64,
}

impl Default for ChannelConstants {
    fn default() -> Self {
        Self {
            planck_constant: 6.626_070_15e-34,
            speed_of_light: 2.997_924_58e8,
            wavelength: 265e-9,
            quantum_efficiency: 0.15,
            error_probability: 1e-6,
            scattering_coefficient: 1.0,
            xi_base: 4.04e4,
        }
    }
}

impl ChannelConstants {
    /// Energy of a single carrier photon, E = hc/λ (J).
    pub fn photon_energy(&self) -> f64 {
        self.planck_constant * self.speed_of_light / self.wavelength
    }
}

/// Engineering ranges for the link parameters.
///
/// The power ceiling is an eye/skin safety limit, the rate window is the
/// band the channel model was validated over, and the elevation window is
/// what keeps the link in the non-line-of-sight scattering regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkLimits {
    pub power_min: Power,
    pub power_max: Power,
    pub power_default: Power,

    pub rate_min: DataRate,
    pub rate_max: DataRate,
    pub rate_default: DataRate,

    pub beam_divergence_min_deg: f64,
    pub beam_divergence_max_deg: f64,
    pub beam_divergence_default_deg: f64,

    pub elevation_min_deg: f64,
    pub elevation_max_deg: f64,
    pub tx_elevation_default_deg: f64,
    pub rx_elevation_default_deg: f64,

    /// Transmitter elevations analyzed in the reference campaign.
    pub tx_elevation_options_deg: Vec<f64>,
    /// Receiver elevations analyzed in the reference campaign.
    pub rx_elevation_options_deg: Vec<f64>,

    /// The four transceiver pairings the coverage figures were measured at.
    pub elevation_combinations_deg: Vec<(f64, f64)>,
}

impl Default for LinkLimits {
    fn default() -> Self {
        Self {
            power_min: Power::from_watts(0.1),
            power_max: Power::from_watts(0.5),
            power_default: Power::from_watts(0.5),
            rate_min: DataRate::from_kbps(10.0),
            rate_max: DataRate::from_kbps(120.0),
            rate_default: DataRate::from_kbps(50.0),
            beam_divergence_min_deg: 5.0,
            beam_divergence_max_deg: 20.0,
            beam_divergence_default_deg: 15.0,
            elevation_min_deg: 30.0,
            elevation_max_deg: 50.0,
            tx_elevation_default_deg: 30.0,
            rx_elevation_default_deg: 50.0,
            tx_elevation_options_deg: vec![30.0, 40.0, 50.0],
            rx_elevation_options_deg: vec![30.0, 50.0],
            elevation_combinations_deg: vec![
                (30.0, 30.0),
                (30.0, 50.0),
                (50.0, 30.0),
                (50.0, 50.0),
            ],
        }
    }
}

impl LinkLimits {
    /// Default link parameters (the experimental configuration).
    pub fn default_link(&self) -> LinkParameters {
        LinkParameters {
            power: self.power_default,
            data_rate: self.rate_default,
            tx_elevation_deg: self.tx_elevation_default_deg,
            rx_elevation_deg: self.rx_elevation_default_deg,
        }
    }

    pub fn validate(&self, link: &LinkParameters) -> Result<(), ParamError> {
        let watts = link.power.watts();
        if watts < self.power_min.watts() || watts > self.power_max.watts() {
            return Err(ParamError::PowerOutOfRange {
                value: watts,
                min: self.power_min.watts(),
                max: self.power_max.watts(),
            });
        }

        let bps = link.data_rate.bps();
        if bps < self.rate_min.bps() || bps > self.rate_max.bps() {
            return Err(ParamError::RateOutOfRange {
                value: bps,
                min: self.rate_min.bps(),
                max: self.rate_max.bps(),
            });
        }

        if link.tx_elevation_deg < self.elevation_min_deg
            || link.tx_elevation_deg > self.elevation_max_deg
        {
            return Err(ParamError::TxElevationOutOfRange {
                value: link.tx_elevation_deg,
                min: self.elevation_min_deg,
                max: self.elevation_max_deg,
            });
        }

        if link.rx_elevation_deg < self.elevation_min_deg
            || link.rx_elevation_deg > self.elevation_max_deg
        {
            return Err(ParamError::RxElevationOutOfRange {
                value: link.rx_elevation_deg,
                min: self.elevation_min_deg,
                max: self.elevation_max_deg,
            });
        }

        Ok(())
    }

    pub fn validate_beam_divergence(&self, phi_deg: f64) -> Result<(), ParamError> {
        if phi_deg < self.beam_divergence_min_deg || phi_deg > self.beam_divergence_max_deg {
            return Err(ParamError::BeamDivergenceOutOfRange {
                value: phi_deg,
                min: self.beam_divergence_min_deg,
                max: self.beam_divergence_max_deg,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("transmission power {value} W outside [{min}, {max}] W")]
    PowerOutOfRange { value: f64, min: f64, max: f64 },

    #[error("data rate {value} bps outside [{min}, {max}] bps")]
    RateOutOfRange { value: f64, min: f64, max: f64 },

    #[error("beam divergence {value}° outside [{min}, {max}]°")]
    BeamDivergenceOutOfRange { value: f64, min: f64, max: f64 },

    #[error("transmitter elevation {value}° outside [{min}, {max}]°")]
    TxElevationOutOfRange { value: f64, min: f64, max: f64 },

    #[error("receiver elevation {value}° outside [{min}, {max}]°")]
    RxElevationOutOfRange { value: f64, min: f64, max: f64 },
}

/// Deployment-level defaults: the reference region, the practical
/// connectivity standard, and the bounds the node-count search runs over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDefaults {
    /// Region of interest (1 km × 1 km in the reference analysis).
    pub region_area: Area,

    /// Practical whole-network connectivity standard.
    pub connectivity_target: f64,

    pub node_search_min: usize,
    pub node_search_max: usize,

    /// Grid samples for the positional connectivity average.
    pub sample_points: usize,
}

impl Default for NetworkDefaults {
    fn default() -> Self {
        Self {
            region_area: Area::from_square_metres(1.0e6),
            connectivity_target: 0.90,
            node_search_min: 10,
            node_search_max: 500,
            sample_points: crate::connectivity::DEFAULT_SAMPLE_POINTS,
        }
    }
}
