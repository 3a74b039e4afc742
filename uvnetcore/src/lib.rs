//! Analytical models for sizing ultraviolet non-line-of-sight sensor networks.
//!
//! The crate is a chain of pure model layers. [`channel`] turns link
//! parameters (power, data rate, transceiver elevations) into a maximum
//! communication distance, [`coverage`] turns distance into effective ground
//! area and minimum node counts, [`adjacency`] and [`connectivity`] turn a
//! node population into m-connectivity probabilities, and the [`optimize`]
//! searches answer the inverse questions ("what power reaches 100 m?",
//! "how many nodes for 90% 2-connectivity?"). [`robustness`] condenses the
//! probabilities into a deployment health report.
//!
//! Every function is deterministic given its arguments; the only stochastic
//! entry points ([`deployment::uniform_random`], [`connectivity::monte_carlo_q`])
//! take an explicit seed.

pub mod adjacency;
pub mod channel;
pub mod connectivity;
pub mod coverage;
pub mod deployment;
pub mod optimize;
pub mod params;
pub mod report;
pub mod robustness;
pub mod units;
pub mod verify;

use std::fmt::Debug;

/// Checks two values are within 0.001% of each other.
#[allow(unused)]
fn assert_close<T>(a: T, b: T)
where
    T: Into<f64> + Copy + Debug,
{
    let float_a: f64 = a.into();
    let float_b: f64 = b.into();

    if float_a == 0. || float_b == 0. {
        assert!(float_a == float_b, "{a:?} and {b:?} are not close.");
        return;
    }

    let percent_diff = (float_a - float_b).abs() / float_a.abs();

    assert!(percent_diff < 0.00001, "{a:?} and {b:?} are not close.");
}
