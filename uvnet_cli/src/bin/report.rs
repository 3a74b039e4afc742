//! Robustness report for an explicit configuration: either a known
//! communication distance, or link parameters the distance is derived from.

use std::process::ExitCode;

use clap::Parser;
use uvnetcore::{
    channel::{LinkParameters, ook_distance},
    params::{ChannelConstants, LinkLimits},
    robustness,
    units::{Area, DataRate, Length, Power},
    verify,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Communication distance in metres (computed from the link
    /// parameters if not given)
    #[arg(short, long)]
    distance: Option<f64>,

    /// Transmission power in watts
    #[arg(long)]
    power: Option<f64>,

    /// Data rate in kbps
    #[arg(long)]
    rate: Option<f64>,

    /// Transmitter elevation in degrees
    #[arg(long)]
    theta1: Option<f64>,

    /// Receiver elevation in degrees
    #[arg(long)]
    theta2: Option<f64>,

    /// Number of deployed nodes
    #[arg(short, long)]
    nodes: usize,

    /// Region of interest area in square metres
    #[arg(short, long, default_value_t = 1.0e6)]
    area: f64,

    /// Also analyze tolerance to this node failure rate (e.g. 0.1)
    #[arg(short, long)]
    failure_rate: Option<f64>,

    /// Run the model invariant checks for this configuration
    #[arg(long)]
    verify: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let constants = ChannelConstants::default();
    let limits = LinkLimits::default();
    let region = Area::from_square_metres(args.area);

    let distance = match args.distance {
        Some(metres) => Length::from_metres(metres),
        None => {
            let link = LinkParameters::new(
                args.power
                    .map(Power::from_watts)
                    .unwrap_or(limits.power_default),
                args.rate
                    .map(DataRate::from_kbps)
                    .unwrap_or(limits.rate_default),
                args.theta1.unwrap_or(limits.tx_elevation_default_deg),
                args.theta2.unwrap_or(limits.rx_elevation_default_deg),
            );

            if let Err(e) = limits.validate(&link) {
                eprintln!("<Error> {e}");
                return ExitCode::FAILURE;
            }

            match ook_distance(&constants, &link) {
                Some(distance) => distance,
                None => {
                    eprintln!("<Error> link parameters give no finite communication distance");
                    return ExitCode::FAILURE;
                }
            }
        }
    };

    let report = robustness::evaluate(distance, args.nodes, region);
    let metrics = &report.metrics;

    println!("UV network robustness report");
    println!("  Distance:       {:.1} m", distance.metres());
    println!("  Nodes:          {}", args.nodes);
    println!(
        "  Region:         {:.2e} m² ({:.0} m square)",
        args.area,
        region.side().metres()
    );
    println!();
    println!("  Overall:        {} ({:.0}/100)", report.level, report.score);
    println!(
        "  1-connectivity: {:.2}% {}",
        metrics.one_connectivity * 100.0,
        tick(report.meets_standards.basic_connectivity)
    );
    println!(
        "  2-connectivity: {:.2}% {}",
        metrics.two_connectivity * 100.0,
        tick(report.meets_standards.robust_connectivity)
    );
    println!(
        "  3-connectivity: {:.2}% {}",
        metrics.three_connectivity * 100.0,
        tick(report.meets_standards.high_redundancy)
    );
    println!("  Neighbours:     {:.2} expected", metrics.expected_neighbors);
    println!(
        "  Isolation risk: {:.4}%",
        metrics.isolation_probability * 100.0
    );

    println!();
    for recommendation in robustness::recommend_improvements(distance, args.nodes, region) {
        println!("  - {recommendation}");
    }

    if let Some(failure_rate) = args.failure_rate {
        let tolerance =
            robustness::analyze_failure_tolerance(distance, args.nodes, region, failure_rate);

        println!();
        println!(
            "  Failure tolerance at {:.0}% loss:",
            failure_rate * 100.0
        );
        println!(
            "    Survivors:    {} of {}",
            tolerance.remaining_nodes, args.nodes
        );
        println!(
            "    1-conn after: {:.2}%",
            tolerance.connectivity_after_failure[0] * 100.0
        );
        println!(
            "    Survives:     {}",
            if tolerance.network_survives { "yes" } else { "no" }
        );
        println!("    Resilience:   {}", tolerance.resilience);
    }

    if args.verify {
        if verify::verify_all(distance, args.nodes, region) {
            println!();
            println!("<Message> All model invariants hold for this configuration");
        } else {
            eprintln!("<Error> Model invariant violated; see output above");
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

fn tick(ok: bool) -> &'static str {
    if ok { "[ok]" } else { "[low]" }
}
