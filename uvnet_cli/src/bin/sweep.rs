//! Full Cartesian parameter sweep, fanned out across worker threads.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use serde::Serialize;
use uvnetcore::{
    optimize::{
        Objective,
        sweep::{SweepConfig, SweepConstraints, SweepRow, evaluate_combination},
    },
    params::{ChannelConstants, LinkLimits},
    units::Area,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Region of interest area in square metres
    #[arg(short, long, default_value_t = 1.0e6)]
    area: f64,

    /// Drop configurations below this 2-connectivity
    #[arg(short, long)]
    min_connectivity: Option<f64>,

    /// Drop configurations needing more nodes than this
    #[arg(long)]
    max_nodes: Option<usize>,

    #[arg(long, value_enum, default_value_t = ObjectiveArg::MinNodes)]
    objective: ObjectiveArg,

    /// Write every admissible configuration to this CSV file
    #[arg(short, long)]
    csv: Option<PathBuf>,

    /// How many top configurations to print
    #[arg(long, default_value_t = 5)]
    top: usize,

    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ObjectiveArg {
    MinNodes,
    MaxConnectivity,
    Balanced,
}

impl From<ObjectiveArg> for Objective {
    fn from(value: ObjectiveArg) -> Self {
        match value {
            ObjectiveArg::MinNodes => Objective::MinimumNodes,
            ObjectiveArg::MaxConnectivity => Objective::MaximumConnectivity,
            ObjectiveArg::Balanced => Objective::Balanced,
        }
    }
}

/// Flat CSV record with plain-unit columns.
#[derive(Debug, Serialize)]
struct CsvRow {
    power_w: f64,
    rate_kbps: f64,
    tx_elevation_deg: f64,
    rx_elevation_deg: f64,
    distance_m: f64,
    minimum_nodes: usize,
    two_connectivity: f64,
    score: f64,
}

impl From<&SweepRow> for CsvRow {
    fn from(row: &SweepRow) -> Self {
        CsvRow {
            power_w: row.power.watts(),
            rate_kbps: row.data_rate.kbps(),
            tx_elevation_deg: row.tx_elevation_deg,
            rx_elevation_deg: row.rx_elevation_deg,
            distance_m: row.distance.metres(),
            minimum_nodes: row.minimum_nodes,
            two_connectivity: row.two_connectivity,
            score: row.score,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let constants = ChannelConstants::default();
    let region = Area::from_square_metres(args.area);
    let config = SweepConfig::from_limits(&LinkLimits::default(), region);

    let constraints = SweepConstraints {
        min_two_connectivity: args.min_connectivity,
        max_nodes: args.max_nodes,
    };
    let objective: Objective = args.objective.into();

    let mut rows: Vec<SweepRow> = config
        .combinations()
        .into_par_iter()
        .filter_map(|(power, rate, theta1, theta2)| {
            evaluate_combination(
                &constants, region, power, rate, theta1, theta2, constraints, objective,
            )
        })
        .collect();

    rows.sort_by(|a, b| a.score.total_cmp(&b.score));

    if rows.is_empty() {
        eprintln!("<Error> no configuration satisfies the constraints");
        return ExitCode::FAILURE;
    }

    if !args.quiet {
        println!(
            "{} admissible configurations (of {})",
            rows.len(),
            config.combinations().len()
        );
        println!(
            "{:<8} {:<10} {:<12} {:<12} {:<8} {:<10}",
            "Pt (W)", "Rd (kbps)", "Angles", "Dist (m)", "Nodes", "2-Conn %"
        );

        for row in rows.iter().take(args.top) {
            println!(
                "{:<8.1} {:<10.0} {:<12} {:<12.1} {:<8} {:<10.2}",
                row.power.watts(),
                row.data_rate.kbps(),
                format!("{:.0}°-{:.0}°", row.tx_elevation_deg, row.rx_elevation_deg),
                row.distance.metres(),
                row.minimum_nodes,
                row.two_connectivity * 100.0
            );
        }
    }

    if let Some(path) = args.csv {
        let mut writer = match csv::Writer::from_path(&path) {
            Ok(writer) => writer,
            Err(e) => {
                eprintln!("<Error> failed to open {path:?}: {e}");
                return ExitCode::FAILURE;
            }
        };

        for row in &rows {
            if let Err(e) = writer.serialize(CsvRow::from(row)) {
                eprintln!("<Error> failed to write {path:?}: {e}");
                return ExitCode::FAILURE;
            }
        }

        if let Err(e) = writer.flush() {
            eprintln!("<Error> failed to flush {path:?}: {e}");
            return ExitCode::FAILURE;
        }

        if !args.quiet {
            println!("<Message> {} rows written to {path:?}", rows.len());
        }
    }

    ExitCode::SUCCESS
}
