//! Generate concrete node deployments and compare their empirical
//! neighbour counts against the analytical expectation.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng, rng};
use rand_chacha::ChaCha12Rng;
use serde::Serialize;
use uvnetcore::{
    connectivity, coverage, deployment,
    units::{Area, Length},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long, value_enum, default_value_t = Mode::Random)]
    mode: Mode,

    /// Number of nodes (derived from the distance for minimum/four-node modes)
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Region of interest area in square metres
    #[arg(short, long, default_value_t = 1.0e6)]
    area: f64,

    /// Communication distance in metres
    #[arg(short, long)]
    distance: Option<f64>,

    /// Seed for random placement; random if not given
    #[arg(long)]
    seed: Option<u64>,

    /// Generate this many independent random deployments
    #[arg(long, default_value_t = 1)]
    count: usize,

    /// Write positions to this CSV file (node, x, y per row)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Mode {
    /// Uniform random placement
    Random,
    /// Centred square grid
    Grid,
    /// Grid of the minimum node count for full coverage
    Minimum,
    /// The reference four-node square
    FourNode,
}

#[derive(Debug, Serialize)]
struct PositionRow {
    deployment: usize,
    node: usize,
    x_m: f64,
    y_m: f64,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let region = Area::from_square_metres(args.area);
    let distance = args.distance.map(Length::from_metres);

    let deployments = match args.mode {
        Mode::Random => {
            let Some(nodes) = args.nodes else {
                eprintln!("<Error> --nodes is required for random deployments");
                return ExitCode::FAILURE;
            };

            // One master seed, one derived seed per deployment, so a whole
            // batch is reproducible from a single number.
            let master = args.seed.unwrap_or_else(|| rng().random());
            let mut seeder = ChaCha12Rng::seed_from_u64(master);

            if !args.quiet {
                println!("<Message> Master seed {master}");
            }

            (0..args.count.max(1))
                .map(|_| deployment::uniform_random(nodes, region, seeder.random()))
                .collect()
        }
        Mode::Grid => {
            let Some(nodes) = args.nodes else {
                eprintln!("<Error> --nodes is required for grid deployments");
                return ExitCode::FAILURE;
            };
            vec![deployment::grid(nodes, region)]
        }
        Mode::Minimum => {
            let Some(distance) = distance else {
                eprintln!("<Error> --distance is required for minimum-node deployments");
                return ExitCode::FAILURE;
            };
            vec![deployment::minimum_node_grid(region, distance)]
        }
        Mode::FourNode => {
            let Some(distance) = distance else {
                eprintln!("<Error> --distance is required for the four-node square");
                return ExitCode::FAILURE;
            };
            vec![deployment::four_node_square(distance)]
        }
    };

    if !args.quiet {
        for (index, deployed) in deployments.iter().enumerate() {
            println!(
                "Deployment {index}: {} nodes over a {:.0} m square",
                deployed.len(),
                deployed.region_side.metres()
            );

            if let Some(l) = distance {
                let counts = deployment::neighbor_counts(deployed, l);
                let mean =
                    counts.iter().sum::<usize>() as f64 / counts.len().max(1) as f64;
                let isolated = counts.iter().filter(|&&c| c == 0).count();

                println!(
                    "  Mean neighbours: {mean:.2} (analytical {:.2})",
                    connectivity::expected_neighbors(deployed.len(), region, l)
                );
                println!("  Isolated nodes:  {isolated}");
                println!(
                    "  Minimum for coverage: {}",
                    coverage::minimum_nodes(region, l)
                );
            }
        }
    }

    if let Some(path) = args.output {
        let mut writer = match csv::Writer::from_path(&path) {
            Ok(writer) => writer,
            Err(e) => {
                eprintln!("<Error> failed to open {path:?}: {e}");
                return ExitCode::FAILURE;
            }
        };

        for (index, deployed) in deployments.iter().enumerate() {
            for (node, point) in deployed.positions.iter().enumerate() {
                let row = PositionRow {
                    deployment: index,
                    node,
                    x_m: point.x.metres(),
                    y_m: point.y.metres(),
                };
                if let Err(e) = writer.serialize(row) {
                    eprintln!("<Error> failed to write {path:?}: {e}");
                    return ExitCode::FAILURE;
                }
            }
        }

        if let Err(e) = writer.flush() {
            eprintln!("<Error> failed to flush {path:?}: {e}");
            return ExitCode::FAILURE;
        }

        if !args.quiet {
            println!("<Message> Positions written to {path:?}");
        }
    }

    ExitCode::SUCCESS
}
