//! End-to-end network design from deployment requirements.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use uvnetcore::{
    optimize::{Priority, design::{DesignRequirements, design_network}},
    params::{ChannelConstants, LinkLimits},
    report::{DesignReport, ReportIdentity, write_report},
    units::Area,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Region of interest area in square metres
    #[arg(short, long, default_value_t = 1.0e6)]
    area: f64,

    /// Target 2-connectivity probability
    #[arg(short, long, default_value_t = 0.9)]
    target_connectivity: f64,

    /// Maximum number of nodes available
    #[arg(short, long)]
    budget: Option<usize>,

    /// What the design should favour
    #[arg(long, value_enum, default_value_t = PriorityArg::Balanced)]
    priority: PriorityArg,

    /// Write the full report to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the report as MessagePack instead of JSON
    #[arg(long)]
    msgpack: bool,

    #[arg(short, long)]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PriorityArg {
    Cost,
    Reliability,
    Balanced,
}

impl From<PriorityArg> for Priority {
    fn from(value: PriorityArg) -> Self {
        match value {
            PriorityArg::Cost => Priority::Cost,
            PriorityArg::Reliability => Priority::Reliability,
            PriorityArg::Balanced => Priority::Balanced,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let constants = ChannelConstants::default();
    let limits = LinkLimits::default();

    let requirements = DesignRequirements {
        region: Area::from_square_metres(args.area),
        target_connectivity: args.target_connectivity,
        budget_nodes: args.budget,
        priority: args.priority.into(),
    };

    let design = match design_network(&constants, &limits, &requirements) {
        Ok(design) => design,
        Err(e) => {
            eprintln!("<Error> {e}");
            return ExitCode::FAILURE;
        }
    };

    if !args.quiet {
        println!("Network design for {:.2e} m²", args.area);
        println!("  Power:          {:.2} W", design.power.watts());
        println!("  Data rate:      {:.0} kbps", design.data_rate.kbps());
        println!(
            "  Elevations:     {:.0}° tx / {:.0}° rx",
            design.tx_elevation_deg, design.rx_elevation_deg
        );
        println!(
            "  Link distance:  {:.1} m",
            design.communication_distance.metres()
        );
        println!("  Nodes:          {}", design.required_nodes);
        println!(
            "  2-connectivity: {:.2}%",
            design.two_connectivity * 100.0
        );
        println!(
            "  Robustness:     {} ({:.0}/100)",
            design.robustness.level, design.robustness.score
        );

        for recommendation in &design.recommendations {
            println!("  - {recommendation}");
        }
    }

    if let Some(output) = args.output {
        let report = DesignReport {
            design,
            identity: ReportIdentity::current(&constants),
        };

        if let Err(e) = write_report(output.clone(), &report, args.msgpack) {
            eprintln!("<Error> failed to write {output:?}: {e}");
            return ExitCode::FAILURE;
        }

        if !args.quiet {
            println!("<Message> Report written to {output:?}");
        }
    }

    ExitCode::SUCCESS
}
