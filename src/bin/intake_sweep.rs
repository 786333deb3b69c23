//! Sweep the cohort-3 intake and write the equilibrium-year gap for each value
//!
//! Outputs one CSV row per intake for plotting the gap curve

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use workforce_projection::assumptions::{load_or_reference, LoadOptions};
use workforce_projection::scenario::intake_grid;
use workforce_projection::{RiskVariant, ScenarioOverrides, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "intake_sweep", about = "Equilibrium-year gap across a range of cohort-3 intakes")]
struct Args {
    #[arg(long, env = "WORKFORCE_SWEEP_FROM", default_value_t = 600.0)]
    from: f64,

    #[arg(long, env = "WORKFORCE_SWEEP_TO", default_value_t = 1500.0)]
    to: f64,

    #[arg(long, env = "WORKFORCE_SWEEP_STEP", default_value_t = 10.0)]
    step: f64,

    /// Parameter file; the built-in 2025 parameters are used when omitted
    #[arg(long, env = "WORKFORCE_PARAMETERS")]
    parameters: Option<PathBuf>,

    #[arg(long, env = "WORKFORCE_COLUMN", default_value = "raming_2025")]
    column: String,

    #[arg(long, env = "WORKFORCE_CATEGORY", default_value = "Huisarts")]
    category: String,

    #[arg(long, env = "WORKFORCE_VARIANT", default_value = "mid")]
    variant: RiskVariant,

    /// Output CSV; stdout when omitted
    #[arg(long, env = "WORKFORCE_OUTPUT")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let intakes = intake_grid(args.from, args.to, args.step).context("Invalid sweep range")?;

    let options = LoadOptions {
        value_column: args.column.clone(),
        category: Some(args.category.clone()),
        ..LoadOptions::default()
    };
    let snapshot = load_or_reference(args.parameters.as_deref(), &options).context("Failed to load parameters")?;
    let runner = ScenarioRunner::with_snapshot(snapshot);

    let start = Instant::now();
    let sweep = runner
        .sweep_intake(&ScenarioOverrides::default(), &intakes, args.variant)
        .context("Sweep failed")?;
    info!("Projected {} intakes in {:?}", sweep.len(), start.elapsed());

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    writeln!(out, "intake,gap_fte,supply_fte,demand_fte")?;
    for (intake, projection) in &sweep {
        if let Some(last) = projection.terminal() {
            writeln!(
                out,
                "{:.2},{:.4},{:.4},{:.4}",
                intake,
                last.gap_fte,
                last.supply_fte,
                last.demand_fte.get(args.variant)
            )?;
        }
    }
    out.flush()?;

    if let Some(path) = &args.output {
        println!("Wrote {} rows to {}", sweep.len(), path.display());
    }

    Ok(())
}
