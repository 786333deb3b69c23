//! Workforce Projection CLI
//!
//! Runs one projection scenario and prints the yearly supply, demand and gap

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use log::info;
use serde::Serialize;

use workforce_projection::assumptions::{load_or_reference, LoadOptions};
use workforce_projection::projection::{Cohort, ImpactAnalysis, ProjectionSummary};
use workforce_projection::scenario::{RunConfig, ScenarioOutcome};
use workforce_projection::{EquilibriumResult, RiskVariant, ScenarioOverrides, ScenarioRunner, SolverConfig};

#[derive(Parser, Debug)]
#[command(name = "workforce_projection", version, about = "Project GP workforce supply, demand and gap")]
struct Args {
    /// Parameter file; the built-in 2025 parameters are used when omitted
    #[arg(long, env = "WORKFORCE_PARAMETERS")]
    parameters: Option<PathBuf>,

    /// Value column of the parameter file
    #[arg(long, env = "WORKFORCE_COLUMN", default_value = "raming_2025")]
    column: String,

    /// Keep only parameter rows of this profession
    #[arg(long, env = "WORKFORCE_CATEGORY", default_value = "Huisarts")]
    category: String,

    #[arg(long, env = "WORKFORCE_CATEGORY_COLUMN", default_value = "Categorie2")]
    category_column: String,

    /// Read every row regardless of category
    #[arg(long, env = "WORKFORCE_ALL_CATEGORIES")]
    all_categories: bool,

    /// JSON file with scenario overrides
    #[arg(long, env = "WORKFORCE_OVERRIDES")]
    overrides: Option<PathBuf>,

    /// Cohort-3 intake, applied on top of the overrides file
    #[arg(long, env = "WORKFORCE_INTAKE")]
    intake: Option<f64>,

    /// Demand variant: low, mid or high
    #[arg(long, env = "WORKFORCE_VARIANT", default_value = "mid")]
    variant: RiskVariant,

    /// Solve for the intake that closes the gap in the equilibrium year
    #[arg(long, env = "WORKFORCE_SOLVE")]
    solve: bool,

    /// Gap tolerance of the solver in FTE
    #[arg(long, env = "WORKFORCE_TOLERANCE", default_value_t = 0.1)]
    tolerance: f64,

    /// Print a JSON report instead of a table
    #[arg(long, env = "WORKFORCE_JSON")]
    json: bool,

    /// Also write the yearly rows to this CSV file
    #[arg(long, env = "WORKFORCE_OUTPUT")]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    generated_at: DateTime<Utc>,
    parameters: String,
    overrides: &'a ScenarioOverrides,
    summary: ProjectionSummary,
    #[serde(flatten)]
    outcome: &'a ScenarioOutcome,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = LoadOptions {
        value_column: args.column.clone(),
        category_column: args.category_column.clone(),
        category: if args.all_categories { None } else { Some(args.category.clone()) },
    };
    let snapshot = load_or_reference(args.parameters.as_deref(), &options).with_context(|| {
        format!(
            "Failed to load parameters from {}",
            args.parameters.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
        )
    })?;
    info!("Loaded {} parameters", snapshot.len());

    let mut overrides = match &args.overrides {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read overrides from {}", path.display()))?;
            ScenarioOverrides::from_json(&text)
                .with_context(|| format!("Invalid overrides in {}", path.display()))?
        }
        None => ScenarioOverrides::default(),
    };
    if let Some(intake) = args.intake {
        overrides = overrides.with_intake(intake);
    }

    let runner = ScenarioRunner::with_snapshot(snapshot);
    let config = RunConfig {
        variant: args.variant,
        solve: args.solve.then(|| SolverConfig::with_tolerance(args.tolerance)),
    };
    let outcome = runner.run(&overrides, &config).context("Projection failed")?;

    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        outcome
            .projection
            .write_csv(BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote {} rows to {}", outcome.projection.years.len(), path.display());
    }

    if args.json {
        let report = Report {
            generated_at: Utc::now(),
            parameters: args
                .parameters
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in 2025".to_string()),
            overrides: &overrides,
            summary: outcome.projection.summary(),
            outcome: &outcome,
        };
        serde_json::to_writer_pretty(io::stdout().lock(), &report)?;
        println!();
        return Ok(());
    }

    print_table(&outcome);
    if let Some(eq) = &outcome.equilibrium {
        print_equilibrium(eq);
    }
    if let Some(impact) = &outcome.impact {
        print_impact(impact);
    }

    Ok(())
}

fn print_table(outcome: &ScenarioOutcome) {
    let projection = &outcome.projection;
    println!("Workforce Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");
    println!(
        "Variant: {}    Cohort-3 intake: {:.0}\n",
        projection.variant, projection.cohort3_intake
    );

    println!(
        "{:>4} {:>10} {:>10} {:>9} {:>9} {:>9} {:>10} {:>10} {:>10} {:>8}",
        "Year", "Headcount", "Supply", "Current", "Pipeline", "Foreign", "Demo-only", "Demand", "Gap", "Gap %"
    );
    println!("{}", "-".repeat(99));

    for row in &projection.years {
        let pipeline = row.cohort_fte(Cohort::Pipeline1)
            + row.cohort_fte(Cohort::Pipeline2)
            + row.cohort_fte(Cohort::Pipeline3);
        println!(
            "{:>4} {:>10.1} {:>10.1} {:>9.1} {:>9.1} {:>9.1} {:>10.1} {:>10.1} {:>10.1} {:>7.2}%",
            row.year,
            row.supply_headcount,
            row.supply_fte,
            row.cohort_fte(Cohort::Current),
            pipeline,
            row.cohort_fte(Cohort::Foreign),
            row.demand_fte_demographic.get(projection.variant),
            row.demand_fte.get(projection.variant),
            row.gap_fte,
            row.gap_percentage * 100.0
        );
    }

    let summary = projection.summary();
    println!();
    println!("Terminal gap: {:.1} FTE", summary.terminal_gap_fte);
    println!("Years with a shortage: {}", summary.shortage_years);
}

fn print_equilibrium(eq: &EquilibriumResult) {
    println!();
    println!("Equilibrium intake for {}", eq.target_year);
    println!("  Intake:     {:.1}", eq.intake);
    println!("  Gap:        {:.3} FTE", eq.gap_fte);
    println!("  Iterations: {}", eq.iterations);
    if !eq.converged {
        println!("  WARNING: solver did not converge within its bounds");
    }
}

fn print_impact(impact: &ImpactAnalysis) {
    let Some(advice) = impact.linear_intake_advice else {
        return;
    };
    println!();
    println!("Intake advice by driver ({}, current intake {:.1}):", impact.year, impact.cohort3_intake);
    for contribution in &impact.contributions {
        println!(
            "  {:<24} {:>10.1}",
            contribution.component.label(),
            contribution.intake_equivalent
        );
    }
    println!("  {:<24} {:>10.1}", "Advice", advice);
}
