//! Scenario overrides and the batch scenario runner
//!
//! A parameter snapshot is loaded once; any number of override sets can then
//! be projected against it without re-reading the parameter file.

use std::ops::RangeInclusive;

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::{Assumptions, ParameterSnapshot, RiskVariant};
use crate::error::{ProjectionError, Result};
use crate::projection::{
    EquilibriumResult, ImpactAnalysis, ProjectionEngine, ProjectionResult, SolverConfig,
};

/// Sparse user adjustments on top of a parameter snapshot.
///
/// `None` keeps the snapshot value; `Some(0.0)` is an explicit zero. Field
/// names on the wire follow the parameter names used by the existing API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioOverrides {
    /// Annual intake of pipeline cohort 3
    #[serde(rename = "instroom", default, skip_serializing_if = "Option::is_none")]
    pub intake: Option<f64>,
    /// Internal pass rate of every pipeline cohort
    #[serde(rename = "intern_rendement", default, skip_serializing_if = "Option::is_none")]
    pub internal_pass_rate: Option<f64>,
    #[serde(rename = "fte_vrouw", default, skip_serializing_if = "Option::is_none")]
    pub fte_female: Option<f64>,
    #[serde(rename = "fte_man", default, skip_serializing_if = "Option::is_none")]
    pub fte_male: Option<f64>,

    // External return of every pipeline cohort
    #[serde(rename = "extern_rendement_vrouw_1jaar", default, skip_serializing_if = "Option::is_none")]
    pub return_female_1: Option<f64>,
    #[serde(rename = "extern_rendement_vrouw_5jaar", default, skip_serializing_if = "Option::is_none")]
    pub return_female_5: Option<f64>,
    #[serde(rename = "extern_rendement_vrouw_10jaar", default, skip_serializing_if = "Option::is_none")]
    pub return_female_10: Option<f64>,
    #[serde(rename = "extern_rendement_vrouw_15jaar", default, skip_serializing_if = "Option::is_none")]
    pub return_female_15: Option<f64>,
    #[serde(rename = "extern_rendement_man_1jaar", default, skip_serializing_if = "Option::is_none")]
    pub return_male_1: Option<f64>,
    #[serde(rename = "extern_rendement_man_5jaar", default, skip_serializing_if = "Option::is_none")]
    pub return_male_5: Option<f64>,
    #[serde(rename = "extern_rendement_man_10jaar", default, skip_serializing_if = "Option::is_none")]
    pub return_male_10: Option<f64>,
    #[serde(rename = "extern_rendement_man_15jaar", default, skip_serializing_if = "Option::is_none")]
    pub return_male_15: Option<f64>,

    // Attrition of the current workforce
    #[serde(rename = "uitstroom_vrouw_5j", default, skip_serializing_if = "Option::is_none")]
    pub attrition_female_5: Option<f64>,
    #[serde(rename = "uitstroom_vrouw_10j", default, skip_serializing_if = "Option::is_none")]
    pub attrition_female_10: Option<f64>,
    #[serde(rename = "uitstroom_vrouw_15j", default, skip_serializing_if = "Option::is_none")]
    pub attrition_female_15: Option<f64>,
    #[serde(rename = "uitstroom_vrouw_20j", default, skip_serializing_if = "Option::is_none")]
    pub attrition_female_20: Option<f64>,
    #[serde(rename = "uitstroom_man_5j", default, skip_serializing_if = "Option::is_none")]
    pub attrition_male_5: Option<f64>,
    #[serde(rename = "uitstroom_man_10j", default, skip_serializing_if = "Option::is_none")]
    pub attrition_male_10: Option<f64>,
    #[serde(rename = "uitstroom_man_15j", default, skip_serializing_if = "Option::is_none")]
    pub attrition_male_15: Option<f64>,
    #[serde(rename = "uitstroom_man_20j", default, skip_serializing_if = "Option::is_none")]
    pub attrition_male_20: Option<f64>,

    // Demand sub-components, applied to every risk variant
    #[serde(rename = "epi_midden", alias = "epi", default, skip_serializing_if = "Option::is_none")]
    pub epidemiology: Option<f64>,
    #[serde(rename = "soc_midden", alias = "soc", default, skip_serializing_if = "Option::is_none")]
    pub social: Option<f64>,
    #[serde(rename = "vak_midden", alias = "vak", default, skip_serializing_if = "Option::is_none")]
    pub professional: Option<f64>,
    #[serde(rename = "eff_midden", alias = "eff", default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<f64>,
    #[serde(rename = "hor_midden", alias = "hor", default, skip_serializing_if = "Option::is_none")]
    pub horizontal_substitution: Option<f64>,
    #[serde(rename = "tijd_midden", alias = "tijd", default, skip_serializing_if = "Option::is_none")]
    pub working_time: Option<f64>,
    #[serde(rename = "ver_midden", alias = "ver", default, skip_serializing_if = "Option::is_none")]
    pub vertical_substitution: Option<f64>,
    #[serde(
        rename = "totale_zorgvraag_excl_ATV_midden",
        alias = "totale_zorgvraag_excl_ATV",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_excl_working_time: Option<f64>,

    // Multipliers
    #[serde(rename = "demografie_factor", default, skip_serializing_if = "Option::is_none")]
    pub demography_factor: Option<f64>,
    #[serde(rename = "uitstroom_factor_vrouw", default, skip_serializing_if = "Option::is_none")]
    pub attrition_factor_female: Option<f64>,
    #[serde(rename = "uitstroom_factor_man", default, skip_serializing_if = "Option::is_none")]
    pub attrition_factor_male: Option<f64>,

    /// Training duration of pipeline cohort 3, whole years
    #[serde(rename = "opleidingsduur", default, skip_serializing_if = "Option::is_none")]
    pub training_years: Option<f64>,
}

const RATE: RangeInclusive<f64> = 0.0..=1.0;
const FTE_FACTOR: RangeInclusive<f64> = 0.0..=1.5;
const DEMAND_RATE: RangeInclusive<f64> = -0.05..=0.05;
const DEMOGRAPHY_FACTOR: RangeInclusive<f64> = 0.9..=1.3;
const ATTRITION_FACTOR: RangeInclusive<f64> = 0.0..=2.0;
const TRAINING_YEARS: RangeInclusive<f64> = 0.0..=10.0;

/// Maximum cohort-3 intake accepted as an override
pub const MAX_INTAKE: f64 = 100_000.0;

const INTAKE: RangeInclusive<f64> = 0.0..=MAX_INTAKE;

/// Largest number of intakes one sweep evaluates
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// Evenly spaced intakes from `from` to `to` inclusive
pub fn intake_grid(from: f64, to: f64, step: f64) -> Result<Vec<f64>> {
    check_range("instroom", Some(from), &INTAKE)?;
    check_range("instroom", Some(to), &INTAKE)?;
    if !(step.is_finite() && step > 0.0) {
        return Err(ProjectionError::invalid("step", step, "sweep step must be positive"));
    }
    if to < from {
        return Err(ProjectionError::invalid("to", to, format!("sweep must not end before {from}")));
    }

    let intervals = ((to - from) / step).floor();
    if intervals >= MAX_SWEEP_POINTS as f64 {
        return Err(ProjectionError::invalid(
            "step",
            step,
            format!("sweep would evaluate more than {MAX_SWEEP_POINTS} intakes"),
        ));
    }
    let count = intervals as usize + 1;
    Ok((0..count).map(|i| (from + step * i as f64).min(to)).collect())
}

impl ScenarioOverrides {
    /// Parse overrides from JSON, rejecting unknown field names
    pub fn from_json(text: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Same overrides with cohort-3 intake replaced
    pub fn with_intake(&self, intake: f64) -> Self {
        Self {
            intake: Some(intake),
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check every set value against its documented domain
    pub fn validate(&self) -> Result<()> {
        check_range("instroom", self.intake, &INTAKE)?;
        check_range("intern_rendement", self.internal_pass_rate, &RATE)?;

        for (name, value) in [("fte_vrouw", self.fte_female), ("fte_man", self.fte_male)] {
            check_range(name, value, &FTE_FACTOR)?;
            if value == Some(0.0) {
                return Err(ProjectionError::invalid(name, 0.0, "FTE factor must be positive"));
            }
        }

        for (name, value) in self.rate_fields() {
            check_range(name, value, &RATE)?;
        }
        for (name, value) in self.demand_fields() {
            check_range(name, value, &DEMAND_RATE)?;
        }

        check_range("demografie_factor", self.demography_factor, &DEMOGRAPHY_FACTOR)?;
        check_range("uitstroom_factor_vrouw", self.attrition_factor_female, &ATTRITION_FACTOR)?;
        check_range("uitstroom_factor_man", self.attrition_factor_male, &ATTRITION_FACTOR)?;

        check_range("opleidingsduur", self.training_years, &TRAINING_YEARS)?;
        if let Some(years) = self.training_years {
            if years.fract() != 0.0 {
                return Err(ProjectionError::invalid(
                    "opleidingsduur",
                    years,
                    "training duration must be a whole number of years",
                ));
            }
        }

        Ok(())
    }

    fn rate_fields(&self) -> [(&'static str, Option<f64>); 16] {
        [
            ("extern_rendement_vrouw_1jaar", self.return_female_1),
            ("extern_rendement_vrouw_5jaar", self.return_female_5),
            ("extern_rendement_vrouw_10jaar", self.return_female_10),
            ("extern_rendement_vrouw_15jaar", self.return_female_15),
            ("extern_rendement_man_1jaar", self.return_male_1),
            ("extern_rendement_man_5jaar", self.return_male_5),
            ("extern_rendement_man_10jaar", self.return_male_10),
            ("extern_rendement_man_15jaar", self.return_male_15),
            ("uitstroom_vrouw_5j", self.attrition_female_5),
            ("uitstroom_vrouw_10j", self.attrition_female_10),
            ("uitstroom_vrouw_15j", self.attrition_female_15),
            ("uitstroom_vrouw_20j", self.attrition_female_20),
            ("uitstroom_man_5j", self.attrition_male_5),
            ("uitstroom_man_10j", self.attrition_male_10),
            ("uitstroom_man_15j", self.attrition_male_15),
            ("uitstroom_man_20j", self.attrition_male_20),
        ]
    }

    fn demand_fields(&self) -> [(&'static str, Option<f64>); 8] {
        [
            ("epi_midden", self.epidemiology),
            ("soc_midden", self.social),
            ("vak_midden", self.professional),
            ("eff_midden", self.efficiency),
            ("hor_midden", self.horizontal_substitution),
            ("tijd_midden", self.working_time),
            ("ver_midden", self.vertical_substitution),
            ("totale_zorgvraag_excl_ATV_midden", self.total_excl_working_time),
        ]
    }
}

fn check_range(name: &str, value: Option<f64>, range: &RangeInclusive<f64>) -> Result<()> {
    match value {
        None => Ok(()),
        Some(v) if !v.is_finite() => Err(ProjectionError::invalid(name, v, "value must be finite")),
        Some(v) if !range.contains(&v) => Err(ProjectionError::invalid(
            name,
            v,
            format!("expected a value in [{}, {}]", range.start(), range.end()),
        )),
        Some(_) => Ok(()),
    }
}

/// Everything one scenario run produces
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub projection: ProjectionResult,
    pub equilibrium: Option<EquilibriumResult>,
    pub impact: Option<ImpactAnalysis>,
}

/// What to compute for each scenario
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub variant: RiskVariant,
    /// Solve for the equilibrium intake at the horizon's equilibrium year
    pub solve: Option<SolverConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            variant: RiskVariant::Mid,
            solve: None,
        }
    }
}

/// Pre-loaded scenario runner for batch projections
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    snapshot: ParameterSnapshot,
}

impl ScenarioRunner {
    /// Runner over the built-in 2025 parameters
    pub fn new() -> Self {
        Self {
            snapshot: ParameterSnapshot::reference_2025(),
        }
    }

    pub fn with_snapshot(snapshot: ParameterSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &ParameterSnapshot {
        &self.snapshot
    }

    /// Resolve the overrides and build an engine for them
    pub fn engine(&self, overrides: &ScenarioOverrides) -> Result<ProjectionEngine> {
        let assumptions = Assumptions::resolve(&self.snapshot, overrides)?;
        Ok(ProjectionEngine::new(assumptions))
    }

    /// Project one scenario over the full horizon
    pub fn run(&self, overrides: &ScenarioOverrides, config: &RunConfig) -> Result<ScenarioOutcome> {
        let engine = self.engine(overrides)?;
        let projection = engine.project_horizon(config.variant);
        let target = engine.assumptions().horizon.equilibrium_year;

        let equilibrium = match &config.solve {
            Some(solver) => Some(engine.solve_equilibrium_intake(target, config.variant, solver)?),
            None => None,
        };
        let impact = if config.solve.is_some() {
            Some(ImpactAnalysis::at(&engine, target, config.variant)?)
        } else {
            None
        };

        if let Some(last) = projection.terminal() {
            debug!(
                "Scenario ({} variant): {} gap {:.1} FTE",
                config.variant, last.year, last.gap_fte
            );
        }

        Ok(ScenarioOutcome {
            projection,
            equilibrium,
            impact,
        })
    }

    /// Run many override sets in parallel. Results are in input order.
    pub fn run_batch(
        &self,
        scenarios: &[ScenarioOverrides],
        config: &RunConfig,
    ) -> Vec<Result<ScenarioOutcome>> {
        debug!("Running batch of {} scenarios", scenarios.len());
        scenarios
            .par_iter()
            .map(|overrides| self.run(overrides, config))
            .collect()
    }

    /// Terminal-year gap for each cohort-3 intake, in parallel
    pub fn sweep_intake(
        &self,
        base: &ScenarioOverrides,
        intakes: &[f64],
        variant: RiskVariant,
    ) -> Result<Vec<(f64, ProjectionResult)>> {
        for &intake in intakes {
            check_range("instroom", Some(intake), &INTAKE)?;
        }
        let engine = self.engine(base)?;
        Ok(intakes
            .par_iter()
            .map(|&intake| {
                let varied = ProjectionEngine::new(engine.assumptions().with_cohort3_intake(intake));
                (intake, varied.project_horizon(variant))
            })
            .collect())
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_and_explicit_zero_differ() {
        let runner = ScenarioRunner::new();
        let config = RunConfig::default();

        let unset = runner.run(&ScenarioOverrides::default(), &config).unwrap();
        let zero_intake = runner
            .run(&ScenarioOverrides::default().with_intake(0.0), &config)
            .unwrap();

        let a = unset.projection.terminal().unwrap();
        let b = zero_intake.projection.terminal().unwrap();
        assert!(b.supply_fte < a.supply_fte);
        assert!(b.gap_fte > a.gap_fte);
    }

    #[test]
    fn test_json_overrides() {
        let overrides = ScenarioOverrides::from_json(
            r#"{"instroom": 900, "fte_vrouw": 0.7, "epi": 0.0, "uitstroom_factor_man": 1.1}"#,
        )
        .unwrap();

        assert_eq!(overrides.intake, Some(900.0));
        assert_eq!(overrides.fte_female, Some(0.7));
        assert_eq!(overrides.epidemiology, Some(0.0));
        assert_eq!(overrides.attrition_factor_male, Some(1.1));
        assert_eq!(overrides.fte_male, None);
        assert!(overrides.validate().is_ok());

        assert!(ScenarioOverrides::from_json(r#"{"instroom_typo": 900}"#).is_err());
    }

    #[test]
    fn test_out_of_range_overrides_rejected() {
        let cases = [
            ScenarioOverrides { internal_pass_rate: Some(1.2), ..Default::default() },
            ScenarioOverrides { intake: Some(-5.0), ..Default::default() },
            ScenarioOverrides { epidemiology: Some(0.2), ..Default::default() },
            ScenarioOverrides { demography_factor: Some(2.0), ..Default::default() },
            ScenarioOverrides { training_years: Some(2.5), ..Default::default() },
            ScenarioOverrides { fte_male: Some(f64::NAN), ..Default::default() },
            ScenarioOverrides { fte_female: Some(0.0), ..Default::default() },
        ];

        for overrides in cases {
            match overrides.validate() {
                Err(ProjectionError::InvalidParameter { .. }) => {}
                other => panic!("expected InvalidParameter for {:?}, got {:?}", overrides, other),
            }
        }
    }

    #[test]
    fn test_batch_matches_sequential_runs() {
        let runner = ScenarioRunner::new();
        let config = RunConfig::default();
        let scenarios: Vec<_> = [700.0, 800.0, 900.0]
            .iter()
            .map(|&i| ScenarioOverrides::default().with_intake(i))
            .collect();

        let batch = runner.run_batch(&scenarios, &config);
        for (overrides, outcome) in scenarios.iter().zip(batch) {
            let sequential = runner.run(overrides, &config).unwrap();
            assert_eq!(outcome.unwrap().projection, sequential.projection);
        }
    }

    #[test]
    fn test_run_with_solver() {
        let runner = ScenarioRunner::new();
        let config = RunConfig {
            variant: RiskVariant::Mid,
            solve: Some(SolverConfig::default()),
        };

        let outcome = runner.run(&ScenarioOverrides::default(), &config).unwrap();
        let equilibrium = outcome.equilibrium.unwrap();
        let advice = outcome.impact.unwrap().linear_intake_advice.unwrap();

        assert!(equilibrium.converged);
        assert!((equilibrium.intake - advice).abs() < 1.0);
    }

    #[test]
    fn test_sweep_gap_decreases() {
        let runner = ScenarioRunner::new();
        let intakes: Vec<f64> = (0..10).map(|i| 600.0 + 100.0 * i as f64).collect();
        let sweep = runner
            .sweep_intake(&ScenarioOverrides::default(), &intakes, RiskVariant::Mid)
            .unwrap();

        let gaps: Vec<f64> = sweep.iter().map(|(_, r)| r.terminal().unwrap().gap_fte).collect();
        assert!(gaps.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn test_sweep_rejects_invalid_intakes() {
        let runner = ScenarioRunner::new();

        for bad in [-500.0, f64::NAN, f64::INFINITY, MAX_INTAKE + 1.0] {
            let result = runner.sweep_intake(&ScenarioOverrides::default(), &[700.0, bad], RiskVariant::Mid);
            assert!(
                matches!(result, Err(ProjectionError::InvalidParameter { ref name, .. }) if name == "instroom"),
                "intake {} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_intake_grid() {
        let grid = intake_grid(600.0, 1500.0, 10.0).unwrap();
        assert_eq!(grid.len(), 91);
        assert_eq!(grid[0], 600.0);
        assert_eq!(grid[90], 1500.0);

        assert_eq!(intake_grid(718.0, 718.0, 1.0).unwrap(), vec![718.0]);
        assert_eq!(intake_grid(600.0, 1000.0, 300.0).unwrap(), vec![600.0, 900.0]);
    }

    #[test]
    fn test_intake_grid_rejects_bad_ranges() {
        let cases = [
            (-500.0, 1500.0, 10.0),
            (600.0, f64::NAN, 10.0),
            (600.0, 1500.0, 0.0),
            (600.0, 1500.0, -10.0),
            (1500.0, 600.0, 10.0),
            // 900 million points
            (600.0, 1500.0, 1e-6),
        ];
        for (from, to, step) in cases {
            assert!(
                matches!(intake_grid(from, to, step), Err(ProjectionError::InvalidParameter { .. })),
                "{} to {} by {} accepted",
                from,
                to,
                step
            );
        }

        let at_cap = intake_grid(0.0, (MAX_SWEEP_POINTS - 1) as f64, 1.0).unwrap();
        assert_eq!(at_cap.len(), MAX_SWEEP_POINTS);
    }
}
