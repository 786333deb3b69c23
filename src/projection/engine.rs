//! Combines supply and demand into a yearly gap projection

use std::ops::RangeInclusive;

use super::demand::DemandProjector;
use super::equilibrium::{solve_equilibrium_intake, EquilibriumResult, SolverConfig};
use super::rows::{gap_percentage, ProjectionResult, ProjectionYear, VariantValues};
use super::supply::{SupplyBreakdown, SupplyProjector};
use crate::assumptions::{Assumptions, ParameterSnapshot, RiskVariant};
use crate::error::{ProjectionError, Result};
use crate::scenario::ScenarioOverrides;

/// Projection engine over one set of resolved assumptions
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
}

impl ProjectionEngine {
    pub fn new(assumptions: Assumptions) -> Self {
        Self { assumptions }
    }

    /// Resolve overrides against a snapshot and build an engine
    pub fn from_snapshot(snapshot: &ParameterSnapshot, overrides: &ScenarioOverrides) -> Result<Self> {
        Ok(Self::new(Assumptions::resolve(snapshot, overrides)?))
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    pub fn supply(&self) -> SupplyProjector<'_> {
        SupplyProjector::new(&self.assumptions.supply, &self.assumptions.horizon)
    }

    pub fn demand(&self) -> DemandProjector<'_> {
        DemandProjector::new(&self.assumptions.demand, &self.assumptions.horizon)
    }

    /// Project from the reference year to the equilibrium year
    pub fn project_horizon(&self, variant: RiskVariant) -> ProjectionResult {
        self.collect(self.assumptions.horizon.years(), variant)
    }

    /// Project an inclusive range of years, none of which may precede the reference year
    pub fn project(&self, years: RangeInclusive<i32>, variant: RiskVariant) -> Result<ProjectionResult> {
        self.check_year(*years.start())?;
        Ok(self.collect(years, variant))
    }

    fn collect(&self, years: RangeInclusive<i32>, variant: RiskVariant) -> ProjectionResult {
        let mut result = ProjectionResult::new(variant, self.assumptions.horizon, self.assumptions.cohort3_intake());
        for year in years {
            result.add_row(self.project_year(year, variant));
        }
        result
    }

    fn project_year(&self, year: i32, variant: RiskVariant) -> ProjectionYear {
        let supply = self.supply().project(year);
        let demand = self.demand();

        let demand_fte = VariantValues::from_fn(|v| demand.required_fte(year, v));
        let supply_fte = supply.fte();
        let gap_fte = demand_fte.get(variant) - supply_fte;

        ProjectionYear {
            year,
            supply_headcount: supply.headcount(),
            supply_fte,
            cohorts: supply.cohorts,
            demand_fte,
            demand_fte_demographic: VariantValues::from_fn(|v| demand.demographic_fte(year, v)),
            demand_factors: demand.factors(year, variant),
            gap_fte,
            gap_percentage: gap_percentage(gap_fte, supply_fte),
        }
    }

    /// Supply of one year with its cohort breakdown
    pub fn supply_at(&self, year: i32) -> Result<SupplyBreakdown> {
        self.check_year(year)?;
        Ok(self.supply().project(year))
    }

    /// Required minus available FTE in one year
    pub fn gap_at(&self, year: i32, variant: RiskVariant) -> f64 {
        self.demand().required_fte(year, variant) - self.supply().project(year).fte()
    }

    /// Cohort-3 intake that closes the gap in `target_year`
    pub fn solve_equilibrium_intake(
        &self,
        target_year: i32,
        variant: RiskVariant,
        config: &SolverConfig,
    ) -> Result<EquilibriumResult> {
        self.check_year(target_year)?;
        solve_equilibrium_intake(&self.assumptions, target_year, variant, config)
    }

    fn check_year(&self, year: i32) -> Result<()> {
        let reference = self.assumptions.horizon.reference_year;
        if year < reference {
            return Err(ProjectionError::invalid(
                "year",
                f64::from(year),
                format!("projection years start at the reference year {reference}"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::Cohort;
    use approx::assert_abs_diff_eq;

    fn engine() -> ProjectionEngine {
        ProjectionEngine::new(Assumptions::reference().unwrap())
    }

    #[test]
    fn test_horizon_rows() {
        let result = engine().project_horizon(RiskVariant::Mid);

        assert_eq!(result.years.len(), 19);
        assert_eq!(result.years[0].year, 2025);
        assert_eq!(result.terminal().unwrap().year, 2043);
    }

    #[test]
    fn test_gap_is_demand_minus_supply() {
        for variant in RiskVariant::ALL {
            let result = engine().project_horizon(variant);
            for row in &result.years {
                assert_eq!(row.gap_fte, row.demand_fte.get(variant) - row.supply_fte);
                if row.supply_fte > 0.0 {
                    assert_eq!(row.gap_percentage, row.gap_fte / row.supply_fte);
                }
            }
        }
    }

    #[test]
    fn test_reference_year_gap_is_unmet_backlog() {
        let engine = engine();
        for variant in RiskVariant::ALL {
            let row = engine.project_horizon(variant).years[0].clone();
            let backlog = engine.assumptions().demand.components(variant).unmet_base;

            assert_abs_diff_eq!(row.supply_fte, engine.assumptions().demand.base_fte, epsilon = 1e-9);
            assert_abs_diff_eq!(row.gap_fte, row.supply_fte * backlog, epsilon = 1e-9);
            assert_abs_diff_eq!(row.gap_percentage, backlog, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_default_intake_gap_in_2043() {
        let result = engine().project_horizon(RiskVariant::Mid);
        let last = result.terminal().unwrap();

        // 12727.70 required against 13378.42 available
        assert_abs_diff_eq!(last.demand_fte.mid, 12727.70, epsilon = 0.01);
        assert_abs_diff_eq!(last.supply_fte, 13378.42, epsilon = 0.01);
        assert!(last.gap_fte < 0.0, "expected a surplus in 2043, got {}", last.gap_fte);
        assert!(last.cohort_fte(Cohort::Pipeline3) > 0.0);
    }

    #[test]
    fn test_demographic_demand_rows() {
        let result = engine().project_horizon(RiskVariant::Mid);

        assert_eq!(result.years[0].demand_fte_demographic, result.years[0].demand_fte);
        for row in &result.years[1..] {
            assert!(row.demand_fte_demographic.mid < row.demand_fte.mid, "year {}", row.year);
        }
    }

    #[test]
    fn test_runs_are_bit_identical() {
        let a = engine().project_horizon(RiskVariant::High);
        let b = engine().project_horizon(RiskVariant::High);

        assert_eq!(a, b);
        for (x, y) in a.years.iter().zip(&b.years) {
            assert_eq!(x.gap_fte.to_bits(), y.gap_fte.to_bits());
        }
    }

    #[test]
    fn test_years_before_reference_rejected() {
        let engine = engine();

        assert!(matches!(
            engine.project(2020..=2030, RiskVariant::Mid),
            Err(ProjectionError::InvalidParameter { .. })
        ));
        assert_eq!(engine.project(2030..=2050, RiskVariant::Mid).unwrap().years.len(), 21);
        assert!(engine.supply_at(2024).is_err());
    }

    #[test]
    fn test_gap_at_matches_rows() {
        let engine = engine();
        let result = engine.project_horizon(RiskVariant::Low);
        for row in &result.years {
            assert_eq!(engine.gap_at(row.year, RiskVariant::Low), row.gap_fte);
        }
    }

    #[test]
    fn test_csv_output() {
        let result = engine().project_horizon(RiskVariant::Mid);
        let mut buffer = Vec::new();
        result.write_csv(&mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 20);
        assert!(lines[0].starts_with("year,supply_headcount,supply_fte,fte_current"));
        assert!(lines[0].contains(",demand_fte_demographic_mid,"));
        assert!(lines[1].starts_with("2025,"));
    }
}
