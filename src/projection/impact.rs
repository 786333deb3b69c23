//! Intake advice and its decomposition by driver
//!
//! Supply is linear in the cohort-3 intake, so the intake that closes the gap
//! in a given year has a closed form. Expressing each supply and demand term
//! in the same intake units shows how much of the advice each driver accounts
//! for: the attrition of the current workforce, the inflow from the other
//! cohorts, demography, the unmet backlog and each non-demographic driver.
//!
//! Demand growth `base * demographic * non_demographic` splits exactly into
//! `base * demography`, `base * unmet * (1 + demography)` and
//! `base * growth * demographic` for every non-demographic driver term.

use serde::{Deserialize, Serialize};

use super::demand::DemandDriver;
use super::engine::ProjectionEngine;
use super::supply::Cohort;
use crate::assumptions::RiskVariant;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactComponent {
    /// Current workforce lost since the reference year
    Attrition,
    Pipeline1,
    Pipeline2,
    Foreign,
    Demography,
    /// Unmet-demand backlog still outstanding
    UnmetDemand,
    Epidemiology,
    Social,
    Professional,
    Efficiency,
    HorizontalSubstitution,
    VerticalSubstitution,
    WorkingTime,
    TotalExclWorkingTime,
}

impl ImpactComponent {
    pub fn label(self) -> &'static str {
        match self {
            ImpactComponent::Attrition => "attrition",
            ImpactComponent::Pipeline1 => "pipeline_1",
            ImpactComponent::Pipeline2 => "pipeline_2",
            ImpactComponent::Foreign => "foreign",
            ImpactComponent::Demography => "demography",
            ImpactComponent::UnmetDemand => "unmet_demand",
            ImpactComponent::Epidemiology => "epidemiology",
            ImpactComponent::Social => "social",
            ImpactComponent::Professional => "professional",
            ImpactComponent::Efficiency => "efficiency",
            ImpactComponent::HorizontalSubstitution => "horizontal_substitution",
            ImpactComponent::VerticalSubstitution => "vertical_substitution",
            ImpactComponent::WorkingTime => "working_time",
            ImpactComponent::TotalExclWorkingTime => "total_excl_working_time",
        }
    }
}

impl From<DemandDriver> for ImpactComponent {
    fn from(driver: DemandDriver) -> Self {
        match driver {
            DemandDriver::Epidemiology => ImpactComponent::Epidemiology,
            DemandDriver::Social => ImpactComponent::Social,
            DemandDriver::Professional => ImpactComponent::Professional,
            DemandDriver::Efficiency => ImpactComponent::Efficiency,
            DemandDriver::HorizontalSubstitution => ImpactComponent::HorizontalSubstitution,
            DemandDriver::VerticalSubstitution => ImpactComponent::VerticalSubstitution,
            DemandDriver::WorkingTime => ImpactComponent::WorkingTime,
            DemandDriver::TotalExclWorkingTime => ImpactComponent::TotalExclWorkingTime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactContribution {
    pub component: ImpactComponent,
    /// Contribution in FTE; positive widens the gap
    pub fte: f64,
    /// Same contribution in cohort-3 intake places per year
    pub intake_equivalent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub year: i32,
    pub variant: RiskVariant,
    pub cohort3_intake: f64,
    pub cohort3_fte: f64,
    pub gap_fte: f64,
    /// Intake closing the gap in `year`; `None` when cohort 3 has not yet contributed
    pub linear_intake_advice: Option<f64>,
    /// Empty when there is no advice
    pub contributions: Vec<ImpactContribution>,
}

impl ImpactAnalysis {
    pub fn at(engine: &ProjectionEngine, year: i32, variant: RiskVariant) -> Result<Self> {
        let supply = engine.supply_at(year)?;
        let demand = engine.demand();
        let factors = demand.factors(year, variant);
        let base_fte = engine.assumptions().demand.base_fte;
        let intake = engine.assumptions().cohort3_intake();

        let cohort3_fte = supply.cohort_fte(Cohort::Pipeline3);
        let gap_fte = demand.required_fte(year, variant) - supply.fte();

        let mut analysis = Self {
            year,
            variant,
            cohort3_intake: intake,
            cohort3_fte,
            gap_fte,
            linear_intake_advice: None,
            contributions: Vec::new(),
        };
        if cohort3_fte <= 0.0 || intake <= 0.0 {
            return Ok(analysis);
        }

        let per_fte = intake / cohort3_fte;
        analysis.linear_intake_advice = Some(intake + gap_fte * per_fte);

        let mut terms = vec![
            (ImpactComponent::Attrition, base_fte - supply.cohort_fte(Cohort::Current)),
            (ImpactComponent::Pipeline1, -supply.cohort_fte(Cohort::Pipeline1)),
            (ImpactComponent::Pipeline2, -supply.cohort_fte(Cohort::Pipeline2)),
            (ImpactComponent::Foreign, -supply.cohort_fte(Cohort::Foreign)),
            (ImpactComponent::Demography, base_fte * factors.demography),
            (ImpactComponent::UnmetDemand, base_fte * factors.unmet * (1.0 + factors.demography)),
        ];
        terms.extend(
            demand
                .driver_terms(year, variant)
                .into_iter()
                .map(|term| (term.driver.into(), base_fte * term.growth * factors.demographic)),
        );

        analysis.contributions = terms
            .into_iter()
            .map(|(component, fte)| ImpactContribution {
                component,
                fte,
                intake_equivalent: fte * per_fte,
            })
            .collect();

        Ok(analysis)
    }

    pub fn contribution(&self, component: ImpactComponent) -> Option<&ImpactContribution> {
        self.contributions.iter().find(|c| c.component == component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::Assumptions;
    use crate::projection::SolverConfig;
    use approx::assert_relative_eq;

    fn engine() -> ProjectionEngine {
        ProjectionEngine::new(Assumptions::reference().unwrap())
    }

    #[test]
    fn test_contributions_sum_to_advice() {
        for variant in RiskVariant::ALL {
            let analysis = ImpactAnalysis::at(&engine(), 2043, variant).unwrap();
            let advice = analysis.linear_intake_advice.unwrap();
            let total: f64 = analysis.contributions.iter().map(|c| c.intake_equivalent).sum();

            assert_eq!(analysis.contributions.len(), 13);
            assert_relative_eq!(total, advice, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_combined_rate_contributions_sum_to_advice() {
        let mut a = Assumptions::reference().unwrap();
        a.demand.mid.total_excl_working_time = Some(0.03);
        a.demand.mid.working_time = 0.01;
        let analysis = ImpactAnalysis::at(&ProjectionEngine::new(a), 2043, RiskVariant::Mid).unwrap();
        let total: f64 = analysis.contributions.iter().map(|c| c.intake_equivalent).sum();

        assert_eq!(analysis.contributions.len(), 8);
        assert!(analysis.contribution(ImpactComponent::Epidemiology).is_none());
        assert!(analysis.contribution(ImpactComponent::TotalExclWorkingTime).unwrap().fte > 0.0);
        assert!(analysis.contribution(ImpactComponent::WorkingTime).unwrap().fte > 0.0);
        assert_relative_eq!(total, analysis.linear_intake_advice.unwrap(), max_relative = 1e-9);
    }

    #[test]
    fn test_demand_contributions_in_2043() {
        let engine = engine();
        let base = engine.assumptions().demand.base_fte;
        let analysis = ImpactAnalysis::at(&engine, 2043, RiskVariant::Mid).unwrap();
        let get = |c| analysis.contribution(c).unwrap().fte;

        // 18 years in: demography 0.121 + 3/5 of the way to 0.148, a tenth of
        // the 0.063 backlog left, non-demographic drivers frozen at 10 years
        let demography = 0.1372;
        let unmet = 0.0063;
        let demographic = (1.0 + demography) * (1.0 + unmet) - 1.0;

        assert_relative_eq!(get(ImpactComponent::Demography), base * demography, max_relative = 1e-9);
        assert_relative_eq!(get(ImpactComponent::UnmetDemand), base * unmet * (1.0 + demography), max_relative = 1e-9);
        for (component, rate) in [
            (ImpactComponent::Epidemiology, 0.01),
            (ImpactComponent::Social, 0.019),
            (ImpactComponent::Professional, -0.003),
            (ImpactComponent::Efficiency, -0.005),
            (ImpactComponent::HorizontalSubstitution, 0.016),
            (ImpactComponent::VerticalSubstitution, -0.011),
        ] {
            assert_relative_eq!(get(component), base * rate * 10.0 * demographic, max_relative = 1e-9);
        }
        assert_eq!(get(ImpactComponent::WorkingTime), 0.0);
    }

    #[test]
    fn test_advice_matches_bisection() {
        let engine = engine();
        let analysis = ImpactAnalysis::at(&engine, 2043, RiskVariant::Mid).unwrap();
        let config = SolverConfig {
            min_bracket: 1e-9,
            tolerance: 1e-6,
            ..SolverConfig::default()
        };
        let solved = engine.solve_equilibrium_intake(2043, RiskVariant::Mid, &config).unwrap();

        assert!((analysis.linear_intake_advice.unwrap() - solved.intake).abs() < 1e-3);
    }

    #[test]
    fn test_signs_of_drivers() {
        let analysis = ImpactAnalysis::at(&engine(), 2043, RiskVariant::Mid).unwrap();

        let get = |c| analysis.contribution(c).unwrap().fte;
        assert!(get(ImpactComponent::Attrition) > 0.0);
        assert!(get(ImpactComponent::Pipeline1) < 0.0);
        assert!(get(ImpactComponent::Foreign) < 0.0);
        assert!(get(ImpactComponent::Demography) > 0.0);
        assert!(get(ImpactComponent::UnmetDemand) > 0.0);
        assert!(get(ImpactComponent::Social) > 0.0);
        assert!(get(ImpactComponent::Efficiency) < 0.0);
        assert!(get(ImpactComponent::VerticalSubstitution) < 0.0);
    }

    #[test]
    fn test_no_advice_before_cohort_three_contributes() {
        let analysis = ImpactAnalysis::at(&engine(), 2029, RiskVariant::Mid).unwrap();

        assert_eq!(analysis.cohort3_fte, 0.0);
        assert!(analysis.linear_intake_advice.is_none());
        assert!(analysis.contributions.is_empty());
    }
}
