//! Equilibrium intake search
//!
//! The gap in a fixed year falls strictly as the cohort-3 intake rises, so a
//! bracketed bisection always finds the balancing intake. The search has an
//! iteration cap; failing to bracket or converge is reported on the result
//! instead of as an error.

use serde::{Deserialize, Serialize};

use super::demand::DemandProjector;
use super::supply::SupplyProjector;
use crate::assumptions::{Assumptions, RiskVariant};
use crate::error::{ProjectionError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Converged once the absolute gap is below this many FTE
    pub tolerance: f64,
    /// Converged once the bracket is narrower than this many intake places
    pub min_bracket: f64,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lower_bound: 600.0,
            upper_bound: 1500.0,
            tolerance: 0.1,
            min_bracket: 1.0,
            max_iterations: 64,
        }
    }
}

impl SolverConfig {
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumResult {
    pub target_year: i32,
    /// Best intake found
    pub intake: f64,
    /// Gap in the target year at that intake
    pub gap_fte: f64,
    pub iterations: u32,
    pub converged: bool,
}

/// Bisect over cohort-3 intake until the `target_year` gap closes
pub fn solve_equilibrium_intake(
    assumptions: &Assumptions,
    target_year: i32,
    variant: RiskVariant,
    config: &SolverConfig,
) -> Result<EquilibriumResult> {
    validate(config)?;

    let demand = DemandProjector::new(&assumptions.demand, &assumptions.horizon).required_fte(target_year, variant);
    let gap = |intake: f64| {
        let varied = assumptions.with_cohort3_intake(intake);
        demand - SupplyProjector::new(&varied.supply, &varied.horizon).project(target_year).fte()
    };
    let result = |intake: f64, gap_fte: f64, iterations: u32, converged: bool| EquilibriumResult {
        target_year,
        intake,
        gap_fte,
        iterations,
        converged,
    };

    let mut lo = config.lower_bound;
    let mut hi = config.upper_bound;
    let gap_lo = gap(lo);
    let gap_hi = gap(hi);

    if gap_lo.abs() < config.tolerance {
        return Ok(result(lo, gap_lo, 0, true));
    }
    if gap_hi.abs() < config.tolerance {
        return Ok(result(hi, gap_hi, 0, true));
    }
    // Surplus even at the lowest intake, or shortage even at the highest
    if gap_lo < 0.0 {
        return Ok(result(lo, gap_lo, 0, false));
    }
    if gap_hi > 0.0 {
        return Ok(result(hi, gap_hi, 0, false));
    }

    let mut best = (lo, gap_lo);
    for iteration in 1..=config.max_iterations {
        let mid = 0.5 * (lo + hi);
        let gap_mid = gap(mid);
        if gap_mid.abs() < best.1.abs() {
            best = (mid, gap_mid);
        }

        if gap_mid.abs() < config.tolerance || hi - lo < config.min_bracket {
            return Ok(result(mid, gap_mid, iteration, true));
        }

        if gap_mid > 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Ok(result(best.0, best.1, config.max_iterations, false))
}

fn validate(config: &SolverConfig) -> Result<()> {
    if !(config.lower_bound.is_finite() && config.lower_bound >= 0.0) {
        return Err(ProjectionError::invalid("lower_bound", config.lower_bound, "must be a non-negative number"));
    }
    if !(config.upper_bound.is_finite() && config.upper_bound > config.lower_bound) {
        return Err(ProjectionError::invalid("upper_bound", config.upper_bound, "must exceed the lower bound"));
    }
    if !(config.tolerance > 0.0) {
        return Err(ProjectionError::invalid("tolerance", config.tolerance, "must be positive"));
    }
    if !(config.min_bracket >= 0.0) {
        return Err(ProjectionError::invalid("min_bracket", config.min_bracket, "must not be negative"));
    }
    Ok(())
}
