//! Yearly supply, demand and gap projection, plus the equilibrium search

mod demand;
mod engine;
mod equilibrium;
mod impact;
mod rows;
mod supply;

pub use demand::{DemandDriver, DemandFactors, DemandProjector, DriverTerm, BACKLOG_YEARS, WORKTIME_CEILING};
pub use engine::ProjectionEngine;
pub use equilibrium::{solve_equilibrium_intake, EquilibriumResult, SolverConfig};
pub use impact::{ImpactAnalysis, ImpactComponent, ImpactContribution};
pub use rows::{gap_percentage, ProjectionResult, ProjectionSummary, ProjectionYear, VariantValues};
pub use supply::{Cohort, CohortContribution, SupplyBreakdown, SupplyProjector};
