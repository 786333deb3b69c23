//! Workforce Projection - supply and demand projection for the general practitioner workforce
//!
//! This library provides:
//! - Breakpoint interpolation of multi-year attrition, return and demographic parameters
//! - Cohort-based supply projection (current workforce, training pipeline, foreign inflow)
//! - Multi-component demand growth per risk variant
//! - Yearly gap projection and the intake that closes the gap in the equilibrium year
//! - Batch scenario runs over a single parameter snapshot

pub mod assumptions;
pub mod error;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use assumptions::{Assumptions, Horizon, ParameterSnapshot, RiskVariant};
pub use error::ProjectionError;
pub use projection::{EquilibriumResult, ProjectionEngine, ProjectionResult, ProjectionYear, SolverConfig};
pub use scenario::{ScenarioOverrides, ScenarioRunner};
