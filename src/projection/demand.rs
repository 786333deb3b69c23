//! Required workforce per year and risk variant
//!
//! Demand grows from the reference-year workforce through two multiplied
//! factors: a demographic factor (population change plus the unmet-demand
//! backlog, which decays to zero over twenty years) and a non-demographic
//! factor (epidemiology, socio-cultural change, professional and efficiency
//! developments, substitution and working-time change). Non-demographic trends
//! stop at the trend year; demography runs to the end of the horizon.
//!
//! The backlog is present in full at the reference year, so
//! `required_fte(R) = base_fte * (1 + unmet_base)`.

use serde::{Deserialize, Serialize};

use crate::assumptions::{interpolate_breakpoints4, DemandAssumptions, DemandComponents, Horizon, RiskVariant};

/// Years over which the unmet-demand backlog decays to zero
pub const BACKLOG_YEARS: f64 = 20.0;

/// Value of the working-time term once its denominator would reach zero
pub const WORKTIME_CEILING: f64 = 1.5;

/// Growth factors of one year. `required_fte = base_fte * (1 + total_growth)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandFactors {
    /// Population-driven growth since the reference year
    pub demography: f64,
    /// Unmet-demand backlog still outstanding
    pub unmet: f64,
    /// `(1 + demography) * (1 + unmet) - 1`
    pub demographic: f64,
    pub non_demographic: f64,
    pub total_growth: f64,
}

/// Non-demographic growth driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandDriver {
    Epidemiology,
    Social,
    Professional,
    Efficiency,
    HorizontalSubstitution,
    VerticalSubstitution,
    WorkingTime,
    /// Combined rate replacing the six drivers above
    TotalExclWorkingTime,
}

/// One driver's share of `non_demographic - 1`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverTerm {
    pub driver: DemandDriver,
    pub growth: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct DemandProjector<'a> {
    assumptions: &'a DemandAssumptions,
    horizon: &'a Horizon,
}

impl<'a> DemandProjector<'a> {
    pub fn new(assumptions: &'a DemandAssumptions, horizon: &'a Horizon) -> Self {
        Self { assumptions, horizon }
    }

    pub fn factors(&self, year: i32, variant: RiskVariant) -> DemandFactors {
        let c = self.assumptions.components(variant);
        let t = f64::from(self.horizon.elapsed(year).max(0));

        let [d5, d10, d15, d20] = c.demography;
        let demography = interpolate_breakpoints4(t, d5, d10, d15, d20) * self.assumptions.demography_factor;
        let unmet = unmet_backlog(c.unmet_base, t);
        let demographic = (1.0 + demography) * (1.0 + unmet) - 1.0;

        let non_demographic = non_demographic_factor(c, self.trend_elapsed(t));

        DemandFactors {
            demography,
            unmet,
            demographic,
            non_demographic,
            total_growth: non_demographic * demographic,
        }
    }

    /// Demand under every growth driver
    pub fn required_fte(&self, year: i32, variant: RiskVariant) -> f64 {
        self.assumptions.base_fte * (1.0 + self.factors(year, variant).total_growth)
    }

    /// Demand from demography and the unmet backlog alone
    pub fn demographic_fte(&self, year: i32, variant: RiskVariant) -> f64 {
        self.assumptions.base_fte * (1.0 + self.factors(year, variant).demographic)
    }

    /// Split of `non_demographic - 1` by driver; the terms sum to it
    pub fn driver_terms(&self, year: i32, variant: RiskVariant) -> Vec<DriverTerm> {
        let c = self.assumptions.components(variant);
        let t_nd = self.trend_elapsed(f64::from(self.horizon.elapsed(year).max(0)));
        let term = |driver, growth| DriverTerm { driver, growth };

        let worktime = term(DemandDriver::WorkingTime, worktime_term(c.working_time, t_nd) - 1.0);
        match c.total_excl_working_time {
            Some(total) => vec![term(DemandDriver::TotalExclWorkingTime, total * t_nd), worktime],
            None => vec![
                term(DemandDriver::Epidemiology, c.epidemiology * t_nd),
                term(DemandDriver::Social, c.social * t_nd),
                term(DemandDriver::Professional, c.professional * t_nd),
                term(DemandDriver::Efficiency, c.efficiency * t_nd),
                term(DemandDriver::HorizontalSubstitution, c.horizontal_substitution * t_nd),
                term(DemandDriver::VerticalSubstitution, c.vertical_substitution * t_nd),
                worktime,
            ],
        }
    }

    fn trend_elapsed(&self, t: f64) -> f64 {
        t.min(f64::from(self.horizon.trend_year - self.horizon.reference_year))
    }
}

fn unmet_backlog(unmet_base: f64, t: f64) -> f64 {
    unmet_base * (1.0 - t / BACKLOG_YEARS).max(0.0)
}

fn non_demographic_factor(c: &DemandComponents, t_nd: f64) -> f64 {
    let worktime = worktime_term(c.working_time, t_nd);

    match c.total_excl_working_time {
        Some(total) => worktime + total * t_nd,
        None => {
            let substitution = 1.0 + c.vertical_substitution * t_nd;
            let other = (c.epidemiology + c.social + c.professional + c.efficiency + c.horizontal_substitution) * t_nd;
            substitution + worktime + other - 1.0
        }
    }
}

fn worktime_term(rate: f64, t_nd: f64) -> f64 {
    let shrink = rate * t_nd;
    if shrink < 1.0 {
        1.0 / (1.0 - shrink)
    } else {
        WORKTIME_CEILING
    }
}
