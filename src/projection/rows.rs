//! Projection output structures

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::demand::DemandFactors;
use super::supply::{Cohort, CohortContribution};
use crate::assumptions::{Horizon, RiskVariant};
use crate::error::Result;

/// One value per risk variant
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VariantValues {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

impl VariantValues {
    pub fn from_fn(mut f: impl FnMut(RiskVariant) -> f64) -> Self {
        Self {
            low: f(RiskVariant::Low),
            mid: f(RiskVariant::Mid),
            high: f(RiskVariant::High),
        }
    }

    pub fn get(&self, variant: RiskVariant) -> f64 {
        match variant {
            RiskVariant::Low => self.low,
            RiskVariant::Mid => self.mid,
            RiskVariant::High => self.high,
        }
    }
}

/// A single year of projection output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: i32,

    // Supply
    pub supply_headcount: f64,
    pub supply_fte: f64,
    pub cohorts: Vec<CohortContribution>,

    // Demand
    pub demand_fte: VariantValues,
    /// Demand from demography and the unmet backlog only
    pub demand_fte_demographic: VariantValues,
    /// Growth factors of the selected variant
    pub demand_factors: DemandFactors,

    /// Required minus available FTE for the selected variant; positive is a shortage
    pub gap_fte: f64,
    /// Gap as a fraction of available FTE
    pub gap_percentage: f64,
}

impl ProjectionYear {
    pub fn cohort_fte(&self, cohort: Cohort) -> f64 {
        self.cohorts
            .iter()
            .find(|c| c.cohort == cohort)
            .map(|c| c.fte)
            .unwrap_or(0.0)
    }
}

/// Gap as a fraction of supply, zero when there is no supply
pub fn gap_percentage(gap_fte: f64, supply_fte: f64) -> f64 {
    if supply_fte == 0.0 {
        0.0
    } else {
        gap_fte / supply_fte
    }
}

/// Projection over a range of years for one risk variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub variant: RiskVariant,
    pub horizon: Horizon,
    pub cohort3_intake: f64,
    pub years: Vec<ProjectionYear>,
}

impl ProjectionResult {
    pub fn new(variant: RiskVariant, horizon: Horizon, cohort3_intake: f64) -> Self {
        Self {
            variant,
            horizon,
            cohort3_intake,
            years: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: ProjectionYear) {
        self.years.push(row);
    }

    pub fn year(&self, year: i32) -> Option<&ProjectionYear> {
        self.years.iter().find(|row| row.year == year)
    }

    /// Last projected year
    pub fn terminal(&self) -> Option<&ProjectionYear> {
        self.years.last()
    }

    pub fn summary(&self) -> ProjectionSummary {
        let largest = self
            .years
            .iter()
            .max_by(|a, b| a.gap_fte.total_cmp(&b.gap_fte));

        ProjectionSummary {
            variant: self.variant,
            cohort3_intake: self.cohort3_intake,
            first_year: self.years.first().map(|r| r.year),
            last_year: self.terminal().map(|r| r.year),
            terminal_gap_fte: self.terminal().map(|r| r.gap_fte).unwrap_or(0.0),
            largest_gap_fte: largest.map(|r| r.gap_fte).unwrap_or(0.0),
            largest_gap_year: largest.map(|r| r.year),
            shortage_years: self.years.iter().filter(|r| r.gap_fte > 0.0).count(),
        }
    }

    /// Write one line per year as comma-separated values
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut out = csv::Writer::from_writer(writer);

        let mut header = vec![
            "year".to_string(),
            "supply_headcount".to_string(),
            "supply_fte".to_string(),
        ];
        header.extend(Cohort::ALL.iter().map(|c| format!("fte_{}", c.label())));
        header.extend(
            [
                "demand_fte_low",
                "demand_fte_mid",
                "demand_fte_high",
                "demand_fte_demographic_low",
                "demand_fte_demographic_mid",
                "demand_fte_demographic_high",
                "gap_fte",
                "gap_percentage",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        out.write_record(&header)?;

        for row in &self.years {
            let mut record = vec![
                row.year.to_string(),
                format!("{:.4}", row.supply_headcount),
                format!("{:.4}", row.supply_fte),
            ];
            record.extend(Cohort::ALL.iter().map(|&c| format!("{:.4}", row.cohort_fte(c))));
            let demographic = &row.demand_fte_demographic;
            record.extend(
                [
                    row.demand_fte.low,
                    row.demand_fte.mid,
                    row.demand_fte.high,
                    demographic.low,
                    demographic.mid,
                    demographic.high,
                    row.gap_fte,
                ]
                .iter()
                .map(|v| format!("{:.4}", v)),
            );
            record.push(format!("{:.6}", row.gap_percentage));
            out.write_record(&record)?;
        }

        out.flush()?;
        Ok(())
    }
}

/// Headline figures of a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub variant: RiskVariant,
    pub cohort3_intake: f64,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub terminal_gap_fte: f64,
    pub largest_gap_fte: f64,
    pub largest_gap_year: Option<i32>,
    /// Years with a positive gap
    pub shortage_years: usize,
}
