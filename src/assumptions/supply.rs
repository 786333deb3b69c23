//! Supply-side assumptions: current workforce, training pipeline, foreign inflow

use serde::{Deserialize, Serialize};

use super::curves::{AttritionCurve, ReturnCurve};

/// Sex of a practitioner; attrition, return and FTE factors differ by sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Female, Sex::Male];

    /// Parameter-name fragment used in the parameter file
    pub fn key(self) -> &'static str {
        match self {
            Sex::Female => "vrouw",
            Sex::Male => "man",
        }
    }
}

/// A pair of values, one per sex
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BySex<T> {
    pub female: T,
    pub male: T,
}

impl<T> BySex<T> {
    pub fn new(female: T, male: T) -> Self {
        Self { female, male }
    }

    pub fn get(&self, sex: Sex) -> &T {
        match sex {
            Sex::Female => &self.female,
            Sex::Male => &self.male,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Sex, &T) -> U) -> BySex<U> {
        BySex {
            female: f(Sex::Female, &self.female),
            male: f(Sex::Male, &self.male),
        }
    }
}

impl BySex<f64> {
    /// Split a total by a female share
    pub fn split(total: f64, female_share: f64) -> Self {
        Self {
            female: total * female_share,
            male: total * (1.0 - female_share),
        }
    }

    pub fn total(&self) -> f64 {
        self.female + self.male
    }

    /// Headcount converted to FTE with per-sex factors
    pub fn weighted(&self, factors: &BySex<f64>) -> f64 {
        self.female * factors.female + self.male * factors.male
    }
}

/// The practitioners working at the reference year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWorkforce {
    pub headcount: f64,
    pub female_share: f64,
    /// Attrition curves with any adjustment multiplier already applied
    pub attrition: BySex<AttritionCurve>,
}

/// One cohort of trainees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineCohort {
    /// Trainees starting per year
    pub intake: f64,
    pub female_share: f64,
    /// Share completing training
    pub internal_pass_rate: f64,
    pub training_years: u32,
    /// Share of qualified trainees working in the profession over time
    pub external_return: BySex<ReturnCurve>,
}

/// Practitioners qualified abroad entering each year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignInflow {
    pub per_year: f64,
    pub female_share: f64,
    pub return_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyAssumptions {
    pub current: CurrentWorkforce,
    /// Cohorts 1 and 2 are already in training; cohort 3 starts at the correction year
    pub pipeline: [PipelineCohort; 3],
    pub foreign: ForeignInflow,
    /// FTE per headcount
    pub fte: BySex<f64>,
}

impl SupplyAssumptions {
    /// Available FTE at the reference year
    pub fn base_fte(&self) -> f64 {
        BySex::split(self.current.headcount, self.current.female_share).weighted(&self.fte)
    }
}
