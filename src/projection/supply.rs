//! Available workforce per year, built up cohort by cohort

use serde::{Deserialize, Serialize};

use crate::assumptions::{BySex, Horizon, PipelineCohort, SupplyAssumptions};

/// Source of practitioners in the supply projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    /// Working at the reference year
    Current,
    /// In training at the reference year
    Pipeline1,
    Pipeline2,
    /// Starting training from the correction year; its intake is the policy lever
    Pipeline3,
    /// Qualified abroad
    Foreign,
}

impl Cohort {
    pub const ALL: [Cohort; 5] = [
        Cohort::Current,
        Cohort::Pipeline1,
        Cohort::Pipeline2,
        Cohort::Pipeline3,
        Cohort::Foreign,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Cohort::Current => "current",
            Cohort::Pipeline1 => "pipeline_1",
            Cohort::Pipeline2 => "pipeline_2",
            Cohort::Pipeline3 => "pipeline_3",
            Cohort::Foreign => "foreign",
        }
    }
}

/// Headcount and FTE of one cohort in one year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortContribution {
    pub cohort: Cohort,
    pub headcount: BySex<f64>,
    pub fte: f64,
}

/// Supply of one year, split by cohort in [`Cohort::ALL`] order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyBreakdown {
    pub year: i32,
    pub cohorts: Vec<CohortContribution>,
}

impl SupplyBreakdown {
    pub fn headcount(&self) -> f64 {
        self.cohorts.iter().map(|c| c.headcount.total()).sum()
    }

    pub fn fte(&self) -> f64 {
        self.cohorts.iter().map(|c| c.fte).sum()
    }

    pub fn cohort(&self, cohort: Cohort) -> Option<&CohortContribution> {
        self.cohorts.iter().find(|c| c.cohort == cohort)
    }

    pub fn cohort_fte(&self, cohort: Cohort) -> f64 {
        self.cohort(cohort).map(|c| c.fte).unwrap_or(0.0)
    }
}

/// Projects available supply from resolved supply assumptions
#[derive(Debug, Clone, Copy)]
pub struct SupplyProjector<'a> {
    assumptions: &'a SupplyAssumptions,
    horizon: &'a Horizon,
}

impl<'a> SupplyProjector<'a> {
    pub fn new(assumptions: &'a SupplyAssumptions, horizon: &'a Horizon) -> Self {
        Self { assumptions, horizon }
    }

    pub fn project(&self, year: i32) -> SupplyBreakdown {
        let t = self.horizon.elapsed(year);
        let offset = self.horizon.correction_offset();
        let cohort3_window = self.horizon.equilibrium_year - self.horizon.correction_year;
        let [first, second, third] = &self.assumptions.pipeline;

        let heads = [
            (Cohort::Current, self.current(t)),
            (Cohort::Pipeline1, pipeline_headcount(first, t, 0, offset)),
            (Cohort::Pipeline2, pipeline_headcount(second, t, 0, offset)),
            (Cohort::Pipeline3, pipeline_headcount(third, t, offset, cohort3_window)),
            (Cohort::Foreign, self.foreign(t)),
        ];

        let cohorts = heads
            .into_iter()
            .map(|(cohort, headcount)| CohortContribution {
                cohort,
                headcount,
                fte: headcount.weighted(&self.assumptions.fte),
            })
            .collect();

        SupplyBreakdown { year, cohorts }
    }

    fn current(&self, t: i32) -> BySex<f64> {
        let current = &self.assumptions.current;
        let start = BySex::split(current.headcount, current.female_share);
        start.map(|sex, n| n * (1.0 - current.attrition.get(sex).fraction_at(f64::from(t))))
    }

    fn foreign(&self, t: i32) -> BySex<f64> {
        let foreign = &self.assumptions.foreign;
        let arrived = foreign.per_year * f64::from(t.max(0)) * foreign.return_rate;
        BySex::split(arrived, foreign.female_share)
    }
}

/// Qualified practitioners from a training cohort still working at `t`.
///
/// The cohort starts training `start_offset` years after the reference year
/// and contributes at most `window` graduating classes. Each class is weighted
/// by the return rate for its own years since qualifying.
fn pipeline_headcount(cohort: &PipelineCohort, t: i32, start_offset: i32, window: i32) -> BySex<f64> {
    let latest = t - start_offset - cohort.training_years as i32;
    let classes = latest.min(window).max(0);
    if classes == 0 {
        return BySex::default();
    }

    let graduates = BySex::split(cohort.intake * cohort.internal_pass_rate, cohort.female_share);
    graduates.map(|sex, n| n * cohort.external_return.get(sex).sum_over(latest as u32, classes as u32))
}
