//! Model assumptions: curves, the parameter snapshot and the resolved inputs
//! of the supply and demand projections

mod curves;
mod demand;
mod snapshot;
mod supply;
pub mod loader;

pub use curves::{interpolate_breakpoints4, interpolate_breakpoints_return, AttritionCurve, ReturnCurve};
pub use demand::{DemandAssumptions, DemandComponents, RiskVariant};
pub use loader::{load_or_reference, load_snapshot, LoadOptions};
pub use snapshot::ParameterSnapshot;
pub use supply::{BySex, CurrentWorkforce, ForeignInflow, PipelineCohort, Sex, SupplyAssumptions};

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::scenario::ScenarioOverrides;

/// Key years of a projection round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    /// Year of the parameter snapshot
    pub reference_year: i32,
    /// First year in which a change to training intake takes effect
    pub correction_year: i32,
    /// Year after which non-demographic trends are held constant
    pub trend_year: i32,
    /// Year in which supply and demand should balance
    pub equilibrium_year: i32,
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            reference_year: 2025,
            correction_year: 2027,
            trend_year: 2035,
            equilibrium_year: 2043,
        }
    }
}

impl Horizon {
    /// Read horizon years from the snapshot, falling back to the defaults
    pub fn from_snapshot(snapshot: &ParameterSnapshot) -> Result<Self> {
        let defaults = Self::default();
        let year = |name: &str, fallback: i32| -> Result<i32> {
            match snapshot.get_opt(name) {
                None => Ok(fallback),
                Some(v) if v.fract() == 0.0 && (1900.0..=2200.0).contains(&v) => Ok(v as i32),
                Some(v) => Err(ProjectionError::invalid(name, v, "expected a whole calendar year")),
            }
        };

        let horizon = Self {
            reference_year: year("basisjaar", defaults.reference_year)?,
            correction_year: year("bijsturingsjaar", defaults.correction_year)?,
            trend_year: year("trendjaar", defaults.trend_year)?,
            equilibrium_year: year("evenwichtsjaar1", defaults.equilibrium_year)?,
        };
        horizon.validate()?;
        Ok(horizon)
    }

    fn validate(&self) -> Result<()> {
        if self.correction_year < self.reference_year {
            return Err(ProjectionError::invalid(
                "bijsturingsjaar",
                f64::from(self.correction_year),
                "correction year precedes the reference year",
            ));
        }
        if self.equilibrium_year < self.correction_year {
            return Err(ProjectionError::invalid(
                "evenwichtsjaar1",
                f64::from(self.equilibrium_year),
                "equilibrium year precedes the correction year",
            ));
        }
        if self.trend_year < self.reference_year {
            return Err(ProjectionError::invalid(
                "trendjaar",
                f64::from(self.trend_year),
                "trend year precedes the reference year",
            ));
        }
        Ok(())
    }

    /// Years between the reference year and the correction year
    pub fn correction_offset(&self) -> i32 {
        self.correction_year - self.reference_year
    }

    /// Years since the reference year
    pub fn elapsed(&self, year: i32) -> i32 {
        year - self.reference_year
    }

    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.reference_year..=self.equilibrium_year
    }
}

/// Snapshot and overrides resolved into typed model inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub horizon: Horizon,
    pub supply: SupplyAssumptions,
    pub demand: DemandAssumptions,
}

impl Assumptions {
    /// Built-in 2025 parameters without overrides
    pub fn reference() -> Result<Self> {
        Self::resolve(&ParameterSnapshot::reference_2025(), &ScenarioOverrides::default())
    }

    /// Apply overrides on top of a snapshot. Every missing parameter and every
    /// out-of-range value is reported here, before any projection runs.
    pub fn resolve(snapshot: &ParameterSnapshot, overrides: &ScenarioOverrides) -> Result<Self> {
        overrides.validate()?;

        let horizon = Horizon::from_snapshot(snapshot)?;
        let supply = resolve_supply(snapshot, overrides)?;
        let demand = resolve_demand(snapshot, overrides, supply.base_fte())?;

        Ok(Self { horizon, supply, demand })
    }

    /// Same assumptions with the cohort-3 intake replaced
    pub fn with_cohort3_intake(&self, intake: f64) -> Self {
        let mut changed = self.clone();
        changed.supply.pipeline[2].intake = intake;
        changed
    }

    pub fn cohort3_intake(&self) -> f64 {
        self.supply.pipeline[2].intake
    }
}

fn pick(snapshot: &ParameterSnapshot, value: Option<f64>, name: &str) -> Result<f64> {
    match value {
        Some(v) => Ok(v),
        None => snapshot.get(name),
    }
}

fn resolve_supply(snapshot: &ParameterSnapshot, o: &ScenarioOverrides) -> Result<SupplyAssumptions> {
    let attrition_factor = BySex::new(
        o.attrition_factor_female.unwrap_or(1.0),
        o.attrition_factor_male.unwrap_or(1.0),
    );
    let attrition_overrides = BySex::new(
        [o.attrition_female_5, o.attrition_female_10, o.attrition_female_15, o.attrition_female_20],
        [o.attrition_male_5, o.attrition_male_10, o.attrition_male_15, o.attrition_male_20],
    );

    let attrition_for = |sex: Sex| -> Result<AttritionCurve> {
        let given = attrition_overrides.get(sex);
        let mut points = [0.0; 4];
        for (i, horizon) in ["vijf", "tien", "vijftien", "twintig"].iter().enumerate() {
            points[i] = pick(snapshot, given[i], &format!("uitstroom_{}_basis_{}", sex.key(), horizon))?;
        }
        let factor = *attrition_factor.get(sex);
        let curve = AttritionCurve::new(points[0], points[1], points[2], points[3]).scaled(factor);
        if let Some(&worst) = curve.breakpoints().iter().find(|&&p| !(0.0..=1.0).contains(&p)) {
            return Err(ProjectionError::invalid(
                format!("uitstroom_factor_{}", sex.key()),
                factor,
                format!("scaled attrition fraction {worst:.3} falls outside [0, 1]"),
            ));
        }
        Ok(curve)
    };
    let attrition = BySex::new(attrition_for(Sex::Female)?, attrition_for(Sex::Male)?);

    let current = CurrentWorkforce {
        headcount: snapshot.get("aanbod_personen")?,
        female_share: snapshot.get("per_vrouw_basis")?,
        attrition,
    };

    let pipeline = [
        resolve_pipeline(snapshot, o, "", false)?,
        resolve_pipeline(snapshot, o, "2", false)?,
        resolve_pipeline(snapshot, o, "3", true)?,
    ];

    let foreign = ForeignInflow {
        per_year: snapshot.get("n_buitenland")?,
        female_share: snapshot.get("per_vrouw_buitenland")?,
        return_rate: snapshot.get("rendement_buitenland")?,
    };

    let fte = BySex::new(
        pick(snapshot, o.fte_female, "fte_vrouw_basis")?,
        pick(snapshot, o.fte_male, "fte_man_basis")?,
    );

    Ok(SupplyAssumptions { current, pipeline, foreign, fte })
}

fn resolve_pipeline(
    snapshot: &ParameterSnapshot,
    o: &ScenarioOverrides,
    suffix: &str,
    adjustable: bool,
) -> Result<PipelineCohort> {
    let key = |base: &str| format!("{base}{suffix}");

    let intake = if adjustable {
        pick(snapshot, o.intake, &key("n_inopleiding_perjaar"))?
    } else {
        snapshot.get(&key("n_inopleiding_perjaar"))?
    };
    let duration_name = key("opleidingsduur");
    let duration = if adjustable {
        pick(snapshot, o.training_years, &duration_name)?
    } else {
        snapshot.get(&duration_name)?
    };
    if duration < 0.0 || duration.fract() != 0.0 || duration > f64::from(u16::MAX) {
        return Err(ProjectionError::invalid(
            duration_name,
            duration,
            "training duration must be a non-negative whole number of years",
        ));
    }

    let curve = |sex: Sex, given: [Option<f64>; 4]| -> Result<ReturnCurve> {
        let mut points = [0.0; 4];
        for (i, years) in [1, 5, 10, 15].iter().enumerate() {
            points[i] = pick(snapshot, given[i], &key(&format!("extern_rendement_{}_{}jaar", sex.key(), years)))?;
        }
        Ok(ReturnCurve::new(points[0], points[1], points[2], points[3]))
    };

    Ok(PipelineCohort {
        intake,
        female_share: snapshot.get(&key("per_vrouw_opleiding"))?,
        internal_pass_rate: pick(snapshot, o.internal_pass_rate, &key("intern_rendement"))?,
        training_years: duration as u32,
        external_return: BySex::new(
            curve(Sex::Female, [o.return_female_1, o.return_female_5, o.return_female_10, o.return_female_15])?,
            curve(Sex::Male, [o.return_male_1, o.return_male_5, o.return_male_10, o.return_male_15])?,
        ),
    })
}

fn resolve_demand(snapshot: &ParameterSnapshot, o: &ScenarioOverrides, base_fte: f64) -> Result<DemandAssumptions> {
    let variant = |v: RiskVariant| -> Result<DemandComponents> {
        let key = |base: &str| format!("{}_{}", base, v.suffix());
        Ok(DemandComponents {
            unmet_base: snapshot.get(&key("onv_vraag"))?,
            demography: [
                snapshot.get(&key("demo_5"))?,
                snapshot.get(&key("demo_10"))?,
                snapshot.get(&key("demo_15"))?,
                snapshot.get(&key("demo_20"))?,
            ],
            epidemiology: pick(snapshot, o.epidemiology, &key("epi"))?,
            social: pick(snapshot, o.social, &key("sociaal"))?,
            professional: pick(snapshot, o.professional, &key("vakinh"))?,
            efficiency: pick(snapshot, o.efficiency, &key("effic"))?,
            horizontal_substitution: pick(snapshot, o.horizontal_substitution, &key("horsub"))?,
            vertical_substitution: pick(snapshot, o.vertical_substitution, &key("vertsub"))?,
            working_time: pick(snapshot, o.working_time, &key("atv"))?,
            total_excl_working_time: o
                .total_excl_working_time
                .or_else(|| snapshot.get_opt(&key("totale_zorgvraag_excl_ATV"))),
        })
    };

    Ok(DemandAssumptions {
        base_fte,
        demography_factor: o.demography_factor.unwrap_or(1.0),
        low: variant(RiskVariant::Low)?,
        mid: variant(RiskVariant::Mid)?,
        high: variant(RiskVariant::High)?,
    })
}
