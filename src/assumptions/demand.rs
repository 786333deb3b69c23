//! Demand-side assumptions per risk variant

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Low, mid and high demand scenarios published with each projection round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskVariant {
    Low,
    Mid,
    High,
}

impl RiskVariant {
    pub const ALL: [RiskVariant; 3] = [RiskVariant::Low, RiskVariant::Mid, RiskVariant::High];

    /// Suffix of the variant's parameter names
    pub fn suffix(self) -> &'static str {
        match self {
            RiskVariant::Low => "laag",
            RiskVariant::Mid => "midden",
            RiskVariant::High => "hoog",
        }
    }
}

impl fmt::Display for RiskVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RiskVariant::Low => "low",
            RiskVariant::Mid => "mid",
            RiskVariant::High => "high",
        };
        f.write_str(name)
    }
}

impl FromStr for RiskVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" | "laag" => Ok(RiskVariant::Low),
            "mid" | "midden" => Ok(RiskVariant::Mid),
            "high" | "hoog" => Ok(RiskVariant::High),
            other => Err(format!("unknown risk variant `{other}` (expected low, mid or high)")),
        }
    }
}

/// Growth components of one variant. Annual rates unless noted otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandComponents {
    /// Unmet demand at the reference year, as a fraction of current demand
    pub unmet_base: f64,
    /// Cumulative demographic growth after 5/10/15/20 years
    pub demography: [f64; 4],
    pub epidemiology: f64,
    pub social: f64,
    pub professional: f64,
    pub efficiency: f64,
    pub horizontal_substitution: f64,
    pub vertical_substitution: f64,
    pub working_time: f64,
    /// Combined rate replacing vertical substitution and the five other
    /// components when set
    pub total_excl_working_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandAssumptions {
    /// Workforce FTE at the reference year, before the unmet backlog
    pub base_fte: f64,
    /// Multiplier on the demographic growth curve
    pub demography_factor: f64,
    pub low: DemandComponents,
    pub mid: DemandComponents,
    pub high: DemandComponents,
}

impl DemandAssumptions {
    pub fn components(&self, variant: RiskVariant) -> &DemandComponents {
        match variant {
            RiskVariant::Low => &self.low,
            RiskVariant::Mid => &self.mid,
            RiskVariant::High => &self.high,
        }
    }

    pub fn components_mut(&mut self, variant: RiskVariant) -> &mut DemandComponents {
        match variant {
            RiskVariant::Low => &mut self.low,
            RiskVariant::Mid => &mut self.mid,
            RiskVariant::High => &mut self.high,
        }
    }
}
