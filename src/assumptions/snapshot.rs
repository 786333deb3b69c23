//! Immutable keyed store of named model parameters

use std::collections::HashMap;

use crate::error::{ProjectionError, Result};

/// Read-only map from parameter name to value, built once per scenario year
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSnapshot {
    values: HashMap<String, f64>,
}

impl ParameterSnapshot {
    pub fn new(values: HashMap<String, f64>) -> Self {
        Self { values }
    }

    /// Look up a parameter, failing loudly if it is absent
    pub fn get(&self, name: &str) -> Result<f64> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| ProjectionError::missing(name))
    }

    /// Look up an optional parameter
    pub fn get_opt(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of this snapshot with one value replaced or added
    pub fn with_value(&self, name: &str, value: f64) -> Self {
        let mut values = self.values.clone();
        values.insert(name.to_string(), value);
        Self { values }
    }

    /// Copy of this snapshot with one value removed
    pub fn without(&self, name: &str) -> Self {
        let mut values = self.values.clone();
        values.remove(name);
        Self { values }
    }

    /// Built-in general practitioner parameters for the 2025 projection round.
    /// Matches `data/parameters/raming_2025.csv` for the `Huisarts` rows.
    pub fn reference_2025() -> Self {
        let mut values: HashMap<String, f64> = REFERENCE_2025
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect();

        // Pipeline cohorts 2 and 3 share the training and return assumptions of cohort 1
        for suffix in ["2", "3"] {
            for base in PIPELINE_KEYS {
                if let Some(value) = values.get(*base).copied() {
                    values.insert(format!("{base}{suffix}"), value);
                }
            }
        }

        for (variant, scale) in [("laag", 0.8), ("midden", 1.0), ("hoog", 1.2)] {
            for (name, value) in DEMAND_MIDDEN {
                values.insert(format!("{name}_{variant}"), value * scale);
            }
        }

        Self { values }
    }
}

impl FromIterator<(String, f64)> for ParameterSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

const REFERENCE_2025: &[(&str, f64)] = &[
    ("basisjaar", 2025.0),
    ("bijsturingsjaar", 2027.0),
    ("trendjaar", 2035.0),
    ("evenwichtsjaar1", 2043.0),
    // Current workforce
    ("aanbod_personen", 14347.0),
    ("per_vrouw_basis", 0.66),
    ("fte_vrouw_basis", 0.72),
    ("fte_man_basis", 0.81),
    ("uitstroom_vrouw_basis_vijf", 0.116),
    ("uitstroom_vrouw_basis_tien", 0.232),
    ("uitstroom_vrouw_basis_vijftien", 0.371),
    ("uitstroom_vrouw_basis_twintig", 0.51),
    ("uitstroom_man_basis_vijf", 0.226),
    ("uitstroom_man_basis_tien", 0.373),
    ("uitstroom_man_basis_vijftien", 0.502),
    ("uitstroom_man_basis_twintig", 0.632),
    // Training pipeline
    ("n_inopleiding_perjaar", 718.0),
    ("per_vrouw_opleiding", 0.74),
    ("intern_rendement", 0.94),
    ("opleidingsduur", 3.0),
    ("extern_rendement_vrouw_1jaar", 0.989),
    ("extern_rendement_vrouw_5jaar", 0.943),
    ("extern_rendement_vrouw_10jaar", 0.889),
    ("extern_rendement_vrouw_15jaar", 0.851),
    ("extern_rendement_man_1jaar", 0.992),
    ("extern_rendement_man_5jaar", 0.959),
    ("extern_rendement_man_10jaar", 0.931),
    ("extern_rendement_man_15jaar", 0.905),
    // Foreign inflow
    ("n_buitenland", 14.0),
    ("per_vrouw_buitenland", 1.0),
    ("rendement_buitenland", 1.0),
];

const PIPELINE_KEYS: &[&str] = &[
    "n_inopleiding_perjaar",
    "per_vrouw_opleiding",
    "intern_rendement",
    "opleidingsduur",
    "extern_rendement_vrouw_1jaar",
    "extern_rendement_vrouw_5jaar",
    "extern_rendement_vrouw_10jaar",
    "extern_rendement_vrouw_15jaar",
    "extern_rendement_man_1jaar",
    "extern_rendement_man_5jaar",
    "extern_rendement_man_10jaar",
    "extern_rendement_man_15jaar",
];

// Mid variant; low and high scale every component by 0.8 and 1.2
const DEMAND_MIDDEN: [(&str, f64); 12] = [
    ("onv_vraag", 0.063),
    ("demo_5", 0.043),
    ("demo_10", 0.086),
    ("demo_15", 0.121),
    ("demo_20", 0.148),
    ("epi", 0.01),
    ("sociaal", 0.019),
    ("vakinh", -0.003),
    ("effic", -0.005),
    ("horsub", 0.016),
    ("vertsub", -0.011),
    ("atv", 0.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_is_an_error() {
        let snapshot = ParameterSnapshot::reference_2025();
        match snapshot.get("does_not_exist") {
            Err(ProjectionError::MissingParameter { name }) => assert_eq!(name, "does_not_exist"),
            other => panic!("expected MissingParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_has_all_cohorts_and_variants() {
        let snapshot = ParameterSnapshot::reference_2025();

        assert_eq!(snapshot.get("n_inopleiding_perjaar3").unwrap(), 718.0);
        assert_eq!(snapshot.get("opleidingsduur2").unwrap(), 3.0);
        assert_eq!(snapshot.get("demo_20_midden").unwrap(), 0.148);
        assert!((snapshot.get("onv_vraag_hoog").unwrap() - 0.063 * 1.2).abs() < 1e-12);
        assert!(snapshot.get("atv_laag").is_ok());
    }

    #[test]
    fn test_with_value_leaves_original_untouched() {
        let snapshot = ParameterSnapshot::reference_2025();
        let changed = snapshot.with_value("n_buitenland", 0.0);

        assert_eq!(changed.get("n_buitenland").unwrap(), 0.0);
        assert_eq!(snapshot.get("n_buitenland").unwrap(), 14.0);
        assert!(!snapshot.without("n_buitenland").contains("n_buitenland"));
    }
}
