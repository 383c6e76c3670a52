//! Factor document schema

use hwimpact_core::{ConsumptionProfile, FactorTable, LoadError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Criterion to value
pub type CriterionMap = BTreeMap<String, f64>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorDocument {
    /// Criterion to unit of its impact
    #[serde(default)]
    pub units: BTreeMap<String, String>,

    /// Family key (`cpu`, `case_rack`, ...) to factors
    #[serde(default)]
    pub components: BTreeMap<String, FactorTable>,

    #[serde(default)]
    pub electricity: Electricity,

    /// Category name to power draw model
    #[serde(default)]
    pub consumption_profiles: BTreeMap<String, ConsumptionProfile>,

    /// Functional block to hardware support level to factors
    #[serde(default)]
    pub iot: BTreeMap<String, BTreeMap<String, IotLevel>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Electricity {
    /// Location code to impact per kWh
    #[serde(default)]
    pub mixes: BTreeMap<String, CriterionMap>,

    /// Display name to location code
    #[serde(default)]
    pub available_countries: BTreeMap<String, String>,

    /// Units of use-phase impacts when they differ from the global ones
    #[serde(default)]
    pub units: BTreeMap<String, String>,
}

/// Factors of one IoT hardware support level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IotLevel {
    #[serde(default)]
    pub manufacture: CriterionMap,
    #[serde(default)]
    pub eol: CriterionMap,
}

impl FactorDocument {
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Mix of `location`: the code itself first, then the alias table
    pub fn mix(&self, location: &str) -> Option<&CriterionMap> {
        if let Some(mix) = self.electricity.mixes.get(location) {
            return Some(mix);
        }
        self.electricity
            .available_countries
            .iter()
            .find(|(name, code)| name.as_str() == location || code.as_str() == location)
            .and_then(|(_, code)| self.electricity.mixes.get(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"
units: { gwp: kgCO2eq }
components:
  cpu:
    gwp: { impact: 9.14, die_impact: 1.97 }
electricity:
  mixes:
    FRA: { gwp: 0.098 }
  available_countries:
    France: FRA
"#;

    #[test]
    fn test_parse_document() {
        let doc = FactorDocument::from_yaml(DOC).unwrap();
        let cpu = &doc.components["cpu"]["gwp"];
        assert_eq!(cpu.impact, 9.14);
        assert_eq!(cpu.die_impact, Some(1.97));
        assert!(doc.consumption_profiles.is_empty());
    }

    #[test]
    fn test_mix_aliases() {
        let doc = FactorDocument::from_yaml(DOC).unwrap();
        assert_eq!(doc.mix("FRA").unwrap()["gwp"], 0.098);
        assert_eq!(doc.mix("France").unwrap()["gwp"], 0.098);
        assert!(doc.mix("Atlantis").is_none());
    }

    #[test]
    fn test_empty_document() {
        let doc = FactorDocument::from_yaml("{}").unwrap();
        assert_eq!(doc, FactorDocument::default());
    }
}
