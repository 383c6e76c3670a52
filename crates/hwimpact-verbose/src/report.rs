//! Report projection

use hwimpact_core::{AttributeView, ImpactMap, ImpactResult};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key of the usage entry
pub const USAGE_KEY: &str = "USAGE";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactSummary {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

fn summarize(impacts: &ImpactMap) -> BTreeMap<String, ImpactSummary> {
    impacts
        .iter()
        .map(|(criterion, impact)| {
            let summary = ImpactSummary {
                value: impact.value,
                min: impact.min,
                max: impact.max,
                unit: impact.unit.clone(),
            };
            (criterion.clone(), summary)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentEntry {
    pub label: String,
    pub units: u32,
    /// Provenance of `units`; kept out of the JSON shape
    pub units_attribute: Option<AttributeView>,
    pub attributes: Vec<AttributeView>,
    pub impacts: BTreeMap<String, ImpactSummary>,
}

impl ComponentEntry {
    fn to_json(&self) -> Value {
        let mut entry = Map::new();
        for attribute in &self.attributes {
            entry.insert(attribute.name.to_string(), view_json(attribute));
        }
        entry.insert("units".to_string(), Value::from(self.units));
        entry.insert("impacts".to_string(), impacts_json(&self.impacts));
        Value::Object(entry)
    }
}

/// `{value, status, source, unit}`; the name is the key
fn view_json(view: &AttributeView) -> Value {
    let mut json = serde_json::to_value(view).unwrap_or(Value::Null);
    if let Some(fields) = json.as_object_mut() {
        fields.remove("name");
    }
    json
}

fn impacts_json(impacts: &BTreeMap<String, ImpactSummary>) -> Value {
    serde_json::to_value(impacts).unwrap_or(Value::Null)
}

/// Per-instance breakdown in device order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerboseReport {
    pub components: Vec<ComponentEntry>,
    /// Use-phase impacts of the whole device
    pub usage: BTreeMap<String, ImpactSummary>,
    pub duration_years: f64,
}

impl VerboseReport {
    pub fn from_result(result: &ImpactResult) -> Self {
        let components = result
            .components
            .iter()
            .map(|component| ComponentEntry {
                label: component.label.clone(),
                units: component.units,
                units_attribute: component.configuration.units_view(),
                attributes: component.configuration.attributes(),
                impacts: summarize(&component.manufacturing),
            })
            .collect();
        Self {
            components,
            usage: summarize(&result.phases.use_phase),
            duration_years: result.duration_years,
        }
    }

    pub fn get(&self, label: &str) -> Option<&ComponentEntry> {
        self.components.iter().find(|c| c.label == label)
    }

    /// `{ "CPU-1": {...}, ..., "USAGE": { "impacts": {...} } }`
    pub fn to_json(&self) -> Value {
        let mut report = Map::new();
        for component in &self.components {
            report.insert(component.label.clone(), component.to_json());
        }
        let mut usage = Map::new();
        usage.insert("impacts".to_string(), impacts_json(&self.usage));
        report.insert(USAGE_KEY.to_string(), Value::Object(usage));
        Value::Object(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwimpact_core::{
        AttributeValue, ComponentCategory, ComponentImpact, CpuConfiguration, ImpactValue,
        PhaseImpact, Status,
    };

    fn result() -> ImpactResult {
        let mut cpu = CpuConfiguration::new().with_core_units(24);
        cpu.units = Some(AttributeValue::new(Status::Completed, 1).with_source("fallback constant"));

        let mut manufacturing = ImpactMap::new();
        manufacturing.insert("gwp".into(), ImpactValue::calculated(21.7, 20.0, 23.0, "kgCO2eq"));
        let mut phases = PhaseImpact::default();
        phases
            .use_phase
            .insert("gwp".into(), ImpactValue::calculated(300.0, 0.0, 600.0, "kgCO2eq"));

        ImpactResult {
            impacts: ImpactMap::new(),
            phases,
            duration_years: 1.0,
            components: vec![ComponentImpact {
                label: "CPU-1".into(),
                category: ComponentCategory::Cpu,
                units: 1,
                configuration: cpu.into(),
                manufacturing,
                power: 0.0,
            }],
            verbose: None,
        }
    }

    #[test]
    fn test_json_shape() {
        let json = VerboseReport::from_result(&result()).to_json();

        let cpu = &json["CPU-1"];
        assert_eq!(cpu["core_units"]["value"], 24);
        assert_eq!(cpu["core_units"]["status"], "INPUT");
        assert_eq!(cpu["core_units"]["unit"], "none");
        assert_eq!(cpu["units"], 1);
        assert_eq!(cpu["impacts"]["gwp"]["value"], 21.7);
        assert_eq!(cpu["impacts"]["gwp"]["unit"], "kgCO2eq");
        assert!(cpu.get("tdp").is_none());
        assert!(cpu["core_units"].get("name").is_none());

        let usage = json["USAGE"].as_object().unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(json["USAGE"]["impacts"]["gwp"]["value"], 300.0);
    }

    #[test]
    fn test_units_provenance_kept_on_entry() {
        let report = VerboseReport::from_result(&result());
        let cpu = report.get("CPU-1").unwrap();
        assert_eq!(cpu.units, 1);
        let provenance = cpu.units_attribute.as_ref().unwrap();
        assert_eq!(provenance.status, Status::Completed);
        assert_eq!(provenance.source.as_deref(), Some("fallback constant"));
    }

    #[test]
    fn test_lookup_by_label() {
        let report = VerboseReport::from_result(&result());
        assert!(report.get("CPU-1").is_some());
        assert!(report.get("RAM-1").is_none());
    }
}
