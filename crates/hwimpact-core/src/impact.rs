//! Impact values, per-phase mappings and the compute result

use crate::category::ComponentCategory;
use crate::component::ComponentConfiguration;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// How an impact value was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImpactSource {
    Input,
    Calculated,
    Aggregated,
    NotImplemented,
}

/// One criterion's impact with its best/worst case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactValue {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub source: ImpactSource,
}

impl ImpactValue {
    pub fn calculated(value: f64, min: f64, max: f64, unit: impl Into<String>) -> Self {
        Self {
            value,
            min,
            max,
            unit: unit.into(),
            source: ImpactSource::Calculated,
        }
    }

    pub fn zero(unit: impl Into<String>, source: ImpactSource) -> Self {
        Self {
            value: 0.0,
            min: 0.0,
            max: 0.0,
            unit: unit.into(),
            source,
        }
    }

    /// Sum of two values of the same criterion
    pub fn combine(
        &self,
        criterion: &str,
        other: &ImpactValue,
        source: ImpactSource,
    ) -> Result<ImpactValue, EngineError> {
        if self.unit != other.unit {
            return Err(EngineError::InconsistentUnits {
                criterion: criterion.to_string(),
                left: self.unit.clone(),
                right: other.unit.clone(),
            });
        }
        Ok(ImpactValue {
            value: self.value + other.value,
            min: self.min + other.min,
            max: self.max + other.max,
            unit: self.unit.clone(),
            source,
        })
    }
}

/// Criterion to impact
pub type ImpactMap = BTreeMap<String, ImpactValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Manufacturing,
    Use,
    EndOfLife,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Manufacturing, Phase::Use, Phase::EndOfLife];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Manufacturing => "manufacturing",
            Phase::Use => "use",
            Phase::EndOfLife => "end_of_life",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseImpact {
    pub manufacturing: ImpactMap,
    #[serde(rename = "use")]
    pub use_phase: ImpactMap,
    pub end_of_life: ImpactMap,
}

impl PhaseImpact {
    pub fn get(&self, phase: Phase) -> &ImpactMap {
        match phase {
            Phase::Manufacturing => &self.manufacturing,
            Phase::Use => &self.use_phase,
            Phase::EndOfLife => &self.end_of_life,
        }
    }

    pub fn get_mut(&mut self, phase: Phase) -> &mut ImpactMap {
        match phase {
            Phase::Manufacturing => &mut self.manufacturing,
            Phase::Use => &mut self.use_phase,
            Phase::EndOfLife => &mut self.end_of_life,
        }
    }
}

/// Impact attributed to one resolved component instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentImpact {
    /// Instance key, e.g. `RAM-2`
    pub label: String,
    pub category: ComponentCategory,
    pub units: u32,
    pub configuration: ComponentConfiguration,
    pub manufacturing: ImpactMap,
    /// Power drawn by all units of the component, W
    pub power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    /// Lifecycle total per criterion
    pub impacts: ImpactMap,
    pub phases: PhaseImpact,
    pub duration_years: f64,
    pub components: Vec<ComponentImpact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<Value>,
}

impl ImpactResult {
    pub fn total(&self, criterion: &str) -> Option<&ImpactValue> {
        self.impacts.get(criterion)
    }

    pub fn phase(&self, phase: Phase, criterion: &str) -> Option<&ImpactValue> {
        self.phases.get(phase).get(criterion)
    }
}
