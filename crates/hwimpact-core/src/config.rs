//! Engine configuration
//!
//! Every field has a default, so a YAML document only needs the keys it
//! overrides. Map entries are merged onto the built-in ones.

use crate::archetype::ArchetypeValue;
use crate::category::ComponentCategory;
use crate::error::LoadError;
use crate::HOURS_PER_YEAR;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Wattages used when no consumption profile is available
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerModel {
    /// Draw of everything not modelled per component, W
    pub platform_baseline: f64,
    /// Per RAM unit, W
    pub ram_watts: f64,
    pub ssd_watts: f64,
    pub hdd_watts: f64,
}

impl Default for PowerModel {
    fn default() -> Self {
        Self {
            platform_baseline: 50.0,
            ram_watts: 5.0,
            ssd_watts: 5.0,
            hdd_watts: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Location used when neither the caller nor the archetype sets one
    pub default_location: String,
    /// Criteria computed when the caller asks for none in particular
    pub default_criteria: Vec<String>,
    pub hours_per_year: f64,
    /// Category name to the id `"default"` stands for
    #[serde(deserialize_with = "fallbacks_over_defaults")]
    pub archetype_fallbacks: BTreeMap<String, String>,
    pub power: PowerModel,
    /// Fixed die area added to every CPU, cm²
    pub cpu_base_die_area: f64,
    /// `SECTION.attribute` to COMPLETED fallback value
    #[serde(deserialize_with = "completions_over_defaults")]
    pub completions: BTreeMap<String, ArchetypeValue>,
}

fn default_archetype_fallbacks() -> BTreeMap<String, String> {
    BTreeMap::from([(
        ComponentCategory::Server.as_str().to_string(),
        "platform_compute_medium".to_string(),
    )])
}

fn default_completions() -> BTreeMap<String, ArchetypeValue> {
    [
        ("CPU.tdp", ArchetypeValue::Number(100.0)),
        ("DISK.type", ArchetypeValue::from("ssd")),
        ("CASE.case_type", ArchetypeValue::from("rack")),
        ("USAGE.hours_life_time", ArchetypeValue::Number(4.0 * HOURS_PER_YEAR)),
        ("USAGE.use_time_ratio", ArchetypeValue::Number(1.0)),
        ("USAGE.time_workload", ArchetypeValue::Number(50.0)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn merged<'de, D, V>(
    deserializer: D,
    mut defaults: BTreeMap<String, V>,
) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    defaults.extend(BTreeMap::<String, V>::deserialize(deserializer)?);
    Ok(defaults)
}

fn fallbacks_over_defaults<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    merged(deserializer, default_archetype_fallbacks())
}

fn completions_over_defaults<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, ArchetypeValue>, D::Error>
where
    D: Deserializer<'de>,
{
    merged(deserializer, default_completions())
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_location: "EEE".to_string(),
            default_criteria: vec!["gwp".to_string(), "adp".to_string(), "pe".to_string()],
            hours_per_year: HOURS_PER_YEAR,
            archetype_fallbacks: default_archetype_fallbacks(),
            power: PowerModel::default(),
            cpu_base_die_area: 0.491,
            completions: default_completions(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoadError::io(path.display().to_string(), e))?;
        Self::from_yaml(&content)
    }

    /// Id that `"default"` resolves to for `category`
    pub fn fallback_archetype(&self, category: ComponentCategory) -> Option<&str> {
        self.archetype_fallbacks
            .get(category.as_str())
            .map(String::as_str)
    }

    /// COMPLETED fallback for `section.attribute`
    pub fn completion(&self, section: &str, attribute: &str) -> Option<&ArchetypeValue> {
        self.completions.get(&format!("{}.{}", section, attribute))
    }
}
