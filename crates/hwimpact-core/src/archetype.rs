//! Archetype records
//!
//! An archetype record groups `{default, min, max}` triples by section. Device
//! archetypes use one section per component (`CPU`, `RAM`, `USAGE`, ...);
//! component archetypes keep everything under [`ROOT_SECTION`].

use crate::attribute::Bound;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Section holding attributes that belong to no component
pub const ROOT_SECTION: &str = "";

/// A raw archetype cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArchetypeValue {
    Number(f64),
    Text(String),
}

impl ArchetypeValue {
    /// Read a table cell; empty cells carry no value
    pub fn parse(cell: &str) -> Option<Self> {
        let cell = cell.trim();
        if cell.is_empty() {
            return None;
        }
        match cell.parse::<f64>() {
            Ok(n) if n.is_finite() => Some(ArchetypeValue::Number(n)),
            _ => Some(ArchetypeValue::Text(cell.to_string())),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArchetypeValue::Number(n) => Some(*n),
            ArchetypeValue::Text(_) => None,
        }
    }
}

impl From<f64> for ArchetypeValue {
    fn from(n: f64) -> Self {
        ArchetypeValue::Number(n)
    }
}

impl From<&str> for ArchetypeValue {
    fn from(s: &str) -> Self {
        ArchetypeValue::Text(s.to_string())
    }
}

/// The `{default, min, max}` triple of one attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefaults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ArchetypeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<ArchetypeValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<ArchetypeValue>,
}

impl AttributeDefaults {
    pub fn get(&self, bound: Bound) -> Option<&ArchetypeValue> {
        match bound {
            Bound::Value => self.default.as_ref(),
            Bound::Min => self.min.as_ref(),
            Bound::Max => self.max.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.min.is_none() && self.max.is_none()
    }
}

pub type Section = BTreeMap<String, AttributeDefaults>;

/// One archetype: attribute triples grouped by section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeRecord {
    pub id: String,
    #[serde(default)]
    pub sections: BTreeMap<String, Section>,
}

impl ArchetypeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sections: BTreeMap::new(),
        }
    }

    pub fn section(&self, section: &str) -> Option<&Section> {
        self.sections.get(section)
    }

    pub fn attribute(&self, section: &str, name: &str) -> Option<&AttributeDefaults> {
        self.sections.get(section).and_then(|s| s.get(name))
    }

    /// Default of `section.name`, if the record has one
    pub fn default_of(&self, section: &str, name: &str) -> Option<&ArchetypeValue> {
        self.attribute(section, name).and_then(|a| a.default.as_ref())
    }

    /// Declare an attribute with no value yet (an empty column)
    pub fn declare(&mut self, section: &str, name: &str) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .entry(name.to_string())
            .or_default();
    }

    pub fn set(&mut self, section: &str, name: &str, bound: Bound, value: ArchetypeValue) {
        let entry = self
            .sections
            .entry(section.to_string())
            .or_default()
            .entry(name.to_string())
            .or_default();
        match bound {
            Bound::Value => entry.default = Some(value),
            Bound::Min => entry.min = Some(value),
            Bound::Max => entry.max = Some(value),
        }
    }

    /// Builder form of [`ArchetypeRecord::set`] for the default bound
    pub fn with(mut self, section: &str, name: &str, value: impl Into<ArchetypeValue>) -> Self {
        self.set(section, name, Bound::Value, value.into());
        self
    }

    /// Builder form of [`ArchetypeRecord::set`] for both range bounds
    pub fn with_range(
        mut self,
        section: &str,
        name: &str,
        min: impl Into<ArchetypeValue>,
        max: impl Into<ArchetypeValue>,
    ) -> Self {
        self.set(section, name, Bound::Min, min.into());
        self.set(section, name, Bound::Max, max.into());
        self
    }
}
