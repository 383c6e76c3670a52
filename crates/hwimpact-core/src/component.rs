//! Component configurations
//!
//! One struct per component kind, unified by [`ComponentConfiguration`]. Every
//! field is an attribute slot; `archetype` is only a resolution hint and never
//! part of a component's identity.

use crate::archetype::ArchetypeValue;
use crate::attribute::{Attr, AttributeType, AttributeValue, Status};
use crate::category::ComponentCategory;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ENUMERATED ATTRIBUTE TYPES
// ============================================================================

/// Storage technology of a disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskKind {
    Ssd,
    Hdd,
}

impl DiskKind {
    pub fn category(&self) -> ComponentCategory {
        match self {
            DiskKind::Ssd => ComponentCategory::Ssd,
            DiskKind::Hdd => ComponentCategory::Hdd,
        }
    }

    /// The kind whose archetype table is `category`
    pub fn of_category(category: ComponentCategory) -> Option<DiskKind> {
        match category {
            ComponentCategory::Ssd => Some(DiskKind::Ssd),
            ComponentCategory::Hdd => Some(DiskKind::Hdd),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiskKind::Ssd => "ssd",
            DiskKind::Hdd => "hdd",
        }
    }
}

impl FromStr for DiskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssd" => Ok(DiskKind::Ssd),
            "hdd" => Ok(DiskKind::Hdd),
            other => Err(format!("unknown disk type: {}", other)),
        }
    }
}

impl AttributeType for DiskKind {
    fn from_archetype(value: &ArchetypeValue) -> Option<Self> {
        match value {
            ArchetypeValue::Text(s) => s.parse().ok(),
            ArchetypeValue::Number(_) => None,
        }
    }
}

/// Chassis form factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Rack,
    Blade,
    Tower,
}

impl CaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Rack => "rack",
            CaseType::Blade => "blade",
            CaseType::Tower => "tower",
        }
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rack" => Ok(CaseType::Rack),
            "blade" => Ok(CaseType::Blade),
            "tower" => Ok(CaseType::Tower),
            other => Err(format!("unknown case type: {}", other)),
        }
    }
}

impl AttributeType for CaseType {
    fn from_archetype(value: &ArchetypeValue) -> Option<Self> {
        match value {
            ArchetypeValue::Text(s) => s.parse().ok(),
            ArchetypeValue::Number(_) => None,
        }
    }
}

// ============================================================================
// COMPONENT KINDS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuConfiguration {
    #[serde(default)]
    pub units: Attr<u32>,
    #[serde(default)]
    pub core_units: Attr<u32>,
    /// Die area per core, mm²
    #[serde(default)]
    pub die_size_per_core: Attr<f64>,
    /// Thermal design power, W
    #[serde(default)]
    pub tdp: Attr<f64>,
    #[serde(default)]
    pub family: Attr<String>,
    #[serde(default)]
    pub name: Attr<String>,
    #[serde(default)]
    pub manufacturer: Attr<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

impl CpuConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: u32) -> Self {
        self.units = Some(AttributeValue::input(units));
        self
    }

    pub fn with_core_units(mut self, core_units: u32) -> Self {
        self.core_units = Some(AttributeValue::input(core_units));
        self
    }

    pub fn with_die_size_per_core(mut self, mm2: f64) -> Self {
        self.die_size_per_core = Some(AttributeValue::input(mm2));
        self
    }

    pub fn with_tdp(mut self, watts: f64) -> Self {
        self.tdp = Some(AttributeValue::input(watts));
        self
    }

    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(AttributeValue::input(family.into()));
        self
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RamConfiguration {
    #[serde(default)]
    pub units: Attr<u32>,
    /// GB
    #[serde(default)]
    pub capacity: Attr<f64>,
    /// GB/cm²
    #[serde(default)]
    pub density: Attr<f64>,
    #[serde(default)]
    pub manufacturer: Attr<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

impl RamConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: u32) -> Self {
        self.units = Some(AttributeValue::input(units));
        self
    }

    pub fn with_capacity(mut self, gb: f64) -> Self {
        self.capacity = Some(AttributeValue::input(gb));
        self
    }

    pub fn with_density(mut self, gb_per_cm2: f64) -> Self {
        self.density = Some(AttributeValue::input(gb_per_cm2));
        self
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskConfiguration {
    #[serde(default)]
    pub units: Attr<u32>,
    #[serde(default, rename = "type")]
    pub disk_type: Attr<DiskKind>,
    /// GB
    #[serde(default)]
    pub capacity: Attr<f64>,
    /// GB/cm²; only meaningful for SSDs
    #[serde(default)]
    pub density: Attr<f64>,
    #[serde(default)]
    pub manufacturer: Attr<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

impl DiskConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ssd() -> Self {
        Self::new().with_type(DiskKind::Ssd)
    }

    pub fn hdd() -> Self {
        Self::new().with_type(DiskKind::Hdd)
    }

    pub fn with_type(mut self, kind: DiskKind) -> Self {
        self.disk_type = Some(AttributeValue::input(kind));
        self
    }

    pub fn with_units(mut self, units: u32) -> Self {
        self.units = Some(AttributeValue::input(units));
        self
    }

    pub fn with_capacity(mut self, gb: f64) -> Self {
        self.capacity = Some(AttributeValue::input(gb));
        self
    }

    pub fn with_density(mut self, gb_per_cm2: f64) -> Self {
        self.density = Some(AttributeValue::input(gb_per_cm2));
        self
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    /// Resolved kind, SSD while still unresolved
    pub fn kind(&self) -> DiskKind {
        self.disk_type.as_ref().map_or(DiskKind::Ssd, |t| t.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PowerSupplyConfiguration {
    #[serde(default)]
    pub units: Attr<u32>,
    /// kg
    #[serde(default)]
    pub unit_weight: Attr<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

impl PowerSupplyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_units(mut self, units: u32) -> Self {
        self.units = Some(AttributeValue::input(units));
        self
    }

    pub fn with_unit_weight(mut self, kg: f64) -> Self {
        self.unit_weight = Some(AttributeValue::input(kg));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseConfiguration {
    #[serde(default)]
    pub units: Attr<u32>,
    #[serde(default)]
    pub case_type: Attr<CaseType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

impl CaseConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_case_type(mut self, case_type: CaseType) -> Self {
        self.case_type = Some(AttributeValue::input(case_type));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MotherboardConfiguration {
    #[serde(default)]
    pub units: Attr<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyConfiguration {
    #[serde(default)]
    pub units: Attr<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

// ============================================================================
// SUM TYPE
// ============================================================================

/// Any component of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComponentConfiguration {
    Cpu(CpuConfiguration),
    Ram(RamConfiguration),
    Disk(DiskConfiguration),
    PowerSupply(PowerSupplyConfiguration),
    Case(CaseConfiguration),
    Motherboard(MotherboardConfiguration),
    Assembly(AssemblyConfiguration),
}

impl ComponentConfiguration {
    pub fn category(&self) -> ComponentCategory {
        match self {
            ComponentConfiguration::Cpu(_) => ComponentCategory::Cpu,
            ComponentConfiguration::Ram(_) => ComponentCategory::Ram,
            ComponentConfiguration::Disk(d) => d.kind().category(),
            ComponentConfiguration::PowerSupply(_) => ComponentCategory::PowerSupply,
            ComponentConfiguration::Case(_) => ComponentCategory::Case,
            ComponentConfiguration::Motherboard(_) => ComponentCategory::Motherboard,
            ComponentConfiguration::Assembly(_) => ComponentCategory::Assembly,
        }
    }

    pub fn units(&self) -> Option<&AttributeValue<u32>> {
        match self {
            ComponentConfiguration::Cpu(c) => c.units.as_ref(),
            ComponentConfiguration::Ram(c) => c.units.as_ref(),
            ComponentConfiguration::Disk(c) => c.units.as_ref(),
            ComponentConfiguration::PowerSupply(c) => c.units.as_ref(),
            ComponentConfiguration::Case(c) => c.units.as_ref(),
            ComponentConfiguration::Motherboard(c) => c.units.as_ref(),
            ComponentConfiguration::Assembly(c) => c.units.as_ref(),
        }
    }

    /// Unit count, 1 while still unresolved
    pub fn unit_count(&self) -> u32 {
        self.units().map_or(1, |u| u.value)
    }

    pub fn archetype(&self) -> Option<&str> {
        match self {
            ComponentConfiguration::Cpu(c) => c.archetype.as_deref(),
            ComponentConfiguration::Ram(c) => c.archetype.as_deref(),
            ComponentConfiguration::Disk(c) => c.archetype.as_deref(),
            ComponentConfiguration::PowerSupply(c) => c.archetype.as_deref(),
            ComponentConfiguration::Case(c) => c.archetype.as_deref(),
            ComponentConfiguration::Motherboard(c) => c.archetype.as_deref(),
            ComponentConfiguration::Assembly(c) => c.archetype.as_deref(),
        }
    }

    pub fn units_view(&self) -> Option<AttributeView> {
        AttributeView::of("units", "none", &self.units().cloned())
    }

    /// Every set attribute except `units`, in declaration order
    pub fn attributes(&self) -> Vec<AttributeView> {
        let views = match self {
            ComponentConfiguration::Cpu(c) => vec![
                AttributeView::of("core_units", "none", &c.core_units),
                AttributeView::of("die_size_per_core", "mm2", &c.die_size_per_core),
                AttributeView::of("tdp", "W", &c.tdp),
                AttributeView::of("family", "none", &c.family),
                AttributeView::of("name", "none", &c.name),
                AttributeView::of("manufacturer", "none", &c.manufacturer),
            ],
            ComponentConfiguration::Ram(c) => vec![
                AttributeView::of("capacity", "GB", &c.capacity),
                AttributeView::of("density", "GB/cm2", &c.density),
                AttributeView::of("manufacturer", "none", &c.manufacturer),
            ],
            ComponentConfiguration::Disk(c) => vec![
                AttributeView::of("type", "none", &c.disk_type),
                AttributeView::of("capacity", "GB", &c.capacity),
                AttributeView::of("density", "GB/cm2", &c.density),
                AttributeView::of("manufacturer", "none", &c.manufacturer),
            ],
            ComponentConfiguration::PowerSupply(c) => {
                vec![AttributeView::of("unit_weight", "kg", &c.unit_weight)]
            }
            ComponentConfiguration::Case(c) => {
                vec![AttributeView::of("case_type", "none", &c.case_type)]
            }
            ComponentConfiguration::Motherboard(_) | ComponentConfiguration::Assembly(_) => {
                vec![]
            }
        };
        views.into_iter().flatten().collect()
    }
}

/// Read-only projection of one attribute for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeView {
    pub name: &'static str,
    pub value: Value,
    pub status: Status,
    pub source: Option<String>,
    pub unit: &'static str,
}

impl AttributeView {
    /// View of `attr`, `None` while it is unset
    pub fn of<T: AttributeType>(
        name: &'static str,
        unit: &'static str,
        attr: &Attr<T>,
    ) -> Option<AttributeView> {
        attr.as_ref().map(|a| AttributeView {
            name,
            value: a.value.to_json(),
            status: a.status,
            source: a.source.clone(),
            unit,
        })
    }
}
