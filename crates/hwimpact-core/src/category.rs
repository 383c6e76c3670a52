//! Component and device categories
//!
//! A category names an archetype table, a factor family and the section a
//! device archetype uses for that component.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    /// Whole server device
    Server,
    Cpu,
    Ram,
    Ssd,
    Hdd,
    PowerSupply,
    Case,
    Motherboard,
    Assembly,
}

impl ComponentCategory {
    pub const ALL: [ComponentCategory; 9] = [
        ComponentCategory::Server,
        ComponentCategory::Cpu,
        ComponentCategory::Ram,
        ComponentCategory::Ssd,
        ComponentCategory::Hdd,
        ComponentCategory::PowerSupply,
        ComponentCategory::Case,
        ComponentCategory::Motherboard,
        ComponentCategory::Assembly,
    ];

    /// Lowercase key used for table file names and factor families
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentCategory::Server => "server",
            ComponentCategory::Cpu => "cpu",
            ComponentCategory::Ram => "ram",
            ComponentCategory::Ssd => "ssd",
            ComponentCategory::Hdd => "hdd",
            ComponentCategory::PowerSupply => "power_supply",
            ComponentCategory::Case => "case",
            ComponentCategory::Motherboard => "motherboard",
            ComponentCategory::Assembly => "assembly",
        }
    }

    /// Section name inside a device archetype (`CPU`, `POWER_SUPPLY`, ...)
    pub fn section(&self) -> &'static str {
        match self {
            ComponentCategory::Server => "SERVER",
            ComponentCategory::Cpu => "CPU",
            ComponentCategory::Ram => "RAM",
            ComponentCategory::Ssd => "SSD",
            ComponentCategory::Hdd => "HDD",
            ComponentCategory::PowerSupply => "POWER_SUPPLY",
            ComponentCategory::Case => "CASE",
            ComponentCategory::Motherboard => "MOTHERBOARD",
            ComponentCategory::Assembly => "ASSEMBLY",
        }
    }

    pub fn is_device(&self) -> bool {
        matches!(self, ComponentCategory::Server)
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ComponentCategory::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == lowered || c.section().eq_ignore_ascii_case(&lowered))
            .ok_or_else(|| format!("unknown component category: {}", s))
    }
}
