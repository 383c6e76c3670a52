//! Device configuration: the components of one device plus its usage

use crate::category::ComponentCategory;
use crate::component::ComponentConfiguration;
use crate::usage::UsageConfiguration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfiguration {
    /// Device archetype id; `None` means the configured fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
    /// Components in caller order; canonical order after resolution
    #[serde(default)]
    pub components: Vec<ComponentConfiguration>,
    #[serde(default)]
    pub usage: UsageConfiguration,
}

impl DeviceConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = Some(archetype.into());
        self
    }

    pub fn with_component(mut self, component: impl Into<ComponentConfiguration>) -> Self {
        self.components.push(component.into());
        self
    }

    pub fn with_usage(mut self, usage: UsageConfiguration) -> Self {
        self.usage = usage;
        self
    }

    /// Components whose category is `category`
    pub fn of_category(
        &self,
        category: ComponentCategory,
    ) -> impl Iterator<Item = &ComponentConfiguration> {
        self.components
            .iter()
            .filter(move |c| c.category() == category)
    }

    pub fn has_disks(&self) -> bool {
        self.components
            .iter()
            .any(|c| matches!(c, ComponentConfiguration::Disk(_)))
    }
}

macro_rules! impl_into_component {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<crate::component::$ty> for ComponentConfiguration {
                fn from(c: crate::component::$ty) -> Self {
                    ComponentConfiguration::$variant(c)
                }
            }
        )*
    };
}

impl_into_component! {
    CpuConfiguration => Cpu,
    RamConfiguration => Ram,
    DiskConfiguration => Disk,
    PowerSupplyConfiguration => PowerSupply,
    CaseConfiguration => Case,
    MotherboardConfiguration => Motherboard,
    AssemblyConfiguration => Assembly,
}
