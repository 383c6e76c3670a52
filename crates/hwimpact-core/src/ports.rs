//! Store contracts
//!
//! The engine reads reference data only through these traits. Lookups are
//! total: a missing entry is `None`, never an error.

use crate::archetype::ArchetypeRecord;
use crate::category::ComponentCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default/min/max attribute triples per archetype id
pub trait ArchetypeRepository: Send + Sync {
    /// `archetype_id == "default"` is rewritten to the store's fallback id
    fn lookup(&self, category: ComponentCategory, archetype_id: &str) -> Option<ArchetypeRecord>;
}

/// Manufacturing factor of one criterion
///
/// `die_impact` multiplies the component's scaled quantity (die area, weight);
/// `impact` is the fixed part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub impact: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub die_impact: Option<f64>,
}

/// Criterion to factor
pub type FactorTable = BTreeMap<String, Factor>;

/// Power draw model of a component class
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionProfile {
    /// Fixed draw per unit, W
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watts: Option<f64>,
    /// Draw per GB of capacity, W
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watts_per_gb: Option<f64>,
}

/// Impact factors, electrical mixes and power profiles
pub trait FactorProvider: Send + Sync {
    /// Factors of `category`; `variant` narrows it (e.g. case type)
    fn impact_factors(&self, category: ComponentCategory, variant: Option<&str>)
        -> Option<FactorTable>;

    /// Impact per kWh by criterion; alias names resolve to their code
    fn electrical_mix(&self, location: &str) -> Option<BTreeMap<String, f64>>;

    fn consumption_profile(&self, category: ComponentCategory) -> Option<ConsumptionProfile>;

    /// Manufacture plus end-of-life factor of an IoT functional block
    fn iot_factor(
        &self,
        functional_block: &str,
        hardware_support_level: &str,
        criterion: &str,
    ) -> Option<f64>;

    /// Unit of a criterion's embodied impact
    fn unit(&self, criterion: &str) -> Option<String>;

    /// Unit of a criterion's use-phase impact
    fn electrical_unit(&self, criterion: &str) -> Option<String> {
        self.unit(criterion)
    }
}
