//! HWImpact Core: domain model, provenance and store contracts
//!
//! Every hardware or usage attribute carries a [`Status`] telling where its
//! value came from. Components are a closed sum type
//! ([`ComponentConfiguration`]); impact results are per criterion and per
//! lifecycle phase ([`PhaseImpact`]).
//!
//! Stores are reached only through the [`ArchetypeRepository`] and
//! [`FactorProvider`] traits so the engine never depends on how the reference
//! tables are backed.

pub mod archetype;
pub mod attribute;
pub mod category;
pub mod component;
pub mod config;
pub mod context;
pub mod device;
pub mod error;
pub mod impact;
pub mod ports;
pub mod telemetry;
pub mod usage;

pub use archetype::{ArchetypeRecord, ArchetypeValue, AttributeDefaults, ROOT_SECTION};
pub use attribute::{Attr, AttributeType, AttributeValue, Bound, Status};
pub use category::ComponentCategory;
pub use component::{
    AssemblyConfiguration, AttributeView, CaseConfiguration, CaseType, ComponentConfiguration,
    CpuConfiguration, DiskConfiguration, DiskKind, MotherboardConfiguration,
    PowerSupplyConfiguration, RamConfiguration,
};
pub use config::{EngineConfig, PowerModel};
pub use context::ComputeContext;
pub use device::DeviceConfiguration;
pub use error::{EngineError, LoadError};
pub use impact::{
    ComponentImpact, ImpactMap, ImpactResult, ImpactSource, ImpactValue, Phase, PhaseImpact,
};
pub use ports::{ArchetypeRepository, ConsumptionProfile, Factor, FactorProvider, FactorTable};
pub use usage::{UsageConfiguration, WorkloadTime};

/// Hours in a (non leap) year; the unit every duration is expressed in.
pub const HOURS_PER_YEAR: f64 = 8760.0;
