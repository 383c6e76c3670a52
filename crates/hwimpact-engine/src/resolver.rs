//! Attribute resolution
//!
//! Fills every attribute a caller left out, in order: the component's own
//! archetype reference (`ARCHETYPE`), the device archetype section
//! (`DEFAULT`), the configured fallback constant (`COMPLETED`). Values that
//! are already set are never touched, so resolving twice is a no-op.

use hwimpact_core::{
    ArchetypeRecord, ArchetypeRepository, AssemblyConfiguration, Attr, AttributeType,
    AttributeValue, CaseConfiguration, ComponentCategory, ComponentConfiguration,
    CpuConfiguration, DeviceConfiguration, DiskConfiguration, DiskKind, EngineConfig,
    EngineError, MotherboardConfiguration, PowerSupplyConfiguration, RamConfiguration, Status,
    UsageConfiguration, ROOT_SECTION,
};
use tracing::{debug, warn};

/// Source recorded on COMPLETED attributes
pub const FALLBACK_SOURCE: &str = "fallback constant";

/// Id standing for the configured fallback archetype
pub const DEFAULT_ARCHETYPE: &str = "default";

const USAGE_SECTION: &str = "USAGE";
const DISK_SECTION: &str = "DISK";

/// One archetype section consulted for defaults
struct Layer<'r> {
    record: &'r ArchetypeRecord,
    section: &'static str,
    status: Status,
}

fn layers<'r>(
    own: Option<(&'r ArchetypeRecord, Status)>,
    device: Option<&'r ArchetypeRecord>,
    section: &'static str,
) -> Vec<Layer<'r>> {
    let own = own.map(|(record, status)| Layer {
        record,
        section: ROOT_SECTION,
        status,
    });
    let device = device.map(|record| Layer {
        record,
        section,
        status: Status::Default,
    });
    own.into_iter().chain(device).collect()
}

pub struct Resolver<'a> {
    archetypes: &'a dyn ArchetypeRepository,
    config: &'a EngineConfig,
}

impl<'a> Resolver<'a> {
    pub fn new(archetypes: &'a dyn ArchetypeRepository, config: &'a EngineConfig) -> Self {
        Self { archetypes, config }
    }

    // ========================================================================
    // ARCHETYPES
    // ========================================================================

    fn lookup(&self, category: ComponentCategory, id: &str) -> Option<ArchetypeRecord> {
        let id = match self.config.fallback_archetype(category) {
            Some(fallback) if id == DEFAULT_ARCHETYPE => fallback,
            _ => id,
        };
        self.archetypes.lookup(category, id)
    }

    /// Server archetype `id`, the configured fallback when `None`
    pub fn device_archetype(&self, id: Option<&str>) -> Result<ArchetypeRecord, EngineError> {
        let id = id.unwrap_or(DEFAULT_ARCHETYPE);
        self.lookup(ComponentCategory::Server, id)
            .ok_or_else(|| EngineError::UnresolvedArchetype {
                category: ComponentCategory::Server,
                archetype_id: id.to_string(),
            })
    }

    /// Record of a component's own archetype reference, with the component
    /// an untyped disk becomes once the table holding that record is known
    fn component_archetype(
        &self,
        component: &ComponentConfiguration,
    ) -> Result<(ComponentConfiguration, Option<ArchetypeRecord>), EngineError> {
        let Some(id) = component.archetype() else {
            return Ok((component.clone(), None));
        };
        let candidates = match component {
            ComponentConfiguration::Disk(d) if d.disk_type.is_none() => {
                vec![ComponentCategory::Ssd, ComponentCategory::Hdd]
            }
            _ => vec![component.category()],
        };
        let (category, record) = candidates
            .into_iter()
            .find_map(|category| self.lookup(category, id).map(|record| (category, record)))
            .ok_or_else(|| EngineError::UnresolvedArchetype {
                category: component.category(),
                archetype_id: id.to_string(),
            })?;

        let typed = match (component, DiskKind::of_category(category)) {
            (ComponentConfiguration::Disk(d), Some(kind)) if d.disk_type.is_none() => {
                debug!(archetype = %record.id, kind = kind.as_str(), "Disk typed by its archetype table");
                ComponentConfiguration::Disk(DiskConfiguration {
                    disk_type: Some(
                        AttributeValue::new(Status::Archetype, kind).with_source(record.id.clone()),
                    ),
                    ..d.clone()
                })
            }
            _ => component.clone(),
        };
        Ok((typed, Some(record)))
    }

    // ========================================================================
    // ATTRIBUTES
    // ========================================================================

    fn fill<T: AttributeType>(
        &self,
        slot: &Attr<T>,
        name: &str,
        layers: &[Layer<'_>],
        section: &str,
    ) -> Attr<T> {
        if let Some(value) = slot {
            return Some(value.clone());
        }

        for layer in layers {
            let Some(defaults) = layer.record.attribute(layer.section, name) else {
                continue;
            };
            let Some(raw) = &defaults.default else {
                continue;
            };
            let Some(value) = T::from_archetype(raw) else {
                warn!(archetype = %layer.record.id, attribute = name, "Unreadable archetype default");
                continue;
            };

            let plain = AttributeValue::new(layer.status, value).with_source(layer.record.id.clone());
            let bounded = plain.clone().with_bounds(
                defaults.min.as_ref().and_then(T::from_archetype),
                defaults.max.as_ref().and_then(T::from_archetype),
            );
            if bounded.bounds_consistent() {
                return Some(bounded);
            }
            warn!(
                archetype = %layer.record.id,
                attribute = name,
                "Archetype range does not bracket the default, dropping it"
            );
            return Some(plain);
        }

        let value = self
            .config
            .completion(section, name)
            .and_then(T::from_archetype)?;
        debug!(section, attribute = name, "Completed from fallback constant");
        Some(AttributeValue::new(Status::Completed, value).with_source(FALLBACK_SOURCE))
    }

    fn fill_units(&self, slot: &Attr<u32>, layers: &[Layer<'_>], section: &str) -> Attr<u32> {
        self.fill(slot, "units", layers, section)
            .or_else(|| Some(AttributeValue::new(Status::Completed, 1).with_source(FALLBACK_SOURCE)))
    }

    /// Units of a RAM or disk entry present in the device. An archetype count
    /// of zero only means the archetype instantiates none of them.
    fn fill_held_units(&self, slot: &Attr<u32>, layers: &[Layer<'_>], section: &str) -> Attr<u32> {
        match self.fill_units(slot, layers, section) {
            Some(units) if units.value == 0 && !units.is_input() => {
                debug!(section, "Archetype holds none, completing units to 1");
                Some(AttributeValue::new(Status::Completed, 1).with_source(FALLBACK_SOURCE))
            }
            units => units,
        }
    }

    // ========================================================================
    // COMPONENTS
    // ========================================================================

    /// Resolve a component on its own: its archetype reference (`ARCHETYPE`),
    /// else the category's default archetype when one exists (`DEFAULT`)
    pub fn resolve_component(
        &self,
        component: &ComponentConfiguration,
    ) -> Result<ComponentConfiguration, EngineError> {
        if component.archetype().is_some() {
            let (component, own) = self.component_archetype(component)?;
            let own = own.as_ref().map(|record| (record, Status::Archetype));
            return self.resolve_with(&component, own, None);
        }
        let fallback = self.lookup(component.category(), DEFAULT_ARCHETYPE);
        let own = fallback.as_ref().map(|record| (record, Status::Default));
        self.resolve_with(component, own, None)
    }

    fn resolve_with(
        &self,
        component: &ComponentConfiguration,
        own: Option<(&ArchetypeRecord, Status)>,
        device: Option<&ArchetypeRecord>,
    ) -> Result<ComponentConfiguration, EngineError> {
        let resolved = match component {
            ComponentConfiguration::Cpu(c) => {
                let s = ComponentCategory::Cpu.section();
                let l = layers(own, device, s);
                ComponentConfiguration::Cpu(CpuConfiguration {
                    units: self.fill_units(&c.units, &l, s),
                    core_units: self.fill(&c.core_units, "core_units", &l, s),
                    die_size_per_core: self.fill(&c.die_size_per_core, "die_size_per_core", &l, s),
                    tdp: self.fill(&c.tdp, "tdp", &l, s),
                    family: self.fill(&c.family, "family", &l, s),
                    name: self.fill(&c.name, "name", &l, s),
                    manufacturer: self.fill(&c.manufacturer, "manufacturer", &l, s),
                    archetype: c.archetype.clone(),
                })
            }
            ComponentConfiguration::Ram(c) => {
                let s = ComponentCategory::Ram.section();
                let l = layers(own, device, s);
                ComponentConfiguration::Ram(RamConfiguration {
                    units: self.fill_held_units(&c.units, &l, s),
                    capacity: self.fill(&c.capacity, "capacity", &l, s),
                    density: self.fill(&c.density, "density", &l, s),
                    manufacturer: self.fill(&c.manufacturer, "manufacturer", &l, s),
                    archetype: c.archetype.clone(),
                })
            }
            ComponentConfiguration::Disk(c) => {
                let disk_type = self.fill(&c.disk_type, "type", &layers(own, None, DISK_SECTION), DISK_SECTION);
                let kind = disk_type.as_ref().map_or(DiskKind::Ssd, |t| t.value);
                let s = kind.category().section();
                let l = layers(own, device, s);
                ComponentConfiguration::Disk(DiskConfiguration {
                    units: self.fill_held_units(&c.units, &l, s),
                    disk_type,
                    capacity: self.fill(&c.capacity, "capacity", &l, s),
                    density: self.fill(&c.density, "density", &l, s),
                    manufacturer: self.fill(&c.manufacturer, "manufacturer", &l, s),
                    archetype: c.archetype.clone(),
                })
            }
            ComponentConfiguration::PowerSupply(c) => {
                let s = ComponentCategory::PowerSupply.section();
                let l = layers(own, device, s);
                ComponentConfiguration::PowerSupply(PowerSupplyConfiguration {
                    units: self.fill_units(&c.units, &l, s),
                    unit_weight: self.fill(&c.unit_weight, "unit_weight", &l, s),
                    archetype: c.archetype.clone(),
                })
            }
            ComponentConfiguration::Case(c) => {
                let s = ComponentCategory::Case.section();
                let l = layers(own, device, s);
                ComponentConfiguration::Case(CaseConfiguration {
                    units: self.fill_units(&c.units, &l, s),
                    case_type: self.fill(&c.case_type, "case_type", &l, s),
                    archetype: c.archetype.clone(),
                })
            }
            ComponentConfiguration::Motherboard(c) => {
                let s = ComponentCategory::Motherboard.section();
                ComponentConfiguration::Motherboard(MotherboardConfiguration {
                    units: self.fill_units(&c.units, &layers(own, device, s), s),
                    archetype: c.archetype.clone(),
                })
            }
            ComponentConfiguration::Assembly(c) => {
                let s = ComponentCategory::Assembly.section();
                ComponentConfiguration::Assembly(AssemblyConfiguration {
                    units: self.fill_units(&c.units, &layers(own, device, s), s),
                    archetype: c.archetype.clone(),
                })
            }
        };
        validate(&resolved)?;
        Ok(resolved)
    }

    // ========================================================================
    // DEVICES
    // ========================================================================

    /// Resolve a server: fill every component and the usage, instantiating
    /// the components the caller left out
    pub fn resolve_server(
        &self,
        device: &DeviceConfiguration,
    ) -> Result<DeviceConfiguration, EngineError> {
        let record = self.device_archetype(device.archetype.as_deref())?;
        let components = self
            .server_components(device, &record)?
            .iter()
            .map(|component| {
                let (component, own) = self.component_archetype(component)?;
                let own = own.as_ref().map(|r| (r, Status::Archetype));
                self.resolve_with(&component, own, Some(&record))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let usage = self.resolve_usage(&device.usage, Some(&record))?;

        debug!(archetype = %record.id, components = components.len(), "Resolved server");
        Ok(DeviceConfiguration {
            archetype: device.archetype.clone(),
            components,
            usage,
        })
    }

    /// The server's component list in canonical order, unresolved
    fn server_components(
        &self,
        device: &DeviceConfiguration,
        record: &ArchetypeRecord,
    ) -> Result<Vec<ComponentConfiguration>, EngineError> {
        let mut cpu = None;
        let mut power_supply = None;
        let mut case = None;
        let mut motherboard = None;
        let mut assembly = None;
        let mut rams = Vec::new();
        let mut disks = Vec::new();

        for component in &device.components {
            let slot = match component {
                ComponentConfiguration::Ram(_) => {
                    rams.push(component.clone());
                    continue;
                }
                ComponentConfiguration::Disk(_) => {
                    disks.push(component.clone());
                    continue;
                }
                ComponentConfiguration::Cpu(_) => &mut cpu,
                ComponentConfiguration::PowerSupply(_) => &mut power_supply,
                ComponentConfiguration::Case(_) => &mut case,
                ComponentConfiguration::Motherboard(_) => &mut motherboard,
                ComponentConfiguration::Assembly(_) => &mut assembly,
            };
            if slot.is_some() {
                let section = component.category().section();
                return Err(EngineError::invalid(
                    section,
                    "units",
                    format!("a server holds at most one {} entry", section),
                ));
            }
            *slot = Some(component.clone());
        }

        if rams.is_empty() {
            rams.push(RamConfiguration::default().into());
        }
        if disks.is_empty() {
            for kind in [DiskKind::Ssd, DiskKind::Hdd] {
                let units = record
                    .default_of(kind.category().section(), "units")
                    .and_then(u32::from_archetype)
                    .unwrap_or(0);
                if units > 0 {
                    disks.push(
                        DiskConfiguration {
                            disk_type: Some(
                                AttributeValue::new(Status::Default, kind)
                                    .with_source(record.id.clone()),
                            ),
                            ..Default::default()
                        }
                        .into(),
                    );
                }
            }
        }

        let mut ordered = vec![cpu.unwrap_or_else(|| CpuConfiguration::default().into())];
        ordered.extend(rams);
        ordered.extend(disks);
        ordered.push(power_supply.unwrap_or_else(|| PowerSupplyConfiguration::default().into()));
        ordered.push(case.unwrap_or_else(|| CaseConfiguration::default().into()));
        ordered.push(motherboard.unwrap_or_else(|| MotherboardConfiguration::default().into()));
        ordered.push(assembly.unwrap_or_else(|| AssemblyConfiguration::default().into()));
        Ok(ordered)
    }

    // ========================================================================
    // USAGE
    // ========================================================================

    /// Resolve usage against its own archetype reference, then the device's
    /// `USAGE` section
    pub fn resolve_usage(
        &self,
        usage: &UsageConfiguration,
        device: Option<&ArchetypeRecord>,
    ) -> Result<UsageConfiguration, EngineError> {
        let own = match usage.archetype.as_deref() {
            Some(id) => Some(self.device_archetype(Some(id))?),
            None => None,
        };
        let mut l = Vec::new();
        if let Some(record) = own.as_ref() {
            l.push(Layer {
                record,
                section: USAGE_SECTION,
                status: Status::Archetype,
            });
        }
        if let Some(record) = device {
            l.push(Layer {
                record,
                section: USAGE_SECTION,
                status: Status::Default,
            });
        }

        let s = USAGE_SECTION;
        let usage_location = self
            .fill(&usage.usage_location, "usage_location", &l, s)
            .or_else(|| {
                Some(
                    AttributeValue::new(Status::Completed, self.config.default_location.clone())
                        .with_source(FALLBACK_SOURCE),
                )
            });
        let resolved = UsageConfiguration {
            usage_location,
            hours_life_time: self.fill(&usage.hours_life_time, "hours_life_time", &l, s),
            use_time_ratio: self.fill(&usage.use_time_ratio, "use_time_ratio", &l, s),
            time_workload: self.fill(&usage.time_workload, "time_workload", &l, s),
            workload_time: usage.workload_time.clone(),
            avg_power: self.fill(&usage.avg_power, "avg_power", &l, s),
            archetype: usage.archetype.clone(),
        };
        validate_usage(&resolved)?;
        Ok(resolved)
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

fn require<T>(attr: &Attr<T>, component: &str, name: &str) -> Result<(), EngineError> {
    match attr {
        Some(_) => Ok(()),
        None => Err(EngineError::missing(component, name)),
    }
}

/// Every present reading of `attr` satisfies `accept`, and the range brackets the value
fn check_range(
    attr: &Attr<f64>,
    component: &str,
    name: &str,
    accept: impl Fn(f64) -> bool,
    reason: &str,
) -> Result<(), EngineError> {
    let Some(attr) = attr else {
        return Ok(());
    };
    let readings = [Some(attr.value), attr.min, attr.max];
    if readings.into_iter().flatten().any(|v| !v.is_finite() || !accept(v)) {
        return Err(EngineError::invalid(component, name, reason));
    }
    if !attr.bounds_consistent() {
        return Err(EngineError::invalid(component, name, "min/max do not bracket the value"));
    }
    Ok(())
}

fn at_least_one(attr: &Attr<u32>, component: &str, name: &str) -> Result<(), EngineError> {
    match attr {
        Some(count) if count.value == 0 => {
            Err(EngineError::invalid(component, name, "must be at least 1"))
        }
        _ => Ok(()),
    }
}

fn non_negative(attr: &Attr<f64>, component: &str, name: &str) -> Result<(), EngineError> {
    check_range(attr, component, name, |v| v >= 0.0, "must not be negative")
}

fn validate(component: &ComponentConfiguration) -> Result<(), EngineError> {
    let section = component.category().section();
    match component {
        ComponentConfiguration::Cpu(c) => {
            at_least_one(&c.units, section, "units")?;
            require(&c.core_units, section, "core_units")?;
            at_least_one(&c.core_units, section, "core_units")?;
            require(&c.die_size_per_core, section, "die_size_per_core")?;
            non_negative(&c.die_size_per_core, section, "die_size_per_core")?;
            non_negative(&c.tdp, section, "tdp")
        }
        ComponentConfiguration::Ram(c) => {
            require(&c.capacity, section, "capacity")?;
            require(&c.density, section, "density")?;
            non_negative(&c.capacity, section, "capacity")?;
            check_range(&c.density, section, "density", |v| v > 0.0, "must be positive")
        }
        ComponentConfiguration::Disk(c) => {
            if c.kind() == DiskKind::Ssd {
                require(&c.capacity, section, "capacity")?;
                require(&c.density, section, "density")?;
            }
            non_negative(&c.capacity, section, "capacity")?;
            check_range(&c.density, section, "density", |v| v > 0.0, "must be positive")
        }
        ComponentConfiguration::PowerSupply(c) => {
            at_least_one(&c.units, section, "units")?;
            require(&c.unit_weight, section, "unit_weight")?;
            non_negative(&c.unit_weight, section, "unit_weight")
        }
        ComponentConfiguration::Case(c) => {
            at_least_one(&c.units, section, "units")?;
            require(&c.case_type, section, "case_type")
        }
        ComponentConfiguration::Motherboard(c) => at_least_one(&c.units, section, "units"),
        ComponentConfiguration::Assembly(c) => at_least_one(&c.units, section, "units"),
    }
}

fn validate_usage(usage: &UsageConfiguration) -> Result<(), EngineError> {
    let s = USAGE_SECTION;
    require(&usage.hours_life_time, s, "hours_life_time")?;
    require(&usage.use_time_ratio, s, "use_time_ratio")?;
    require(&usage.time_workload, s, "time_workload")?;
    check_range(&usage.hours_life_time, s, "hours_life_time", |v| v > 0.0, "must be positive")?;
    check_range(
        &usage.use_time_ratio,
        s,
        "use_time_ratio",
        |v| (0.0..=1.0).contains(&v),
        "must be within 0..=1",
    )?;
    check_range(
        &usage.time_workload,
        s,
        "time_workload",
        |v| (0.0..=100.0).contains(&v),
        "must be within 0..=100",
    )?;
    let percent = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
    if !usage
        .workload_time
        .iter()
        .all(|p| percent(p.time_percentage) && percent(p.load_percentage))
    {
        return Err(EngineError::invalid(s, "workload_time", "percentages must be within 0..=100"));
    }
    if usage.workload_time_percentage() > 100.0 {
        return Err(EngineError::invalid(s, "workload_time", "time percentages exceed 100"));
    }
    non_negative(&usage.avg_power, s, "avg_power")
}
