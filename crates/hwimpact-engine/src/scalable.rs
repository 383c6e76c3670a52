//! Per-component scaling and power models
//!
//! Every bound is read in the direction that moves the impact the same way:
//! `Bound::Min` yields the smallest quantity, so attributes an impact
//! decreases with (density) are read at the opposite bound.

use hwimpact_core::{
    AssemblyConfiguration, Attr, Bound, CaseConfiguration, ComponentCategory,
    ComponentConfiguration, ConsumptionProfile, CpuConfiguration, DiskConfiguration, DiskKind,
    EngineConfig, EngineError, Factor, MotherboardConfiguration, PowerModel,
    PowerSupplyConfiguration, RamConfiguration,
};

/// How the manufacturing factor of one unit applies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// `impact` only
    Fixed,
    /// `impact + die_impact × quantity`
    Die(f64),
    /// `impact × quantity`
    Weight(f64),
}

impl Scale {
    /// Impact of one unit
    pub fn apply(&self, factor: &Factor) -> f64 {
        match *self {
            Scale::Fixed => factor.impact,
            Scale::Die(quantity) => factor.impact + factor.die_impact.unwrap_or(0.0) * quantity,
            Scale::Weight(quantity) => factor.impact * quantity,
        }
    }
}

pub trait Scalable {
    fn category(&self) -> ComponentCategory;

    /// Unit count at `bound`, 1 while unresolved
    fn units(&self, bound: Bound) -> f64;

    /// Narrows the factor family, e.g. the case type
    fn variant(&self) -> Option<&'static str> {
        None
    }

    /// Per-unit scaling at `bound`
    fn scale_factor(&self, bound: Bound, config: &EngineConfig) -> Result<Scale, EngineError>;

    /// Draw of all units at full load, W
    fn power_draw(&self, bound: Bound, profile: Option<&ConsumptionProfile>, power: &PowerModel)
        -> f64;
}

fn units_at(units: &Attr<u32>, bound: Bound) -> f64 {
    units.as_ref().map_or(1.0, |u| u.at(bound))
}

fn required(attr: &Attr<f64>, component: &str, name: &str, bound: Bound) -> Result<f64, EngineError> {
    attr.as_ref()
        .map(|a| a.at(bound))
        .ok_or_else(|| EngineError::missing(component, name))
}

/// `capacity / density`, die area in cm²
fn die_area(
    component: &str,
    capacity: &Attr<f64>,
    density: &Attr<f64>,
    bound: Bound,
) -> Result<f64, EngineError> {
    let capacity = required(capacity, component, "capacity", bound)?;
    let density = required(density, component, "density", bound.inverse())?;
    if density <= 0.0 {
        return Err(EngineError::invalid(component, "density", "must be positive"));
    }
    Ok(capacity / density)
}

/// Draw from a consumption profile, per-GB first
fn profile_draw(profile: Option<&ConsumptionProfile>, capacity: &Attr<f64>, bound: Bound) -> Option<f64> {
    let profile = profile?;
    match (profile.watts_per_gb, capacity) {
        (Some(per_gb), Some(capacity)) => Some(per_gb * capacity.at(bound)),
        _ => profile.watts,
    }
}

impl Scalable for CpuConfiguration {
    fn category(&self) -> ComponentCategory {
        ComponentCategory::Cpu
    }

    fn units(&self, bound: Bound) -> f64 {
        units_at(&self.units, bound)
    }

    fn scale_factor(&self, bound: Bound, config: &EngineConfig) -> Result<Scale, EngineError> {
        let cores = self
            .core_units
            .as_ref()
            .map(|c| c.at(bound))
            .ok_or_else(|| EngineError::missing("CPU", "core_units"))?;
        let die_size = required(&self.die_size_per_core, "CPU", "die_size_per_core", bound)?;
        // mm² to cm²
        Ok(Scale::Die(cores * die_size / 100.0 + config.cpu_base_die_area))
    }

    fn power_draw(&self, bound: Bound, _: Option<&ConsumptionProfile>, _: &PowerModel) -> f64 {
        self.tdp.as_ref().map_or(0.0, |t| t.at(bound)) * self.units(bound)
    }
}

impl Scalable for RamConfiguration {
    fn category(&self) -> ComponentCategory {
        ComponentCategory::Ram
    }

    fn units(&self, bound: Bound) -> f64 {
        units_at(&self.units, bound)
    }

    fn scale_factor(&self, bound: Bound, _: &EngineConfig) -> Result<Scale, EngineError> {
        die_area("RAM", &self.capacity, &self.density, bound).map(Scale::Die)
    }

    fn power_draw(&self, bound: Bound, profile: Option<&ConsumptionProfile>, power: &PowerModel) -> f64 {
        profile_draw(profile, &self.capacity, bound).unwrap_or(power.ram_watts) * self.units(bound)
    }
}

impl Scalable for DiskConfiguration {
    fn category(&self) -> ComponentCategory {
        self.kind().category()
    }

    fn units(&self, bound: Bound) -> f64 {
        units_at(&self.units, bound)
    }

    fn scale_factor(&self, bound: Bound, _: &EngineConfig) -> Result<Scale, EngineError> {
        match self.kind() {
            DiskKind::Ssd => die_area("SSD", &self.capacity, &self.density, bound).map(Scale::Die),
            DiskKind::Hdd => Ok(Scale::Fixed),
        }
    }

    fn power_draw(&self, bound: Bound, profile: Option<&ConsumptionProfile>, power: &PowerModel) -> f64 {
        let fallback = match self.kind() {
            DiskKind::Ssd => power.ssd_watts,
            DiskKind::Hdd => power.hdd_watts,
        };
        profile_draw(profile, &self.capacity, bound).unwrap_or(fallback) * self.units(bound)
    }
}

impl Scalable for PowerSupplyConfiguration {
    fn category(&self) -> ComponentCategory {
        ComponentCategory::PowerSupply
    }

    fn units(&self, bound: Bound) -> f64 {
        units_at(&self.units, bound)
    }

    fn scale_factor(&self, bound: Bound, _: &EngineConfig) -> Result<Scale, EngineError> {
        required(&self.unit_weight, "POWER_SUPPLY", "unit_weight", bound).map(Scale::Weight)
    }

    fn power_draw(&self, _: Bound, _: Option<&ConsumptionProfile>, _: &PowerModel) -> f64 {
        0.0
    }
}

impl Scalable for CaseConfiguration {
    fn category(&self) -> ComponentCategory {
        ComponentCategory::Case
    }

    fn units(&self, bound: Bound) -> f64 {
        units_at(&self.units, bound)
    }

    fn variant(&self) -> Option<&'static str> {
        self.case_type.as_ref().map(|c| c.value.as_str())
    }

    fn scale_factor(&self, _: Bound, _: &EngineConfig) -> Result<Scale, EngineError> {
        match self.case_type {
            Some(_) => Ok(Scale::Fixed),
            None => Err(EngineError::missing("CASE", "case_type")),
        }
    }

    fn power_draw(&self, _: Bound, _: Option<&ConsumptionProfile>, _: &PowerModel) -> f64 {
        0.0
    }
}

macro_rules! fixed_scalable {
    ($($ty:ty => $category:ident),* $(,)?) => {
        $(
            impl Scalable for $ty {
                fn category(&self) -> ComponentCategory {
                    ComponentCategory::$category
                }

                fn units(&self, bound: Bound) -> f64 {
                    units_at(&self.units, bound)
                }

                fn scale_factor(&self, _: Bound, _: &EngineConfig) -> Result<Scale, EngineError> {
                    Ok(Scale::Fixed)
                }

                fn power_draw(&self, _: Bound, _: Option<&ConsumptionProfile>, _: &PowerModel) -> f64 {
                    0.0
                }
            }
        )*
    };
}

fixed_scalable! {
    MotherboardConfiguration => Motherboard,
    AssemblyConfiguration => Assembly,
}

/// The component behind a [`ComponentConfiguration`]
pub fn scalable(component: &ComponentConfiguration) -> &dyn Scalable {
    match component {
        ComponentConfiguration::Cpu(c) => c,
        ComponentConfiguration::Ram(c) => c,
        ComponentConfiguration::Disk(c) => c,
        ComponentConfiguration::PowerSupply(c) => c,
        ComponentConfiguration::Case(c) => c,
        ComponentConfiguration::Motherboard(c) => c,
        ComponentConfiguration::Assembly(c) => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hwimpact_core::{AttributeValue, CaseType, Status};

    fn factor(impact: f64, die_impact: Option<f64>) -> Factor {
        Factor { impact, die_impact }
    }

    #[test]
    fn test_cpu_die_area() {
        let cpu = CpuConfiguration::new().with_core_units(24).with_die_size_per_core(24.5);
        let scale = cpu.scale_factor(Bound::Value, &EngineConfig::default()).unwrap();
        assert_eq!(scale, Scale::Die(24.0 * 24.5 / 100.0 + 0.491));

        // 24 cores of 24.5 mm² on the gwp factor
        let per_unit = scale.apply(&factor(9.14, Some(1.97)));
        assert!((per_unit - 21.691).abs() < 1e-3);
    }

    #[test]
    fn test_ram_density_reads_inverse_bound() {
        let mut ram = RamConfiguration::new().with_capacity(32.0);
        ram.density = Some(AttributeValue::new(Status::Default, 1.79).with_bounds(Some(1.0), Some(2.0)));

        let Scale::Die(low) = ram.scale_factor(Bound::Min, &EngineConfig::default()).unwrap() else {
            panic!("expected die scaling");
        };
        let Scale::Die(high) = ram.scale_factor(Bound::Max, &EngineConfig::default()).unwrap() else {
            panic!("expected die scaling");
        };
        assert_eq!(low, 32.0 / 2.0);
        assert_eq!(high, 32.0 / 1.0);
    }

    #[test]
    fn test_missing_required_attribute() {
        let err = CpuConfiguration::new()
            .with_core_units(4)
            .scale_factor(Bound::Value, &EngineConfig::default())
            .unwrap_err();
        assert_eq!(err, EngineError::missing("CPU", "die_size_per_core"));

        let err = RamConfiguration::new()
            .with_capacity(8.0)
            .with_density(0.0)
            .scale_factor(Bound::Value, &EngineConfig::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_power_supply_weight_is_multiplicative() {
        let psu = PowerSupplyConfiguration::new().with_unit_weight(2.99);
        let scale = psu.scale_factor(Bound::Value, &EngineConfig::default()).unwrap();
        assert!((scale.apply(&factor(24.3, None)) - 72.657).abs() < 1e-9);
    }

    #[test]
    fn test_case_variant() {
        let case = CaseConfiguration::new().with_case_type(CaseType::Blade);
        assert_eq!(case.variant(), Some("blade"));
        assert!(CaseConfiguration::new()
            .scale_factor(Bound::Value, &EngineConfig::default())
            .is_err());
    }

    #[test]
    fn test_power_models() {
        let power = PowerModel::default();
        let cpu = CpuConfiguration::new().with_units(2).with_tdp(150.0);
        assert_eq!(cpu.power_draw(Bound::Value, None, &power), 300.0);

        let ram = RamConfiguration::new().with_units(4).with_capacity(32.0);
        assert_eq!(ram.power_draw(Bound::Value, None, &power), 20.0);
        let profile = ConsumptionProfile {
            watts: None,
            watts_per_gb: Some(0.25),
        };
        assert_eq!(ram.power_draw(Bound::Value, Some(&profile), &power), 32.0);

        let hdd = DiskConfiguration::hdd().with_units(3);
        assert_eq!(hdd.power_draw(Bound::Value, None, &power), 30.0);
        assert_eq!(
            PowerSupplyConfiguration::new().power_draw(Bound::Max, None, &power),
            0.0
        );
    }
}
