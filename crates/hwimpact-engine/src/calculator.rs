//! Impact calculation over resolved configurations
//!
//! Every value is computed at the three bounds; the `min`/`max` of an
//! [`ImpactValue`] are the readings at `Bound::Min`/`Bound::Max`.

use crate::scalable::scalable;
use hwimpact_core::{
    Bound, ComponentConfiguration, EngineConfig, EngineError, FactorProvider, ImpactMap,
    ImpactSource, ImpactValue, Phase, PhaseImpact, UsageConfiguration,
};
use tracing::debug;

/// Unit reported for criteria no table knows
pub const NO_UNIT: &str = "none";

pub struct ImpactCalculator<'a> {
    factors: &'a dyn FactorProvider,
    config: &'a EngineConfig,
}

/// `(value, min, max)` from readings at `Bound::ALL`
fn spread(readings: [f64; 3]) -> (f64, f64, f64) {
    let [value, low, high] = readings;
    (value, low.min(value), high.max(value))
}

fn merge(
    into: &mut ImpactMap,
    criterion: &str,
    value: &ImpactValue,
    source: ImpactSource,
) -> Result<(), EngineError> {
    let merged = match into.get(criterion) {
        Some(current) => current.combine(criterion, value, source)?,
        None => ImpactValue {
            source,
            ..value.clone()
        },
    };
    into.insert(criterion.to_string(), merged);
    Ok(())
}

impl<'a> ImpactCalculator<'a> {
    pub fn new(factors: &'a dyn FactorProvider, config: &'a EngineConfig) -> Self {
        Self { factors, config }
    }

    fn unit(&self, criterion: &str) -> String {
        self.factors
            .unit(criterion)
            .unwrap_or_else(|| NO_UNIT.to_string())
    }

    fn electrical_unit(&self, criterion: &str) -> String {
        self.factors
            .electrical_unit(criterion)
            .unwrap_or_else(|| NO_UNIT.to_string())
    }

    fn zeros(&self, criteria: &[String], source: ImpactSource) -> ImpactMap {
        criteria
            .iter()
            .map(|c| (c.clone(), ImpactValue::zero(self.unit(c), source)))
            .collect()
    }

    // ========================================================================
    // MANUFACTURING
    // ========================================================================

    /// Embodied impact of every unit of `component`
    pub fn manufacturing(
        &self,
        component: &ComponentConfiguration,
        criteria: &[String],
    ) -> Result<ImpactMap, EngineError> {
        let item = scalable(component);
        let factors = self.factors.impact_factors(item.category(), item.variant());
        if factors.is_none() {
            debug!(category = %item.category(), variant = ?item.variant(), "No impact factors");
        }

        let mut scales = Vec::with_capacity(Bound::ALL.len());
        for bound in Bound::ALL {
            scales.push((item.units(bound), item.scale_factor(bound, self.config)?));
        }

        let mut impacts = ImpactMap::new();
        for criterion in criteria {
            let unit = self.unit(criterion);
            let value = match factors.as_ref().and_then(|f| f.get(criterion)) {
                Some(factor) => {
                    let readings = [0, 1, 2].map(|i| scales[i].0 * scales[i].1.apply(factor));
                    let (value, min, max) = spread(readings);
                    ImpactValue::calculated(value, min, max, unit)
                }
                None => ImpactValue::zero(unit, ImpactSource::Calculated),
            };
            impacts.insert(criterion.clone(), value);
        }
        Ok(impacts)
    }

    /// Sum per-component maps; every requested criterion is present even
    /// when there is nothing to sum
    pub fn sum_components(
        &self,
        maps: &[ImpactMap],
        criteria: &[String],
    ) -> Result<ImpactMap, EngineError> {
        let mut total = self.zeros(criteria, ImpactSource::Calculated);
        for map in maps {
            for (criterion, value) in map {
                merge(&mut total, criterion, value, ImpactSource::Calculated)?;
            }
        }
        Ok(total)
    }

    // ========================================================================
    // USE
    // ========================================================================

    /// Full-load draw of all units of `component`, W
    pub fn component_power(&self, component: &ComponentConfiguration, bound: Bound) -> f64 {
        let item = scalable(component);
        let profile = self.factors.consumption_profile(item.category());
        item.power_draw(bound, profile.as_ref(), &self.config.power)
    }

    /// Draw of the device at `bound`, W. `avg_power` wins over the model.
    pub fn power(
        &self,
        components: &[ComponentConfiguration],
        usage: &UsageConfiguration,
        bound: Bound,
        with_platform: bool,
    ) -> f64 {
        if let Some(avg_power) = &usage.avg_power {
            return avg_power.at(bound);
        }
        let draw: f64 = components
            .iter()
            .map(|c| self.component_power(c, bound))
            .sum();
        if with_platform {
            draw + self.config.power.platform_baseline
        } else {
            draw
        }
    }

    /// Energy drawn over `duration_hours` at `bound`, kWh
    pub fn energy(
        &self,
        components: &[ComponentConfiguration],
        usage: &UsageConfiguration,
        duration_hours: f64,
        bound: Bound,
        with_platform: bool,
    ) -> f64 {
        let power = self.power(components, usage, bound, with_platform);
        let ratio = usage.use_time_ratio.as_ref().map_or(1.0, |r| r.at(bound));
        // A measured average already reflects the workload
        let load = match (&usage.avg_power, usage.weighted_workload()) {
            (Some(_), _) => 1.0,
            (None, Some(percent)) => percent / 100.0,
            (None, None) => usage.time_workload.as_ref().map_or(100.0, |w| w.at(bound)) / 100.0,
        };
        power / 1000.0 * duration_hours * ratio * load
    }

    /// Use-phase impact: energy times the electrical mix of the usage location
    pub fn use_phase(
        &self,
        components: &[ComponentConfiguration],
        usage: &UsageConfiguration,
        criteria: &[String],
        duration_hours: f64,
        with_platform: bool,
    ) -> Result<ImpactMap, EngineError> {
        if criteria.is_empty() {
            return Ok(ImpactMap::new());
        }
        let location = usage
            .location()
            .unwrap_or(self.config.default_location.as_str());
        let mix = self
            .factors
            .electrical_mix(location)
            .ok_or_else(|| EngineError::UnresolvedLocation {
                location: location.to_string(),
            })?;

        let energy = Bound::ALL
            .map(|bound| self.energy(components, usage, duration_hours, bound, with_platform));
        debug!(location, kwh = energy[0], "Use-phase energy");

        Ok(criteria
            .iter()
            .map(|criterion| {
                let factor = mix.get(criterion).copied().unwrap_or(0.0);
                let (value, min, max) = spread(energy.map(|kwh| kwh * factor));
                let impact =
                    ImpactValue::calculated(value, min, max, self.electrical_unit(criterion));
                (criterion.clone(), impact)
            })
            .collect())
    }

    // ========================================================================
    // END OF LIFE AND TOTALS
    // ========================================================================

    pub fn end_of_life(&self, criteria: &[String]) -> ImpactMap {
        self.zeros(criteria, ImpactSource::NotImplemented)
    }

    /// Lifecycle total: the union of criteria across phases
    pub fn aggregate(&self, phases: &PhaseImpact) -> Result<ImpactMap, EngineError> {
        let mut total = ImpactMap::new();
        for phase in Phase::ALL {
            for (criterion, value) in phases.get(phase) {
                merge(&mut total, criterion, value, ImpactSource::Aggregated)?;
            }
        }
        Ok(total)
    }
}
