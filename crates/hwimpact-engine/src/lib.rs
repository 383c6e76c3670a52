//! HWImpact Engine: resolution and lifecycle impact computation
//!
//! [`ImpactEngine`] owns the stores (behind `Arc`) and the configuration.
//! A compute call resolves the caller's partial description with
//! [`Resolver`], computes every phase with [`ImpactCalculator`] and, on
//! request, attaches the verbose breakdown.

pub mod calculator;
pub mod resolver;
pub mod scalable;

pub use calculator::{ImpactCalculator, NO_UNIT};
pub use resolver::{Resolver, DEFAULT_ARCHETYPE, FALLBACK_SOURCE};
pub use scalable::{Scalable, Scale};

use hwimpact_core::{
    ArchetypeRepository, Bound, ComponentConfiguration, ComponentImpact, ComputeContext,
    DeviceConfiguration, EngineConfig, EngineError, FactorProvider, ImpactResult, PhaseImpact,
    UsageConfiguration,
};
use hwimpact_verbose::VerboseReport;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, info_span};

pub struct ImpactEngine {
    archetypes: Arc<dyn ArchetypeRepository>,
    factors: Arc<dyn FactorProvider>,
    config: EngineConfig,
}

impl ImpactEngine {
    pub fn new(
        archetypes: Arc<dyn ArchetypeRepository>,
        factors: Arc<dyn FactorProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            archetypes,
            factors,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.archetypes.as_ref(), &self.config)
    }

    pub fn calculator(&self) -> ImpactCalculator<'_> {
        ImpactCalculator::new(self.factors.as_ref(), &self.config)
    }

    // ========================================================================
    // COMPUTE
    // ========================================================================

    /// Lifecycle impact of a server.
    ///
    /// `usage` replaces the configuration's own usage when given. `criteria`
    /// of `None` means the configured defaults; an empty slice yields empty
    /// mappings. `duration_hours` defaults to one year.
    pub fn compute_server(
        &self,
        configuration: &DeviceConfiguration,
        usage: Option<&UsageConfiguration>,
        criteria: Option<&[String]>,
        duration_hours: Option<f64>,
        verbose: bool,
    ) -> Result<ImpactResult, EngineError> {
        let ctx = ComputeContext::new("server");
        let span = info_span!("compute", trace_id = %ctx.trace_id, subject = %ctx.subject);
        let _enter = span.enter();

        let criteria = self.criteria(criteria);
        let duration = self.duration(duration_hours)?;

        let mut device = configuration.clone();
        if let Some(usage) = usage {
            device.usage = usage.clone();
        }
        let resolved = self.resolver().resolve_server(&device)?;
        let result = self.assemble(
            &resolved.components,
            &resolved.usage,
            &criteria,
            duration,
            true,
            verbose,
        )?;

        info!(
            components = result.components.len(),
            criteria = criteria.len(),
            duration_hours = duration,
            "Computed server impact"
        );
        Ok(result)
    }

    /// Impact of a single component: its embodied impact plus the use phase
    /// of its own power draw, without the platform baseline
    pub fn compute_component(
        &self,
        component: &ComponentConfiguration,
        usage: Option<&UsageConfiguration>,
        criteria: Option<&[String]>,
        duration_hours: Option<f64>,
        verbose: bool,
    ) -> Result<ImpactResult, EngineError> {
        let ctx = ComputeContext::new(component.category().as_str());
        let span = info_span!("compute", trace_id = %ctx.trace_id, subject = %ctx.subject);
        let _enter = span.enter();

        let criteria = self.criteria(criteria);
        let duration = self.duration(duration_hours)?;

        let resolver = self.resolver();
        let resolved = resolver.resolve_component(component)?;
        let default_usage = UsageConfiguration::default();
        let usage = resolver.resolve_usage(usage.unwrap_or(&default_usage), None)?;
        let result = self.assemble(&[resolved], &usage, &criteria, duration, false, verbose)?;

        info!(criteria = criteria.len(), duration_hours = duration, "Computed component impact");
        Ok(result)
    }

    fn criteria(&self, criteria: Option<&[String]>) -> Vec<String> {
        match criteria {
            Some(criteria) => criteria.to_vec(),
            None => self.config.default_criteria.clone(),
        }
    }

    fn duration(&self, duration_hours: Option<f64>) -> Result<f64, EngineError> {
        match duration_hours {
            None => Ok(self.config.hours_per_year),
            Some(hours) if hours.is_finite() && hours >= 0.0 => Ok(hours),
            Some(_) => Err(EngineError::invalid(
                "USAGE",
                "duration",
                "must be a non-negative number of hours",
            )),
        }
    }

    fn assemble(
        &self,
        components: &[ComponentConfiguration],
        usage: &UsageConfiguration,
        criteria: &[String],
        duration_hours: f64,
        with_platform: bool,
        verbose: bool,
    ) -> Result<ImpactResult, EngineError> {
        let calculator = self.calculator();

        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        let mut impacts = Vec::with_capacity(components.len());
        for component in components {
            let section = component.category().section();
            let n = seen.entry(section).or_insert(0);
            *n += 1;
            impacts.push(ComponentImpact {
                label: format!("{}-{}", section, n),
                category: component.category(),
                units: component.unit_count(),
                configuration: component.clone(),
                manufacturing: calculator.manufacturing(component, criteria)?,
                power: calculator.component_power(component, Bound::Value),
            });
        }

        let embodied: Vec<_> = impacts.iter().map(|c| c.manufacturing.clone()).collect();
        let phases = PhaseImpact {
            manufacturing: calculator.sum_components(&embodied, criteria)?,
            use_phase: calculator.use_phase(components, usage, criteria, duration_hours, with_platform)?,
            end_of_life: calculator.end_of_life(criteria),
        };
        let totals = calculator.aggregate(&phases)?;
        debug!(criteria = totals.len(), "Aggregated phases");

        let mut result = ImpactResult {
            impacts: totals,
            phases,
            duration_years: duration_hours / self.config.hours_per_year,
            components: impacts,
            verbose: None,
        };
        if verbose {
            result.verbose = Some(VerboseReport::from_result(&result).to_json());
        }
        Ok(result)
    }
}
