//! Factor store with atomic snapshot reload

use crate::document::FactorDocument;
use chrono::{DateTime, Utc};
use hwimpact_core::{ComponentCategory, ConsumptionProfile, FactorProvider, FactorTable, LoadError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// One immutable version of the factor tables
#[derive(Debug, Clone)]
pub struct FactorSnapshot {
    pub document: FactorDocument,
    /// blake3 hex digest of the source text
    pub digest: String,
    pub loaded_at: DateTime<Utc>,
}

impl FactorSnapshot {
    pub fn parse(yaml: &str) -> Result<Self, LoadError> {
        Ok(Self {
            document: FactorDocument::from_yaml(yaml)?,
            digest: blake3::hash(yaml.as_bytes()).to_hex().to_string(),
            loaded_at: Utc::now(),
        })
    }
}

#[derive(Debug)]
pub struct FactorStore {
    /// Backing file; `None` for stores built from a string
    path: Option<PathBuf>,
    snapshot: RwLock<Arc<FactorSnapshot>>,
}

impl FactorStore {
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        let snapshot = FactorSnapshot::parse(yaml)?;
        info!(digest = %snapshot.digest, "Loaded factor tables");
        Ok(Self {
            path: None,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let snapshot = FactorSnapshot::parse(&read(&path)?)?;
        info!(path = %path.display(), digest = %snapshot.digest, "Loaded factor tables");
        Ok(Self {
            path: Some(path),
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Current snapshot; stays valid across reloads
    pub fn snapshot(&self) -> Arc<FactorSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-read the backing file and swap it in whole.
    ///
    /// Returns whether the content changed. On error the previous snapshot
    /// stays in place.
    pub fn reload(&self) -> Result<bool, LoadError> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        let yaml = read(path)?;
        let next = match FactorSnapshot::parse(&yaml) {
            Ok(next) => next,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Factor reload rejected");
                return Err(e);
            }
        };

        let mut current = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let changed = current.digest != next.digest;
        if changed {
            info!(
                path = %path.display(),
                from = %current.digest,
                to = %next.digest,
                "Reloaded factor tables"
            );
        }
        *current = Arc::new(next);
        Ok(changed)
    }

    /// Display name to location code
    pub fn available_countries(&self) -> BTreeMap<String, String> {
        self.snapshot().document.electricity.available_countries.clone()
    }

    /// Impact of one kWh at `location` for `criterion`
    pub fn electrical_factor(&self, location: &str, criterion: &str) -> Option<f64> {
        self.snapshot()
            .document
            .mix(location)
            .and_then(|mix| mix.get(criterion).copied())
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|e| LoadError::io(path.display().to_string(), e))
}

fn family_key(category: ComponentCategory, variant: Option<&str>) -> String {
    match variant {
        Some(variant) => format!("{}_{}", category.as_str(), variant),
        None => category.as_str().to_string(),
    }
}

impl FactorProvider for FactorStore {
    fn impact_factors(
        &self,
        category: ComponentCategory,
        variant: Option<&str>,
    ) -> Option<FactorTable> {
        self.snapshot()
            .document
            .components
            .get(&family_key(category, variant))
            .cloned()
    }

    fn electrical_mix(&self, location: &str) -> Option<BTreeMap<String, f64>> {
        self.snapshot().document.mix(location).cloned()
    }

    fn consumption_profile(&self, category: ComponentCategory) -> Option<ConsumptionProfile> {
        self.snapshot()
            .document
            .consumption_profiles
            .get(category.as_str())
            .copied()
    }

    fn iot_factor(
        &self,
        functional_block: &str,
        hardware_support_level: &str,
        criterion: &str,
    ) -> Option<f64> {
        let snapshot = self.snapshot();
        let level = snapshot
            .document
            .iot
            .get(functional_block)?
            .get(hardware_support_level)?;
        let manufacture = level.manufacture.get(criterion)?;
        let eol = level.eol.get(criterion)?;
        Some(manufacture + eol)
    }

    fn unit(&self, criterion: &str) -> Option<String> {
        self.snapshot().document.units.get(criterion).cloned()
    }

    fn electrical_unit(&self, criterion: &str) -> Option<String> {
        let snapshot = self.snapshot();
        snapshot
            .document
            .electricity
            .units
            .get(criterion)
            .or_else(|| snapshot.document.units.get(criterion))
            .cloned()
    }
}
