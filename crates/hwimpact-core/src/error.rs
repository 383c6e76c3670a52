//! Unified Error Model
use crate::category::ComponentCategory;
use thiserror::Error;

/// Failures surfaced by resolution and computation.
///
/// All of them are deterministic configuration problems, so none is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("CONFIG/{component}.{attribute}: {reason}")]
    InvalidConfiguration {
        component: String,
        attribute: String,
        reason: String,
    },

    #[error("LOCATION/no electrical mix for '{location}'")]
    UnresolvedLocation { location: String },

    #[error("ARCHETYPE/no {category} archetype '{archetype_id}'")]
    UnresolvedArchetype {
        category: ComponentCategory,
        archetype_id: String,
    },

    #[error("UNITS/{criterion}: '{left}' does not match '{right}'")]
    InconsistentUnits {
        criterion: String,
        left: String,
        right: String,
    },
}

impl EngineError {
    pub fn invalid(
        component: impl Into<String>,
        attribute: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidConfiguration {
            component: component.into(),
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// A required attribute is absent after every fallback was tried
    pub fn missing(component: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::invalid(component, attribute, "required attribute has no value")
    }
}

/// Failures while loading reference tables from their backing source.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO/{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV/{0}")]
    Csv(String),

    #[error("YAML/{0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl LoadError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.into(),
            source,
        }
    }
}
