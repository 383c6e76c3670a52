//! Attribute values with provenance
//!
//! An [`AttributeValue`] is a datum plus the tag recording who supplied it.
//! The tag is assigned once and never re-derived.

use crate::archetype::ArchetypeValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Where an attribute value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Supplied by the caller
    Input,
    /// Default of the device archetype
    Default,
    /// Global fallback constant
    Completed,
    /// Default of a component-level archetype reference
    Archetype,
}

impl Status {
    pub fn is_input(&self) -> bool {
        matches!(self, Status::Input)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::Input => write!(f, "INPUT"),
            Status::Default => write!(f, "DEFAULT"),
            Status::Completed => write!(f, "COMPLETED"),
            Status::Archetype => write!(f, "ARCHETYPE"),
        }
    }
}

/// Which end of an attribute's range to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Value,
    Min,
    Max,
}

impl Bound {
    pub const ALL: [Bound; 3] = [Bound::Value, Bound::Min, Bound::Max];

    /// The opposite end, for quantities an impact decreases with
    pub fn inverse(self) -> Bound {
        match self {
            Bound::Value => Bound::Value,
            Bound::Min => Bound::Max,
            Bound::Max => Bound::Min,
        }
    }
}

/// A typed datum tagged with its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue<T> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub value: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
}

/// An attribute slot: `None` until something supplies a value
pub type Attr<T> = Option<AttributeValue<T>>;

impl<T> AttributeValue<T> {
    pub fn new(status: Status, value: T) -> Self {
        Self {
            status,
            source: None,
            value,
            min: None,
            max: None,
        }
    }

    /// A caller-supplied value
    pub fn input(value: T) -> Self {
        Self::new(Status::Input, value)
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_bounds(mut self, min: Option<T>, max: Option<T>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn is_input(&self) -> bool {
        self.status.is_input()
    }
}

impl<T: PartialOrd> AttributeValue<T> {
    /// `min <= value <= max` for whichever bounds are present
    pub fn bounds_consistent(&self) -> bool {
        let low_ok = self.min.as_ref().map_or(true, |min| *min <= self.value);
        let high_ok = self.max.as_ref().map_or(true, |max| self.value <= *max);
        low_ok && high_ok
    }
}

impl<T: Copy + Into<f64>> AttributeValue<T> {
    /// Numeric reading at `bound`; a missing bound collapses onto the value
    pub fn at(&self, bound: Bound) -> f64 {
        let picked = match bound {
            Bound::Value => self.value,
            Bound::Min => self.min.unwrap_or(self.value),
            Bound::Max => self.max.unwrap_or(self.value),
        };
        picked.into()
    }
}

/// Types an attribute can hold
///
/// Conversion from an archetype cell is lenient: a cell that cannot be read
/// as `Self` yields `None` and the attribute falls through to the next source.
pub trait AttributeType: Clone + PartialOrd + Serialize {
    fn from_archetype(value: &ArchetypeValue) -> Option<Self>;

    fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl AttributeType for f64 {
    fn from_archetype(value: &ArchetypeValue) -> Option<Self> {
        match value {
            ArchetypeValue::Number(n) => Some(*n),
            ArchetypeValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl AttributeType for u32 {
    fn from_archetype(value: &ArchetypeValue) -> Option<Self> {
        let n = f64::from_archetype(value)?;
        if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
            Some(n as u32)
        } else {
            None
        }
    }
}

impl AttributeType for String {
    fn from_archetype(value: &ArchetypeValue) -> Option<Self> {
        match value {
            ArchetypeValue::Text(s) => Some(s.clone()),
            ArchetypeValue::Number(n) => Some(n.to_string()),
        }
    }
}
