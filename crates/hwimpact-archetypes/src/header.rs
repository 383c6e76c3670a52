//! Column header parsing

use hwimpact_core::{Bound, ROOT_SECTION};

/// Where a column's cells go inside an archetype record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnKey {
    pub section: String,
    pub attribute: String,
    pub bound: Bound,
}

impl ColumnKey {
    /// Parse `[SECTION.]attribute[.default|.min|.max]`
    ///
    /// Returns `None` for headers with empty segments or more than one
    /// section qualifier.
    pub fn parse(header: &str) -> Option<ColumnKey> {
        let mut parts: Vec<&str> = header.trim().split('.').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return None;
        }

        let bound = match parts.last().copied() {
            Some("default") => Some(Bound::Value),
            Some("min") => Some(Bound::Min),
            Some("max") => Some(Bound::Max),
            _ => None,
        };
        if bound.is_some() {
            parts.pop();
        }

        let (section, attribute) = match parts.as_slice() {
            [attribute] => (ROOT_SECTION, *attribute),
            [section, attribute] => (*section, *attribute),
            _ => return None,
        };

        Some(ColumnKey {
            section: section.trim().to_string(),
            attribute: attribute.trim().to_string(),
            bound: bound.unwrap_or(Bound::Value),
        })
    }
}
