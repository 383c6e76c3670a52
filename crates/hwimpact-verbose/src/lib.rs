//! HWImpact Verbose: auditable breakdown of an impact result
//!
//! [`VerboseReport`] is a pure projection of an [`ImpactResult`]: one entry
//! per component instance (`CPU-1`, `RAM-1`, ...) with every attribute's
//! value and provenance plus the instance's embodied impacts, and a `USAGE`
//! entry carrying only the use-phase impacts.

pub mod render;
pub mod report;

pub use report::{ComponentEntry, ImpactSummary, VerboseReport, USAGE_KEY};
