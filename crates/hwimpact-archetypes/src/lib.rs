//! HWImpact Archetypes: tabular archetype store
//!
//! One CSV table per category (`server.csv`, `cpu.csv`, ...). Each row is one
//! archetype id; each other column is `[SECTION.]attribute[.default|.min|.max]`.
//! Parsing is lenient: malformed headers and empty cells are skipped, never
//! fatal.

pub mod header;
pub mod store;

pub use header::ColumnKey;
pub use store::ArchetypeStore;
