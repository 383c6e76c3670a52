//! HWImpact Factors: reference factor tables
//!
//! A single YAML document holds manufacturing factors per component family,
//! electrical mixes per location, power consumption profiles and IoT block
//! factors. [`FactorStore`] serves it as an immutable snapshot that
//! [`FactorStore::reload`] swaps atomically.

pub mod document;
pub mod store;

pub use document::{Electricity, FactorDocument, IotLevel};
pub use store::{FactorSnapshot, FactorStore};
