//! Integration tests against the reference archetype tables.

use hwimpact_archetypes::ArchetypeStore;
use hwimpact_core::{ArchetypeRepository, ArchetypeValue, Bound, ComponentCategory, EngineConfig};

const ARCHETYPES_DIR: &str = "data/archetypes";

fn archetypes_dir() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(ARCHETYPES_DIR)
}

fn store() -> ArchetypeStore {
    ArchetypeStore::from_dir(archetypes_dir())
        .unwrap()
        .with_config(&EngineConfig::default())
}

#[test]
fn test_dell_r740() {
    let record = store().lookup(ComponentCategory::Server, "dellR740").unwrap();

    assert_eq!(record.default_of("CPU", "core_units"), Some(&ArchetypeValue::Number(24.0)));
    assert_eq!(record.default_of("CPU", "die_size_per_core"), Some(&ArchetypeValue::Number(24.5)));
    assert_eq!(record.default_of("RAM", "units"), Some(&ArchetypeValue::Number(12.0)));
    assert_eq!(record.default_of("SSD", "density"), Some(&ArchetypeValue::Number(50.6)));
    assert_eq!(record.default_of("CASE", "case_type"), Some(&ArchetypeValue::from("rack")));
    assert_eq!(record.default_of("", "manufacturer"), Some(&ArchetypeValue::from("Dell")));

    let weight = record.attribute("POWER_SUPPLY", "unit_weight").unwrap();
    assert_eq!(weight.get(Bound::Min), Some(&ArchetypeValue::Number(1.0)));
    assert_eq!(weight.get(Bound::Max), Some(&ArchetypeValue::Number(5.0)));

    // Declared but empty columns are present without values
    let tdp = record.attribute("CPU", "tdp").unwrap();
    assert!(tdp.is_empty());
}

#[test]
fn test_default_server_is_medium_platform() {
    let record = store().lookup(ComponentCategory::Server, "default").unwrap();
    assert_eq!(record.id, "platform_compute_medium");
}

#[test]
fn test_component_tables() {
    let store = store();
    let cpu = store.lookup(ComponentCategory::Cpu, "intel_xeon_gold_6134").unwrap();
    assert_eq!(cpu.default_of("", "core_units"), Some(&ArchetypeValue::Number(8.0)));
    assert_eq!(cpu.default_of("", "manufacturer"), Some(&ArchetypeValue::from("Intel")));

    assert!(store.ids(ComponentCategory::Ssd).contains(&"generic_ssd".to_string()));
    assert!(store.ids(ComponentCategory::PowerSupply).is_empty());
}

#[test]
fn test_unknown_archetype_is_none() {
    let store = store();
    assert!(store.lookup(ComponentCategory::Server, "nonexistent_id").is_none());
    assert!(store.lookup(ComponentCategory::Motherboard, "default").is_none());
}
