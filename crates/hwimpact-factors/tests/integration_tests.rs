//! Integration tests against the reference factor document and reload.

use hwimpact_core::{ComponentCategory, FactorProvider};
use hwimpact_factors::FactorStore;
use std::io::Write;
use std::sync::Arc;

const FACTORS_PATH: &str = "data/factors.yml";

fn factors_path() -> String {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = std::path::Path::new(&manifest_dir).parent().unwrap().parent().unwrap();
    workspace_root.join(FACTORS_PATH).to_string_lossy().to_string()
}

#[test]
fn test_reference_document_loads() {
    let store = FactorStore::load(factors_path()).unwrap();

    let cpu = store.impact_factors(ComponentCategory::Cpu, None).unwrap();
    assert_eq!(cpu["gwp"].impact, 9.14);
    assert_eq!(cpu["gwp"].die_impact, Some(1.97));

    for case_type in ["rack", "blade", "tower"] {
        assert!(
            store.impact_factors(ComponentCategory::Case, Some(case_type)).is_some(),
            "missing case factors for {}",
            case_type
        );
    }

    assert_eq!(store.electrical_factor("FRA", "gwp"), Some(0.098));
    assert_eq!(store.electrical_factor("France", "gwp"), Some(0.098));
    assert_eq!(store.unit("pe").as_deref(), Some("MJ"));
    assert!(store.iot_factor("connectivity", "hsl_1", "gwp").is_none());
}

#[test]
fn test_reload_swaps_snapshot() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "electricity:\n  mixes:\n    EEE: {{ gwp: 0.38 }}\n").unwrap();
    file.flush().unwrap();

    let store = FactorStore::load(file.path()).unwrap();
    let before = store.snapshot();
    assert_eq!(store.electrical_factor("EEE", "gwp"), Some(0.38));

    std::fs::write(file.path(), "electricity:\n  mixes:\n    EEE: { gwp: 0.25 }\n").unwrap();
    assert!(store.reload().unwrap());
    assert_eq!(store.electrical_factor("EEE", "gwp"), Some(0.25));

    // Readers holding the old snapshot keep seeing it whole
    assert_eq!(before.document.mix("EEE").unwrap()["gwp"], 0.38);
    assert_ne!(before.digest, store.snapshot().digest);

    assert!(!store.reload().unwrap());
}

#[test]
fn test_failed_reload_keeps_previous_snapshot() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "units: { gwp: kgCO2eq }\n").unwrap();
    let store = FactorStore::load(file.path()).unwrap();
    let digest = store.snapshot().digest.clone();

    std::fs::write(file.path(), "units: [broken").unwrap();
    assert!(store.reload().is_err());
    assert_eq!(store.snapshot().digest, digest);
    assert_eq!(store.unit("gwp").as_deref(), Some("kgCO2eq"));
}

/// Replace a file by rename so a concurrent reload never reads it half written
fn replace(path: &std::path::Path, content: &str) {
    let staging = path.with_extension("staging");
    std::fs::write(&staging, content).unwrap();
    std::fs::rename(&staging, path).unwrap();
}

#[test]
fn test_concurrent_reads_during_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("factors.yml");
    replace(&path, "electricity:\n  mixes:\n    EEE: { gwp: 1.0, pe: 1.0 }\n");
    let store = Arc::new(FactorStore::load(&path).unwrap());

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let mix = store.electrical_mix("EEE").unwrap();
                    // Both criteria always come from the same version
                    assert_eq!(mix["gwp"], mix["pe"]);
                }
            })
        })
        .collect();

    for value in [2.0, 3.0, 4.0] {
        replace(
            &path,
            &format!("electricity:\n  mixes:\n    EEE: {{ gwp: {v}, pe: {v} }}\n", v = value),
        );
        store.reload().unwrap();
    }

    for reader in readers {
        reader.join().unwrap();
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let err = FactorStore::load("/nonexistent/factors.yml").unwrap_err();
    assert!(err.to_string().starts_with("IO/"));
}
