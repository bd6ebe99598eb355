//! Common test utilities and fixture helpers.
//!
//! Integration tests load the shared JSON catalog from `docs/fixtures` and
//! build rockets against it through these helpers.

use std::path::PathBuf;
use std::sync::Arc;

use rocketyard_lib::{Catalog, RocketAssembler};

/// Path to fixtures directory used by tests.
#[allow(dead_code)]
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Path to the well-formed fixture catalog.
#[allow(dead_code)]
pub fn catalog_path() -> PathBuf {
    fixtures_dir().join("catalog.json")
}

#[allow(dead_code)]
pub fn load_catalog() -> Catalog {
    Catalog::from_path(&catalog_path()).expect("load fixture catalog.json")
}

/// Empty assembler over the fixture catalog.
#[allow(dead_code)]
pub fn assembler() -> RocketAssembler {
    RocketAssembler::new(Arc::new(load_catalog()))
}

/// Pod on top of a tank on top of an engine, connected with stack nodes.
#[allow(dead_code)]
pub fn stacked_rocket() -> RocketAssembler {
    let mut rocket = assembler();
    rocket
        .add_instance(Some("pod"), "mk1-pod", [0.0, 2.1, 0.0], [0.0; 3])
        .expect("add pod");
    rocket
        .add_instance(Some("tank"), "fl-t400", [0.0, 0.7, 0.0], [0.0; 3])
        .expect("add tank");
    rocket
        .add_instance(Some("engine"), "lv-t45", [0.0, -0.9, 0.0], [0.0; 3])
        .expect("add engine");
    rocket.connect_stack("tank", "pod").expect("tank under pod");
    rocket.connect_stack("engine", "tank").expect("engine under tank");
    rocket
}

/// Absolute-tolerance float comparison with a readable failure message.
#[allow(dead_code)]
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}
