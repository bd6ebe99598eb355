mod common;

use common::{assert_close, load_catalog};
use rocketyard_lib::physics::{calculate_delta_v, calculate_twr, local_gravity, EngineStats, MassProfile};
use rocketyard_lib::{AccuracyLevel, PartCategory, PhysicsConfig};

fn tank(dry: f64, wet: f64) -> MassProfile {
    MassProfile::new(PartCategory::FuelTanks, dry, wet)
}

#[test]
fn zero_engines_yield_exactly_zero() {
    let config = PhysicsConfig::default();
    let parts = [tank(1_000.0, 5_000.0)];
    for altitude in [0.0, 35_000.0, 70_000.0, 250_000.0] {
        assert_eq!(calculate_delta_v(&parts, &[], 5_000.0, altitude, &config), 0.0);
        assert_eq!(calculate_twr(&[], 5_000.0, altitude, &config), 0.0);
    }
}

#[test]
fn delta_v_ignores_list_order() {
    let config = PhysicsConfig::default();
    let engines = [
        EngineStats::new(215_000.0, 320.0, 250.0),
        EngineStats::new(60_000.0, 345.0, 85.0),
        EngineStats::new(1_500_000.0, 310.0, 285.0),
    ];
    let parts = [
        tank(500.0, 4_500.0),
        MassProfile::new(PartCategory::Engines, 1_500.0, 1_500.0),
        MassProfile::new(PartCategory::Command, 840.0, 840.0),
        tank(250.0, 2_250.0),
    ];
    let total = 9_090.0;

    for altitude in [0.0, 20_000.0, 80_000.0] {
        let forward = calculate_delta_v(&parts, &engines, total, altitude, &config);

        let mut reversed_engines = engines;
        reversed_engines.reverse();
        let mut rotated_parts = parts;
        rotated_parts.rotate_left(1);
        let shuffled = calculate_delta_v(&rotated_parts, &reversed_engines, total, altitude, &config);

        assert_close(forward, shuffled, 1e-9);
    }
}

#[test]
fn reference_engine_in_vacuum() {
    let config = PhysicsConfig::default();
    let engine = EngineStats::new(215_000.0, 320.0, 250.0);
    let expected = 320.0 * 9.81 * (5_000.0_f64 / 1_000.0).ln();

    for altitude in [70_000.0, 100_000.0] {
        let delta_v = calculate_delta_v(&[tank(1_000.0, 5_000.0)], &[engine], 5_000.0, altitude, &config);
        assert_close(delta_v, expected, 1.0);
    }
}

#[test]
fn reference_engine_lifts_its_twr_one_mass() {
    let config = PhysicsConfig::default();
    let engine = EngineStats::new(215_000.0, 320.0, 320.0);
    assert_close(calculate_twr(&[engine], 21_915.0, 0.0, &config), 1.0, 0.01);
}

#[test]
fn simple_accuracy_keeps_surface_gravity() {
    let simple = PhysicsConfig {
        accuracy_level: AccuracyLevel::Simple,
        ..PhysicsConfig::default()
    };
    let engine = EngineStats::new(215_000.0, 320.0, 320.0);

    assert_eq!(local_gravity(250_000.0, &simple), 9.81);
    assert_close(
        calculate_twr(&[engine], 21_915.0, 250_000.0, &simple),
        215_000.0 / (21_915.0 * 9.81),
        1e-9,
    );
}

#[test]
fn config_derived_from_catalog_body() {
    let catalog = load_catalog();
    let mun = catalog.body("mun").expect("mun in fixture");
    let config = PhysicsConfig::for_body(mun);

    assert_eq!(config.reference_body.gravity, 1.63);
    assert_eq!(config.reference_body.atmosphere_height, 0.0);

    // Airless body: every altitude is vacuum, so ISP never drops.
    let engine = EngineStats::new(215_000.0, 320.0, 250.0);
    let delta_v = calculate_delta_v(&[tank(1_000.0, 5_000.0)], &[engine], 5_000.0, 0.0, &config);
    assert_close(delta_v, 320.0 * 1.63 * 5.0_f64.ln(), 1e-6);
}

#[test]
fn twr_and_delta_v_scale_thrust_differently_mid_atmosphere() {
    let config = PhysicsConfig::default();
    let altitude = 35_000.0;
    let mass = 10_000.0;
    let gravity = local_gravity(altitude, &config);

    // TWR uses the full sea-level ratio anywhere inside the atmosphere.
    let lifter = EngineStats::new(100_000.0, 320.0, 250.0);
    let twr = calculate_twr(&[lifter], mass, altitude, &config);
    let twr_scale = twr * mass * gravity / lifter.thrust_vacuum;
    assert_close(twr_scale, 250.0 / 320.0, 1e-9);

    // Delta-v weights ISP by thrust scaled with the interpolated ISP (285 s
    // halfway up). A second engine with flat ISP makes the weighting visible.
    let steady = EngineStats::new(100_000.0, 300.0, 300.0);
    let parts = [tank(1_000.0, 5_000.0)];
    let delta_v = calculate_delta_v(&parts, &[lifter, steady], 5_000.0, altitude, &config);

    let weighted_isp = |scale: f64| {
        let thrust = 100_000.0 * scale;
        (thrust * 285.0 + 100_000.0 * 300.0) / (thrust + 100_000.0)
    };
    let ln_ratio = 5.0_f64.ln();
    assert_close(delta_v, weighted_isp(285.0 / 320.0) * 9.81 * ln_ratio, 1e-6);
    assert!((delta_v - weighted_isp(250.0 / 320.0) * 9.81 * ln_ratio).abs() > 0.1);
}
