//! Flight-performance calculations.
//!
//! - [`engine`] - Per-engine figures and altitude-dependent interpolation
//! - [`constants`] - Reference-body defaults
//!
//! Every function is pure: inputs are plain slices and numbers, constants
//! come from [`PhysicsConfig`], and degenerate inputs (no engines, no mass,
//! no fuel) yield `0.0` rather than an error, so callers can display figures
//! for half-built rockets.
//!
//! # Example
//!
//! ```
//! use rocketyard_lib::catalog::PartCategory;
//! use rocketyard_lib::config::PhysicsConfig;
//! use rocketyard_lib::physics::{calculate_delta_v, EngineStats, MassProfile};
//!
//! let config = PhysicsConfig::default();
//! let tank = MassProfile::new(PartCategory::FuelTanks, 1_000.0, 5_000.0);
//! let engine = EngineStats::new(215_000.0, 320.0, 250.0);
//!
//! let delta_v = calculate_delta_v(&[tank], &[engine], 5_000.0, 80_000.0, &config);
//! assert!((delta_v - 320.0 * 9.81 * 5.0_f64.ln()).abs() < 1.0);
//! ```

pub mod constants;
pub mod engine;

pub use engine::{atmosphere_ratio, effective_isp, is_vacuum, local_gravity, EngineStats};

use serde::{Deserialize, Serialize};

use crate::catalog::{PartCategory, PartDefinition};
use crate::config::PhysicsConfig;

use constants::EXCESS_DELTA_V_ALTITUDE_FACTOR;

/// Mass figures of one placed part, as seen by the delta-v calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProfile {
    pub category: PartCategory,
    pub dry_mass: f64,
    pub wet_mass: f64,
}

impl MassProfile {
    pub fn new(category: PartCategory, dry_mass: f64, wet_mass: f64) -> Self {
        Self {
            category,
            dry_mass,
            wet_mass,
        }
    }

    pub fn of(part: &PartDefinition) -> Self {
        Self::new(part.category, part.mass.dry, part.mass.wet)
    }

    /// Mass this part contributes once all propellant is spent. Only
    /// fuel-tank-like parts shed mass; everything else keeps its full mass.
    pub fn burnout_mass(&self) -> f64 {
        if self.category.is_fuel_tank_like() {
            self.dry_mass
        } else {
            self.wet_mass
        }
    }
}

/// Summed burnout mass across `parts`.
pub fn dry_mass(parts: &[MassProfile]) -> f64 {
    parts.iter().map(MassProfile::burnout_mass).sum()
}

/// Thrust-weighted average ISP across engines at `altitude`, together with
/// the total thrust it was weighted by.
fn weighted_isp(engines: &[EngineStats], altitude: f64, config: &PhysicsConfig) -> (f64, f64) {
    let vacuum = is_vacuum(altitude, config);
    let mut total_thrust = 0.0;
    let mut weighted = 0.0;

    for engine in engines {
        let (thrust, isp) = if vacuum {
            (engine.thrust_vacuum, engine.isp_vacuum)
        } else {
            let isp = effective_isp(engine, altitude, config);
            let thrust = if engine.isp_vacuum > 0.0 {
                engine.thrust_vacuum * (isp / engine.isp_vacuum)
            } else {
                0.0
            };
            (thrust, isp)
        };
        total_thrust += thrust;
        weighted += thrust * isp;
    }

    if total_thrust > 0.0 {
        (weighted / total_thrust, total_thrust)
    } else {
        (0.0, 0.0)
    }
}

/// Tsiolkovsky delta-v in m/s for a rocket of `total_mass` kilograms.
///
/// Burnout mass is derived from `parts` (see [`MassProfile::burnout_mass`]);
/// `total_mass` includes payload. Returns `0.0` without engines, without
/// burnable fuel or with a non-positive dry mass.
pub fn calculate_delta_v(
    parts: &[MassProfile],
    engines: &[EngineStats],
    total_mass: f64,
    altitude: f64,
    config: &PhysicsConfig,
) -> f64 {
    if engines.is_empty() {
        return 0.0;
    }

    let (isp, _) = weighted_isp(engines, altitude, config);
    let dry = dry_mass(parts);
    let fuel = total_mass - dry;
    if fuel <= 0.0 || dry <= 0.0 {
        return 0.0;
    }

    isp * config.reference_body.gravity * (total_mass / dry).ln()
}

/// Thrust-to-weight ratio at `altitude`.
///
/// Below the atmosphere boundary each engine's vacuum thrust is scaled by
/// `isp_sea_level / isp_vacuum` regardless of altitude. This differs from the
/// interpolated scaling used by [`calculate_delta_v`] and is kept as-is.
pub fn calculate_twr(
    engines: &[EngineStats],
    total_mass: f64,
    altitude: f64,
    config: &PhysicsConfig,
) -> f64 {
    if engines.is_empty() || total_mass <= 0.0 {
        return 0.0;
    }

    let vacuum = is_vacuum(altitude, config);
    let total_thrust: f64 = engines
        .iter()
        .map(|engine| {
            if vacuum {
                engine.thrust_vacuum
            } else if engine.isp_vacuum > 0.0 {
                engine.thrust_vacuum * (engine.isp_sea_level / engine.isp_vacuum)
            } else {
                0.0
            }
        })
        .sum();

    let gravity = local_gravity(altitude, config);
    if gravity <= 0.0 {
        return 0.0;
    }
    total_thrust / (total_mass * gravity)
}

/// Seconds until `fuel_mass` kilograms are exhausted with every engine at
/// full throttle. See [`EngineStats::mass_flow`].
pub fn calculate_burn_time(engines: &[EngineStats], fuel_mass: f64, config: &PhysicsConfig) -> f64 {
    if engines.is_empty() || fuel_mass <= 0.0 {
        return 0.0;
    }

    let g0 = config.reference_body.gravity;
    let total_flow: f64 = engines.iter().map(|engine| engine.mass_flow(g0)).sum();

    if total_flow <= 0.0 {
        return 0.0;
    }
    fuel_mass / total_flow
}

/// Delta-v per kilogram of rocket.
pub fn calculate_efficiency(delta_v: f64, total_mass: f64) -> f64 {
    if total_mass <= 0.0 {
        return 0.0;
    }
    delta_v / total_mass
}

/// Rough apoapsis estimate in metres.
///
/// A rocket that cannot lift off (`initial_twr < 1`) reaches nothing. Below
/// the orbital requirement the estimate scales linearly up to the atmosphere
/// height; at or above it, the low-orbit altitude plus
/// [`EXCESS_DELTA_V_ALTITUDE_FACTOR`] metres per surplus m/s.
pub fn estimate_max_height(delta_v: f64, initial_twr: f64, config: &PhysicsConfig) -> f64 {
    if delta_v <= 0.0 || initial_twr <= 0.0 || initial_twr < 1.0 {
        return 0.0;
    }

    let body = &config.reference_body;
    let required = body.required_orbital_delta_v();
    if required <= 0.0 || delta_v >= required {
        return body.low_orbit_altitude + (delta_v - required) * EXCESS_DELTA_V_ALTITUDE_FACTOR;
    }
    body.atmosphere_height * (delta_v / required)
}

/// All performance figures for one rocket configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub delta_v: f64,
    pub twr: f64,
    pub burn_time: f64,
    pub efficiency: f64,
    pub estimated_max_height: f64,
    pub total_mass: f64,
    pub dry_mass: f64,
    pub fuel_mass: f64,
}

/// Compose every calculation for `total_mass` kilograms at `altitude`.
pub fn performance_summary(
    parts: &[MassProfile],
    engines: &[EngineStats],
    total_mass: f64,
    altitude: f64,
    config: &PhysicsConfig,
) -> PerformanceReport {
    let dry = dry_mass(parts);
    let fuel = (total_mass - dry).max(0.0);
    let delta_v = calculate_delta_v(parts, engines, total_mass, altitude, config);
    let twr = calculate_twr(engines, total_mass, altitude, config);

    PerformanceReport {
        delta_v,
        twr,
        burn_time: calculate_burn_time(engines, fuel, config),
        efficiency: calculate_efficiency(delta_v, total_mass),
        estimated_max_height: estimate_max_height(delta_v, twr, config),
        total_mass,
        dry_mass: dry,
        fuel_mass: fuel,
    }
}
