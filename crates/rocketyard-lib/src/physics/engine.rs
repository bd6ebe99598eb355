//! Engine performance figures resolved for a given altitude.

use serde::{Deserialize, Serialize};

use crate::catalog::EngineSpec;
use crate::config::PhysicsConfig;

use super::constants::NEWTONS_PER_KILONEWTON;

/// Thrust (newtons) and specific impulse (seconds) of one engine in vacuum
/// and at sea level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub thrust_vacuum: f64,
    pub thrust_sea_level: f64,
    pub isp_vacuum: f64,
    pub isp_sea_level: f64,
}

impl EngineStats {
    /// Build stats from vacuum thrust and both ISP figures. Sea-level thrust
    /// scales with the ISP ratio, as it does for a fixed mass flow.
    pub fn new(thrust_vacuum: f64, isp_vacuum: f64, isp_sea_level: f64) -> Self {
        let thrust_sea_level = if isp_vacuum > 0.0 {
            thrust_vacuum * isp_sea_level / isp_vacuum
        } else {
            0.0
        };
        Self {
            thrust_vacuum,
            thrust_sea_level,
            isp_vacuum,
            isp_sea_level,
        }
    }

    /// Convert a catalog engine (thrust in kN) to SI figures.
    pub fn from_spec(spec: &EngineSpec) -> Self {
        Self {
            thrust_vacuum: spec.thrust.vacuum * NEWTONS_PER_KILONEWTON,
            thrust_sea_level: spec.thrust.atmosphere * NEWTONS_PER_KILONEWTON,
            isp_vacuum: spec.isp.vacuum,
            isp_sea_level: spec.isp.atmosphere,
        }
    }

    /// Propellant mass flow in kg/s at full throttle: nominal (vacuum) thrust
    /// over sea-level ISP. Vacuum-only engines without a sea-level ISP use
    /// their vacuum ISP.
    pub fn mass_flow(&self, g0: f64) -> f64 {
        let isp = if self.isp_sea_level > 0.0 {
            self.isp_sea_level
        } else {
            self.isp_vacuum
        };
        if isp <= 0.0 || g0 <= 0.0 {
            return 0.0;
        }
        self.thrust_vacuum / (isp * g0)
    }
}

/// Whether `altitude` lies at or above the configured atmosphere height.
pub fn is_vacuum(altitude: f64, config: &PhysicsConfig) -> bool {
    altitude >= config.reference_body.atmosphere_height
}

/// Fraction of sea-level atmosphere remaining at `altitude`, in `[0, 1]`.
pub fn atmosphere_ratio(altitude: f64, config: &PhysicsConfig) -> f64 {
    let height = config.reference_body.atmosphere_height;
    if height <= 0.0 {
        return 0.0;
    }
    (1.0 - altitude / height).clamp(0.0, 1.0)
}

/// ISP interpolated linearly between vacuum and sea level.
pub fn effective_isp(engine: &EngineStats, altitude: f64, config: &PhysicsConfig) -> f64 {
    if is_vacuum(altitude, config) {
        return engine.isp_vacuum;
    }
    let ratio = atmosphere_ratio(altitude, config);
    engine.isp_vacuum + (engine.isp_sea_level - engine.isp_vacuum) * ratio
}

/// Gravity at `altitude` under the inverse-square law, or surface gravity for
/// [`crate::config::AccuracyLevel::Simple`].
pub fn local_gravity(altitude: f64, config: &PhysicsConfig) -> f64 {
    let body = &config.reference_body;
    if !config.accuracy_level.uses_gravity_falloff() {
        return body.gravity;
    }
    let distance = body.radius + altitude.max(0.0);
    if distance <= 0.0 {
        return body.gravity;
    }
    body.gravity * (body.radius * body.radius) / (distance * distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccuracyLevel;

    #[test]
    fn isp_interpolates_through_the_atmosphere() {
        let config = PhysicsConfig::default();
        let engine = EngineStats::new(215_000.0, 320.0, 250.0);

        assert_eq!(effective_isp(&engine, 0.0, &config), 250.0);
        assert!((effective_isp(&engine, 35_000.0, &config) - 285.0).abs() < 1e-9);
        assert_eq!(effective_isp(&engine, 70_000.0, &config), 320.0);
        assert_eq!(effective_isp(&engine, 90_000.0, &config), 320.0);
    }

    #[test]
    fn gravity_falls_off_with_altitude() {
        let config = PhysicsConfig::default();
        assert!((local_gravity(0.0, &config) - 9.81).abs() < 1e-12);
        // One body radius up, gravity drops to a quarter.
        assert!((local_gravity(600_000.0, &config) - 9.81 / 4.0).abs() < 1e-9);

        let simple = PhysicsConfig {
            accuracy_level: AccuracyLevel::Simple,
            ..PhysicsConfig::default()
        };
        assert_eq!(local_gravity(600_000.0, &simple), 9.81);
    }

    #[test]
    fn body_without_atmosphere_is_always_vacuum() {
        let mut config = PhysicsConfig::default();
        config.reference_body.atmosphere_height = 0.0;
        assert!(is_vacuum(0.0, &config));
        assert_eq!(atmosphere_ratio(0.0, &config), 0.0);
    }

    #[test]
    fn sea_level_thrust_tracks_isp_ratio() {
        let engine = EngineStats::new(200_000.0, 300.0, 240.0);
        assert!((engine.thrust_sea_level - 160_000.0).abs() < 1e-9);
        assert_eq!(EngineStats::new(1.0, 0.0, 0.0).thrust_sea_level, 0.0);
    }

    #[test]
    fn mass_flow_uses_sea_level_isp() {
        let engine = EngineStats::new(215_000.0, 320.0, 250.0);
        assert!((engine.mass_flow(9.81) - 215_000.0 / (250.0 * 9.81)).abs() < 1e-9);

        let throttled = EngineStats::new(215_000.0, 320.0, 100.0);
        assert!(throttled.mass_flow(9.81) > engine.mass_flow(9.81));
        assert_eq!(engine.mass_flow(0.0), 0.0);
    }
}
