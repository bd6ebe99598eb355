//! Tunable constants for physics, structural heuristics and validation.
//!
//! Every struct deserializes from camelCase JSON with field-level defaults,
//! so a configuration file only needs to name the values it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::CelestialBody;
use crate::error::{Error, Result};
use crate::physics::constants;
use crate::validation::ValidationOptions;

/// Which formulas feed the performance figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccuracyLevel {
    /// Surface gravity everywhere; no inverse-square falloff.
    Simple,
    #[default]
    Standard,
    Detailed,
}

impl AccuracyLevel {
    pub fn uses_gravity_falloff(self) -> bool {
        !matches!(self, AccuracyLevel::Simple)
    }
}

/// Body the rocket launches from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReferenceBody {
    /// Surface gravity in m/s².
    pub gravity: f64,
    /// Altitude in metres at which the vacuum regime begins.
    pub atmosphere_height: f64,
    /// Mean radius in metres.
    pub radius: f64,
    /// Velocity needed for a low circular orbit, in m/s.
    pub orbital_velocity: f64,
    /// Gravity and drag losses incurred reaching orbit, in m/s.
    pub ascent_losses: f64,
    /// Altitude credited to a rocket that just makes orbit, in metres.
    pub low_orbit_altitude: f64,
}

impl Default for ReferenceBody {
    fn default() -> Self {
        Self {
            gravity: constants::REFERENCE_GRAVITY,
            atmosphere_height: constants::REFERENCE_ATMOSPHERE_HEIGHT,
            radius: constants::REFERENCE_RADIUS,
            orbital_velocity: constants::REFERENCE_ORBITAL_VELOCITY,
            ascent_losses: constants::REFERENCE_ASCENT_LOSSES,
            low_orbit_altitude: constants::REFERENCE_LOW_ORBIT_ALTITUDE,
        }
    }
}

impl ReferenceBody {
    /// Derive gravity, radius and atmosphere height from a catalog body.
    /// Orbit-related figures keep their reference defaults.
    pub fn from_celestial_body(body: &CelestialBody) -> Self {
        Self {
            gravity: body.physical.gravity,
            atmosphere_height: body.atmosphere_height(),
            radius: body.physical.radius,
            ..Self::default()
        }
    }

    /// Delta-v needed to reach a low orbit including ascent losses.
    pub fn required_orbital_delta_v(&self) -> f64 {
        self.orbital_velocity + self.ascent_losses
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [(self.gravity, "gravity"), (self.radius, "radius")];
        for (value, field) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("referenceBody.{field} must be a finite positive number"),
                });
            }
        }

        let non_negative = [
            (self.atmosphere_height, "atmosphereHeight"),
            (self.orbital_velocity, "orbitalVelocity"),
            (self.ascent_losses, "ascentLosses"),
            (self.low_orbit_altitude, "lowOrbitAltitude"),
        ];
        for (value, field) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig {
                    message: format!("referenceBody.{field} must be finite and non-negative"),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhysicsConfig {
    pub reference_body: ReferenceBody,
    pub accuracy_level: AccuracyLevel,
}

impl PhysicsConfig {
    pub fn for_body(body: &CelestialBody) -> Self {
        Self {
            reference_body: ReferenceBody::from_celestial_body(body),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.reference_body.validate()
    }
}

/// Thresholds for the structural stability heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructureConfig {
    /// Largest tolerated mass ratio across a single connection.
    pub mass_ratio_threshold: f64,
    /// Largest tolerated per-axis standard deviation of engine positions.
    pub thrust_imbalance_threshold: f64,
    /// Connections a radially-supported part needs.
    pub radial_support_min_connections: usize,
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            mass_ratio_threshold: 10.0,
            thrust_imbalance_threshold: 0.5,
            radial_support_min_connections: 2,
        }
    }
}

impl StructureConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.mass_ratio_threshold.is_finite() || self.mass_ratio_threshold < 1.0 {
            return Err(Error::InvalidConfig {
                message: "structure.massRatioThreshold must be at least 1".to_string(),
            });
        }
        if !self.thrust_imbalance_threshold.is_finite() || self.thrust_imbalance_threshold <= 0.0 {
            return Err(Error::InvalidConfig {
                message: "structure.thrustImbalanceThreshold must be a finite positive number"
                    .to_string(),
            });
        }
        Ok(())
    }
}

/// Application-level configuration document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub physics: PhysicsConfig,
    pub structure: StructureConfig,
    pub validation: ValidationOptions,
}

impl AppConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.physics.validate()?;
        self.structure.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Atmosphere, BodyType, PhysicalProperties};

    #[test]
    fn partial_document_merges_over_defaults() {
        let config = AppConfig::from_json_str(
            r#"{"physics": {"referenceBody": {"gravity": 1.63}, "accuracyLevel": "simple"}}"#,
        )
        .expect("valid config");

        assert_eq!(config.physics.reference_body.gravity, 1.63);
        assert_eq!(config.physics.reference_body.radius, 600_000.0);
        assert_eq!(config.physics.reference_body.atmosphere_height, 70_000.0);
        assert_eq!(config.physics.accuracy_level, AccuracyLevel::Simple);
        assert_eq!(config.structure, StructureConfig::default());
        assert_eq!(config.validation.max_errors, 100);
    }

    #[test]
    fn rejects_non_positive_gravity() {
        let err = AppConfig::from_json_str(r#"{"physics": {"referenceBody": {"gravity": 0}}}"#)
            .expect_err("gravity must be positive");
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn derives_reference_body_from_catalog_body() {
        let mun = CelestialBody {
            id: "mun".to_string(),
            name: "Mun".to_string(),
            body_type: BodyType::Moon,
            physical: PhysicalProperties {
                radius: 200_000.0,
                mass: 9.76e20,
                gravity: 1.63,
            },
            parent: Some("kerbin".to_string()),
            orbit: None,
            atmosphere: Some(Atmosphere {
                present: false,
                height: 5_000.0,
                pressure: 0.0,
                temperature_asl: 0.0,
            }),
        };

        let body = ReferenceBody::from_celestial_body(&mun);
        assert_eq!(body.gravity, 1.63);
        assert_eq!(body.radius, 200_000.0);
        assert_eq!(body.atmosphere_height, 0.0);
        assert_eq!(body.required_orbital_delta_v(), 3_700.0);
    }
}
