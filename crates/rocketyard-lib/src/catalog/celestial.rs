//! Celestial bodies and their orbital hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyType {
    Star,
    Planet,
    Moon,
    DwarfPlanet,
    Asteroid,
    Comet,
}

impl BodyType {
    pub const ALL: [BodyType; 6] = [
        BodyType::Star,
        BodyType::Planet,
        BodyType::Moon,
        BodyType::DwarfPlanet,
        BodyType::Asteroid,
        BodyType::Comet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BodyType::Star => "star",
            BodyType::Planet => "planet",
            BodyType::Moon => "moon",
            BodyType::DwarfPlanet => "dwarf_planet",
            BodyType::Asteroid => "asteroid",
            BodyType::Comet => "comet",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Every body except a star orbits a parent.
    pub fn requires_parent(self) -> bool {
        self != BodyType::Star
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Radius in metres, mass in kilograms, surface gravity in m/s².
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalProperties {
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub mass: f64,
    #[serde(default)]
    pub gravity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orbit {
    pub semi_major_axis: f64,
    #[serde(default)]
    pub eccentricity: f64,
    #[serde(default)]
    pub inclination: f64,
    #[serde(default)]
    pub orbital_period: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Atmosphere {
    #[serde(default)]
    pub present: bool,
    /// Height of the atmosphere's upper boundary in metres.
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default, rename = "temperatureASL")]
    pub temperature_asl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CelestialBody {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub body_type: BodyType,
    pub physical: PhysicalProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbit: Option<Orbit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere: Option<Atmosphere>,
}

impl CelestialBody {
    /// Atmosphere height when the body has one, otherwise zero.
    pub fn atmosphere_height(&self) -> f64 {
        self.atmosphere
            .filter(|a| a.present)
            .map(|a| a.height)
            .unwrap_or(0.0)
    }
}
