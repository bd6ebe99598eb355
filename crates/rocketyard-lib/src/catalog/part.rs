//! Part definitions: the immutable catalog entries rockets are built from.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Functional category of a part. Drives root selection, dry-mass accounting
/// and the category-specific schema checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartCategory {
    Command,
    Structural,
    FuelTanks,
    Engines,
    Control,
    Coupling,
    Payload,
    Aerodynamic,
    Utility,
    Science,
    Electrical,
    Ground,
    Thermal,
}

impl PartCategory {
    pub const ALL: [PartCategory; 13] = [
        PartCategory::Command,
        PartCategory::Structural,
        PartCategory::FuelTanks,
        PartCategory::Engines,
        PartCategory::Control,
        PartCategory::Coupling,
        PartCategory::Payload,
        PartCategory::Aerodynamic,
        PartCategory::Utility,
        PartCategory::Science,
        PartCategory::Electrical,
        PartCategory::Ground,
        PartCategory::Thermal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PartCategory::Command => "command",
            PartCategory::Structural => "structural",
            PartCategory::FuelTanks => "fuel_tanks",
            PartCategory::Engines => "engines",
            PartCategory::Control => "control",
            PartCategory::Coupling => "coupling",
            PartCategory::Payload => "payload",
            PartCategory::Aerodynamic => "aerodynamic",
            PartCategory::Utility => "utility",
            PartCategory::Science => "science",
            PartCategory::Electrical => "electrical",
            PartCategory::Ground => "ground",
            PartCategory::Thermal => "thermal",
        }
    }

    /// Parse the catalog spelling of a category.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Categories whose stored dry mass (rather than full mass) counts toward
    /// a rocket's burnout mass.
    pub fn is_fuel_tank_like(self) -> bool {
        matches!(self, PartCategory::FuelTanks)
    }
}

impl fmt::Display for PartCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse physical size class. Only used by structural heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartSize {
    Tiny,
    Small,
    Medium,
    Large,
    ExtraLarge,
}

/// Dry and fully-loaded mass in kilograms.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PartMass {
    #[serde(default)]
    pub dry: f64,
    #[serde(default)]
    pub wet: f64,
}

/// A named, positioned, oriented connection point on a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachNode {
    pub id: String,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default = "default_orientation")]
    pub orientation: [f64; 3],
}

fn default_orientation() -> [f64; 3] {
    [0.0, 1.0, 0.0]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachRules {
    #[serde(default = "default_true")]
    pub stack: bool,
    #[serde(default = "default_true")]
    pub srf_attach: bool,
    #[serde(default)]
    pub allow_collision: bool,
}

impl Default for AttachRules {
    fn default() -> Self {
        Self {
            stack: true,
            srf_attach: true,
            allow_collision: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Resource capacity carried by a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSlot {
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub max_amount: f64,
}

/// Part module entry. Catalogs list modules either by bare name or as an
/// object carrying a `name` plus module settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartModule {
    Name(String),
    Detailed {
        name: String,
        #[serde(flatten)]
        settings: serde_json::Map<String, serde_json::Value>,
    },
}

impl PartModule {
    pub fn name(&self) -> &str {
        match self {
            PartModule::Name(name) => name,
            PartModule::Detailed { name, .. } => name,
        }
    }
}

/// Vacuum / sea-level pair. Thrust values are kilonewtons, ISP values seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformancePair {
    #[serde(default)]
    pub vacuum: f64,
    #[serde(default)]
    pub atmosphere: f64,
}

/// One propellant consumed by an engine and its share of total flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Propellant {
    pub name: String,
    #[serde(default)]
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSpec {
    pub engine_type: Option<String>,
    pub thrust: PerformancePair,
    pub isp: PerformancePair,
    pub propellants: Vec<Propellant>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuelTankSpec {
    pub tank_type: Option<String>,
    pub volume: Option<f64>,
    pub capacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub crew_capacity: u32,
}

/// Category-specific view of a part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartExtension {
    Engine(EngineSpec),
    FuelTank(FuelTankSpec),
    Command(CommandSpec),
    None,
}

/// Catalog entry for a placeable part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartDefinition {
    pub id: String,
    pub name: String,
    pub category: PartCategory,
    pub mass: PartMass,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub attach_nodes: Vec<AttachNode>,
    #[serde(default)]
    pub attach_rules: AttachRules,
    #[serde(default)]
    pub resources: Vec<ResourceSlot>,
    #[serde(default)]
    pub modules: Vec<PartModule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_required: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<PartSize>,

    // Engine fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thrust: Option<PerformancePair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isp: Option<PerformancePair>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub propellants: Vec<Propellant>,

    // Fuel tank fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tank_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,

    // Command fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew_capacity: Option<u32>,
}

impl PartDefinition {
    /// Resolve the category-specific data for this part.
    ///
    /// Engines without both thrust and ISP figures are treated as having no
    /// engine extension, so physics never sees a half-specified engine.
    pub fn extension(&self) -> PartExtension {
        match self.category {
            PartCategory::Engines => match (self.thrust, self.isp) {
                (Some(thrust), Some(isp)) => PartExtension::Engine(EngineSpec {
                    engine_type: self.engine_type.clone(),
                    thrust,
                    isp,
                    propellants: self.propellants.clone(),
                }),
                _ => PartExtension::None,
            },
            PartCategory::FuelTanks => PartExtension::FuelTank(FuelTankSpec {
                tank_type: self.tank_type.clone(),
                volume: self.volume,
                capacity: self.resources.iter().map(|r| r.max_amount).sum(),
            }),
            PartCategory::Command => PartExtension::Command(CommandSpec {
                crew_capacity: self.crew_capacity.unwrap_or(0),
            }),
            _ => PartExtension::None,
        }
    }

    pub fn engine_spec(&self) -> Option<EngineSpec> {
        match self.extension() {
            PartExtension::Engine(spec) => Some(spec),
            _ => None,
        }
    }

    pub fn is_engine(&self) -> bool {
        self.engine_spec().is_some()
    }

    /// Whether this part needs lateral support beyond a single stack joint.
    pub fn requires_radial_support(&self) -> bool {
        self.category == PartCategory::Engines && self.size == Some(PartSize::Large)
    }

    pub fn has_module(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.modules
            .iter()
            .any(|m| m.name().to_ascii_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_engine_with_flat_extension_fields() {
        let part: PartDefinition = serde_json::from_value(json!({
            "id": "liquidEngine",
            "name": "LV-T45",
            "category": "engines",
            "mass": {"dry": 1500.0, "wet": 1500.0},
            "cost": 1200,
            "engineType": "LiquidFuel",
            "thrust": {"vacuum": 215.0, "atmosphere": 167.97},
            "isp": {"vacuum": 320.0, "atmosphere": 250.0},
            "propellants": [{"name": "LiquidFuel", "ratio": 0.45}, {"name": "Oxidizer", "ratio": 0.55}],
            "modules": ["ModuleEngines", {"name": "ModuleGimbal", "range": 3}]
        }))
        .expect("engine decodes");

        let spec = part.engine_spec().expect("engine extension");
        assert_eq!(spec.thrust.vacuum, 215.0);
        assert_eq!(spec.propellants.len(), 2);
        assert!(part.has_module("gimbal"));
        assert_eq!(part.attach_rules, AttachRules::default());
    }

    #[test]
    fn engine_without_isp_has_no_extension() {
        let part: PartDefinition = serde_json::from_value(json!({
            "id": "e", "name": "E", "category": "engines",
            "mass": {"dry": 1.0, "wet": 1.0},
            "thrust": {"vacuum": 10.0, "atmosphere": 8.0}
        }))
        .expect("decodes");
        assert_eq!(part.extension(), PartExtension::None);
    }

    #[test]
    fn category_round_trips_through_catalog_spelling() {
        for category in PartCategory::ALL {
            assert_eq!(PartCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(PartCategory::parse("engine"), None);
    }

    #[test]
    fn fuel_tank_capacity_sums_slots() {
        let part: PartDefinition = serde_json::from_value(json!({
            "id": "tank", "name": "FL-T400", "category": "fuel_tanks",
            "mass": {"dry": 250.0, "wet": 2250.0},
            "volume": 400.0,
            "resources": [
                {"type": "LiquidFuel", "amount": 180.0, "maxAmount": 180.0},
                {"type": "Oxidizer", "amount": 220.0, "maxAmount": 220.0}
            ]
        }))
        .expect("decodes");
        match part.extension() {
            PartExtension::FuelTank(spec) => assert_eq!(spec.capacity, 400.0),
            other => panic!("unexpected extension: {:?}", other),
        }
    }
}
