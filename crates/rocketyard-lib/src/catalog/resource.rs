//! Resource definitions (propellants, electric charge, ore, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a resource may move between parts of a vessel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowMode {
    NoFlow,
    AllVessel,
    StagePriorityFlow,
    StageStackFlow,
    StageLocked,
}

impl FlowMode {
    pub const ALL: [FlowMode; 5] = [
        FlowMode::NoFlow,
        FlowMode::AllVessel,
        FlowMode::StagePriorityFlow,
        FlowMode::StageStackFlow,
        FlowMode::StageLocked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FlowMode::NoFlow => "NO_FLOW",
            FlowMode::AllVessel => "ALL_VESSEL",
            FlowMode::StagePriorityFlow => "STAGE_PRIORITY_FLOW",
            FlowMode::StageStackFlow => "STAGE_STACK_FLOW",
            FlowMode::StageLocked => "STAGE_LOCKED",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }

    /// Flow modes that are consistent with a non-transferable resource.
    pub fn allows_locked_resource(self) -> bool {
        matches!(self, FlowMode::NoFlow | FlowMode::StageLocked)
    }
}

impl fmt::Display for FlowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    pub id: String,
    pub name: String,
    /// Mass per unit, in tonnes.
    pub density: f64,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default = "default_transferable")]
    pub transferable: bool,
    pub flow_mode: FlowMode,
    /// RGB or RGBA, each component in `[0, 1]`.
    #[serde(default)]
    pub color: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_energy: Option<f64>,
}

fn default_transferable() -> bool {
    true
}
