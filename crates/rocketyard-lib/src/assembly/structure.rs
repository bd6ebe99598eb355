//! Structure tree and stability heuristics over the assembled graph.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::assembler::RocketAssembler;
use crate::catalog::PartCategory;
use crate::config::StructureConfig;
use crate::graph::collect_reachable;
use crate::validation::Severity;

/// One node of the parent -> child tree handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureNode {
    pub instance_id: String,
    pub part_id: String,
    pub children: Vec<StructureNode>,
}

impl StructureNode {
    /// Number of nodes in this subtree, including itself.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(StructureNode::node_count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureIssueCode {
    NoParts,
    NoRoot,
    Disconnected,
    InsufficientSupport,
    ThrustImbalance,
    ExcessiveMassRatio,
}

impl StructureIssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            StructureIssueCode::NoParts => "no-parts",
            StructureIssueCode::NoRoot => "no-root",
            StructureIssueCode::Disconnected => "disconnected",
            StructureIssueCode::InsufficientSupport => "insufficient-support",
            StructureIssueCode::ThrustImbalance => "thrust-imbalance",
            StructureIssueCode::ExcessiveMassRatio => "excessive-mass-ratio",
        }
    }
}

impl fmt::Display for StructureIssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureIssue {
    pub severity: Severity,
    pub code: StructureIssueCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl StructureIssue {
    fn error(code: StructureIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            instance_id: None,
            details: None,
        }
    }

    fn warning(code: StructureIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    fn on(mut self, instance_id: &str) -> Self {
        self.instance_id = Some(instance_id.to_string());
        self
    }

    fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Outcome of [`RocketAssembler::validate_structure`]. Only errors make a
/// structure invalid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureReport {
    pub valid: bool,
    pub issues: Vec<StructureIssue>,
}

impl StructureReport {
    fn from_issues(issues: Vec<StructureIssue>) -> Self {
        let valid = !issues.iter().any(|i| i.severity == Severity::Error);
        Self { valid, issues }
    }

    pub fn errors(&self) -> impl Iterator<Item = &StructureIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &StructureIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }
}

impl RocketAssembler {
    /// The instance the structure hangs from: the first command part, else
    /// the first connection parent that is never a child.
    pub fn find_root(&self) -> Option<&str> {
        let command = self.instances().iter().find(|instance| {
            self.part_for(&instance.id)
                .is_some_and(|part| part.category == PartCategory::Command)
        });
        if let Some(instance) = command {
            return Some(instance.id.as_str());
        }

        let children: HashSet<&str> = self
            .connections()
            .iter()
            .map(|c| c.child.instance_id.as_str())
            .collect();
        self.connections()
            .iter()
            .map(|c| c.parent.instance_id.as_str())
            .find(|parent| !children.contains(parent))
    }

    /// Tree of parts reachable from the root by following parent -> child
    /// edges. Falls back to the first placed part when no root qualifies.
    pub fn build_structure_tree(&self) -> Option<StructureNode> {
        let root = self
            .find_root()
            .or_else(|| self.instances().first().map(|i| i.id.as_str()))?;
        let mut visited = HashSet::new();
        self.subtree(root, &mut visited)
    }

    fn subtree<'a>(&'a self, id: &'a str, visited: &mut HashSet<&'a str>) -> Option<StructureNode> {
        if !visited.insert(id) {
            return None;
        }
        let instance = self.instance(id)?;
        let children = self
            .children_of(id)
            .into_iter()
            .filter_map(|child| self.subtree(child, visited))
            .collect();
        Some(StructureNode {
            instance_id: instance.id.clone(),
            part_id: instance.part_id.clone(),
            children,
        })
    }

    /// Structural errors and stability warnings for the current graph.
    pub fn validate_structure(&self, config: &StructureConfig) -> StructureReport {
        if self.is_empty() {
            return StructureReport::from_issues(vec![StructureIssue::error(
                StructureIssueCode::NoParts,
                "Rocket has no parts",
            )]);
        }

        let mut issues = Vec::new();
        match self.find_root() {
            Some(root) => self.check_connectivity(root, &mut issues),
            None => issues.push(StructureIssue::error(
                StructureIssueCode::NoRoot,
                "No root part found: add a command module or connect parts beneath a top part",
            )),
        }
        self.check_radial_support(config, &mut issues);
        self.check_thrust_balance(config, &mut issues);
        self.check_mass_ratio(config, &mut issues);

        let report = StructureReport::from_issues(issues);
        debug!(
            valid = report.valid,
            issues = report.issues.len(),
            "validated rocket structure"
        );
        report
    }

    fn check_connectivity(&self, root: &str, issues: &mut Vec<StructureIssue>) {
        let connected = collect_reachable(root.to_string(), |node| {
            self.connections()
                .iter()
                .filter_map(|c| {
                    if c.parent.instance_id == *node {
                        Some(c.child.instance_id.clone())
                    } else if c.child.instance_id == *node {
                        Some(c.parent.instance_id.clone())
                    } else {
                        None
                    }
                })
                .collect::<Vec<_>>()
        });

        for instance in self.instances() {
            if !connected.contains(&instance.id) {
                issues.push(
                    StructureIssue::warning(
                        StructureIssueCode::Disconnected,
                        format!("Part '{}' is not connected to the root '{root}'", instance.id),
                    )
                    .on(&instance.id),
                );
            }
        }
    }

    fn check_radial_support(&self, config: &StructureConfig, issues: &mut Vec<StructureIssue>) {
        for instance in self.instances() {
            let Some(part) = self.part_for(&instance.id) else {
                continue;
            };
            let connections = self.connection_count(&instance.id);
            if part.requires_radial_support() && connections < config.radial_support_min_connections {
                issues.push(
                    StructureIssue::warning(
                        StructureIssueCode::InsufficientSupport,
                        format!(
                            "Part '{}' needs at least {} connections for support, has {connections}",
                            instance.id, config.radial_support_min_connections
                        ),
                    )
                    .on(&instance.id)
                    .with_details(json!({ "connections": connections })),
                );
            }
        }
    }

    fn check_thrust_balance(&self, config: &StructureConfig, issues: &mut Vec<StructureIssue>) {
        let positions: Vec<[f64; 3]> = self
            .instances()
            .iter()
            .filter(|instance| {
                self.part_for(&instance.id)
                    .is_some_and(|p| p.category == PartCategory::Engines)
            })
            .map(|instance| instance.position)
            .collect();
        if positions.len() < 2 {
            return;
        }

        let count = positions.len() as f64;
        let mut std_dev = [0.0; 3];
        for (axis, deviation) in std_dev.iter_mut().enumerate() {
            let centroid = positions.iter().map(|p| p[axis]).sum::<f64>() / count;
            let variance = positions
                .iter()
                .map(|p| (p[axis] - centroid).powi(2))
                .sum::<f64>()
                / count;
            *deviation = variance.sqrt();
        }

        if std_dev.iter().any(|d| *d > config.thrust_imbalance_threshold) {
            issues.push(
                StructureIssue::warning(
                    StructureIssueCode::ThrustImbalance,
                    "Engine placement is unbalanced around the thrust centroid",
                )
                .with_details(json!({ "stdDev": std_dev, "engines": positions.len() })),
            );
        }
    }

    fn check_mass_ratio(&self, config: &StructureConfig, issues: &mut Vec<StructureIssue>) {
        let mass_of = |id: &str| {
            self.part_for(id)
                .map(|p| p.mass.wet)
                .filter(|mass| *mass > 0.0)
                .unwrap_or(1.0)
        };

        let worst = self
            .connections()
            .iter()
            .map(|c| {
                let parent = mass_of(&c.parent.instance_id);
                let child = mass_of(&c.child.instance_id);
                ((parent / child).max(child / parent), c)
            })
            .max_by(|a, b| a.0.total_cmp(&b.0));

        if let Some((ratio, connection)) = worst {
            if ratio > config.mass_ratio_threshold {
                issues.push(
                    StructureIssue::warning(
                        StructureIssueCode::ExcessiveMassRatio,
                        format!(
                            "Mass ratio {ratio:.1} between '{}' and '{}' exceeds {}",
                            connection.parent.instance_id,
                            connection.child.instance_id,
                            config.mass_ratio_threshold
                        ),
                    )
                    .with_details(json!({
                        "ratio": ratio,
                        "parent": connection.parent.instance_id,
                        "child": connection.child.instance_id,
                    })),
                );
            }
        }
    }
}
