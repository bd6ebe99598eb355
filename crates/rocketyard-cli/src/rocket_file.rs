//! JSON description of a rocket, replayed through the assembler.
//!
//! ```json
//! {
//!   "instances": [{ "id": "pod", "part": "mk1-pod", "position": [0, 2, 0] }],
//!   "connections": [{ "child": "tank", "parent": "pod" }]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use rocketyard_lib::assembly::{DEFAULT_CHILD_NODE, DEFAULT_PARENT_NODE};
use rocketyard_lib::{Catalog, RocketAssembler};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RocketFile {
    #[serde(default)]
    pub instances: Vec<InstanceEntry>,
    #[serde(default)]
    pub connections: Vec<ConnectionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstanceEntry {
    pub id: Option<String>,
    pub part: String,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEntry {
    pub child: String,
    pub parent: String,
    pub child_node: Option<String>,
    pub parent_node: Option<String>,
}

impl RocketFile {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read rocket from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse rocket from {}", path.display()))
    }

    /// Place every instance, then make every connection, in file order. The
    /// first rejected step aborts the build.
    pub fn assemble(&self, catalog: Arc<Catalog>) -> Result<RocketAssembler> {
        let mut rocket = RocketAssembler::new(catalog);

        for (index, entry) in self.instances.iter().enumerate() {
            rocket
                .add_instance(entry.id.as_deref(), &entry.part, entry.position, entry.rotation)
                .with_context(|| format!("instance #{index} ('{}') could not be placed", entry.part))?;
        }

        for entry in &self.connections {
            let child_node = entry.child_node.as_deref().unwrap_or(DEFAULT_CHILD_NODE);
            let parent_node = entry.parent_node.as_deref().unwrap_or(DEFAULT_PARENT_NODE);
            rocket
                .connect(&entry.child, &entry.parent, child_node, parent_node)
                .with_context(|| {
                    format!(
                        "could not connect '{}' beneath '{}'",
                        entry.child, entry.parent
                    )
                })?;
        }

        Ok(rocket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Arc<Catalog> {
        let part = |id: &str, category: &str| {
            json!({
                "id": id,
                "name": id,
                "category": category,
                "mass": {"dry": 100.0, "wet": 100.0},
                "cost": 1
            })
        };
        Arc::new(
            Catalog::from_value(json!({
                "parts": [part("pod", "command"), part("tank", "fuel_tanks")]
            }))
            .expect("catalog"),
        )
    }

    #[test]
    fn assembles_with_default_nodes() {
        let file: RocketFile = serde_json::from_value(json!({
            "instances": [{"id": "a", "part": "pod"}, {"id": "b", "part": "tank"}],
            "connections": [{"child": "b", "parent": "a"}]
        }))
        .expect("decode");

        let rocket = file.assemble(catalog()).expect("assemble");
        let connection = &rocket.connections()[0];
        assert_eq!(connection.child.node_id, DEFAULT_CHILD_NODE);
        assert_eq!(connection.parent.node_id, DEFAULT_PARENT_NODE);
    }

    #[test]
    fn rejected_connection_names_both_ends() {
        let file: RocketFile = serde_json::from_value(json!({
            "instances": [{"id": "a", "part": "pod"}],
            "connections": [{"child": "a", "parent": "a"}]
        }))
        .expect("decode");

        let err = file.assemble(catalog()).expect_err("self connection");
        assert!(format!("{err:#}").contains("could not connect 'a' beneath 'a'"));
    }
}
