use serde::{Deserialize, Serialize};

/// Research-tree node. `parents` must form a DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub part_unlocks: Vec<String>,
}
