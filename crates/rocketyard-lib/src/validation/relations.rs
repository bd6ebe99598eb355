//! Cross-entity checks: references that must resolve within the catalog and
//! hierarchies that must not loop.
//!
//! Paths are rooted at the collection, e.g. `parts[3].resources[0].type`, so
//! findings from all four collections can share one result.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Value};

use super::finding::{ErrorCode, Finding, Findings};
use crate::error::{did_you_mean, suggest};
use crate::graph::{find_cycles, parent_chain_returns};
use crate::safe_access::{get_str, index_path, join_path};

/// Borrowed view of every catalog collection.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogSnapshot<'a> {
    pub parts: &'a [Value],
    pub resources: &'a [Value],
    pub celestial_bodies: &'a [Value],
    pub technologies: &'a [Value],
}

/// First index of every string id in `records`.
fn index_by_id(records: &[Value]) -> HashMap<&str, usize> {
    let mut ids = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        if let Some(id) = get_str(record, "id") {
            ids.entry(id).or_insert(index);
        }
    }
    ids
}

fn missing_reference(
    path: String,
    kind: &str,
    target: &str,
    known: &HashMap<&str, usize>,
    as_warning: bool,
) -> Finding {
    let suggestions = suggest(target, known.keys().copied());
    let message = format!("Unknown {kind} '{target}'{}", did_you_mean(&suggestions));
    let finding = if as_warning {
        Finding::warning(ErrorCode::ReferenceError, path, message)
    } else {
        Finding::error(ErrorCode::ReferenceError, path, message)
    };
    finding.with_details(json!({ "reference": target, "kind": kind }))
}

pub(crate) fn validate_relations(snapshot: &CatalogSnapshot<'_>, out: &mut Findings) {
    check_part_references(snapshot, out);
    check_technology_unlocks(snapshot, out);
    check_celestial_hierarchy(snapshot.celestial_bodies, out);
    check_technology_tree(snapshot.technologies, out);
}

/// Part resource slots, propellants and required technologies must resolve.
pub(crate) fn check_part_references(snapshot: &CatalogSnapshot<'_>, out: &mut Findings) {
    let resources = index_by_id(snapshot.resources);
    let technologies = index_by_id(snapshot.technologies);

    for (part_index, part) in snapshot.parts.iter().enumerate() {
        let base = index_path("parts", part_index);

        for (field, key) in [("resources", "type"), ("propellants", "name")] {
            let Some(entries) = part.get(field).and_then(Value::as_array) else {
                continue;
            };
            for (index, entry) in entries.iter().enumerate() {
                let Some(target) = get_str(entry, key) else {
                    continue;
                };
                if !resources.contains_key(target) {
                    let path = join_path(&index_path(&join_path(&base, field), index), key);
                    out.push(missing_reference(path, "resource", target, &resources, false));
                }
            }
        }

        if let Some(tech) = get_str(part, "techRequired") {
            if !technologies.contains_key(tech) {
                out.push(missing_reference(
                    join_path(&base, "techRequired"),
                    "technology",
                    tech,
                    &technologies,
                    false,
                ));
            }
        }
    }
}

/// Unlocked parts should exist. Dangling unlocks are warnings.
pub(crate) fn check_technology_unlocks(snapshot: &CatalogSnapshot<'_>, out: &mut Findings) {
    let parts = index_by_id(snapshot.parts);
    for (tech_index, tech) in snapshot.technologies.iter().enumerate() {
        let Some(unlocks) = tech.get("partUnlocks").and_then(Value::as_array) else {
            continue;
        };
        let base = join_path(&index_path("technologies", tech_index), "partUnlocks");
        for (index, unlock) in unlocks.iter().enumerate() {
            if let Some(part_id) = unlock.as_str() {
                if !parts.contains_key(part_id) {
                    out.push(missing_reference(index_path(&base, index), "part", part_id, &parts, true));
                }
            }
        }
    }
}

/// Parents must resolve and following parents must never return to a body.
pub(crate) fn check_celestial_hierarchy(bodies: &[Value], out: &mut Findings) {
    let known = index_by_id(bodies);
    let mut parent_of: HashMap<&str, &str> = HashMap::new();

    for (index, body) in bodies.iter().enumerate() {
        let (Some(id), Some(parent)) = (get_str(body, "id"), get_str(body, "parent")) else {
            continue;
        };
        // Self-parenting is reported by the per-body validator.
        if id == parent {
            continue;
        }
        if known.contains_key(parent) {
            parent_of.entry(id).or_insert(parent);
        } else {
            out.push(missing_reference(
                join_path(&index_path("celestialBodies", index), "parent"),
                "parent body",
                parent,
                &known,
                false,
            ));
        }
    }

    let mut reported = HashSet::new();
    for (index, body) in bodies.iter().enumerate() {
        let Some(id) = get_str(body, "id") else {
            continue;
        };
        if !parent_of.contains_key(id) || !reported.insert(id) {
            continue;
        }
        if parent_chain_returns(&id, |node| parent_of.get(node).copied()) {
            out.error(
                ErrorCode::CircularReference,
                join_path(&index_path("celestialBodies", index), "parent"),
                format!("Parent chain of body '{id}' loops back to itself"),
            );
        }
    }
}

/// Parents should resolve and the parent graph must be acyclic.
pub(crate) fn check_technology_tree(technologies: &[Value], out: &mut Findings) {
    let known = index_by_id(technologies);
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for (index, tech) in technologies.iter().enumerate() {
        let Some(id) = get_str(tech, "id") else {
            continue;
        };
        if known.get(id) != Some(&index) {
            continue;
        }
        order.push(id);
        let Some(parents) = tech.get("parents").and_then(Value::as_array) else {
            continue;
        };
        let base = join_path(&index_path("technologies", index), "parents");
        for (parent_index, parent) in parents.iter().enumerate() {
            let Some(parent) = parent.as_str() else {
                continue;
            };
            if parent == id {
                continue;
            }
            if known.contains_key(parent) {
                edges.entry(id).or_default().push(parent);
            } else {
                out.push(missing_reference(
                    index_path(&base, parent_index),
                    "parent technology",
                    parent,
                    &known,
                    true,
                ));
            }
        }
    }

    for cycle in find_cycles(&order, |node| edges.get(node).cloned().unwrap_or_default()) {
        let index = known.get(cycle.from).copied().unwrap_or_default();
        out.push(
            Finding::error(
                ErrorCode::CircularReference,
                join_path(&index_path("technologies", index), "parents"),
                format!(
                    "Technology '{}' closes a cycle through parent '{}'",
                    cycle.from, cycle.to
                ),
            )
            .with_details(json!({ "from": cycle.from, "to": cycle.to })),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(snapshot: CatalogSnapshot<'_>) -> Vec<Finding> {
        let mut out = Findings::new();
        validate_relations(&snapshot, &mut out);
        out.into_vec()
    }

    #[test]
    fn unresolved_part_references_are_errors() {
        let parts = vec![json!({
            "id": "tank",
            "resources": [{"type": "LiquidFuel"}, {"type": "Oxidiser"}],
            "techRequired": "rocketry"
        })];
        let resources = vec![json!({"id": "LiquidFuel"}), json!({"id": "Oxidizer"})];
        let findings = run(CatalogSnapshot {
            parts: &parts,
            resources: &resources,
            ..CatalogSnapshot::default()
        });

        let paths: Vec<&str> = findings.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["parts[0].resources[1].type", "parts[0].techRequired"]);
        assert!(findings[0].message.contains("Did you mean 'Oxidizer'?"));
    }

    #[test]
    fn mutual_parents_flag_both_bodies() {
        let bodies = vec![
            json!({"id": "a", "parent": "b"}),
            json!({"id": "b", "parent": "a"}),
            json!({"id": "c", "parent": "a"}),
        ];
        let findings = run(CatalogSnapshot {
            celestial_bodies: &bodies,
            ..CatalogSnapshot::default()
        });
        let circular: Vec<&str> = findings
            .iter()
            .filter(|f| f.code == ErrorCode::CircularReference)
            .map(|f| f.path.as_str())
            .collect();
        assert_eq!(circular, vec!["celestialBodies[0].parent", "celestialBodies[1].parent"]);
    }

    #[test]
    fn tech_cycle_reported_where_closed() {
        let techs = vec![
            json!({"id": "start", "parents": []}),
            json!({"id": "a", "parents": ["start", "c"]}),
            json!({"id": "b", "parents": ["a"]}),
            json!({"id": "c", "parents": ["b", "ghost"]}),
        ];
        let findings = run(CatalogSnapshot {
            technologies: &techs,
            ..CatalogSnapshot::default()
        });

        let missing: Vec<&Finding> = findings
            .iter()
            .filter(|f| f.code == ErrorCode::ReferenceError)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].path, "technologies[3].parents[1]");
        assert_eq!(missing[0].severity, crate::validation::Severity::Warning);

        let cycles: Vec<&Finding> = findings
            .iter()
            .filter(|f| f.code == ErrorCode::CircularReference)
            .collect();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].path, "technologies[2].parents");
    }

    #[test]
    fn dangling_unlock_is_warning() {
        let techs = vec![json!({"id": "basics", "partUnlocks": ["pod", "ghost"]})];
        let parts = vec![json!({"id": "pod"})];
        let findings = run(CatalogSnapshot {
            parts: &parts,
            technologies: &techs,
            ..CatalogSnapshot::default()
        });
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, "technologies[0].partUnlocks[1]");
    }
}
