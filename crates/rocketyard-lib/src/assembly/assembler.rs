use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::events::{AssemblyEvent, EventBus, SubscriptionId, UpdateKind};
use crate::catalog::{Catalog, PartCategory, PartDefinition};
use crate::config::PhysicsConfig;
use crate::error::{did_you_mean, suggest};
use crate::graph::collect_reachable;
use crate::physics::{self, EngineStats, MassProfile, PerformanceReport};

/// Attach node used on the child when none is given.
pub const DEFAULT_CHILD_NODE: &str = "bottom";
/// Attach node used on the parent when none is given.
pub const DEFAULT_PARENT_NODE: &str = "top";

/// A part placed in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartInstance {
    pub id: String,
    pub part_id: String,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
}

/// One end of a connection: an attach node on a placed part.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub instance_id: String,
    pub node_id: String,
}

/// Directed parent -> child joint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub parent: NodeRef,
    pub child: NodeRef,
}

impl Connection {
    pub fn touches(&self, instance_id: &str) -> bool {
        self.parent.instance_id == instance_id || self.child.instance_id == instance_id
    }

    fn uses_node(&self, instance_id: &str, node_id: &str) -> bool {
        (self.parent.instance_id == instance_id && self.parent.node_id == node_id)
            || (self.child.instance_id == instance_id && self.child.node_id == node_id)
    }
}

/// Why a mutation was rejected. A rejected mutation changes nothing and
/// emits nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("part instance not found: {id}")]
    InstanceNotFound { id: String },

    #[error("attach node '{node_id}' on '{instance_id}' is already in use")]
    NodeOccupied { instance_id: String, node_id: String },

    #[error("cannot connect '{id}' to itself")]
    SelfConnection { id: String },

    #[error("connecting '{child}' under '{parent}' would create a cycle")]
    WouldCreateCycle { child: String, parent: String },

    #[error("no connection from '{parent}' to '{child}'")]
    ConnectionNotFound { child: String, parent: String },

    #[error("part instance id already in use: {id}")]
    DuplicateInstance { id: String },

    #[error("unknown part: {part_id}{}", did_you_mean(.suggestions))]
    UnknownPart {
        part_id: String,
        suggestions: Vec<String>,
    },
}

/// Owns one rocket's part/connection graph.
///
/// All mutation goes through the methods below. Each validates its
/// preconditions first, then commits, then notifies subscribers, so a
/// subscriber never sees a half-applied change.
#[derive(Debug)]
pub struct RocketAssembler {
    catalog: Arc<Catalog>,
    instances: Vec<PartInstance>,
    connections: Vec<Connection>,
    next_instance: u64,
    events: EventBus,
}

impl RocketAssembler {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            instances: Vec::new(),
            connections: Vec::new(),
            next_instance: 0,
            events: EventBus::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Register a callback for every committed change.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&AssemblyEvent) + Send + 'static,
    {
        self.events.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Place a part. When `instance_id` is `None` an id of the form `part-N`
    /// is generated. Returns the instance id.
    pub fn add_instance(
        &mut self,
        instance_id: Option<&str>,
        part_id: &str,
        position: [f64; 3],
        rotation: [f64; 3],
    ) -> Result<String, AssemblyError> {
        if self.catalog.part(part_id).is_none() {
            let error = AssemblyError::UnknownPart {
                part_id: part_id.to_string(),
                suggestions: suggest(part_id, self.catalog.part_ids().iter().map(String::as_str)),
            };
            warn!(%error, "rejected add_instance");
            return Err(error);
        }

        let id = match instance_id {
            Some(id) if self.instance(id).is_some() => {
                let error = AssemblyError::DuplicateInstance { id: id.to_string() };
                warn!(%error, "rejected add_instance");
                return Err(error);
            }
            Some(id) => id.to_string(),
            None => self.generate_id(),
        };

        self.instances.push(PartInstance {
            id: id.clone(),
            part_id: part_id.to_string(),
            position,
            rotation,
        });
        debug!(instance = %id, part = part_id, "added part instance");

        self.emit(AssemblyEvent::PartAdded {
            instance_id: id.clone(),
            part_id: part_id.to_string(),
        });
        self.emit(AssemblyEvent::RocketUpdated {
            kind: UpdateKind::Structure,
        });
        Ok(id)
    }

    fn generate_id(&mut self) -> String {
        loop {
            self.next_instance += 1;
            let candidate = format!("part-{}", self.next_instance);
            if self.instance(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Remove an instance and every connection touching it.
    ///
    /// Emits `part:removed`, then one `connection:removed` per dropped edge,
    /// then a single `rocket:updated(structure)` if any edge was dropped.
    pub fn remove_instance(&mut self, instance_id: &str) -> Result<PartInstance, AssemblyError> {
        let index = self.index_of(instance_id)?;
        let instance = self.instances.remove(index);

        let (removed, kept): (Vec<Connection>, Vec<Connection>) = std::mem::take(&mut self.connections)
            .into_iter()
            .partition(|connection| connection.touches(instance_id));
        self.connections = kept;
        debug!(
            instance = instance_id,
            connections = removed.len(),
            "removed part instance"
        );

        self.emit(AssemblyEvent::PartRemoved {
            instance_id: instance_id.to_string(),
        });
        for connection in &removed {
            self.emit(AssemblyEvent::ConnectionRemoved {
                connection: connection.clone(),
            });
        }
        if !removed.is_empty() {
            self.emit(AssemblyEvent::RocketUpdated {
                kind: UpdateKind::Structure,
            });
        }
        Ok(instance)
    }

    /// Attach `child_id` beneath `parent_id`.
    ///
    /// Fails without mutating when either instance is missing, either node is
    /// already used by another connection, the two ids are equal, or
    /// `parent_id` is already a descendant of `child_id`.
    pub fn connect(
        &mut self,
        child_id: &str,
        parent_id: &str,
        child_node: &str,
        parent_node: &str,
    ) -> Result<(), AssemblyError> {
        if let Err(error) = self.check_connect(child_id, parent_id, child_node, parent_node) {
            warn!(child = child_id, parent = parent_id, %error, "rejected connection");
            return Err(error);
        }

        let connection = Connection {
            parent: NodeRef {
                instance_id: parent_id.to_string(),
                node_id: parent_node.to_string(),
            },
            child: NodeRef {
                instance_id: child_id.to_string(),
                node_id: child_node.to_string(),
            },
        };
        self.connections.push(connection.clone());
        debug!(child = child_id, parent = parent_id, "connected parts");

        self.emit(AssemblyEvent::ConnectionCreated { connection });
        self.emit(AssemblyEvent::RocketUpdated {
            kind: UpdateKind::Structure,
        });
        Ok(())
    }

    /// [`connect`](Self::connect) using the `bottom` node of the child and
    /// the `top` node of the parent.
    pub fn connect_stack(&mut self, child_id: &str, parent_id: &str) -> Result<(), AssemblyError> {
        self.connect(child_id, parent_id, DEFAULT_CHILD_NODE, DEFAULT_PARENT_NODE)
    }

    fn check_connect(
        &self,
        child_id: &str,
        parent_id: &str,
        child_node: &str,
        parent_node: &str,
    ) -> Result<(), AssemblyError> {
        if child_id == parent_id {
            return Err(AssemblyError::SelfConnection {
                id: child_id.to_string(),
            });
        }
        self.index_of(child_id)?;
        self.index_of(parent_id)?;

        for (instance_id, node_id) in [(parent_id, parent_node), (child_id, child_node)] {
            if self.connections.iter().any(|c| c.uses_node(instance_id, node_id)) {
                return Err(AssemblyError::NodeOccupied {
                    instance_id: instance_id.to_string(),
                    node_id: node_id.to_string(),
                });
            }
        }

        let descendants = collect_reachable(child_id.to_string(), |node| {
            self.children_of(node)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        });
        if descendants.contains(parent_id) {
            return Err(AssemblyError::WouldCreateCycle {
                child: child_id.to_string(),
                parent: parent_id.to_string(),
            });
        }
        Ok(())
    }

    /// Remove the first connection from `parent_id` to `child_id`.
    pub fn disconnect(&mut self, child_id: &str, parent_id: &str) -> Result<Connection, AssemblyError> {
        let Some(index) = self.connections.iter().position(|c| {
            c.child.instance_id == child_id && c.parent.instance_id == parent_id
        }) else {
            let error = AssemblyError::ConnectionNotFound {
                child: child_id.to_string(),
                parent: parent_id.to_string(),
            };
            warn!(%error, "rejected disconnect");
            return Err(error);
        };

        let connection = self.connections.remove(index);
        debug!(child = child_id, parent = parent_id, "disconnected parts");

        self.emit(AssemblyEvent::ConnectionRemoved {
            connection: connection.clone(),
        });
        self.emit(AssemblyEvent::RocketUpdated {
            kind: UpdateKind::Structure,
        });
        Ok(connection)
    }

    pub fn move_instance(&mut self, instance_id: &str, position: [f64; 3]) -> Result<(), AssemblyError> {
        let index = self.index_of(instance_id)?;
        self.instances[index].position = position;

        self.emit(AssemblyEvent::PartMoved {
            instance_id: instance_id.to_string(),
            position,
        });
        self.emit(AssemblyEvent::RocketUpdated {
            kind: UpdateKind::Visual,
        });
        Ok(())
    }

    pub fn rotate_instance(&mut self, instance_id: &str, rotation: [f64; 3]) -> Result<(), AssemblyError> {
        let index = self.index_of(instance_id)?;
        self.instances[index].rotation = rotation;

        self.emit(AssemblyEvent::PartRotated {
            instance_id: instance_id.to_string(),
            rotation,
        });
        self.emit(AssemblyEvent::RocketUpdated {
            kind: UpdateKind::Visual,
        });
        Ok(())
    }

    /// Remove every instance and connection.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.connections.clear();
        debug!("cleared rocket");

        self.emit(AssemblyEvent::RocketCleared);
        self.emit(AssemblyEvent::RocketUpdated {
            kind: UpdateKind::Structure,
        });
    }

    fn emit(&mut self, event: AssemblyEvent) {
        self.events.emit(&event);
    }

    fn index_of(&self, instance_id: &str) -> Result<usize, AssemblyError> {
        self.instances
            .iter()
            .position(|i| i.id == instance_id)
            .ok_or_else(|| AssemblyError::InstanceNotFound {
                id: instance_id.to_string(),
            })
    }

    pub fn instance(&self, instance_id: &str) -> Option<&PartInstance> {
        self.instances.iter().find(|i| i.id == instance_id)
    }

    /// Placed parts in insertion order.
    pub fn instances(&self) -> &[PartInstance] {
        &self.instances
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn children_of(&self, instance_id: &str) -> Vec<&str> {
        self.connections
            .iter()
            .filter(|c| c.parent.instance_id == instance_id)
            .map(|c| c.child.instance_id.as_str())
            .collect()
    }

    pub fn parent_of(&self, instance_id: &str) -> Option<&str> {
        self.connections
            .iter()
            .find(|c| c.child.instance_id == instance_id)
            .map(|c| c.parent.instance_id.as_str())
    }

    /// Number of connections touching `instance_id`.
    pub fn connection_count(&self, instance_id: &str) -> usize {
        self.connections.iter().filter(|c| c.touches(instance_id)).count()
    }

    pub fn part_for(&self, instance_id: &str) -> Option<&PartDefinition> {
        self.instance(instance_id)
            .and_then(|instance| self.catalog.part(&instance.part_id))
    }

    fn placed_parts(&self) -> impl Iterator<Item = &PartDefinition> {
        self.instances
            .iter()
            .filter_map(|instance| self.catalog.part(&instance.part_id))
    }

    /// Sum of fully-loaded part masses in kilograms.
    pub fn total_mass(&self) -> f64 {
        self.placed_parts().map(|p| p.mass.wet).sum()
    }

    /// Mass once all propellant is burned.
    pub fn total_dry_mass(&self) -> f64 {
        physics::dry_mass(&self.mass_profiles())
    }

    pub fn total_cost(&self) -> f64 {
        self.placed_parts().map(|p| p.cost).sum()
    }

    pub fn mass_profiles(&self) -> Vec<MassProfile> {
        self.placed_parts().map(MassProfile::of).collect()
    }

    /// Figures for every placed engine with complete thrust and ISP data.
    pub fn engine_stats(&self) -> Vec<EngineStats> {
        self.placed_parts()
            .filter_map(PartDefinition::engine_spec)
            .map(|spec| EngineStats::from_spec(&spec))
            .collect()
    }

    /// Performance of the current rocket carrying `payload_mass` kilograms.
    /// Payload counts as non-propellant mass.
    pub fn performance(
        &self,
        config: &PhysicsConfig,
        payload_mass: f64,
        altitude: f64,
    ) -> PerformanceReport {
        let mut profiles = self.mass_profiles();
        let payload_mass = payload_mass.max(0.0);
        if payload_mass > 0.0 {
            profiles.push(MassProfile::new(PartCategory::Payload, payload_mass, payload_mass));
        }
        let total_mass = self.total_mass() + payload_mass;
        physics::performance_summary(&profiles, &self.engine_stats(), total_mass, altitude, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_catalog;
    use std::sync::Mutex;

    fn assembler() -> RocketAssembler {
        RocketAssembler::new(Arc::new(sample_catalog()))
    }

    #[test]
    fn generated_ids_are_sequential_and_skip_taken() {
        let mut rocket = assembler();
        rocket
            .add_instance(Some("part-2"), "tank", [0.0; 3], [0.0; 3])
            .expect("explicit id");
        assert_eq!(rocket.add_instance(None, "tank", [0.0; 3], [0.0; 3]), Ok("part-1".to_string()));
        assert_eq!(rocket.add_instance(None, "tank", [0.0; 3], [0.0; 3]), Ok("part-3".to_string()));
    }

    #[test]
    fn rejects_unknown_part_with_suggestion() {
        let mut rocket = assembler();
        let err = rocket
            .add_instance(None, "tnk", [0.0; 3], [0.0; 3])
            .expect_err("unknown part");
        assert!(matches!(err, AssemblyError::UnknownPart { .. }));
        assert!(rocket.is_empty());
    }

    #[test]
    fn occupied_node_is_rejected() {
        let mut rocket = assembler();
        let pod = rocket.add_instance(Some("pod"), "pod", [0.0; 3], [0.0; 3]).expect("pod");
        let a = rocket.add_instance(Some("a"), "tank", [0.0; 3], [0.0; 3]).expect("a");
        let b = rocket.add_instance(Some("b"), "tank", [0.0; 3], [0.0; 3]).expect("b");

        rocket.connect_stack(&a, &pod).expect("first joint");
        let err = rocket.connect_stack(&b, &pod).expect_err("pod top is taken");
        assert_eq!(
            err,
            AssemblyError::NodeOccupied {
                instance_id: "pod".to_string(),
                node_id: "top".to_string()
            }
        );
        assert_eq!(rocket.connections().len(), 1);
    }

    #[test]
    fn mutation_events_follow_commit() {
        let mut rocket = assembler();
        let names = std::sync::Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&names);
        rocket.subscribe(move |event| sink.lock().expect("lock").push(event.to_string()));

        let pod = rocket.add_instance(None, "pod", [0.0; 3], [0.0; 3]).expect("pod");
        rocket.move_instance(&pod, [0.0, 1.0, 0.0]).expect("move");

        assert_eq!(
            *names.lock().expect("lock"),
            vec![
                "part:added",
                "rocket:updated(Structure)",
                "part:moved",
                "rocket:updated(Visual)"
            ]
        );
        assert_eq!(rocket.instance(&pod).map(|i| i.position), Some([0.0, 1.0, 0.0]));
    }

    #[test]
    fn payload_counts_as_dry_mass() {
        let mut rocket = assembler();
        rocket.add_instance(None, "tank", [0.0; 3], [0.0; 3]).expect("tank");
        rocket.add_instance(None, "engine", [0.0; 3], [0.0; 3]).expect("engine");

        let config = PhysicsConfig::default();
        let empty = rocket.performance(&config, 0.0, 0.0);
        let loaded = rocket.performance(&config, 500.0, 0.0);

        assert_eq!(loaded.total_mass, empty.total_mass + 500.0);
        assert_eq!(loaded.fuel_mass, empty.fuel_mass);
        assert!(loaded.delta_v < empty.delta_v);
    }
}
