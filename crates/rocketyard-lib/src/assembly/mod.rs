//! Rocket assembly: placed parts, the directed connection graph between
//! their attach nodes, and change notifications.
//!
//! - [`assembler`] - [`RocketAssembler`] and its mutators
//! - [`structure`] - Structure tree and stability heuristics
//! - [`events`] - Notifications delivered to subscribers after each commit
//!
//! The graph invariants hold after every public call: every connection
//! references existing instances, no attach node is used twice, and
//! following parent -> child edges never returns to the start.

pub mod assembler;
pub mod events;
pub mod structure;

pub use assembler::{
    AssemblyError, Connection, NodeRef, PartInstance, RocketAssembler, DEFAULT_CHILD_NODE,
    DEFAULT_PARENT_NODE,
};
pub use events::{AssemblyEvent, SubscriptionId, UpdateKind};
pub use structure::{StructureIssue, StructureIssueCode, StructureNode, StructureReport};

use std::sync::{Arc, Mutex};

/// One rocket shared across threads. Every mutation holds the lock for its
/// whole check-then-commit sequence.
pub type SharedAssembler = Arc<Mutex<RocketAssembler>>;

/// Wrap an assembler for shared use.
pub fn shared(assembler: RocketAssembler) -> SharedAssembler {
    Arc::new(Mutex::new(assembler))
}
