//! Rocketyard library entry points.
//!
//! This crate holds the correctness core of the rocket builder: the part
//! catalog, the assembly graph that connects placed parts, flight-performance
//! physics, and the schema/relation validator for catalog records. Consumers
//! (the CLI, a rendering layer) should only depend on what is exported here
//! instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod assembly;
pub mod catalog;
pub mod config;
pub mod error;
pub mod graph;
pub mod physics;
pub mod safe_access;
pub mod validation;

pub use assembly::{
    AssemblyError, AssemblyEvent, Connection, PartInstance, RocketAssembler, SharedAssembler,
    StructureNode, StructureReport,
};
pub use catalog::{Catalog, PartCategory, PartDefinition, RawCatalog};
pub use config::{AccuracyLevel, AppConfig, PhysicsConfig, ReferenceBody, StructureConfig};
pub use error::{Error, Result};
pub use physics::{
    calculate_burn_time, calculate_delta_v, calculate_efficiency, calculate_twr,
    estimate_max_height, EngineStats, MassProfile, PerformanceReport,
};
pub use validation::{
    CatalogReport, DataValidator, EntityType, ErrorCode, Finding, Severity, ValidationOptions,
    ValidationResult,
};
