//! Catalog data: parts, resources, celestial bodies and technologies.
//!
//! - [`part`] - Part definitions and their category extensions
//! - [`resource`] - Resource definitions and flow modes
//! - [`celestial`] - Celestial bodies, orbits and atmospheres
//! - [`technology`] - Technology tree nodes
//!
//! Catalog documents are JSON objects with up to four arrays:
//!
//! ```json
//! { "parts": [], "resources": [], "celestialBodies": [], "technologies": [] }
//! ```
//!
//! Loading happens in two steps. [`RawCatalog`] keeps the untyped records so
//! malformed content can be validated and reported instead of rejected, and
//! [`Catalog`] decodes them into typed definitions for the assembler and the
//! physics module.

pub mod celestial;
pub mod part;
pub mod resource;
pub mod technology;

pub use celestial::{Atmosphere, BodyType, CelestialBody, Orbit, PhysicalProperties};
pub use part::{
    AttachNode, AttachRules, CommandSpec, EngineSpec, FuelTankSpec, PartCategory,
    PartDefinition, PartExtension, PartMass, PartModule, PartSize, PerformancePair, Propellant,
    ResourceSlot,
};
pub use resource::{FlowMode, ResourceDefinition};
pub use technology::TechNode;

use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::{suggest, Error, Result};
use crate::validation::{
    CatalogReport, CatalogSnapshot, DataValidator, EntityType, ValidationOptions,
};

const PARTS_KEY: &str = "parts";
const RESOURCES_KEY: &str = "resources";
const BODIES_KEY: &str = "celestialBodies";
const TECHNOLOGIES_KEY: &str = "technologies";

/// Untyped catalog records, exactly as supplied by the data loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCatalog {
    pub parts: Vec<Value>,
    pub resources: Vec<Value>,
    pub celestial_bodies: Vec<Value>,
    pub technologies: Vec<Value>,
}

impl RawCatalog {
    /// Load raw records from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::CatalogNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Load raw records from any reader yielding a JSON document.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let document: Value = serde_json::from_reader(reader)?;
        Self::from_value(document)
    }

    pub fn from_value(document: Value) -> Result<Self> {
        let Value::Object(mut root) = document else {
            return Err(Error::UnsupportedCatalog {
                message: "top-level value must be an object".to_string(),
            });
        };

        let mut take = |key: &str| -> Result<Vec<Value>> {
            match root.remove(key) {
                None | Some(Value::Null) => Ok(Vec::new()),
                Some(Value::Array(items)) => Ok(items),
                Some(_) => Err(Error::UnsupportedCatalog {
                    message: format!("'{key}' must be an array"),
                }),
            }
        };

        Ok(Self {
            parts: take(PARTS_KEY)?,
            resources: take(RESOURCES_KEY)?,
            celestial_bodies: take(BODIES_KEY)?,
            technologies: take(TECHNOLOGIES_KEY)?,
        })
    }

    /// Borrow every collection for cross-entity checks.
    pub fn snapshot(&self) -> CatalogSnapshot<'_> {
        CatalogSnapshot {
            parts: &self.parts,
            resources: &self.resources,
            celestial_bodies: &self.celestial_bodies,
            technologies: &self.technologies,
        }
    }

    /// Validate every record and the references between them.
    pub fn validate(&self, validator: &DataValidator, options: &ValidationOptions) -> CatalogReport {
        let parts = validator.validate_many(&self.parts, EntityType::Part, options);
        let resources = validator.validate_many(&self.resources, EntityType::Resource, options);
        let celestial_bodies =
            validator.validate_many(&self.celestial_bodies, EntityType::CelestialBody, options);
        let technologies =
            validator.validate_many(&self.technologies, EntityType::Technology, options);
        let relations = validator.validate_relations(&self.snapshot(), options);

        CatalogReport::new(parts, resources, celestial_bodies, technologies, relations)
    }
}

/// Typed catalog keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    parts: HashMap<String, PartDefinition>,
    resources: HashMap<String, ResourceDefinition>,
    bodies: HashMap<String, CelestialBody>,
    technologies: HashMap<String, TechNode>,
    raw: RawCatalog,
    source: Option<PathBuf>,
}

impl Catalog {
    /// Load and decode a catalog from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = RawCatalog::from_path(path)?;
        let mut catalog = Self::from_raw(raw)?;
        catalog.source = Some(path.to_path_buf());
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_raw(RawCatalog::from_reader(reader)?)
    }

    pub fn from_value(document: Value) -> Result<Self> {
        Self::from_raw(RawCatalog::from_value(document)?)
    }

    /// Decode raw records. Fails on the first record that does not fit its
    /// typed form or whose id duplicates an earlier record of the same kind.
    pub fn from_raw(raw: RawCatalog) -> Result<Self> {
        let parts = decode_all::<PartDefinition>("part", &raw.parts, |p| &p.id)?;
        let resources = decode_all::<ResourceDefinition>("resource", &raw.resources, |r| &r.id)?;
        let bodies =
            decode_all::<CelestialBody>("celestial body", &raw.celestial_bodies, |b| &b.id)?;
        let technologies = decode_all::<TechNode>("technology", &raw.technologies, |t| &t.id)?;

        debug!(
            parts = parts.len(),
            resources = resources.len(),
            bodies = bodies.len(),
            technologies = technologies.len(),
            "decoded catalog"
        );

        Ok(Self {
            parts,
            resources,
            bodies,
            technologies,
            raw,
            source: None,
        })
    }

    pub fn part(&self, id: &str) -> Option<&PartDefinition> {
        self.parts.get(id)
    }

    /// Look up a part, producing an error with close-match suggestions.
    pub fn require_part(&self, id: &str) -> Result<&PartDefinition> {
        self.parts.get(id).ok_or_else(|| Error::UnknownPart {
            id: id.to_string(),
            suggestions: suggest(id, self.parts.keys().map(String::as_str)),
        })
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceDefinition> {
        self.resources.get(id)
    }

    pub fn body(&self, id: &str) -> Option<&CelestialBody> {
        self.bodies.get(id)
    }

    pub fn technology(&self, id: &str) -> Option<&TechNode> {
        self.technologies.get(id)
    }

    /// All parts sorted by id.
    pub fn parts_sorted(&self) -> Vec<&PartDefinition> {
        let mut parts: Vec<&PartDefinition> = self.parts.values().collect();
        parts.sort_by(|a, b| a.id.cmp(&b.id));
        parts
    }

    pub fn part_ids(&self) -> Vec<String> {
        self.parts_sorted().into_iter().map(|p| p.id.clone()).collect()
    }

    pub fn resource_ids(&self) -> Vec<String> {
        sorted_keys(&self.resources)
    }

    pub fn body_ids(&self) -> Vec<String> {
        sorted_keys(&self.bodies)
    }

    pub fn technology_ids(&self) -> Vec<String> {
        sorted_keys(&self.technologies)
    }

    /// The untyped records this catalog was decoded from.
    pub fn raw(&self) -> &RawCatalog {
        &self.raw
    }

    pub fn validate(&self, validator: &DataValidator, options: &ValidationOptions) -> CatalogReport {
        self.raw.validate(validator, options)
    }

    /// Get the source path if the catalog was loaded from a file.
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

fn decode_all<T>(
    kind: &'static str,
    records: &[Value],
    id_of: impl Fn(&T) -> &String,
) -> Result<HashMap<String, T>>
where
    T: DeserializeOwned,
{
    let mut decoded = HashMap::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        let item: T = serde_json::from_value(record.clone()).map_err(|err| Error::InvalidRecord {
            kind,
            id: record
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{index}")),
            message: err.to_string(),
        })?;
        let id = id_of(&item).clone();
        if decoded.contains_key(&id) {
            return Err(Error::DuplicateId { kind, id });
        }
        decoded.insert(id, item);
    }
    Ok(decoded)
}

fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_collections_default_to_empty() {
        let raw = RawCatalog::from_value(json!({"parts": []})).expect("loads");
        assert!(raw.resources.is_empty());
        assert!(raw.technologies.is_empty());
    }

    #[test]
    fn rejects_non_array_collections() {
        let err = RawCatalog::from_value(json!({"parts": {}})).expect_err("should reject");
        assert!(matches!(err, Error::UnsupportedCatalog { .. }));
    }

    #[test]
    fn rejects_duplicate_part_ids() {
        let part = json!({"id": "tank", "name": "Tank", "category": "fuel_tanks", "mass": {"dry": 1.0, "wet": 2.0}});
        let err = Catalog::from_value(json!({"parts": [part.clone(), part]}))
            .expect_err("duplicate ids rejected");
        match err {
            Error::DuplicateId { kind, id } => {
                assert_eq!(kind, "part");
                assert_eq!(id, "tank");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn require_part_suggests_close_ids() {
        let catalog = Catalog::from_value(json!({"parts": [
            {"id": "fuelTankSmall", "name": "Tank", "category": "fuel_tanks", "mass": {"dry": 1.0, "wet": 2.0}}
        ]}))
        .expect("loads");
        let err = catalog.require_part("fuelTankSmal").expect_err("unknown part");
        assert!(err.to_string().contains("Did you mean 'fuelTankSmall'?"));
    }
}
