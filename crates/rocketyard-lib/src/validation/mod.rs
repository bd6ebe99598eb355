//! Schema and relation validation for catalog records.
//!
//! Records are validated in their untyped JSON form so malformed data can be
//! described precisely instead of failing deserialization. Per entity the
//! pipeline is:
//!
//! 1. a `null` entity short-circuits to one required-field-missing error
//! 2. optional auto-fix merges schema defaults into missing fields
//! 3. required-field and primitive type checks from [`schema`]
//! 4. type-specific deep checks (`part`, `resource`, `celestial`, `technology`)
//! 5. custom rules registered on the [`DataValidator`]
//! 6. result assembly: `maxErrors` truncation and severity filtering
//!
//! Cross-entity checks (dangling references, parent cycles) run separately
//! through [`DataValidator::validate_relations`].

mod celestial;
pub mod finding;
pub mod options;
mod part;
pub mod relations;
mod resource;
pub mod rules;
pub mod schema;
mod technology;
pub mod validator;

pub use finding::{ErrorCode, Finding, Findings, Severity, ValidationResult};
pub use options::ValidationOptions;
pub use relations::CatalogSnapshot;
pub use rules::{RuleContext, RuleOutcome, ValidationRule};
pub use schema::{EntityType, FieldKind};
pub use validator::{AutoFixReport, CacheStats, DataValidator};

use serde::Serialize;

/// Validation outcome for a whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogReport {
    pub valid: bool,
    pub parts: ValidationResult,
    pub resources: ValidationResult,
    pub celestial_bodies: ValidationResult,
    pub technologies: ValidationResult,
    pub relations: ValidationResult,
}

impl CatalogReport {
    pub fn new(
        parts: ValidationResult,
        resources: ValidationResult,
        celestial_bodies: ValidationResult,
        technologies: ValidationResult,
        relations: ValidationResult,
    ) -> Self {
        let valid = parts.valid
            && resources.valid
            && celestial_bodies.valid
            && technologies.valid
            && relations.valid;
        Self {
            valid,
            parts,
            resources,
            celestial_bodies,
            technologies,
            relations,
        }
    }

    /// Each section with the label used in reports.
    pub fn sections(&self) -> [(&'static str, &ValidationResult); 5] {
        [
            ("parts", &self.parts),
            ("resources", &self.resources),
            ("celestialBodies", &self.celestial_bodies),
            ("technologies", &self.technologies),
            ("relations", &self.relations),
        ]
    }

    pub fn error_count(&self) -> usize {
        self.sections().iter().map(|(_, r)| r.errors.len()).sum()
    }

    pub fn warning_count(&self) -> usize {
        self.sections().iter().map(|(_, r)| r.warnings.len()).sum()
    }
}
