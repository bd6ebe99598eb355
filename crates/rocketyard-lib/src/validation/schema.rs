//! Static schema tables: required fields, field types and auto-fix defaults
//! per entity type, plus the field-level checks shared by the validators.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::finding::{ErrorCode, Finding, Findings};
use crate::error::{did_you_mean, suggest};
use crate::safe_access::{get_present, type_name};

/// Kind of record a validator is dispatched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Part,
    Resource,
    CelestialBody,
    Technology,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Part,
        EntityType::Resource,
        EntityType::CelestialBody,
        EntityType::Technology,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Part => "part",
            EntityType::Resource => "resource",
            EntityType::CelestialBody => "celestial_body",
            EntityType::Technology => "technology",
        }
    }

    /// Accepts the canonical names plus the `celestialBody` and `tech` aliases.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "part" => Some(EntityType::Part),
            "resource" => Some(EntityType::Resource),
            "celestial_body" | "celestialBody" => Some(EntityType::CelestialBody),
            "technology" | "tech" => Some(EntityType::Technology),
            _ => None,
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            EntityType::Part => &["id", "name", "category", "mass", "cost"],
            EntityType::Resource => &["id", "name", "density", "flowMode"],
            EntityType::CelestialBody => &["id", "name", "type", "physical"],
            EntityType::Technology => &["id", "title", "cost"],
        }
    }

    pub fn field_types(self) -> &'static [(&'static str, FieldKind)] {
        use FieldKind::*;
        match self {
            EntityType::Part => &[
                ("id", String),
                ("name", String),
                ("category", String),
                ("mass", Object),
                ("cost", Number),
                ("attachNodes", Array),
                ("attachRules", Object),
                ("resources", Array),
                ("modules", Array),
                ("techRequired", String),
                ("size", String),
                ("engineType", String),
                ("thrust", Object),
                ("isp", Object),
                ("propellants", Array),
                ("tankType", String),
                ("volume", Number),
            ],
            EntityType::Resource => &[
                ("id", String),
                ("name", String),
                ("density", Number),
                ("unitCost", Number),
                ("transferable", Boolean),
                ("flowMode", String),
                ("color", Array),
                ("specificEnergy", Number),
            ],
            EntityType::CelestialBody => &[
                ("id", String),
                ("name", String),
                ("type", String),
                ("physical", Object),
                ("parent", String),
                ("orbit", Object),
                ("atmosphere", Object),
            ],
            EntityType::Technology => &[
                ("id", String),
                ("title", String),
                ("cost", Number),
                ("parents", Array),
                ("partUnlocks", Array),
            ],
        }
    }

    /// Values merged into missing fields by auto-fix.
    pub fn defaults(self) -> &'static Value {
        match self {
            EntityType::Part => &PART_DEFAULTS,
            EntityType::Resource => &RESOURCE_DEFAULTS,
            EntityType::CelestialBody => &BODY_DEFAULTS,
            EntityType::Technology => &TECHNOLOGY_DEFAULTS,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static PART_DEFAULTS: Lazy<Value> = Lazy::new(|| {
    json!({
        "mass": { "dry": 0.0, "wet": 0.0 },
        "cost": 0.0,
        "attachNodes": [],
        "attachRules": { "stack": true, "srfAttach": true, "allowCollision": false },
        "resources": [],
        "modules": []
    })
});

static RESOURCE_DEFAULTS: Lazy<Value> = Lazy::new(|| {
    json!({
        "unitCost": 0.0,
        "transferable": true,
        "flowMode": "STAGE_PRIORITY_FLOW",
        "color": [1.0, 1.0, 1.0]
    })
});

static BODY_DEFAULTS: Lazy<Value> = Lazy::new(|| {
    json!({
        "physical": { "radius": 0.0, "mass": 0.0, "gravity": 0.0 },
        "atmosphere": { "present": false }
    })
});

static TECHNOLOGY_DEFAULTS: Lazy<Value> = Lazy::new(|| {
    json!({
        "cost": 0.0,
        "parents": [],
        "partUnlocks": []
    })
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl FieldKind {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Object => value.is_object(),
            FieldKind::Array => value.is_array(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
        }
    }
}

pub(crate) fn check_required(entity: &Map<String, Value>, kind: EntityType, out: &mut Findings) {
    for field in kind.required_fields() {
        if entity.get(*field).is_none_or(Value::is_null) {
            out.error(
                ErrorCode::RequiredFieldMissing,
                *field,
                format!("Required field '{field}' is missing"),
            );
        }
    }
}

pub(crate) fn check_types(entity: &Map<String, Value>, kind: EntityType, out: &mut Findings) {
    for (field, expected) in kind.field_types() {
        let Some(value) = entity.get(*field).filter(|v| !v.is_null()) else {
            continue;
        };
        if !expected.matches(value) {
            out.error(
                ErrorCode::InvalidType,
                *field,
                format!(
                    "Field '{field}' must be a {}, got {}",
                    expected.as_str(),
                    type_name(value)
                ),
            );
        }
    }

    if entity.get("id").and_then(Value::as_str).is_some_and(|id| id.trim().is_empty()) {
        out.error(ErrorCode::InvalidValue, "id", "Field 'id' must not be empty");
    }
}

/// Read a number at `path`, reporting a missing (when `required`) or
/// non-numeric value.
pub(crate) fn number_at(entity: &Value, path: &str, required: bool, out: &mut Findings) -> Option<f64> {
    match get_present(entity, path) {
        None => {
            if required {
                out.error(
                    ErrorCode::RequiredFieldMissing,
                    path,
                    format!("Required field '{path}' is missing"),
                );
            }
            None
        }
        Some(value) => match value.as_f64() {
            Some(number) => Some(number),
            None => {
                out.error(
                    ErrorCode::InvalidType,
                    path,
                    format!("Field '{path}' must be a number, got {}", type_name(value)),
                );
                None
            }
        },
    }
}

pub(crate) fn non_negative(value: f64, path: &str, out: &mut Findings) {
    if value < 0.0 || !value.is_finite() {
        out.error(
            ErrorCode::InvalidValue,
            path,
            format!("Field '{path}' must be a non-negative number, got {value}"),
        );
    }
}

pub(crate) fn positive(value: f64, path: &str, out: &mut Findings) {
    if value <= 0.0 || !value.is_finite() {
        out.error(
            ErrorCode::InvalidValue,
            path,
            format!("Field '{path}' must be greater than 0, got {value}"),
        );
    }
}

/// Read exactly three numbers at `path`.
pub(crate) fn vector3_at(entity: &Value, path: &str, required: bool, out: &mut Findings) -> Option<[f64; 3]> {
    let Some(value) = get_present(entity, path) else {
        if required {
            out.error(
                ErrorCode::RequiredFieldMissing,
                path,
                format!("Required field '{path}' is missing"),
            );
        }
        return None;
    };

    let Some(items) = value.as_array() else {
        out.error(
            ErrorCode::InvalidType,
            path,
            format!("Field '{path}' must be an array of 3 numbers, got {}", type_name(value)),
        );
        return None;
    };

    let numbers: Vec<f64> = items.iter().filter_map(Value::as_f64).collect();
    if items.len() != 3 || numbers.len() != 3 {
        out.error(
            ErrorCode::InvalidValue,
            path,
            format!("Field '{path}' must contain exactly 3 numbers"),
        );
        return None;
    }
    Some([numbers[0], numbers[1], numbers[2]])
}

/// Report `value` as outside the allowed set, suggesting close spellings.
pub(crate) fn unknown_variant<'a, I>(value: &str, path: &str, allowed: I, out: &mut Findings)
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let suggestions = suggest(value, allowed.clone());
    let listed: Vec<&str> = allowed.into_iter().collect();
    out.push(
        Finding::error(
            ErrorCode::InvalidValue,
            path,
            format!("Invalid {path} '{value}'{}", did_you_mean(&suggestions)),
        )
        .with_details(json!({ "allowed": listed })),
    );
}
