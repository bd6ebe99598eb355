//! Deep checks for part records, with one sub-validator per category that
//! carries an extension (engines, fuel tanks, command modules).

use std::collections::HashSet;

use serde_json::{json, Value};

use super::finding::{ErrorCode, Finding, Findings};
use super::schema::{non_negative, number_at, positive, unknown_variant, vector3_at};
use crate::catalog::PartCategory;
use crate::safe_access::{
    get_f64, get_present, get_str, index_path, is_missing, join_path, type_name,
};

const ORIENTATION_TOLERANCE: f64 = 0.01;
const PROPELLANT_RATIO_TOLERANCE: f64 = 0.001;
const VOLUME_TOLERANCE: f64 = 0.01;

pub(crate) fn validate(entity: &Value, out: &mut Findings) {
    check_mass(entity, out);
    if let Some(cost) = entity.get("cost").and_then(Value::as_f64) {
        non_negative(cost, "cost", out);
    }
    check_attach_nodes(entity, out);
    check_attach_rules(entity, out);
    check_resources(entity, out);
    check_modules(entity, out);

    if get_str(entity, "techRequired").is_some_and(|t| t.trim().is_empty()) {
        out.error(
            ErrorCode::InvalidValue,
            "techRequired",
            "Field 'techRequired' must not be empty",
        );
    }

    let Some(raw_category) = get_str(entity, "category") else {
        return;
    };
    let Some(category) = PartCategory::parse(raw_category) else {
        unknown_variant(
            raw_category,
            "category",
            PartCategory::ALL.iter().map(|c| c.as_str()),
            out,
        );
        return;
    };

    match category {
        PartCategory::Engines => validate_engine(entity, out),
        PartCategory::FuelTanks => validate_fuel_tank(entity, out),
        PartCategory::Command => validate_command(entity, out),
        _ => {}
    }
}

fn check_mass(entity: &Value, out: &mut Findings) {
    if !get_present(entity, "mass").is_some_and(Value::is_object) {
        return;
    }
    let dry = number_at(entity, "mass.dry", true, out);
    let wet = number_at(entity, "mass.wet", true, out);

    if let Some(dry) = dry {
        non_negative(dry, "mass.dry", out);
        if dry == 0.0 {
            out.warning(
                ErrorCode::UnusualValue,
                "mass.dry",
                "Dry mass of 0 is unusual for a physical part",
            );
        }
    }
    if let Some(wet) = wet {
        non_negative(wet, "mass.wet", out);
    }
    if let (Some(dry), Some(wet)) = (dry, wet) {
        if wet < dry {
            out.push(
                Finding::error(
                    ErrorCode::ConstraintViolation,
                    "mass.wet",
                    format!("Wet mass ({wet}) must not be less than dry mass ({dry})"),
                )
                .with_details(json!({ "dry": dry, "wet": wet })),
            );
        }
    }
}

fn check_attach_nodes(entity: &Value, out: &mut Findings) {
    let Some(nodes) = get_present(entity, "attachNodes").and_then(Value::as_array) else {
        return;
    };

    let mut seen = HashSet::new();
    for (index, node) in nodes.iter().enumerate() {
        let path = index_path("attachNodes", index);
        if !node.is_object() {
            out.error(
                ErrorCode::InvalidType,
                path.as_str(),
                format!("Attach node must be an object, got {}", type_name(node)),
            );
            continue;
        }

        match get_present(node, "id") {
            None => out.error(
                ErrorCode::RequiredFieldMissing,
                join_path(&path, "id"),
                "Attach node is missing its id",
            ),
            Some(Value::String(id)) => {
                if !seen.insert(id.as_str()) {
                    out.error(
                        ErrorCode::ConstraintViolation,
                        join_path(&path, "id"),
                        format!("Duplicate attach node id '{id}'"),
                    );
                }
            }
            Some(other) => out.error(
                ErrorCode::InvalidType,
                join_path(&path, "id"),
                format!("Attach node id must be a string, got {}", type_name(other)),
            ),
        }

        // Errors are reported at the node-relative locator, then re-rooted.
        let mut local = Findings::new();
        vector3_at(node, "position", true, &mut local);
        if let Some(orientation) = vector3_at(node, "orientation", false, &mut local) {
            let length = orientation.iter().map(|c| c * c).sum::<f64>().sqrt();
            if (length - 1.0).abs() > ORIENTATION_TOLERANCE {
                local.push(
                    Finding::warning(
                        ErrorCode::UnusualValue,
                        "orientation",
                        format!("Orientation should be a unit vector, length is {length:.3}"),
                    )
                    .with_details(json!({ "length": length })),
                );
            }
        }
        out.extend(local.into_vec().into_iter().map(|mut finding| {
            finding.path = join_path(&path, &finding.path);
            finding
        }));
    }
}

fn check_attach_rules(entity: &Value, out: &mut Findings) {
    let Some(rules) = get_present(entity, "attachRules").filter(|r| r.is_object()) else {
        return;
    };
    for field in ["stack", "srfAttach", "allowCollision"] {
        if let Some(value) = get_present(rules, field) {
            if !value.is_boolean() {
                out.error(
                    ErrorCode::InvalidType,
                    join_path("attachRules", field),
                    format!("Attach rule '{field}' must be a boolean, got {}", type_name(value)),
                );
            }
        }
    }
}

fn check_resources(entity: &Value, out: &mut Findings) {
    let Some(slots) = get_present(entity, "resources").and_then(Value::as_array) else {
        return;
    };

    for (index, slot) in slots.iter().enumerate() {
        let path = index_path("resources", index);
        if !slot.is_object() {
            out.error(
                ErrorCode::InvalidType,
                path.as_str(),
                format!("Resource slot must be an object, got {}", type_name(slot)),
            );
            continue;
        }

        match get_present(slot, "type") {
            None => out.error(
                ErrorCode::RequiredFieldMissing,
                join_path(&path, "type"),
                "Resource slot is missing its type",
            ),
            Some(value) if !value.is_string() => out.error(
                ErrorCode::InvalidType,
                join_path(&path, "type"),
                format!("Resource type must be a string, got {}", type_name(value)),
            ),
            Some(_) => {}
        }

        let amount_path = join_path(&path, "amount");
        let max_path = join_path(&path, "maxAmount");
        let amount = number_at(entity, &amount_path, true, out);
        let max_amount = number_at(entity, &max_path, true, out);
        if let Some(amount) = amount {
            non_negative(amount, &amount_path, out);
        }
        if let Some(max_amount) = max_amount {
            non_negative(max_amount, &max_path, out);
        }
        if let (Some(amount), Some(max_amount)) = (amount, max_amount) {
            if amount > max_amount {
                out.error(
                    ErrorCode::ConstraintViolation,
                    amount_path,
                    format!("Amount ({amount}) exceeds maxAmount ({max_amount})"),
                );
            }
        }
    }
}

fn check_modules(entity: &Value, out: &mut Findings) {
    let Some(modules) = get_present(entity, "modules").and_then(Value::as_array) else {
        return;
    };
    for (index, module) in modules.iter().enumerate() {
        let named = match module {
            Value::String(name) => !name.trim().is_empty(),
            Value::Object(map) => map.get("name").is_some_and(Value::is_string),
            _ => false,
        };
        if !named {
            out.error(
                ErrorCode::InvalidType,
                index_path("modules", index),
                "Module must be a name or an object with a string 'name'",
            );
        }
    }
}

fn validate_engine(entity: &Value, out: &mut Findings) {
    if is_missing(entity, "engineType") {
        out.info(
            ErrorCode::RecommendedFieldMissing,
            "engineType",
            "Engine has no engineType",
        );
    }

    for group in ["thrust", "isp"] {
        match get_present(entity, group) {
            None => out.error(
                ErrorCode::RequiredFieldMissing,
                group,
                format!("Engine is missing required field '{group}'"),
            ),
            Some(value) if value.is_object() => {
                let vacuum_path = join_path(group, "vacuum");
                let atmosphere_path = join_path(group, "atmosphere");
                if let Some(vacuum) = number_at(entity, &vacuum_path, true, out) {
                    positive(vacuum, &vacuum_path, out);
                }
                if let Some(atmosphere) = number_at(entity, &atmosphere_path, true, out) {
                    non_negative(atmosphere, &atmosphere_path, out);
                }
            }
            // Wrong shape is already reported by the type table.
            Some(_) => {}
        }
    }

    let isp_vacuum = get_f64(entity, "isp.vacuum");
    let isp_atmosphere = get_f64(entity, "isp.atmosphere");
    if let (Some(vacuum), Some(atmosphere)) = (isp_vacuum, isp_atmosphere) {
        if atmosphere > vacuum {
            out.warning(
                ErrorCode::UnusualValue,
                "isp.atmosphere",
                format!("Atmospheric ISP ({atmosphere}) exceeds vacuum ISP ({vacuum})"),
            );
        }
    }

    check_propellants(entity, out);
}

fn check_propellants(entity: &Value, out: &mut Findings) {
    let Some(propellants) = get_present(entity, "propellants") else {
        out.warning(
            ErrorCode::RecommendedFieldMissing,
            "propellants",
            "Engine does not list its propellants",
        );
        return;
    };
    let Some(propellants) = propellants.as_array() else {
        return;
    };

    let mut total = 0.0;
    for (index, propellant) in propellants.iter().enumerate() {
        let path = index_path("propellants", index);
        if !propellant.is_object() {
            out.error(
                ErrorCode::InvalidType,
                path.as_str(),
                format!("Propellant must be an object, got {}", type_name(propellant)),
            );
            continue;
        }
        if !get_present(propellant, "name").is_some_and(Value::is_string) {
            out.error(
                ErrorCode::RequiredFieldMissing,
                join_path(&path, "name"),
                "Propellant is missing its name",
            );
        }
        let ratio_path = join_path(&path, "ratio");
        if let Some(ratio) = number_at(entity, &ratio_path, true, out) {
            non_negative(ratio, &ratio_path, out);
            total += ratio;
        }
    }

    if !propellants.is_empty() && (total - 1.0).abs() > PROPELLANT_RATIO_TOLERANCE {
        out.push(
            Finding::error(
                ErrorCode::ConstraintViolation,
                "propellants",
                format!("Propellant ratios sum to {total:.4}, expected 1"),
            )
            .with_details(json!({ "sum": total })),
        );
    }
}

fn validate_fuel_tank(entity: &Value, out: &mut Findings) {
    if is_missing(entity, "tankType") {
        out.warning(
            ErrorCode::RecommendedFieldMissing,
            "tankType",
            "Fuel tank has no tankType",
        );
    }

    let slots = get_present(entity, "resources").and_then(Value::as_array);
    if slots.is_none_or(|s| s.is_empty()) {
        out.warning(
            ErrorCode::UnusualValue,
            "resources",
            "Fuel tank carries no resources",
        );
    }

    let Some(volume) = get_present(entity, "volume").and_then(Value::as_f64) else {
        return;
    };
    positive(volume, "volume", out);

    let capacity: f64 = slots
        .into_iter()
        .flatten()
        .filter_map(|slot| slot.get("maxAmount").and_then(Value::as_f64))
        .sum();
    if volume > 0.0 && capacity > 0.0 && ((volume - capacity).abs() / volume) > VOLUME_TOLERANCE {
        out.push(
            Finding::warning(
                ErrorCode::ConstraintViolation,
                "volume",
                format!("Volume ({volume}) does not match summed resource capacity ({capacity})"),
            )
            .with_details(json!({ "volume": volume, "capacity": capacity })),
        );
    }
}

fn validate_command(entity: &Value, out: &mut Findings) {
    match get_present(entity, "crewCapacity") {
        None => out.warning(
            ErrorCode::RecommendedFieldMissing,
            "crewCapacity",
            "Command part does not declare crewCapacity",
        ),
        Some(value) => match value.as_f64() {
            None => out.error(
                ErrorCode::InvalidType,
                "crewCapacity",
                format!("Field 'crewCapacity' must be a number, got {}", type_name(value)),
            ),
            Some(crew) if crew < 0.0 || crew.fract() != 0.0 => out.error(
                ErrorCode::InvalidValue,
                "crewCapacity",
                format!("Field 'crewCapacity' must be a non-negative integer, got {crew}"),
            ),
            Some(_) => {}
        },
    }

    let module_names: Vec<String> = get_present(entity, "modules")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|m| match m {
            Value::String(name) => Some(name.as_str()),
            Value::Object(map) => map.get("name").and_then(Value::as_str),
            _ => None,
        })
        .map(normalize_module_name)
        .collect();

    let expected = [
        ("sas", "a SAS module"),
        ("reactionwheel", "a reaction wheel module"),
        ("command", "a command module"),
    ];
    for (needle, label) in expected {
        if !module_names.iter().any(|name| name.contains(needle)) {
            out.warning(
                ErrorCode::RecommendedFieldMissing,
                "modules",
                format!("Command part should include {label}"),
            );
        }
    }

    let has_electric_charge = get_present(entity, "resources")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .any(|slot| slot.get("type").and_then(Value::as_str) == Some("ElectricCharge"));
    if !has_electric_charge {
        out.warning(
            ErrorCode::RecommendedFieldMissing,
            "resources",
            "Command part should carry ElectricCharge",
        );
    }
}

fn normalize_module_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Severity;

    fn run(entity: Value) -> Vec<Finding> {
        let mut out = Findings::new();
        validate(&entity, &mut out);
        out.into_vec()
    }

    fn paths(findings: &[Finding], code: ErrorCode) -> Vec<String> {
        findings
            .iter()
            .filter(|f| f.code == code)
            .map(|f| f.path.clone())
            .collect()
    }

    #[test]
    fn wet_below_dry_is_constraint_violation() {
        let findings = run(json!({"category": "structural", "mass": {"dry": 10.0, "wet": 5.0}}));
        assert_eq!(paths(&findings, ErrorCode::ConstraintViolation), vec!["mass.wet"]);
    }

    #[test]
    fn attach_node_problems_are_located() {
        let findings = run(json!({
            "category": "structural",
            "mass": {"dry": 1.0, "wet": 1.0},
            "attachNodes": [
                {"id": "top", "position": [0.0, 1.0, 0.0], "orientation": [0.0, 2.0, 0.0]},
                {"id": "top", "position": [0.0, -1.0]}
            ]
        }));
        assert_eq!(paths(&findings, ErrorCode::UnusualValue), vec!["attachNodes[0].orientation"]);
        assert_eq!(paths(&findings, ErrorCode::ConstraintViolation), vec!["attachNodes[1].id"]);
        assert_eq!(paths(&findings, ErrorCode::InvalidValue), vec!["attachNodes[1].position"]);
    }

    #[test]
    fn resource_amount_above_capacity() {
        let findings = run(json!({
            "category": "fuel_tanks",
            "tankType": "LF/OX",
            "mass": {"dry": 1.0, "wet": 2.0},
            "resources": [{"type": "LiquidFuel", "amount": 200.0, "maxAmount": 180.0}]
        }));
        assert_eq!(
            paths(&findings, ErrorCode::ConstraintViolation),
            vec!["resources[0].amount"]
        );
    }

    #[test]
    fn engine_propellant_ratios_must_sum_to_one() {
        let findings = run(json!({
            "category": "engines",
            "engineType": "LiquidFuel",
            "mass": {"dry": 1.0, "wet": 1.0},
            "thrust": {"vacuum": 215.0, "atmosphere": 168.0},
            "isp": {"vacuum": 320.0, "atmosphere": 250.0},
            "propellants": [{"name": "LiquidFuel", "ratio": 0.45}, {"name": "Oxidizer", "ratio": 0.5}]
        }));
        assert_eq!(paths(&findings, ErrorCode::ConstraintViolation), vec!["propellants"]);
    }

    #[test]
    fn engine_requires_thrust_and_positive_vacuum_isp() {
        let findings = run(json!({
            "category": "engines",
            "mass": {"dry": 1.0, "wet": 1.0},
            "isp": {"vacuum": 0.0, "atmosphere": 250.0},
            "propellants": [{"name": "LiquidFuel", "ratio": 1.0}]
        }));
        assert_eq!(paths(&findings, ErrorCode::RequiredFieldMissing), vec!["thrust"]);
        assert!(paths(&findings, ErrorCode::InvalidValue).contains(&"isp.vacuum".to_string()));
    }

    #[test]
    fn fuel_tank_volume_mismatch_warns() {
        let findings = run(json!({
            "category": "fuel_tanks",
            "tankType": "LF/OX",
            "mass": {"dry": 1.0, "wet": 2.0},
            "volume": 500.0,
            "resources": [
                {"type": "LiquidFuel", "amount": 180.0, "maxAmount": 180.0},
                {"type": "Oxidizer", "amount": 220.0, "maxAmount": 220.0}
            ]
        }));
        let mismatch: Vec<&Finding> = findings.iter().filter(|f| f.path == "volume").collect();
        assert_eq!(mismatch.len(), 1);
        assert_eq!(mismatch[0].severity, Severity::Warning);
    }

    #[test]
    fn command_part_expectations() {
        let findings = run(json!({
            "category": "command",
            "mass": {"dry": 840.0, "wet": 840.0},
            "crewCapacity": 1.5,
            "modules": ["ModuleCommand", "ModuleSAS", "ModuleReactionWheel"],
            "resources": [{"type": "ElectricCharge", "amount": 50.0, "maxAmount": 50.0}]
        }));
        assert_eq!(paths(&findings, ErrorCode::InvalidValue), vec!["crewCapacity"]);
        assert!(paths(&findings, ErrorCode::RecommendedFieldMissing).is_empty());
    }

    #[test]
    fn unknown_category_suggests_spelling() {
        let findings = run(json!({"category": "engine", "mass": {"dry": 1.0, "wet": 1.0}}));
        let invalid: Vec<&Finding> = findings
            .iter()
            .filter(|f| f.code == ErrorCode::InvalidValue)
            .collect();
        assert_eq!(invalid.len(), 1);
        assert!(invalid[0].message.contains("Did you mean"));
    }
}
