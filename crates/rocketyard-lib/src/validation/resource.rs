use serde_json::{json, Value};

use super::finding::{ErrorCode, Finding, Findings};
use super::schema::{non_negative, unknown_variant};
use crate::catalog::FlowMode;
use crate::safe_access::{get_bool, get_f64, get_present, get_str, index_path, is_missing, type_name};

/// Plausible density range for propellants, in tonnes per unit.
const PROPELLANT_DENSITY_RANGE: std::ops::RangeInclusive<f64> = 0.00001..=0.05;
const PROPELLANTS: [&str; 5] = ["LiquidFuel", "Oxidizer", "MonoPropellant", "SolidFuel", "XenonGas"];

pub(crate) fn validate(entity: &Value, out: &mut Findings) {
    if let Some(density) = get_f64(entity, "density") {
        if density < 0.0 {
            out.error(
                ErrorCode::InvalidValue,
                "density",
                format!("Density must not be negative, got {density}"),
            );
        } else if density == 0.0 {
            out.warning(
                ErrorCode::UnusualValue,
                "density",
                "Density of 0 means the resource is massless",
            );
        }
    }

    if let Some(cost) = get_f64(entity, "unitCost") {
        non_negative(cost, "unitCost", out);
    }
    if let Some(energy) = get_f64(entity, "specificEnergy") {
        non_negative(energy, "specificEnergy", out);
    }

    let flow_mode = match get_str(entity, "flowMode") {
        Some(raw) => {
            let parsed = FlowMode::parse(raw);
            if parsed.is_none() {
                unknown_variant(raw, "flowMode", FlowMode::ALL.iter().map(|m| m.as_str()), out);
            }
            parsed
        }
        None => None,
    };

    if let (Some(false), Some(mode)) = (get_bool(entity, "transferable"), flow_mode) {
        if !mode.allows_locked_resource() {
            out.push(
                Finding::warning(
                    ErrorCode::ConstraintViolation,
                    "transferable",
                    format!("Non-transferable resource should use NO_FLOW or STAGE_LOCKED, not {mode}"),
                )
                .with_details(json!({ "flowMode": mode.as_str() })),
            );
        }
    }

    check_color(entity, out);

    let id = get_str(entity, "id").unwrap_or_default();
    match id {
        "ElectricCharge" => {
            if flow_mode.is_some_and(|m| m != FlowMode::AllVessel) {
                out.warning(
                    ErrorCode::UnusualValue,
                    "flowMode",
                    "ElectricCharge is expected to flow across the whole vessel (ALL_VESSEL)",
                );
            }
            if is_missing(entity, "specificEnergy") {
                out.warning(
                    ErrorCode::RecommendedFieldMissing,
                    "specificEnergy",
                    "ElectricCharge should declare its specificEnergy",
                );
            }
        }
        "SolidFuel" => {
            if get_bool(entity, "transferable") == Some(true) {
                out.warning(
                    ErrorCode::UnusualValue,
                    "transferable",
                    "SolidFuel is normally not transferable",
                );
            }
        }
        _ => {}
    }

    if PROPELLANTS.contains(&id) {
        if let Some(density) = get_f64(entity, "density").filter(|d| *d > 0.0) {
            if !PROPELLANT_DENSITY_RANGE.contains(&density) {
                out.warning(
                    ErrorCode::UnusualValue,
                    "density",
                    format!("Density {density} is outside the usual propellant range"),
                );
            }
        }
    }
}

fn check_color(entity: &Value, out: &mut Findings) {
    let Some(channels) = get_present(entity, "color").and_then(Value::as_array) else {
        return;
    };
    if channels.len() != 3 && channels.len() != 4 {
        out.error(
            ErrorCode::InvalidValue,
            "color",
            format!("Color must have 3 or 4 components, got {}", channels.len()),
        );
        return;
    }
    for (index, channel) in channels.iter().enumerate() {
        let path = index_path("color", index);
        match channel.as_f64() {
            None => out.error(
                ErrorCode::InvalidType,
                path,
                format!("Color component must be a number, got {}", type_name(channel)),
            ),
            Some(value) if !(0.0..=1.0).contains(&value) => out.error(
                ErrorCode::InvalidValue,
                path,
                format!("Color component must be within [0, 1], got {value}"),
            ),
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(entity: Value) -> Vec<Finding> {
        let mut out = Findings::new();
        validate(&entity, &mut out);
        out.into_vec()
    }

    #[test]
    fn locked_transfer_mismatch_is_single_warning() {
        let findings = run(json!({
            "id": "Ore", "name": "Ore", "density": 0.01,
            "transferable": false, "flowMode": "ALL_VESSEL"
        }));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, ErrorCode::ConstraintViolation);
        assert_eq!(findings[0].path, "transferable");
    }

    #[test]
    fn color_components_are_bounded() {
        let findings = run(json!({
            "id": "Ore", "density": 0.01, "flowMode": "ALL_VESSEL",
            "color": [0.5, 1.2, "red"]
        }));
        let located: Vec<(&str, ErrorCode)> =
            findings.iter().map(|f| (f.path.as_str(), f.code)).collect();
        assert_eq!(
            located,
            vec![("color[1]", ErrorCode::InvalidValue), ("color[2]", ErrorCode::InvalidType)]
        );
    }

    #[test]
    fn electric_charge_heuristics() {
        let findings = run(json!({
            "id": "ElectricCharge", "density": 0.0, "flowMode": "STAGE_PRIORITY_FLOW"
        }));
        let paths: Vec<&str> = findings.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["density", "flowMode", "specificEnergy"]);
    }

    #[test]
    fn unknown_flow_mode_is_invalid_value() {
        let findings = run(json!({"id": "Ore", "density": 0.01, "flowMode": "ALL_VESSELS"}));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, ErrorCode::InvalidValue);
        assert!(findings[0].message.contains("ALL_VESSEL"));
    }
}
