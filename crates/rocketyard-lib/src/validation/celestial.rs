use serde_json::Value;

use super::finding::{ErrorCode, Findings};
use super::schema::{non_negative, number_at, positive, unknown_variant};
use crate::catalog::BodyType;
use crate::safe_access::{get_f64, get_present, get_str, type_name};

pub(crate) fn validate(entity: &Value, out: &mut Findings) {
    let body_type = match get_str(entity, "type") {
        Some(raw) => {
            let parsed = BodyType::parse(raw);
            if parsed.is_none() {
                unknown_variant(raw, "type", BodyType::ALL.iter().map(|t| t.as_str()), out);
            }
            parsed
        }
        None => None,
    };

    if get_present(entity, "physical").is_some_and(Value::is_object) {
        for field in ["physical.radius", "physical.mass", "physical.gravity"] {
            if let Some(value) = number_at(entity, field, true, out) {
                non_negative(value, field, out);
            }
        }
    }

    check_parent(entity, body_type, out);
    check_orbit(entity, body_type, out);
    check_atmosphere(entity, out);
}

fn check_parent(entity: &Value, body_type: Option<BodyType>, out: &mut Findings) {
    let parent = get_str(entity, "parent");
    match (body_type, parent) {
        (Some(kind), None) if kind.requires_parent() && get_present(entity, "parent").is_none() => {
            out.error(
                ErrorCode::RequiredFieldMissing,
                "parent",
                format!("A {kind} must orbit a parent body"),
            );
        }
        (Some(BodyType::Star), Some(_)) => out.warning(
            ErrorCode::UnusualValue,
            "parent",
            "Stars do not normally have a parent body",
        ),
        _ => {}
    }

    if let (Some(parent), Some(id)) = (parent, get_str(entity, "id")) {
        if parent == id {
            out.error(
                ErrorCode::CircularReference,
                "parent",
                format!("Body '{id}' cannot be its own parent"),
            );
        }
    }
}

fn check_orbit(entity: &Value, body_type: Option<BodyType>, out: &mut Findings) {
    let Some(orbit) = get_present(entity, "orbit") else {
        if body_type.is_some_and(BodyType::requires_parent) {
            out.warning(
                ErrorCode::RecommendedFieldMissing,
                "orbit",
                "Orbiting body has no orbit parameters",
            );
        }
        return;
    };
    if !orbit.is_object() {
        return;
    }

    if let Some(axis) = number_at(entity, "orbit.semiMajorAxis", false, out) {
        positive(axis, "orbit.semiMajorAxis", out);
    }
    if let Some(eccentricity) = number_at(entity, "orbit.eccentricity", false, out) {
        if !(0.0..1.0).contains(&eccentricity) {
            out.error(
                ErrorCode::InvalidValue,
                "orbit.eccentricity",
                format!("Eccentricity must be within [0, 1) for a closed orbit, got {eccentricity}"),
            );
        }
    }
    if let Some(inclination) = number_at(entity, "orbit.inclination", false, out) {
        if !(0.0..=180.0).contains(&inclination) {
            out.warning(
                ErrorCode::UnusualValue,
                "orbit.inclination",
                format!("Inclination is expected within [0, 180] degrees, got {inclination}"),
            );
        }
    }
    if let Some(period) = number_at(entity, "orbit.orbitalPeriod", false, out) {
        positive(period, "orbit.orbitalPeriod", out);
    }
}

fn check_atmosphere(entity: &Value, out: &mut Findings) {
    let Some(atmosphere) = get_present(entity, "atmosphere").filter(|a| a.is_object()) else {
        return;
    };

    let present = match get_present(atmosphere, "present") {
        None => false,
        Some(Value::Bool(flag)) => *flag,
        Some(other) => {
            out.error(
                ErrorCode::InvalidType,
                "atmosphere.present",
                format!("Field 'atmosphere.present' must be a boolean, got {}", type_name(other)),
            );
            return;
        }
    };

    if !present {
        if get_f64(entity, "atmosphere.height").is_some_and(|h| h > 0.0) {
            out.warning(
                ErrorCode::UnusualValue,
                "atmosphere.height",
                "Atmosphere height is set but the atmosphere is marked absent",
            );
        }
        return;
    }

    if let Some(height) = number_at(entity, "atmosphere.height", true, out) {
        positive(height, "atmosphere.height", out);
    }
    if let Some(pressure) = number_at(entity, "atmosphere.pressure", false, out) {
        non_negative(pressure, "atmosphere.pressure", out);
    }
    if let Some(temperature) = number_at(entity, "atmosphere.temperatureASL", false, out) {
        positive(temperature, "atmosphere.temperatureASL", out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Finding;
    use serde_json::json;

    fn run(entity: Value) -> Vec<Finding> {
        let mut out = Findings::new();
        validate(&entity, &mut out);
        out.into_vec()
    }

    fn kerbin() -> Value {
        json!({
            "id": "kerbin", "name": "Kerbin", "type": "planet", "parent": "kerbol",
            "physical": {"radius": 600000.0, "mass": 5.29e22, "gravity": 9.81},
            "orbit": {"semiMajorAxis": 13599840256.0, "eccentricity": 0.0, "inclination": 0.0, "orbitalPeriod": 9203545.0},
            "atmosphere": {"present": true, "height": 70000.0, "pressure": 101.325, "temperatureASL": 288.15}
        })
    }

    #[test]
    fn well_formed_planet_is_clean() {
        assert!(run(kerbin()).is_empty());
    }

    #[test]
    fn planet_without_parent_is_error() {
        let mut body = kerbin();
        body.as_object_mut().expect("object").remove("parent");
        let findings = run(body);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, ErrorCode::RequiredFieldMissing);
        assert_eq!(findings[0].path, "parent");
    }

    #[test]
    fn self_parent_is_circular() {
        let mut body = kerbin();
        body["parent"] = json!("kerbin");
        let findings = run(body);
        assert_eq!(findings[0].code, ErrorCode::CircularReference);
    }

    #[test]
    fn orbit_and_atmosphere_bounds() {
        let mut body = kerbin();
        body["orbit"]["eccentricity"] = json!(1.2);
        body["atmosphere"]["height"] = json!(0.0);
        let findings = run(body);
        let paths: Vec<&str> = findings.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["orbit.eccentricity", "atmosphere.height"]);
    }
}
