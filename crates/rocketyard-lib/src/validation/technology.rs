use std::collections::HashSet;

use serde_json::Value;

use super::finding::{ErrorCode, Findings};
use super::schema::non_negative;
use crate::safe_access::{get_f64, get_present, get_str, index_path, type_name};

pub(crate) fn validate(entity: &Value, out: &mut Findings) {
    if let Some(cost) = get_f64(entity, "cost") {
        non_negative(cost, "cost", out);
    }

    let id = get_str(entity, "id");
    let parents = string_list(entity, "parents", out);
    let mut seen = HashSet::new();
    for (index, parent) in parents {
        let path = index_path("parents", index);
        if Some(parent) == id {
            out.error(
                ErrorCode::CircularReference,
                path,
                format!("Technology '{parent}' cannot require itself"),
            );
        } else if !seen.insert(parent) {
            out.warning(
                ErrorCode::UnusualValue,
                path,
                format!("Parent '{parent}' is listed more than once"),
            );
        }
    }

    string_list(entity, "partUnlocks", out);
}

/// String elements of the array at `field` with their indices; other
/// elements are reported as invalid types.
fn string_list<'a>(entity: &'a Value, field: &str, out: &mut Findings) -> Vec<(usize, &'a str)> {
    let Some(items) = get_present(entity, field).and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut strings = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(value) => strings.push((index, value)),
            None => out.error(
                ErrorCode::InvalidType,
                index_path(field, index),
                format!("Entries of '{field}' must be strings, got {}", type_name(item)),
            ),
        }
    }
    strings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn self_parent_and_duplicates() {
        let mut out = Findings::new();
        validate(
            &json!({
                "id": "rocketry", "title": "Rocketry", "cost": 5,
                "parents": ["basics", "rocketry", "basics", 7],
                "partUnlocks": ["liquidEngine"]
            }),
            &mut out,
        );
        let findings = out.into_vec();
        let located: Vec<(&str, ErrorCode)> =
            findings.iter().map(|f| (f.path.as_str(), f.code)).collect();
        assert_eq!(
            located,
            vec![
                ("parents[3]", ErrorCode::InvalidType),
                ("parents[1]", ErrorCode::CircularReference),
                ("parents[2]", ErrorCode::UnusualValue),
            ]
        );
    }
}
