use serde_json::{Map, Value};

/// Describes how `actual` departs from `expected`. Objects are compared key by
/// key so a header mismatch names the offending fields only.
pub fn describe_mismatch(expected: &Value, actual: &Value) -> String {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => describe_object_mismatch(expected, actual),
        _ => format!("expected {}, got {}", expected, actual),
    }
}

fn describe_object_mismatch(expected: &Map<String, Value>, actual: &Map<String, Value>) -> String {
    let mut lines = Vec::new();
    for (key, expected_value) in expected {
        match actual.get(key) {
            None => lines.push(format!("missing `{key}` (expected {expected_value})")),
            Some(actual_value) if actual_value != expected_value => lines.push(format!(
                "`{key}`: expected {expected_value}, got {actual_value}"
            )),
            Some(_) => {}
        }
    }
    for (key, actual_value) in actual {
        if !expected.contains_key(key) {
            lines.push(format!("unexpected `{key}` = {actual_value}"));
        }
    }

    if lines.is_empty() {
        "objects are equal".to_string()
    } else {
        lines.join("; ")
    }
}
