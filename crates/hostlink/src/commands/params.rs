//! Typed extraction of handler parameters.
//!
//! Every helper runs on the listener thread before any host work is queued,
//! so a request with bad parameters never reaches the host model.

use hostlink_protocol::JsonObject;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::host::Vec3;
use crate::result::{CommandError, CommandResult, ErrorCode, failure_full, failure_with};

/// Returns a required, non-empty string parameter with whitespace trimmed.
pub(crate) fn required_str<'a>(params: &'a JsonObject, key: &str) -> CommandResult<&'a str> {
    match optional_str(params, key)? {
        Some(value) => Ok(value),
        None => failure_with(
            ErrorCode::InvalidInput,
            format!("missing required parameter '{key}'"),
        ),
    }
}

/// Returns a string parameter when present. Empty strings count as absent.
pub(crate) fn optional_str<'a>(params: &'a JsonObject, key: &str) -> CommandResult<Option<&'a str>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => {
            let trimmed = value.trim();
            Ok((!trimmed.is_empty()).then_some(trimmed))
        }
        Some(other) => wrong_type(key, "a string", other),
    }
}

/// Returns an integer parameter, or `default` when absent.
pub(crate) fn i64_or(params: &JsonObject, key: &str, default: i64) -> CommandResult<i64> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => match value.as_i64() {
            Some(number) => Ok(number),
            None => wrong_type(key, "an integer", value),
        },
    }
}

/// Reads a `[x, y, z]` array parameter when present.
pub(crate) fn optional_vec3(params: &JsonObject, key: &str) -> CommandResult<Option<Vec3>> {
    let Some(value) = params.get(key).filter(|value| !value.is_null()) else {
        return Ok(None);
    };
    let components: Option<Vec<f64>> = value
        .as_array()
        .filter(|items| items.len() == 3)
        .map(|items| items.iter().filter_map(Value::as_f64).collect());
    match components.as_deref() {
        Some(&[x, y, z]) => Ok(Some(Vec3::new(x, y, z))),
        _ => wrong_type(key, "an array of three numbers", value),
    }
}

/// Deserializes a structured parameter when present.
pub(crate) fn optional_typed<T: DeserializeOwned>(
    params: &JsonObject,
    key: &str,
) -> CommandResult<Option<T>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value).map(Some).map_err(|error| {
            CommandError::new(ErrorCode::InvalidParameter)
                .with_context(key)
                .with_details(error.to_string())
        }),
    }
}

fn wrong_type<T>(key: &str, expected: &str, found: &Value) -> CommandResult<T> {
    failure_full(
        ErrorCode::InvalidParameter,
        key,
        format!("expected {expected}, found {}", kind_of(found)),
    )
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::host::KeyMapping;

    fn params(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[rstest]
    #[case::missing(json!({}), "Invalid Input: missing required parameter 'name'")]
    #[case::null(json!({"name": null}), "Invalid Input: missing required parameter 'name'")]
    #[case::blank(json!({"name": "  "}), "Invalid Input: missing required parameter 'name'")]
    #[case::number(json!({"name": 3}), "Invalid Parameter: name (expected a string, found number)")]
    fn required_str_rejects(#[case] input: Value, #[case] expected: &str) {
        let error = required_str(&params(input), "name").expect_err("should fail");
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn required_str_trims() {
        let input = params(json!({"name": " BP_Door "}));
        assert_eq!(required_str(&input, "name"), Ok("BP_Door"));
    }

    #[rstest]
    #[case::absent(json!({}), Ok(None))]
    #[case::array(json!({"location": [1, 2.5, -3]}), Ok(Some(Vec3::new(1.0, 2.5, -3.0))))]
    fn vec3_accepts(#[case] input: Value, #[case] expected: CommandResult<Option<Vec3>>) {
        assert_eq!(optional_vec3(&params(input), "location"), expected);
    }

    #[rstest]
    #[case::short(json!({"location": [1, 2]}))]
    #[case::text(json!({"location": [1, "2", 3]}))]
    #[case::object(json!({"location": {"x": 1}}))]
    fn vec3_rejects(#[case] input: Value) {
        let error = optional_vec3(&params(input), "location").expect_err("should fail");
        assert_eq!(error.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn integer_defaults_when_absent() {
        assert_eq!(i64_or(&JsonObject::new(), "priority", 4), Ok(4));
        let error = i64_or(&params(json!({"priority": "high"})), "priority", 0)
            .expect_err("string priority");
        assert_eq!(error.code(), ErrorCode::InvalidParameter);
    }

    #[test]
    fn typed_parameters_report_shape_errors() {
        let input = params(json!({"mappings": [{"action": "IA_Jump"}]}));
        let error = optional_typed::<Vec<KeyMapping>>(&input, "mappings").expect_err("no key");
        assert_eq!(error.code(), ErrorCode::InvalidParameter);
        assert!(error.details().contains("key"));
    }
}
