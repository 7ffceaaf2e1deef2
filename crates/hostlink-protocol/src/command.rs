//! Command envelope decoding.
//!
//! A request line is a JSON object with a `type` string naming the command and
//! an optional `params` object. Missing or `null` params decode as an empty
//! object so handlers never need to special-case their absence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::JsonObject;
use crate::errors::ProtocolError;

/// Parsed command request from a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    #[serde(rename = "type")]
    command_type: String,
    #[serde(default)]
    params: JsonObject,
}

impl CommandEnvelope {
    /// Builds an envelope for sending.
    pub fn new(command_type: impl Into<String>, params: JsonObject) -> Self {
        Self {
            command_type: command_type.into(),
            params,
        }
    }

    /// Parses a request line into a command envelope.
    ///
    /// Leading and trailing whitespace (including the newline delimiter and
    /// any carriage return) is ignored. The command name is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedJson`] when the line is empty or not
    /// JSON, and [`ProtocolError::InvalidStructure`] when the document is not
    /// an object, lacks a non-empty string `type`, or carries non-object
    /// `params`.
    pub fn parse(line: &[u8]) -> Result<Self, ProtocolError> {
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            return Err(ProtocolError::malformed("empty request line"));
        }

        let document: Value =
            serde_json::from_slice(trimmed).map_err(ProtocolError::from_json_error)?;
        let Value::Object(mut fields) = document else {
            return Err(ProtocolError::invalid_structure(
                "request must be a JSON object",
            ));
        };

        let command_type = match fields.remove("type") {
            Some(Value::String(name)) => name.trim().to_owned(),
            Some(_) => {
                return Err(ProtocolError::invalid_structure(
                    "'type' field must be a string",
                ));
            }
            None => return Err(ProtocolError::invalid_structure("missing 'type' field")),
        };
        if command_type.is_empty() {
            return Err(ProtocolError::invalid_structure("'type' field is empty"));
        }

        let params = match fields.remove("params") {
            None | Some(Value::Null) => JsonObject::new(),
            Some(Value::Object(params)) => params,
            Some(_) => {
                return Err(ProtocolError::invalid_structure(
                    "'params' field must be an object",
                ));
            }
        };

        Ok(Self {
            command_type,
            params,
        })
    }

    /// Returns the command name.
    #[must_use]
    pub fn command_type(&self) -> &str {
        &self.command_type
    }

    /// Returns the command parameters.
    #[must_use]
    pub const fn params(&self) -> &JsonObject {
        &self.params
    }

    /// Serializes the envelope as a newline-terminated line.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Serialize`] if serialization fails.
    pub fn to_line(&self) -> Result<Vec<u8>, ProtocolError> {
        let mut line = serde_json::to_vec(self).map_err(ProtocolError::Serialize)?;
        line.push(b'\n');
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_command_with_params() {
        let input = br#"{"type":"spawn_entity","params":{"name":"Crate","kind":"StaticMesh"}}"#;
        let envelope = CommandEnvelope::parse(input).expect("parse envelope");
        assert_eq!(envelope.command_type(), "spawn_entity");
        assert_eq!(envelope.params().get("name"), Some(&json!("Crate")));
    }

    #[rstest]
    #[case::missing(br#"{"type":"ping"}"#.as_slice())]
    #[case::null(br#"{"type":"ping","params":null}"#.as_slice())]
    #[case::empty(br#"{"type":"ping","params":{}}"#.as_slice())]
    fn absent_params_decode_as_empty_object(#[case] input: &[u8]) {
        let envelope = CommandEnvelope::parse(input).expect("parse envelope");
        assert!(envelope.params().is_empty());
    }

    #[test]
    fn trims_newline_and_carriage_return() {
        let envelope = CommandEnvelope::parse(b"  {\"type\":\" ping \"}\r\n").expect("parse");
        assert_eq!(envelope.command_type(), "ping");
    }

    #[rstest]
    #[case::empty(b"".as_slice())]
    #[case::whitespace(b"   \n".as_slice())]
    #[case::not_json(b"not json".as_slice())]
    #[case::truncated(br#"{"type":"ping""#.as_slice())]
    fn rejects_malformed_lines(#[case] input: &[u8]) {
        let result = CommandEnvelope::parse(input);
        assert!(matches!(result, Err(ProtocolError::MalformedJson { .. })));
    }

    #[rstest]
    #[case::array(br#"[1,2]"#.as_slice())]
    #[case::missing_type(br#"{"params":{}}"#.as_slice())]
    #[case::numeric_type(br#"{"type":7}"#.as_slice())]
    #[case::blank_type(br#"{"type":"  "}"#.as_slice())]
    #[case::array_params(br#"{"type":"ping","params":[1]}"#.as_slice())]
    #[case::string_params(br#"{"type":"ping","params":"x"}"#.as_slice())]
    fn rejects_wrong_shapes(#[case] input: &[u8]) {
        let result = CommandEnvelope::parse(input);
        assert!(matches!(result, Err(ProtocolError::InvalidStructure { .. })));
    }

    #[test]
    fn to_line_is_newline_terminated_and_parses_back() {
        let mut params = JsonObject::new();
        params.insert("name".into(), json!("BP_Door"));
        let envelope = CommandEnvelope::new("create_graph", params);
        let line = envelope.to_line().expect("encode");
        assert_eq!(line.last(), Some(&b'\n'));
        assert_eq!(CommandEnvelope::parse(&line).expect("decode"), envelope);
    }
}
