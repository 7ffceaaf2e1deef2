//! Response envelope and the writer that frames it onto a stream.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::JsonObject;
use crate::errors::ProtocolError;

/// Reply sent for every request line.
///
/// A successful response carries a `data` object and no `error`; a failed
/// response carries an `error` message and no `data`. The constructors are the
/// only way to build one, so the two never coexist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<JsonObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ResponseEnvelope {
    /// Builds a successful response.
    #[must_use]
    pub const fn success(data: JsonObject) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Builds a failed response with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Returns true for a successful response.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the payload of a successful response.
    #[must_use]
    pub const fn data(&self) -> Option<&JsonObject> {
        self.data.as_ref()
    }

    /// Returns the message of a failed response.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Converts the envelope into a `Result`, treating a success without a
    /// payload as an empty object.
    ///
    /// # Errors
    ///
    /// Returns the error message when the response reports failure.
    pub fn into_result(self) -> Result<JsonObject, String> {
        if self.success {
            Ok(self.data.unwrap_or_default())
        } else {
            Err(self.error.unwrap_or_default())
        }
    }
}

/// Writer that serializes response envelopes as newline-terminated JSON.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a response as one line and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization, writing, or flushing fails.
    pub fn write_response(&mut self, response: &ResponseEnvelope) -> Result<(), ProtocolError> {
        let mut line = serde_json::to_vec(response).map_err(ProtocolError::Serialize)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn written(response: &ResponseEnvelope) -> String {
        let mut writer = ResponseWriter::new(Vec::new());
        writer.write_response(response).expect("write response");
        String::from_utf8(writer.into_inner()).expect("valid utf8")
    }

    #[test]
    fn success_omits_error_field() {
        let mut data = JsonObject::new();
        data.insert("alive".into(), Value::Bool(true));
        let line = written(&ResponseEnvelope::success(data));
        assert_eq!(line, "{\"success\":true,\"data\":{\"alive\":true}}\n");
    }

    #[test]
    fn failure_omits_data_field() {
        let line = written(&ResponseEnvelope::failure("Unknown command: nope"));
        assert_eq!(
            line,
            "{\"success\":false,\"error\":\"Unknown command: nope\"}\n"
        );
    }

    #[test]
    fn success_without_data_reads_as_empty_object() {
        let response: ResponseEnvelope =
            serde_json::from_value(json!({"success": true})).expect("decode");
        assert_eq!(response.into_result(), Ok(JsonObject::new()));
    }

    #[test]
    fn failure_converts_into_error() {
        let response = ResponseEnvelope::failure("boom");
        assert_eq!(response.error(), Some("boom"));
        assert!(response.data().is_none());
        assert_eq!(response.into_result(), Err(String::from("boom")));
    }
}
