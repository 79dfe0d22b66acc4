//! `application/json` bodies.

use bytes::Bytes;
use serde_json::{Map, Value};

use super::BodyFormatter;
use crate::error::FormatError;

/// Serializes the fields as one JSON object, keys in field order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl BodyFormatter for JsonFormatter {
    fn format(&self, _format: &str, fields: &[(&str, &Value)]) -> Result<Bytes, FormatError> {
        let object: Map<String, Value> = fields
            .iter()
            .map(|(name, value)| (name.to_string(), (*value).clone()))
            .collect();
        serde_json::to_vec(&Value::Object(object))
            .map(Bytes::from)
            .map_err(|e| FormatError::Serialize(e.to_string()))
    }
}
