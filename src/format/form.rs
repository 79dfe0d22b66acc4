//! `application/x-www-form-urlencoded` bodies.

use bytes::Bytes;
use serde_json::Value;
use url::form_urlencoded;

use super::BodyFormatter;
use crate::error::FormatError;
use crate::params::render_all;

/// Form encoder; array values repeat their key.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormFormatter;

impl BodyFormatter for FormFormatter {
    fn format(&self, _format: &str, fields: &[(&str, &Value)]) -> Result<Bytes, FormatError> {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in fields {
            for rendered in render_all(value) {
                serializer.append_pair(name, &rendered);
            }
        }
        Ok(Bytes::from(serializer.finish()))
    }
}
