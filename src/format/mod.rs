//! Body formatters.
//!
//! # Responsibilities
//! - Define the contract that turns ordered body fields into bytes
//! - Pick a formatter from the effective content type
//!
//! # Design Decisions
//! - Lookup uses the media-type essence (`type/subtype`), parameters ignored
//! - `+json` structured suffixes fall back to the JSON formatter
//! - The codecs themselves come from `url` and `serde_json`

pub mod form;
pub mod json;

use std::sync::Arc;

use bytes::Bytes;
use serde_json::Value;

use crate::error::FormatError;

pub use form::FormFormatter;
pub use json::JsonFormatter;

/// Well-known content types.
pub mod content_type {
    pub const FORM: &str = "application/x-www-form-urlencoded";
    pub const JSON: &str = "application/json";
}

/// Serializes body fields for one family of content types.
pub trait BodyFormatter: Send + Sync {
    /// `format` is the full content type, parameters included.
    fn format(&self, format: &str, fields: &[(&str, &Value)]) -> Result<Bytes, FormatError>;
}

/// Content-type → formatter table.
#[derive(Clone)]
pub struct FormatterRegistry {
    formatters: Vec<(String, Arc<dyn BodyFormatter>)>,
}

impl FormatterRegistry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            formatters: Vec::new(),
        }
    }

    /// Register (or replace) the formatter for a content type.
    pub fn register(&mut self, content_type: &str, formatter: Arc<dyn BodyFormatter>) {
        let key = essence(content_type);
        self.formatters.retain(|(existing, _)| *existing != key);
        self.formatters.push((key, formatter));
    }

    pub fn lookup(&self, content_type: &str) -> Option<&Arc<dyn BodyFormatter>> {
        let key = essence(content_type);
        let find = |wanted: &str| {
            self.formatters
                .iter()
                .find(|(existing, _)| existing == wanted)
                .map(|(_, formatter)| formatter)
        };
        find(key.as_str()).or_else(|| key.ends_with("+json").then(|| find(content_type::JSON)).flatten())
    }

    /// Serialize `fields` for `content_type`.
    pub fn format(&self, content_type: &str, fields: &[(&str, &Value)]) -> Result<Bytes, FormatError> {
        let formatter = self
            .lookup(content_type)
            .ok_or_else(|| FormatError::Unsupported(content_type.to_string()))?;
        formatter.format(content_type, fields)
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(content_type::FORM, Arc::new(FormFormatter));
        registry.register(content_type::JSON, Arc::new(JsonFormatter));
        registry
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.formatters.iter().map(|(key, _)| key))
            .finish()
    }
}

fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_ignores_parameters_and_case() {
        let registry = FormatterRegistry::default();
        assert!(registry.lookup("Application/JSON; charset=utf-8").is_some());
        assert!(registry.lookup("application/x-www-form-urlencoded").is_some());
        assert!(registry.lookup("text/xml").is_none());
    }

    #[test]
    fn structured_json_suffix_uses_json() {
        let registry = FormatterRegistry::default();
        let value = json!(1);
        let bytes = registry
            .format("application/problem+json", &[("n", &value)])
            .unwrap();
        assert_eq!(&bytes[..], br#"{"n":1}"#);
    }

    #[test]
    fn unknown_type_is_an_error() {
        let registry = FormatterRegistry::default();
        let err = registry.format("text/xml", &[]).unwrap_err();
        assert_eq!(err, FormatError::Unsupported("text/xml".into()));
    }

    #[test]
    fn register_replaces_existing() {
        struct Fixed;
        impl BodyFormatter for Fixed {
            fn format(&self, _: &str, _: &[(&str, &Value)]) -> Result<Bytes, FormatError> {
                Ok(Bytes::from_static(b"fixed"))
            }
        }
        let mut registry = FormatterRegistry::default();
        registry.register("application/json", Arc::new(Fixed));
        let bytes = registry.format(content_type::JSON, &[]).unwrap();
        assert_eq!(&bytes[..], b"fixed");
    }
}
