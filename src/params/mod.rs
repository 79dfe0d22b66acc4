//! Request parameter model.
//!
//! # Data Flow
//! ```text
//! request.headers_mut() / query_mut() / path_params_mut() / body_mut() / set_param()
//!     → view.rs (location-scoped view)
//!     → store.rs (ParamStore, the single source of truth)
//!     → snapshot construction reads the store once per send
//! ```
//!
//! # Design Decisions
//! - Values are `serde_json::Value` so body formatters see typed data
//! - Views borrow the store; nothing is cached, so every view sees every write

pub mod store;
pub mod view;

use serde_json::Value;

pub use store::{ParamLocation, ParamRef, ParamStore};
pub use view::{ParamView, ParamViewMut};

/// Render a value the way it goes into a header, query or path segment.
pub fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Like [`render`], but arrays expand into one string per element.
pub fn render_all(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(render).collect(),
        other => vec![render(other)],
    }
}
