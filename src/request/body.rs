//! Request body view.
//!
//! Body fields live in the parameter store under `ParamLocation::Body`. The
//! content type is the `Content-Type` header parameter, so there is exactly
//! one place that decides it.

use bytes::Bytes;
use serde_json::Value;

use crate::params::{render, ParamLocation, ParamStore, ParamView};

pub(crate) const CONTENT_TYPE: &str = "Content-Type";

/// Body state that is not a parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BodyState {
    pub(crate) raw: Option<Bytes>,
}

/// Read-only body view.
#[derive(Debug, Clone, Copy)]
pub struct Body<'a> {
    store: &'a ParamStore,
    state: &'a BodyState,
}

impl<'a> Body<'a> {
    pub(crate) fn new(store: &'a ParamStore, state: &'a BodyState) -> Self {
        Self { store, state }
    }

    /// The declared content type, if any.
    pub fn content_type(&self) -> Option<String> {
        self.store.get(ParamLocation::Header, CONTENT_TYPE).map(render)
    }

    /// Raw bytes set with [`BodyMut::set_raw`]; they take precedence over fields.
    pub fn raw(&self) -> Option<&'a Bytes> {
        self.state.raw.as_ref()
    }

    pub fn fields(&self) -> ParamView<'a> {
        ParamView::new(self.store, ParamLocation::Body)
    }

    /// No raw bytes and no fields.
    pub fn is_empty(&self) -> bool {
        self.state.raw.is_none() && self.store.len_at(ParamLocation::Body) == 0
    }
}

/// Mutable body view.
#[derive(Debug)]
pub struct BodyMut<'a> {
    store: &'a mut ParamStore,
    state: &'a mut BodyState,
}

impl<'a> BodyMut<'a> {
    pub(crate) fn new(store: &'a mut ParamStore, state: &'a mut BodyState) -> Self {
        Self { store, state }
    }

    /// Set the content type (stored as the `Content-Type` header parameter).
    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.store
            .set(ParamLocation::Header, CONTENT_TYPE, content_type.into());
        self
    }

    /// Set a body field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.store.set(ParamLocation::Body, name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.store.remove(ParamLocation::Body, name)
    }

    /// Send these bytes verbatim instead of formatting the fields.
    pub fn set_raw(&mut self, bytes: impl Into<Bytes>) -> &mut Self {
        self.state.raw = Some(bytes.into());
        self
    }

    pub fn clear_raw(&mut self) -> Option<Bytes> {
        self.state.raw.take()
    }

    pub fn as_body(&self) -> Body<'_> {
        Body::new(self.store, self.state)
    }
}
