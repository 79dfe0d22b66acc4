//! Typed views over one location of a [`ParamStore`].

use serde_json::Value;

use super::store::{ParamLocation, ParamStore};
use super::render;

/// Read-only view of the parameters at one location.
#[derive(Debug, Clone, Copy)]
pub struct ParamView<'a> {
    store: &'a ParamStore,
    location: ParamLocation,
}

impl<'a> ParamView<'a> {
    pub(crate) fn new(store: &'a ParamStore, location: ParamLocation) -> Self {
        Self { store, location }
    }

    pub fn location(&self) -> ParamLocation {
        self.location
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.store.get(self.location, name)
    }

    /// The value rendered as it would go on the wire.
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).map(render)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(self.location, name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + Clone + 'a {
        self.store.iter_at(self.location)
    }

    pub fn len(&self) -> usize {
        self.store.len_at(self.location)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mutable view of the parameters at one location.
#[derive(Debug)]
pub struct ParamViewMut<'a> {
    store: &'a mut ParamStore,
    location: ParamLocation,
}

impl<'a> ParamViewMut<'a> {
    pub(crate) fn new(store: &'a mut ParamStore, location: ParamLocation) -> Self {
        Self { store, location }
    }

    /// Insert or overwrite a parameter.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.store.set(self.location, name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.store.remove(self.location, name)
    }

    pub fn clear(&mut self) {
        self.store.clear(self.location);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.store.get(self.location, name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(self.location, name)
    }

    /// Reborrow as a read-only view.
    pub fn as_view(&self) -> ParamView<'_> {
        ParamView::new(self.store, self.location)
    }
}
