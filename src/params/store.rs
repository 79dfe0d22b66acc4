//! Location-keyed parameter table.

use serde_json::Value;

/// Where a named parameter lives in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Header,
    Query,
    Path,
    Body,
}

impl ParamLocation {
    /// Every location, in iteration order.
    pub const ALL: [ParamLocation; 4] = [
        ParamLocation::Header,
        ParamLocation::Query,
        ParamLocation::Path,
        ParamLocation::Body,
    ];

    fn index(self) -> usize {
        match self {
            ParamLocation::Header => 0,
            ParamLocation::Query => 1,
            ParamLocation::Path => 2,
            ParamLocation::Body => 3,
        }
    }

    /// Header names compare case-insensitively; everything else is exact.
    pub fn names_match(self, a: &str, b: &str) -> bool {
        match self {
            ParamLocation::Header => a.eq_ignore_ascii_case(b),
            _ => a == b,
        }
    }
}

/// Borrowed view of one stored parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRef<'a> {
    pub location: ParamLocation,
    pub name: &'a str,
    pub value: &'a Value,
}

/// The single source of truth for every parameter of a request.
///
/// Holds at most one value per `(location, name)`. Overwriting keeps the
/// parameter's original position, so iteration order is first-insertion
/// order within each location.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamStore {
    buckets: [Vec<(String, Value)>; 4],
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite. Returns the previous value, if any.
    pub fn set(
        &mut self,
        location: ParamLocation,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        let bucket = &mut self.buckets[location.index()];
        match bucket
            .iter_mut()
            .find(|(existing, _)| location.names_match(existing, &name))
        {
            Some(slot) => {
                slot.0 = name;
                Some(std::mem::replace(&mut slot.1, value))
            }
            None => {
                bucket.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, location: ParamLocation, name: &str) -> Option<&Value> {
        self.buckets[location.index()]
            .iter()
            .find(|(existing, _)| location.names_match(existing, name))
            .map(|(_, value)| value)
    }

    pub fn contains(&self, location: ParamLocation, name: &str) -> bool {
        self.get(location, name).is_some()
    }

    /// Remove a parameter, keeping the order of the others.
    pub fn remove(&mut self, location: ParamLocation, name: &str) -> Option<Value> {
        let bucket = &mut self.buckets[location.index()];
        let position = bucket
            .iter()
            .position(|(existing, _)| location.names_match(existing, name))?;
        Some(bucket.remove(position).1)
    }

    /// Drop every parameter at `location`.
    pub fn clear(&mut self, location: ParamLocation) {
        self.buckets[location.index()].clear();
    }

    /// Parameters at one location, in insertion order.
    pub fn iter_at(
        &self,
        location: ParamLocation,
    ) -> impl Iterator<Item = (&str, &Value)> + Clone + '_ {
        self.buckets[location.index()]
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Every parameter, location by location. Call again to restart.
    pub fn iter(&self) -> impl Iterator<Item = ParamRef<'_>> + Clone + '_ {
        ParamLocation::ALL.into_iter().flat_map(move |location| {
            self.iter_at(location)
                .map(move |(name, value)| ParamRef { location, name, value })
        })
    }

    pub fn len_at(&self, location: ParamLocation) -> usize {
        self.buckets[location.index()].len()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
