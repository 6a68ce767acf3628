//! Per-cell property storage.
//!
//! Energy terms are stateless; anything a term needs to remember between
//! sweeps (a persistent motion direction, say) lives here. Only
//! time-step listeners write to it, and only between sweeps.

use indexmap::IndexMap;
use potts_core::{CellId, Vec3};

/// A stored property value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    /// A scalar.
    Scalar(f64),
    /// A vector.
    Vector(Vec3),
}

/// Named per-cell values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellProperties {
    values: IndexMap<CellId, IndexMap<String, PropertyValue>>,
}

impl CellProperties {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value.
    pub fn get(&self, cell: CellId, name: &str) -> Option<PropertyValue> {
        self.values.get(&cell)?.get(name).copied()
    }

    /// Look up a scalar; `None` when missing or not a scalar.
    pub fn scalar(&self, cell: CellId, name: &str) -> Option<f64> {
        match self.get(cell, name)? {
            PropertyValue::Scalar(v) => Some(v),
            PropertyValue::Vector(_) => None,
        }
    }

    /// Look up a vector; `None` when missing or not a vector.
    pub fn vector(&self, cell: CellId, name: &str) -> Option<Vec3> {
        match self.get(cell, name)? {
            PropertyValue::Vector(v) => Some(v),
            PropertyValue::Scalar(_) => None,
        }
    }

    /// Store a value, replacing any previous one.
    pub fn set(&mut self, cell: CellId, name: &str, value: PropertyValue) {
        self.values
            .entry(cell)
            .or_default()
            .insert(name.to_string(), value);
    }

    /// Drop every value of a cell.
    pub fn remove_cell(&mut self, cell: CellId) {
        self.values.shift_remove(&cell);
    }

    /// Cells with at least one stored value.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.values.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookup() {
        let mut props = CellProperties::new();
        let c = CellId(3);
        props.set(c, "dir", PropertyValue::Vector(Vec3::new(1.0, 0.0, 0.0)));
        props.set(c, "age", PropertyValue::Scalar(2.0));
        assert_eq!(props.vector(c, "dir"), Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(props.scalar(c, "dir"), None);
        assert_eq!(props.scalar(c, "age"), Some(2.0));
        assert_eq!(props.get(CellId(4), "age"), None);
    }

    #[test]
    fn overwrite_and_remove() {
        let mut props = CellProperties::new();
        let c = CellId(1);
        props.set(c, "x", PropertyValue::Scalar(1.0));
        props.set(c, "x", PropertyValue::Scalar(5.0));
        assert_eq!(props.scalar(c, "x"), Some(5.0));
        props.remove_cell(c);
        assert_eq!(props.cells().count(), 0);
    }
}
