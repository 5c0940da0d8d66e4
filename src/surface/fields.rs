use std::collections::BTreeMap;

use crate::error::{SurfaceError, SurfaceResult};
use crate::geom::Vec3;

use super::FieldKind;

/// Named scalar and 3-vector fields sharing one index space (all cells or
/// all points of a surface).
///
/// Names are kept sorted so output order is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldTable {
    scalars: BTreeMap<String, Vec<f64>>,
    vectors: BTreeMap<String, Vec<Vec3>>,
}

impl FieldTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_scalars(scalars: BTreeMap<String, Vec<f64>>) -> Self {
        Self {
            scalars,
            vectors: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&[f64]> {
        self.scalars.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn vector(&self, name: &str) -> Option<&[Vec3]> {
        self.vectors.get(name).map(Vec::as_slice)
    }

    /// Inserts or replaces a scalar field, returning the previous values.
    pub fn insert_scalar(&mut self, name: impl Into<String>, values: Vec<f64>) -> Option<Vec<f64>> {
        self.scalars.insert(name.into(), values)
    }

    /// Inserts or replaces a vector field, returning the previous values.
    pub fn insert_vector(&mut self, name: impl Into<String>, values: Vec<Vec3>) -> Option<Vec<Vec3>> {
        self.vectors.insert(name.into(), values)
    }

    pub fn scalars(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.scalars.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn vectors(&self) -> impl Iterator<Item = (&str, &[Vec3])> {
        self.vectors.iter().map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scalars.contains_key(name) || self.vectors.contains_key(name)
    }

    /// Number of stored fields, scalar and vector.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scalars.len() + self.vectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.vectors.is_empty()
    }

    pub fn clear(&mut self) {
        self.scalars.clear();
        self.vectors.clear();
    }

    /// Checks that every field holds exactly `expected` entries.
    pub(crate) fn check_lengths(&self, kind: FieldKind, expected: usize) -> SurfaceResult<()> {
        let lengths = self
            .scalars
            .iter()
            .map(|(name, values)| (name, values.len()))
            .chain(self.vectors.iter().map(|(name, values)| (name, values.len())));

        for (name, len) in lengths {
            if len != expected {
                return Err(SurfaceError::format(format!(
                    "{kind} field '{name}' has {len} values, expected {expected}"
                )));
            }
        }
        Ok(())
    }
}
