//! Registry of named, normalized suitability layers.
//!
//! Layers are immutable once registered and are shared behind [`Arc`] so a registry can
//! be cloned cheaply between runs. Every layer must match the registry's grid shape;
//! a mismatch is rejected at registration time.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};

use super::normalize::{normalize, DegeneratePolicy};
use super::raster::Raster;
use super::shape::GridShape;

pub type LayerId = String;

/// Registry for suitability layers keyed by identifier.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct LayerRegistry {
    shape: GridShape,
    layers: BTreeMap<LayerId, Arc<Raster<f64>>>,
}

impl LayerRegistry {
    /// Creates a new, empty registry for grids of `shape`.
    pub fn new(shape: GridShape) -> Self {
        Self {
            shape,
            layers: BTreeMap::new(),
        }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Returns the number of registered layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if there are no registered layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Registers an already normalized layer, replacing any previous layer with that id.
    pub fn register(&mut self, id: impl Into<LayerId>, layer: Raster<f64>) -> Result<()> {
        let id = id.into();
        layer.ensure_shape(&id, self.shape)?;
        self.layers.insert(id, Arc::new(layer));
        Ok(())
    }

    /// Min-max normalizes `raw` and registers the result.
    pub fn register_normalized(
        &mut self,
        id: impl Into<LayerId>,
        raw: &Raster<f64>,
        policy: DegeneratePolicy,
    ) -> Result<()> {
        let id = id.into();
        raw.ensure_shape(&id, self.shape)?;
        self.register(id, normalize(raw, policy))
    }

    /// Builder form of [`LayerRegistry::register`].
    pub fn with_layer(mut self, id: impl Into<LayerId>, layer: Raster<f64>) -> Result<Self> {
        self.register(id, layer)?;
        Ok(self)
    }

    /// Unregisters a layer by its identifier. Returns `true` if it was present.
    pub fn unregister(&mut self, id: &str) -> bool {
        self.layers.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Raster<f64>> {
        self.layers.get(id).map(|l| l.as_ref())
    }

    /// Like [`LayerRegistry::get`] but fails with [`Error::MissingLayer`].
    pub fn require(&self, id: &str) -> Result<&Raster<f64>> {
        self.get(id)
            .ok_or_else(|| Error::MissingLayer { id: id.to_string() })
    }

    /// Registered identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_mismatched_shape() {
        let mut registry = LayerRegistry::new(GridShape::new(4, 4));
        let err = registry
            .register("slope", Raster::filled(GridShape::new(4, 3), 0.5))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { ref layer, .. } if layer == "slope"));
        assert!(registry.is_empty());
    }

    #[test]
    fn register_normalized_rescales() {
        let mut registry = LayerRegistry::new(GridShape::new(1, 2));
        let raw = Raster::from_vec(GridShape::new(1, 2), vec![3.0, 5.0]).unwrap();
        registry
            .register_normalized("dist", &raw, DegeneratePolicy::Zero)
            .unwrap();
        assert_eq!(registry.get("dist").unwrap().as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn require_reports_missing_layer() {
        let registry = LayerRegistry::new(GridShape::new(1, 1));
        let err = registry.require("river").unwrap_err();
        assert!(matches!(err, Error::MissingLayer { ref id } if id == "river"));
    }

    #[test]
    fn unregister_and_ids() {
        let shape = GridShape::new(1, 1);
        let mut registry = LayerRegistry::new(shape)
            .with_layer("b", Raster::filled(shape, 0.0))
            .unwrap()
            .with_layer("a", Raster::filled(shape, 1.0))
            .unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert_eq!(registry.len(), 1);
    }
}
