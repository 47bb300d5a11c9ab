//! Owner of the land-cover state and the static layers of one run.
use crate::error::{Error, Result};

use super::land_cover::LandCoverGrid;
use super::layers::LayerRegistry;
use super::shape::GridShape;

/// Holds the step-0 land cover, the committed current land cover and the layers.
///
/// The current grid is only replaced wholesale through [`GridStore::commit`], so readers
/// never observe a partially updated step.
#[derive(Clone, Debug)]
pub struct GridStore {
    initial: LandCoverGrid,
    current: LandCoverGrid,
    layers: LayerRegistry,
}

impl GridStore {
    /// Creates a store, failing if the layer registry was built for another shape.
    pub fn new(land_cover: LandCoverGrid, layers: LayerRegistry) -> Result<Self> {
        let shape = land_cover.shape();
        if layers.shape() != shape {
            return Err(Error::ShapeMismatch {
                layer: "layers".into(),
                expected: shape,
                found: layers.shape(),
            });
        }
        Ok(Self {
            initial: land_cover.clone(),
            current: land_cover,
            layers,
        })
    }

    pub fn shape(&self) -> GridShape {
        self.initial.shape()
    }

    /// The land cover the run started from.
    pub fn initial(&self) -> &LandCoverGrid {
        &self.initial
    }

    /// The most recently committed land cover.
    pub fn current(&self) -> &LandCoverGrid {
        &self.current
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    /// Replace the current land cover with the next committed step.
    pub fn commit(&mut self, next: LandCoverGrid) -> Result<()> {
        next.cells().ensure_shape("land_cover", self.shape())?;
        self.current = next;
        Ok(())
    }

    /// Discard all committed steps and return to the initial land cover.
    pub fn reset(&mut self) {
        self.current = self.initial.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{LandCover, Raster};

    fn grid(shape: GridShape, category: LandCover) -> LandCoverGrid {
        LandCoverGrid::new(Raster::filled(shape, category))
    }

    #[test]
    fn new_rejects_registry_of_other_shape() {
        let err = GridStore::new(
            grid(GridShape::new(3, 3), LandCover::Expansion),
            LayerRegistry::new(GridShape::new(2, 3)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn commit_and_reset() {
        let shape = GridShape::new(2, 2);
        let mut store = GridStore::new(
            grid(shape, LandCover::Expansion),
            LayerRegistry::new(shape),
        )
        .unwrap();
        store.commit(grid(shape, LandCover::Planned)).unwrap();
        assert_eq!(store.current().count(LandCover::Planned), 4);
        assert_eq!(store.initial().count(LandCover::Planned), 0);

        store.reset();
        assert_eq!(store.current(), store.initial());
    }

    #[test]
    fn commit_rejects_other_shape() {
        let shape = GridShape::new(2, 2);
        let mut store =
            GridStore::new(grid(shape, LandCover::Expansion), LayerRegistry::new(shape)).unwrap();
        let err = store
            .commit(grid(GridShape::new(1, 4), LandCover::Planned))
            .unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }
}
