// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The per-modality rasterization seam.

use coreg_core::layer::{LayerId, LayerStack};
use coreg_core::trace::StrategyKind;
use thiserror::Error;

use crate::strategy::RenderStrategy;

/// Error from a layer rasterizer.
///
/// A rasterizer failure aborts the rest of the composite pass; the partial
/// frame is acceptable because every pass clears the surface first.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RasterError {
    /// The rasterizer has no pixel data for this layer.
    #[error("no pixel source staged for layer {0:?}")]
    MissingSource(LayerId),
    /// The rasterizer does not implement the selected strategy.
    #[error("render strategy {0:?} is not supported by this rasterizer")]
    UnsupportedStrategy(StrategyKind),
}

/// Rasterizes one layer into its own off-screen pixels.
///
/// Implementations stand in for the per-modality renderers (grayscale
/// windowing, color LUTs, label maps). The compositor calls `rasterize`
/// right before copying the layer's displayed area to the output surface.
pub trait LayerRasterizer {
    /// Produces the layer's pixels under the given strategy.
    ///
    /// `redraw` is false when the layer is unchanged since the last pass
    /// and the host did not force invalidation; the implementation may then
    /// keep its previous pixels and return immediately.
    ///
    /// # Errors
    ///
    /// Any [`RasterError`] aborts the composite pass.
    fn rasterize(
        &mut self,
        stack: &LayerStack,
        layer: LayerId,
        strategy: RenderStrategy,
        redraw: bool,
    ) -> Result<(), RasterError>;
}
