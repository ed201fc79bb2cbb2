// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The output surface a composite pass draws into.

use coreg_core::color::Rgba8;
use coreg_core::layer::LayerId;
use coreg_core::viewport::DisplayedArea;
use kurbo::{Affine, Size};

/// Per-draw parameters for one layer copy.
#[derive(Clone, Copy, Debug)]
pub struct DrawParams {
    /// Maps displayed-area-local pixel coordinates to surface coordinates.
    pub transform: Affine,
    /// Blending opacity in `[0, 1]`.
    pub opacity: f32,
    /// Solid color drawn under the layer's pixels, if any.
    pub fill: Option<Rgba8>,
    /// Whether to interpolate when resampling. False when the layer
    /// requests pixel replication.
    pub smoothing: bool,
}

/// A 2D surface that can clear itself and blend rasterized layers.
///
/// The compositor drives exactly one `clear` followed by zero or more
/// `draw_layer` calls per pass. Implementations own both the output pixels
/// and whatever per-layer storage their paired [`LayerRasterizer`] writes
/// into.
///
/// [`LayerRasterizer`]: crate::LayerRasterizer
pub trait CompositeSurface {
    /// The surface size in pixels.
    fn size(&self) -> Size;

    /// Resets any transform state and fills the whole surface with `color`.
    fn clear(&mut self, color: Rgba8);

    /// Source-over blends the layer's rasterized `area` onto the surface
    /// under `params`.
    ///
    /// All geometry comes in through `params.transform`; the copy itself
    /// adds no scaling.
    fn draw_layer(&mut self, layer: LayerId, area: DisplayedArea, params: &DrawParams);
}
