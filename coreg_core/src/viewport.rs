// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-layer viewport state.
//!
//! A [`Viewport`] controls how a layer's pixel grid maps to the output
//! surface: uniform scale, rotation, pan, flips, and the displayed-area
//! rectangle that selects which part of the image is drawn. Rotation is kept
//! in degrees here (what hosts and DICOM-ish metadata speak) and converted to
//! radians only inside transform construction.
//!
//! Viewports are plain `Copy` values. Mutation goes through
//! [`LayerStack::set_viewport`](crate::layer::LayerStack::set_viewport) so
//! the change is recorded on the [`VIEWPORT`](crate::dirty::VIEWPORT)
//! invalidation channel.

use kurbo::Vec2;

use crate::image::ImageDescriptor;

/// Identifier of a host-registered colormap LUT.
///
/// The core never looks inside a colormap; the id only participates in render
/// strategy selection (pseudo-color and label-map rasterization).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColormapId(pub u32);

/// Inclusive pixel-space rectangle selecting the part of an image to draw.
///
/// Corners are pixel coordinates: `(left, top)` and `(right, bottom)`, both
/// inclusive, so a single-pixel area has all four fields equal and the width
/// and height are always at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DisplayedArea {
    /// Column of the left edge.
    pub left: u32,
    /// Row of the top edge.
    pub top: u32,
    /// Column of the right edge (inclusive).
    pub right: u32,
    /// Row of the bottom edge (inclusive).
    pub bottom: u32,
}

impl DisplayedArea {
    /// Creates an area from inclusive corner coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the corners are inverted (`right < left` or
    /// `bottom < top`).
    #[must_use]
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        assert!(
            left <= right && top <= bottom,
            "inverted displayed area: ({left},{top})..({right},{bottom})"
        );
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// The full extent of `image`.
    #[must_use]
    pub fn full(image: &ImageDescriptor) -> Self {
        Self::new(
            0,
            0,
            image.width.saturating_sub(1),
            image.height.saturating_sub(1),
        )
    }

    /// Width in pixels (at least 1).
    #[inline]
    #[must_use]
    pub const fn width(self) -> u32 {
        self.right - self.left + 1
    }

    /// Height in pixels (at least 1).
    #[inline]
    #[must_use]
    pub const fn height(self) -> u32 {
        self.bottom - self.top + 1
    }
}

impl Default for DisplayedArea {
    /// A single-pixel area at the origin.
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

/// How a layer's pixels map to the output surface.
///
/// `scale` must stay positive; the synchronizer and rescaler preserve that by
/// construction (they multiply positive scales by positive ratios).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Uniform zoom factor.
    pub scale: f64,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    /// Pan offset in pixels, applied in the unrotated frame.
    pub translation: Vec2,
    /// Mirror horizontally.
    pub hflip: bool,
    /// Mirror vertically.
    pub vflip: bool,
    /// Which part of the image is drawn.
    pub displayed_area: DisplayedArea,
    /// Colormap for pseudo-color or label-map rasterization.
    pub colormap: Option<ColormapId>,
    /// Treat the image as a label map (requires `colormap`).
    pub labelmap: bool,
    /// Draw with pixel replication (nearest-neighbor) instead of smoothing.
    pub pixel_replication: bool,
}

impl Viewport {
    /// A default viewport whose displayed area covers all of `image`.
    #[must_use]
    pub fn for_image(image: &ImageDescriptor) -> Self {
        Self {
            displayed_area: DisplayedArea::full(image),
            ..Self::default()
        }
    }

    /// Rotation converted to radians.
    #[inline]
    #[must_use]
    pub fn rotation_radians(&self) -> f64 {
        self.rotation.to_radians()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: 0.0,
            translation: Vec2::ZERO,
            hflip: false,
            vflip: false,
            displayed_area: DisplayedArea::default(),
            colormap: None,
            labelmap: false,
            pixel_replication: false,
        }
    }
}
