// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layer-to-surface display transform.
//!
//! [`display_transform`] maps displayed-area-local pixel coordinates (origin
//! at the displayed area's top-left corner) to surface coordinates. The
//! transform is built outermost-first:
//!
//! 1. translate to the surface center,
//! 2. rotate,
//! 3. scale, corrected for anisotropic pixel spacing,
//! 4. un-rotate,
//! 5. pan,
//! 6. re-rotate,
//! 7. flip horizontally and/or vertically,
//! 8. translate by minus half the displayed area.
//!
//! The rotate/un-rotate sandwich around the scale keeps the spacing
//! correction in image axes while the pan stays in unrotated axes, and
//! because the pan sits inside the scale it is expressed in image pixels.
//! Viewport synchronization relies on both of those frames: it copies
//! rotation verbatim and divides translation by the scale ratio, which only
//! lands layers on the same surface point under this composition order.

use kurbo::{Affine, Size, Vec2};

use crate::image::ImageDescriptor;
use crate::viewport::Viewport;

/// Splits a uniform zoom into per-axis scale factors that compensate for
/// anisotropic pixel spacing.
///
/// The denser axis is stretched so one physical unit covers the same number
/// of surface pixels in both directions. Isotropic images pass through
/// unchanged.
pub(crate) fn spacing_corrected_scale(scale: f64, image: &ImageDescriptor) -> (f64, f64) {
    let mut width_scale = scale;
    let mut height_scale = scale;
    if image.row_spacing < image.column_spacing {
        width_scale *= image.column_spacing / image.row_spacing;
    } else if image.column_spacing < image.row_spacing {
        height_scale *= image.row_spacing / image.column_spacing;
    }
    (width_scale, height_scale)
}

/// Computes the transform from a layer's displayed area to the surface.
///
/// `surface` is the size of the composite surface in pixels. The viewport
/// supplies zoom, rotation, pan, flips, and the displayed area; the image
/// supplies the pixel spacing used to correct for anisotropy.
#[must_use]
pub fn display_transform(surface: Size, viewport: &Viewport, image: &ImageDescriptor) -> Affine {
    let (width_scale, height_scale) = spacing_corrected_scale(viewport.scale, image);
    let rotated = viewport.rotation != 0.0;
    let radians = viewport.rotation_radians();

    let mut t = Affine::translate(Vec2::new(surface.width / 2.0, surface.height / 2.0));
    if rotated {
        t = t * Affine::rotate(radians);
    }
    t = t * Affine::scale_non_uniform(width_scale, height_scale);
    if rotated {
        t = t * Affine::rotate(-radians);
    }
    t = t * Affine::translate(viewport.translation);
    if rotated {
        t = t * Affine::rotate(radians);
    }
    if viewport.hflip || viewport.vflip {
        t = t * Affine::scale_non_uniform(
            if viewport.hflip { -1.0 } else { 1.0 },
            if viewport.vflip { -1.0 } else { 1.0 },
        );
    }
    let area = viewport.displayed_area;
    t * Affine::translate(Vec2::new(
        -f64::from(area.width()) / 2.0,
        -f64::from(area.height()) / 2.0,
    ))
}
