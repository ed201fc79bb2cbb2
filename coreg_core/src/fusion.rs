// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay transform for reformatted functional layers.
//!
//! A functional image (PET) reformatted to a sagittal or coronal plane
//! cannot reuse the anatomical layer's display transform directly: its
//! pixels are rarely square, its physical extent differs from the
//! anatomical frame's, and its own viewport scale is meaningless next to
//! the frame it is drawn into. [`fusion_transform`](LayerStack::fusion_transform)
//! builds the affine for that case from two layers at once:
//!
//! - the **reference frame** (the fused layer itself) supplies rotation,
//!   pan, flips, and the displayed area, so the overlay follows the frame
//!   it is drawn into, and
//! - the **active layer** supplies the uniform zoom, the anisotropic
//!   spacing correction, and the displayed-height numerator, so the
//!   overlay's physical size tracks the layer the user is driving.
//!
//! The width axis is additionally multiplied by the baseline scale ratio
//! between the two layers (see [`sync`](crate::sync)), and the height axis
//! by the ratio of the two displayed heights, which reconciles the layers'
//! differing physical extents along each axis.
//!
//! The composition order is the same as
//! [`display_transform`](crate::transform::display_transform); zero frame
//! rotation skips the rotate/un-rotate steps entirely rather than
//! multiplying by an identity rotation.

use kurbo::{Affine, Size, Vec2};

use crate::layer::{LayerId, LayerStack};
use crate::transform::spacing_corrected_scale;

impl LayerStack {
    /// Computes the transform that overlays the fused `layer` onto the
    /// surface in `active`'s display frame.
    ///
    /// Takes `&mut self` because the baseline scale ratio lazily captures a
    /// snapshot for either layer if one is missing.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    #[must_use]
    pub fn fusion_transform(&mut self, surface: Size, layer: LayerId, active: LayerId) -> Affine {
        let ratio = self.viewport_ratio(active, layer);
        let frame = self.viewport[layer.idx as usize];
        let active_viewport = self.viewport[active.idx as usize];

        let (mut width_scale, mut height_scale) =
            match self.image[active.idx as usize].as_ref() {
                Some(image) => spacing_corrected_scale(active_viewport.scale, image),
                None => (active_viewport.scale, active_viewport.scale),
            };
        width_scale *= ratio;
        height_scale *= f64::from(active_viewport.displayed_area.height())
            / f64::from(frame.displayed_area.height());

        let rotated = frame.rotation != 0.0;
        let radians = frame.rotation_radians();

        let mut t = Affine::translate(Vec2::new(surface.width / 2.0, surface.height / 2.0));
        if rotated {
            t = t * Affine::rotate(radians);
        }
        t = t * Affine::scale_non_uniform(width_scale, height_scale);
        if rotated {
            t = t * Affine::rotate(-radians);
        }
        t = t * Affine::translate(frame.translation);
        if rotated {
            t = t * Affine::rotate(radians);
        }
        if frame.hflip || frame.vflip {
            t = t * Affine::scale_non_uniform(
                if frame.hflip { -1.0 } else { 1.0 },
                if frame.vflip { -1.0 } else { 1.0 },
            );
        }
        let area = frame.displayed_area;
        t * Affine::translate(Vec2::new(
            -f64::from(area.width()) / 2.0,
            -f64::from(area.height()) / 2.0,
        ))
    }
}
