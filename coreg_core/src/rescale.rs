// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spacing-relative rescale of one layer against another.
//!
//! [`rescale`](LayerStack::rescale) rewrites a target layer's scale so that
//! its physical extent lines up with a base layer's, using the column
//! spacing and pixel width of both images. The formula intentionally
//! compounds with whatever scale ratio the two layers already have instead
//! of resetting to a raw 1:1 physical match, so user-applied zoom survives.
//!
//! This operation is independent of viewport synchronization; the composite
//! pass calls it from its resize handling, and hosts may call it directly.

use thiserror::Error;

use crate::layer::{LayerId, LayerStack};

/// Error returned by [`LayerStack::rescale`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RescaleError {
    /// Base and target are the same layer. Rescaling a layer against itself
    /// is meaningless and is rejected rather than silently ignored.
    #[error("cannot rescale layer {0:?} against itself")]
    SameLayer(LayerId),
}

impl LayerStack {
    /// Rescales `target` so its physical extent matches `base`, scaled by
    /// their current relative zoom.
    ///
    /// Computes
    /// `col_relative = (target.column_spacing * target.width) /
    /// (base.column_spacing * base.width)` and sets
    /// `target.scale = base.scale * (target.scale / base.scale) *
    /// col_relative`. Only the target's scale is written; everything else in
    /// its viewport is untouched.
    ///
    /// Returns without mutating when either layer has no image or its image
    /// has no source identifier — dynamically generated images are not
    /// spacing-comparable, and that is an expected state, not an error.
    ///
    /// # Errors
    ///
    /// [`RescaleError::SameLayer`] when both handles name the same layer.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn rescale(&mut self, base: LayerId, target: LayerId) -> Result<(), RescaleError> {
        self.validate(base);
        self.validate(target);
        if base == target {
            return Err(RescaleError::SameLayer(base));
        }

        let (Some(base_image), Some(target_image)) = (
            self.image[base.idx as usize].as_ref(),
            self.image[target.idx as usize].as_ref(),
        ) else {
            return Ok(());
        };
        if base_image.source.is_none() || target_image.source.is_none() {
            return Ok(());
        }

        let col_relative = (target_image.column_spacing * f64::from(target_image.width))
            / (base_image.column_spacing * f64::from(base_image.width));

        let base_scale = self.viewport[base.idx as usize].scale;
        let mut viewport = self.viewport[target.idx as usize];
        let ratio = (viewport.scale / base_scale) * col_relative;
        viewport.scale = base_scale * ratio;
        self.set_viewport(target, viewport);
        Ok(())
    }
}
