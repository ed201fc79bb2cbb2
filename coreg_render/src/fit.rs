// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fit-to-surface scale from physical image extents.

use coreg_core::image::ImageDescriptor;
use kurbo::Size;

/// Scale factors that fit an image's physical extent to a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitScale {
    /// Scale at which the physical width exactly fills the surface width.
    pub horizontal: f64,
    /// Scale at which the physical height exactly fills the surface height.
    pub vertical: f64,
    /// The smaller of the two; fits the whole image with no overflow.
    pub factor: f64,
}

/// Computes the fit scales for `image` on a surface of the given size.
///
/// Extents are physical (pixel count times spacing), so two images of the
/// same anatomy fit to the same on-screen size regardless of acquisition
/// resolution. `padding` is subtracted from both surface dimensions first.
#[must_use]
pub fn fit_scale(surface: Size, image: &ImageDescriptor, padding: f64) -> FitScale {
    let horizontal = (surface.width - padding) / image.physical_width();
    let vertical = (surface.height - padding) / image.physical_height();
    FitScale {
        horizontal,
        vertical,
        factor: horizontal.min(vertical),
    }
}
