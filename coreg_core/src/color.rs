// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A minimal RGBA color type.
//!
//! Colors appear at two points in the pipeline: the solid background fill at
//! the start of each composite pass, and the optional per-layer fill color in
//! [`LayerOptions`](crate::layer::LayerOptions). Pixel-level color work
//! (windowing, LUTs) happens behind the rasterizer seam and never enters this
//! crate.

/// An 8-bit-per-channel RGBA color, not premultiplied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black, the composite background fill.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a color from channel values.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Returns whether the color is fully opaque.
    #[inline]
    #[must_use]
    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }
}
