// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The staged-sample rasterizer.

use std::collections::BTreeMap;

use coreg_core::layer::{LayerId, LayerStack};
use coreg_core::viewport::DisplayedArea;
use coreg_render::{LayerRasterizer, RasterError, RenderStrategy};
use thiserror::Error;
use tiny_skia::{ColorU8, Pixmap};

use crate::cache::LayerCache;

/// Error staging source samples.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum StageError {
    /// Sample buffer length does not match the staged dimensions.
    #[error("expected {expected} bytes for {width}x{height}, got {got}")]
    LengthMismatch {
        /// Staged width in pixels.
        width: u32,
        /// Staged height in pixels.
        height: u32,
        /// Bytes the dimensions require.
        expected: usize,
        /// Bytes actually supplied.
        got: usize,
    },
}

#[derive(Clone, Debug)]
enum Samples {
    /// One luminance byte per pixel.
    Gray8(Vec<u8>),
    /// Four bytes (R, G, B, straight A) per pixel.
    Rgba8(Vec<u8>),
}

/// Pixel samples staged for one layer, standing in for the output of a
/// per-modality renderer.
#[derive(Clone, Debug)]
pub struct StagedSource {
    width: u32,
    height: u32,
    samples: Samples,
}

impl StagedSource {
    /// Stages grayscale samples, one byte per pixel.
    ///
    /// # Errors
    ///
    /// [`StageError::LengthMismatch`] when `samples` is not
    /// `width * height` bytes.
    pub fn gray8(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, StageError> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(StageError::LengthMismatch {
                width,
                height,
                expected,
                got: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples: Samples::Gray8(samples),
        })
    }

    /// Stages straight-alpha RGBA samples, four bytes per pixel.
    ///
    /// # Errors
    ///
    /// [`StageError::LengthMismatch`] when `samples` is not
    /// `width * height * 4` bytes.
    pub fn rgba8(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, StageError> {
        let expected = width as usize * height as usize * 4;
        if samples.len() != expected {
            return Err(StageError::LengthMismatch {
                width,
                height,
                expected,
                got: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            samples: Samples::Rgba8(samples),
        })
    }

    /// Staged width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Staged height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Copies the displayed-area window into a fresh pixmap.
    ///
    /// Rows and columns outside the staged dimensions stay transparent.
    fn crop(&self, area: DisplayedArea) -> Pixmap {
        // Displayed-area dimensions are nonzero by construction.
        let Some(mut pixmap) = Pixmap::new(area.width(), area.height()) else {
            panic!(
                "displayed area {}x{} exceeds pixmap limits",
                area.width(),
                area.height()
            );
        };
        let width = self.width as usize;
        let pixels = pixmap.pixels_mut();
        for row in 0..area.height() {
            let src_row = area.top + row;
            if src_row >= self.height {
                break;
            }
            for col in 0..area.width() {
                let src_col = area.left + col;
                if src_col >= self.width {
                    break;
                }
                let at = src_row as usize * width + src_col as usize;
                let color = match &self.samples {
                    Samples::Gray8(samples) => {
                        let v = samples[at];
                        ColorU8::from_rgba(v, v, v, 255)
                    }
                    Samples::Rgba8(samples) => {
                        let at = at * 4;
                        ColorU8::from_rgba(
                            samples[at],
                            samples[at + 1],
                            samples[at + 2],
                            samples[at + 3],
                        )
                    }
                };
                pixels[row as usize * area.width() as usize + col as usize] = color.premultiply();
            }
        }
        pixmap
    }
}

/// A [`LayerRasterizer`] serving externally staged samples.
///
/// The compositing core treats per-modality rendering (grayscale windowing,
/// pseudo-color and label-map LUTs) as an opaque draw-into-an-off-screen-
/// surface operation. This rasterizer is that operation's software stand-in:
/// hosts stage already-rendered samples per layer, and `rasterize` crops
/// them to the layer's displayed area and caches the result, skipping the
/// copy when the pass says the layer is clean.
///
/// Grayscale stagings carry no color or class information, so they serve
/// only the grayscale strategy; RGBA stagings are treated as already
/// rendered under whatever strategy applies. The grayscale alpha-compositing
/// flag is advice to real modality renderers and staged samples composite as
/// given.
#[derive(Debug)]
pub struct StagedRasterizer {
    staged: BTreeMap<u32, StagedSource>,
    cache: LayerCache,
    refreshes: u32,
}

impl StagedRasterizer {
    /// Creates a rasterizer writing into `cache`.
    #[must_use]
    pub fn new(cache: LayerCache) -> Self {
        Self {
            staged: BTreeMap::new(),
            cache,
            refreshes: 0,
        }
    }

    /// Stages samples for a layer, replacing any previous staging.
    ///
    /// Stagings are keyed by the layer's slot, so a host that destroys a
    /// layer must [`unstage`](Self::unstage) it before the slot is reused.
    pub fn stage(&mut self, layer: LayerId, source: StagedSource) {
        let _ = self.staged.insert(layer.index(), source);
    }

    /// Removes a layer's staged samples and evicts its cached pixmap.
    pub fn unstage(&mut self, layer: LayerId) {
        let _ = self.staged.remove(&layer.index());
        self.cache.evict(layer.index());
    }

    /// How many times `rasterize` actually refreshed a layer pixmap.
    #[must_use]
    pub fn refreshes(&self) -> u32 {
        self.refreshes
    }
}

impl LayerRasterizer for StagedRasterizer {
    fn rasterize(
        &mut self,
        stack: &LayerStack,
        layer: LayerId,
        strategy: RenderStrategy,
        redraw: bool,
    ) -> Result<(), RasterError> {
        let Some(source) = self.staged.get(&layer.index()) else {
            return Err(RasterError::MissingSource(layer));
        };
        let gray = matches!(source.samples, Samples::Gray8(_));
        if gray && !matches!(strategy, RenderStrategy::Grayscale { .. }) {
            return Err(RasterError::UnsupportedStrategy(strategy.kind()));
        }
        if !redraw && self.cache.contains(layer.index()) {
            return Ok(());
        }

        let area = stack.viewport(layer).displayed_area;
        self.cache.insert(layer.index(), source.crop(area));
        self.refreshes += 1;
        Ok(())
    }
}
