// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-modality render-strategy selection.

use coreg_core::image::ImageDescriptor;
use coreg_core::trace::StrategyKind;
use coreg_core::viewport::{ColormapId, Viewport};

/// How a layer's pixels are converted to colors during rasterization.
///
/// Selected once per layer per pass by a fixed precedence: label-map beats
/// pseudo-color beats true-color beats grayscale. The variants carry what
/// the corresponding rasterizer needs and nothing else.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStrategy {
    /// Discrete label overlay: the colormap is an index-to-color table and
    /// zero pixels are transparent.
    LabelMap {
        /// Lookup table for label values.
        colormap: ColormapId,
    },
    /// Continuous pseudo-color lookup applied to windowed grayscale values.
    PseudoColor {
        /// Lookup table for intensity values.
        colormap: ColormapId,
    },
    /// The image already carries color pixels.
    TrueColor,
    /// Grayscale windowing.
    Grayscale {
        /// Whether the rasterizer composites the image's alpha channel.
        /// Only the base layer of a composite does; overlays get their
        /// transparency from opacity and colormaps instead.
        include_alpha: bool,
    },
}

impl RenderStrategy {
    /// Selects the strategy for one layer.
    ///
    /// `base_layer` is true for the first layer in draw order; it alone
    /// requests alpha-channel compositing when it falls through to
    /// grayscale.
    #[must_use]
    pub fn select(viewport: &Viewport, image: &ImageDescriptor, base_layer: bool) -> Self {
        match viewport.colormap {
            Some(colormap) if viewport.labelmap => Self::LabelMap { colormap },
            Some(colormap) => Self::PseudoColor { colormap },
            None if image.color => Self::TrueColor,
            None => Self::Grayscale {
                include_alpha: base_layer,
            },
        }
    }

    /// The fieldless kind of this strategy, as reported in trace events.
    #[must_use]
    pub fn kind(self) -> StrategyKind {
        match self {
            Self::LabelMap { .. } => StrategyKind::LabelMap,
            Self::PseudoColor { .. } => StrategyKind::PseudoColor,
            Self::TrueColor => StrategyKind::TrueColor,
            Self::Grayscale { .. } => StrategyKind::Grayscale,
        }
    }
}
