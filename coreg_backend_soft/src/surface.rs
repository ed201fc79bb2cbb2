// Copyright 2026 the Coreg Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The pixmap-backed composite surface.

use coreg_core::color::Rgba8;
use coreg_core::layer::LayerId;
use coreg_core::viewport::DisplayedArea;
use coreg_render::{CompositeSurface, DrawParams};
use kurbo::{Affine, Size};
use thiserror::Error;
use tiny_skia::{BlendMode, Color, FilterQuality, Paint, Pixmap, PixmapPaint, Rect, Transform};

use crate::cache::LayerCache;

/// Error constructing a [`SoftSurface`].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    /// The requested dimensions cannot back a pixmap (zero or out of range).
    #[error("cannot allocate a {width}x{height} pixmap")]
    Invalid {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
}

/// A CPU composite surface backed by a tiny-skia pixmap.
///
/// `draw_layer` pulls the layer's pixmap from the shared [`LayerCache`] that
/// the paired [`StagedRasterizer`](crate::StagedRasterizer) fills, maps it
/// through the draw transform (bilinear when smoothing is on, pixel
/// replication otherwise), and blends it source-over onto the output. The
/// optional fill color is painted under the samples first, faded by the same
/// layer opacity.
#[derive(Debug)]
pub struct SoftSurface {
    pixmap: Pixmap,
    cache: LayerCache,
}

impl SoftSurface {
    /// Creates a surface of the given pixel dimensions.
    ///
    /// # Errors
    ///
    /// [`SurfaceError::Invalid`] when the dimensions cannot back a pixmap.
    pub fn new(width: u32, height: u32, cache: LayerCache) -> Result<Self, SurfaceError> {
        let Some(pixmap) = Pixmap::new(width, height) else {
            return Err(SurfaceError::Invalid { width, height });
        };
        Ok(Self { pixmap, cache })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// The composited output, premultiplied RGBA.
    #[must_use]
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// The composited output as straight (unmultiplied) RGBA bytes,
    /// row-major.
    #[must_use]
    pub fn unmultiplied_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for pixel in self.pixmap.pixels() {
            let color = pixel.demultiply();
            bytes.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        bytes
    }
}

impl CompositeSurface for SoftSurface {
    fn size(&self) -> Size {
        Size::new(f64::from(self.pixmap.width()), f64::from(self.pixmap.height()))
    }

    fn clear(&mut self, color: Rgba8) {
        self.pixmap.fill(to_color(color));
    }

    fn draw_layer(&mut self, layer: LayerId, area: DisplayedArea, params: &DrawParams) {
        let transform = to_transform(params.transform);

        if let Some(fill) = params.fill {
            if let Some(rect) =
                Rect::from_xywh(0.0, 0.0, area.width() as f32, area.height() as f32)
            {
                let mut color = to_color(fill);
                color.apply_opacity(params.opacity);
                let mut paint = Paint::default();
                paint.set_color(color);
                paint.anti_alias = false;
                self.pixmap.fill_rect(rect, &paint, transform, None);
            }
        }

        let paint = PixmapPaint {
            opacity: params.opacity,
            blend_mode: BlendMode::SourceOver,
            quality: if params.smoothing {
                FilterQuality::Bilinear
            } else {
                FilterQuality::Nearest
            },
        };
        // Nothing cached means the rasterizer never ran for this layer; the
        // pass has already failed in that case, so there is nothing to draw.
        let _ = self.cache.with(layer.index(), |source| {
            debug_assert_eq!(
                (source.width(), source.height()),
                (area.width(), area.height()),
                "cached pixmap does not match the displayed area"
            );
            self.pixmap
                .draw_pixmap(0, 0, source.as_ref(), &paint, transform, None);
        });
    }
}

fn to_color(color: Rgba8) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn to_transform(affine: Affine) -> Transform {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "f32 transforms are precise enough for pixel mapping"
    )]
    let [sx, ky, kx, sy, tx, ty] = affine.as_coeffs().map(|c| c as f32);
    Transform::from_row(sx, ky, kx, sy, tx, ty)
}
